//! Merging the three source sets into one lifecycle view.
//!
//! The merge order is fixed: requests seed the map, active records overlay
//! them, the retired archive overlays both. Later-stage sources always win a
//! status conflict because a later lifecycle stage is a strictly more
//! specific fact about the same person. The output is deterministic for a
//! given set of inputs; no clock or randomness is consulted.

use std::collections::BTreeMap;

use crate::appointee::{Appointee, Identity, LifecycleStatus};

// ─── Source stages ───────────────────────────────────────────────────────────

/// Which record set an entry was last touched by. Used only as the conflict
/// tie-break when collapsing id/email duplicate keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Stage {
  Requests,
  Actives,
  Retired,
}

struct Entry {
  appointee: Appointee,
  stage:     Stage,
}

// ─── Merge ───────────────────────────────────────────────────────────────────

/// Merge the three normalized sets into a deduplicated map keyed by
/// [`Identity`].
///
/// 1. Seed from `requests`, keeping each record's own request status.
/// 2. Overlay `actives`: a person present here is serving now, so their
///    status is forced to `Active` — unless the active source itself marked
///    the row inactive, in which case the archived classification stands.
/// 3. Overlay `retired`: the archive's classification wins outright, even
///    over an active record for the same person.
/// 4. Collapse entries that the id/email key fallback split in two: the
///    id-keyed record wins, the email-keyed record fills its gaps, and the
///    later-stage status survives.
pub fn reconcile(
  requests: Vec<Appointee>,
  actives: Vec<Appointee>,
  retired: Vec<Appointee>,
) -> BTreeMap<Identity, Appointee> {
  let mut working: BTreeMap<Identity, Entry> = BTreeMap::new();

  for rec in requests {
    upsert(&mut working, rec, Stage::Requests);
  }
  for rec in actives {
    upsert(&mut working, rec, Stage::Actives);
  }
  for rec in retired {
    upsert(&mut working, rec, Stage::Retired);
  }

  collapse_key_fallback(&mut working);

  working
    .into_iter()
    .map(|(k, e)| (k, e.appointee))
    .collect()
}

fn upsert(
  map: &mut BTreeMap<Identity, Entry>,
  mut rec: Appointee,
  stage: Stage,
) {
  let status = classify(&rec, stage);
  rec.status = status;

  match map.get_mut(&rec.identity) {
    None => {
      let key = rec.identity.clone();
      map.insert(key, Entry { appointee: rec, stage });
    }
    Some(existing) => {
      // Later-stage record becomes the base; the earlier one fills gaps.
      if stage >= existing.stage {
        rec.fill_gaps_from(&existing.appointee);
        existing.appointee = rec;
        existing.stage = stage;
      } else {
        existing.appointee.fill_gaps_from(&rec);
      }
    }
  }
}

/// Decide the status contribution of a record from a given stage.
fn classify(rec: &Appointee, stage: Stage) -> LifecycleStatus {
  match stage {
    // Requests keep whatever the request row said (pending / approved /
    // rejected).
    Stage::Requests => rec.status,
    // The active set is authoritative for "currently serving". A row the
    // source itself flagged as no longer active keeps its archived
    // classification.
    Stage::Actives => {
      if rec.status.is_archived() {
        rec.status
      } else {
        LifecycleStatus::Active
      }
    }
    // The archive's own classification wins; anything unclassified there is
    // a retirement.
    Stage::Retired => {
      if rec.status.is_archived() {
        rec.status
      } else {
        LifecycleStatus::Retired
      }
    }
  }
}

/// Collapse pairs of entries that describe one person under two keys: one
/// keyed by numeric id, one keyed by email (the fallback key). The id-keyed
/// entry is the higher-fidelity record and survives; non-null fields from
/// the email-keyed entry fill its gaps, and whichever entry was touched by
/// the later stage contributes the status.
fn collapse_key_fallback(map: &mut BTreeMap<Identity, Entry>) {
  // Identity::Ord puts all Id keys first, so one pass over the map collects
  // the email index of every id-keyed entry.
  let mut email_to_id: BTreeMap<Identity, Identity> = BTreeMap::new();
  for (key, entry) in map.iter() {
    if matches!(key, Identity::Id(_))
      && let Some(email_key) = entry.appointee.email_key()
    {
      email_to_id.entry(email_key).or_insert_with(|| key.clone());
    }
  }

  let duplicates: Vec<(Identity, Identity)> = map
    .keys()
    .filter(|k| matches!(k, Identity::Email(_)))
    .filter_map(|k| email_to_id.get(k).map(|id| (k.clone(), id.clone())))
    .collect();

  for (email_key, id_key) in duplicates {
    let Some(weak) = map.remove(&email_key) else { continue };
    let Some(strong) = map.get_mut(&id_key) else { continue };

    if weak.stage > strong.stage {
      strong.appointee.status = weak.appointee.status;
      strong.stage = weak.stage;
    }
    strong.appointee.fill_gaps_from(&weak.appointee);
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
