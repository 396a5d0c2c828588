//! `provost` — reconciled HOD lifecycle view and transitions from the
//! command line.
//!
//! # Usage
//!
//! ```
//! provost --url http://localhost:8000 --token <token> view
//! provost view physics
//! provost stats
//! provost tenure 14
//! provost retire 14 --reason "Superannuation"
//! ```

use anyhow::{Context, Result, bail};
use chrono::Utc;
use clap::{Parser, Subcommand};
use provost_client::{LifecycleEngine, LifecycleView, SourceConfig};
use provost_core::{
  appointee::{Appointee, Identity},
  lifecycle::{Action, TransitionPayload},
  view::matches_search,
};
use serde::Deserialize;
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "provost", about = "HOD lifecycle view and transitions")]
struct Args {
  /// Path to a TOML config file (url, token).
  #[arg(short, long, value_name = "FILE")]
  config: Option<std::path::PathBuf>,

  /// Base URL of the appointment backend (default: http://localhost:8000).
  #[arg(long, env = "PROVOST_URL")]
  url: Option<String>,

  /// Backend API token.
  #[arg(long, env = "PROVOST_TOKEN")]
  token: Option<String>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Print the reconciled lifecycle view, optionally filtered.
  View {
    /// Substring to match against name, email, or department.
    term: Option<String>,
  },
  /// Print dashboard counters derived from the reconciled view.
  Stats,
  /// Print one appointee's service period.
  Tenure {
    /// Numeric id or email.
    who: String,
  },
  /// Approve a pending request.
  Approve { who: String },
  /// Reject a pending request.
  Reject {
    who: String,
    #[arg(long)]
    reason: Option<String>,
  },
  /// Activate an approved request into the active set.
  Activate {
    who: String,
    /// Department to assign; defaults to the one on the record.
    #[arg(long)]
    department: Option<String>,
  },
  /// Deactivate a serving HOD.
  Deactivate {
    who: String,
    #[arg(long)]
    reason: Option<String>,
  },
  /// Retire a serving HOD.
  Retire {
    who: String,
    #[arg(long)]
    reason: Option<String>,
  },
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default)]
struct ConfigFile {
  #[serde(default)]
  url:   String,
  #[serde(default)]
  token: String,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn")),
    )
    .with_writer(std::io::stderr)
    .init();

  let args = Args::parse();

  let file_cfg: ConfigFile = if let Some(path) = &args.config {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")?
  } else {
    ConfigFile::default()
  };

  // CLI flags override config file, which overrides defaults.
  let config = SourceConfig::new(
    args
      .url
      .or_else(|| (!file_cfg.url.is_empty()).then(|| file_cfg.url.clone()))
      .unwrap_or_else(|| "http://localhost:8000".to_string()),
    args
      .token
      .or_else(|| (!file_cfg.token.is_empty()).then(|| file_cfg.token.clone()))
      .unwrap_or_default(),
  );

  let engine =
    LifecycleEngine::new(config).context("building HTTP client")?;
  let view = engine.lifecycle_view().await;
  report_degradation(&view);

  match args.command {
    Command::View { term } => {
      let term = term.unwrap_or_default();
      let today = Utc::now().date_naive();
      for a in view.appointees.values() {
        if matches_search(a, &term) {
          print_row(a, &engine, today);
        }
      }
    }
    Command::Stats => {
      let s = engine.stats();
      println!("active:           {}", s.active);
      println!("pending requests: {}", s.pending_requests);
      println!("retired:          {}", s.retired);
      for (dept, n) in &s.department_wise {
        println!("  {dept}: {n}");
      }
    }
    Command::Tenure { who } => {
      let identity = parse_identity(&who);
      let today = Utc::now().date_naive();
      match engine.tenure_text(&identity, today) {
        Some(text) => println!("{text}"),
        None => bail!("no appointee known as {identity}"),
      }
    }
    Command::Approve { who } => {
      transition(&engine, &who, Action::Approve, TransitionPayload::default())
        .await?
    }
    Command::Reject { who, reason } => {
      transition(
        &engine,
        &who,
        Action::Reject,
        TransitionPayload { reason, ..Default::default() },
      )
      .await?
    }
    Command::Activate { who, department } => {
      let identity = parse_identity(&who);
      // Fall back to the department already on the record.
      let department = department.or_else(|| {
        view
          .appointees
          .get(&identity)
          .and_then(|a| a.department_name.clone())
      });
      transition(
        &engine,
        &who,
        Action::Activate,
        TransitionPayload { department, ..Default::default() },
      )
      .await?
    }
    Command::Deactivate { who, reason } => {
      transition(
        &engine,
        &who,
        Action::Deactivate,
        TransitionPayload { reason, ..Default::default() },
      )
      .await?
    }
    Command::Retire { who, reason } => {
      transition(
        &engine,
        &who,
        Action::Retire,
        TransitionPayload { reason, ..Default::default() },
      )
      .await?
    }
  }

  Ok(())
}

// ─── Helpers ──────────────────────────────────────────────────────────────────

fn parse_identity(who: &str) -> Identity {
  match who.trim().parse::<i64>() {
    Ok(id) => Identity::Id(id),
    Err(_) => Identity::from_email(who),
  }
}

async fn transition(
  engine: &LifecycleEngine,
  who: &str,
  action: Action,
  payload: TransitionPayload,
) -> Result<()> {
  let identity = parse_identity(who);
  let updated = engine
    .request_transition(&identity, action, &payload)
    .await
    .with_context(|| format!("applying `{action}` to {identity}"))?;
  println!("{identity}: {}", updated.status);
  Ok(())
}

fn print_row(
  a: &Appointee,
  engine: &LifecycleEngine,
  today: chrono::NaiveDate,
) {
  let tenure = engine
    .tenure_text(&a.identity, today)
    .unwrap_or_else(|| "N/A".to_string());
  println!(
    "{:>8}  {:<24} {:<20} {:<12} {}",
    a.identity.to_string(),
    a.name,
    a.department_name.as_deref().unwrap_or("N/A"),
    a.status.to_string(),
    tenure,
  );
}

fn report_degradation(view: &LifecycleView) {
  for d in &view.degraded {
    tracing::warn!(
      source = d.source.as_str(),
      skipped_rows = d.skipped_rows,
      causes = d.causes.join("; "),
      "source degraded"
    );
  }
}
