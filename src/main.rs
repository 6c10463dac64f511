// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Study-streak reconciler
//!
//! Rebuilds cached activity state (ledger, streak, group summaries) from the
//! post store for selected users or every member of a group. Used to heal
//! drift left behind by recomputes that failed after a post was committed.

use anyhow::{bail, Context, Result};
use clap::Parser;
use study_streak::{config::Config, db::FirestoreDb, ActivityEngine};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "study-streak-reconcile")]
struct Cli {
    /// User to reconcile (repeatable)
    #[arg(short, long = "user")]
    users: Vec<String>,

    /// Reconcile every member of this group
    #[arg(short, long)]
    group: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let cli = Cli::parse();
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!(project = %config.gcp_project_id, "Starting reconciler");

    let db = FirestoreDb::new(&config.gcp_project_id)
        .await
        .with_context(|| format!("Failed to connect to project {}", config.gcp_project_id))?;

    let mut user_ids = cli.users.clone();
    if let Some(group_id) = &cli.group {
        let group = db
            .get_group(group_id)
            .await
            .with_context(|| format!("Failed to load group {}", group_id))?
            .with_context(|| format!("Group {} not found", group_id))?;
        tracing::info!(
            group_id = %group_id,
            members = group.member_ids.len(),
            "Reconciling group members"
        );
        user_ids.extend(group.member_ids);
    }
    user_ids.sort();
    user_ids.dedup();

    if user_ids.is_empty() {
        bail!("Nothing to reconcile: pass --user and/or --group");
    }

    let engine = ActivityEngine::new(db, &config);

    let mut failed = 0usize;
    for user_id in &user_ids {
        match engine.reconcile_user(user_id).await {
            Ok(user) => {
                println!(
                    "{}: streak={} active_days={} groups={}",
                    user_id,
                    user.streak,
                    user.activity.len(),
                    user.group_streaks.len()
                );
            }
            Err(e) => {
                failed += 1;
                tracing::error!(user_id = %user_id, error = %e, "Reconcile failed");
            }
        }
    }

    tracing::info!(total = user_ids.len(), failed, "Reconcile finished");

    if failed > 0 {
        bail!("{} of {} users failed to reconcile", failed, user_ids.len());
    }
    Ok(())
}

/// Initialize structured JSON logging (GCP-compliant).
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("study_streak=debug,info"));

    tracing_subscriber::registry().with(filter).with(format).init();
}
