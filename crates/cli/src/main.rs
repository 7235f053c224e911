// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]
#![allow(clippy::multiple_crate_versions)]

mod commands;

use clap::Parser;
use commands::{Command, execute};
use fieldvisit::{
    Cache, EventDispatcher, EventSink, LoggingEventHandler, MokaCache, Notifier, TracingNotifier,
    VisitConfig, VisitService,
};
use fieldvisit_audit::Actor;
use fieldvisit_domain::{Device, Role, UserId};
use fieldvisit_persistence::Persistence;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// fieldvisit - operate field-service maintenance visits
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the `SQLite` database file. If not provided, uses in-memory database.
    #[arg(short, long, global = true)]
    database: Option<PathBuf>,

    /// JSON file with service settings
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// User id of the person running the command
    #[arg(long, global = true, default_value_t = 1)]
    actor_id: i64,

    /// Role of the person running the command
    #[arg(long, global = true, default_value = "manager")]
    actor_role: Role,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    const fn actor(&self) -> Actor {
        Actor::new(UserId::new(self.actor_id), self.actor_role)
    }
}

fn open_store(database: Option<&PathBuf>) -> Result<Persistence, Box<dyn std::error::Error>> {
    let persistence: Persistence = if let Some(db_path) = database {
        info!("Using file-based database at: {}", db_path.display());
        Persistence::new_with_file(db_path)?
    } else {
        info!("Using in-memory database");
        Persistence::new_in_memory()?
    };
    Ok(persistence)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Args = Args::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config: VisitConfig = match &args.config {
        Some(path) => VisitConfig::from_file(path)?,
        None => VisitConfig::default(),
    };
    let store: Persistence = open_store(args.database.as_ref())?;

    let (dispatcher, worker) =
        EventDispatcher::spawn(LoggingEventHandler, config.event_queue_capacity);
    let devices: Arc<MokaCache<Device>> = Arc::new(MokaCache::new(config.device_cache_capacity));
    let service: VisitService<Persistence> = VisitService::new(
        store,
        &config,
        devices as Arc<dyn Cache<Device>>,
        Arc::new(dispatcher) as Arc<dyn EventSink>,
        Arc::new(TracingNotifier) as Arc<dyn Notifier>,
    );

    let actor: Actor = args.actor();
    let result = execute(&service, &actor, args.command);

    // Closing the service closes the queue; wait for queued events to drain.
    drop(service);
    worker.await?;

    let output: serde_json::Value = result?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
