// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Subcommands and their execution against a visit service.

use clap::Subcommand;
use fieldvisit::{CreateVisit, VisitService};
use fieldvisit_audit::Actor;
use fieldvisit_domain::{
    DeviceId, EngineerId, RequestId, Visit, VisitId, VisitOrigin, VisitOutcome, VisitStatus,
};
use fieldvisit_persistence::{Persistence, SeedData};
use serde::Serialize;
use std::path::PathBuf;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Load facilities, devices, engineers and requests from a JSON file
    Seed {
        fixtures: PathBuf,
    },
    /// Book a visit for a maintenance request
    Create {
        #[arg(long)]
        request: i64,
        #[arg(long)]
        device: i64,
        /// RFC 3339 instant, e.g. 2026-06-01T09:00:00Z
        #[arg(long, value_parser = parse_instant)]
        scheduled_for: OffsetDateTime,
        #[arg(long, default_value = "support")]
        origin: VisitOrigin,
        #[arg(long)]
        paid: bool,
        #[arg(long)]
        cost_cents: Option<i64>,
        #[arg(long)]
        note: Option<String>,
    },
    /// Approve a pending visit
    Approve {
        visit: VisitId,
        #[arg(long)]
        note: Option<String>,
    },
    /// Replace the engineers on a visit
    Assign {
        visit: VisitId,
        #[arg(long = "engineer", required = true)]
        engineers: Vec<i64>,
        #[arg(long)]
        note: Option<String>,
    },
    /// Start a visit by scanning the device code on site
    Start {
        visit: VisitId,
        #[arg(long)]
        code: String,
    },
    /// Record the result of an in-progress visit
    Outcome {
        visit: VisitId,
        outcome: VisitOutcome,
        #[arg(long)]
        note: Option<String>,
    },
    /// Rebook a visit waiting for parts or a follow-up
    Reschedule {
        visit: VisitId,
        #[arg(long, value_parser = parse_instant)]
        scheduled_for: OffsetDateTime,
        #[arg(long)]
        note: Option<String>,
    },
    /// Cancel an open visit
    Cancel {
        visit: VisitId,
        #[arg(long)]
        reason: Option<String>,
    },
    /// Show one visit
    Show {
        visit: VisitId,
    },
    /// List visits, newest first
    List {
        #[arg(long)]
        status: Option<VisitStatus>,
    },
    /// Print the audit trail of a visit
    History {
        visit: VisitId,
    },
    /// Look up a device by its label code
    Device {
        code: String,
    },
}

/// One line of `list` output.
#[derive(Debug, Serialize)]
struct VisitSummary {
    id: VisitId,
    ticket_number: String,
    status: VisitStatus,
    #[serde(with = "time::serde::rfc3339")]
    scheduled_for: OffsetDateTime,
    primary_engineer: Option<EngineerId>,
}

impl From<&Visit> for VisitSummary {
    fn from(visit: &Visit) -> Self {
        Self {
            id: visit.id,
            ticket_number: visit.ticket_number.to_string(),
            status: visit.status,
            scheduled_for: visit.scheduled_for,
            primary_engineer: visit.primary_engineer,
        }
    }
}

fn parse_instant(raw: &str) -> Result<OffsetDateTime, time::error::Parse> {
    OffsetDateTime::parse(raw, &Rfc3339)
}

/// Runs one command and returns its JSON output.
///
/// # Errors
///
/// Returns the service or storage error unchanged.
pub fn execute(
    service: &VisitService<Persistence>,
    actor: &Actor,
    command: Command,
) -> Result<serde_json::Value, Box<dyn std::error::Error>> {
    let output: serde_json::Value = match command {
        Command::Seed { fixtures } => {
            let raw: String = std::fs::read_to_string(&fixtures)?;
            let data: SeedData = SeedData::from_json(&raw)?;
            serde_json::to_value(service.store().seed(&data)?)?
        }
        Command::Create {
            request,
            device,
            scheduled_for,
            origin,
            paid,
            cost_cents,
            note,
        } => {
            let command: CreateVisit = CreateVisit {
                request_id: RequestId::new(request),
                device_id: DeviceId::new(device),
                scheduled_for,
                origin,
                is_paid: paid,
                cost_cents,
                note,
            };
            serde_json::to_value(service.create_visit(command, actor)?)?
        }
        Command::Approve { visit, note } => {
            serde_json::to_value(service.approve_visit(visit, actor, note)?)?
        }
        Command::Assign {
            visit,
            engineers,
            note,
        } => {
            let engineers: Vec<EngineerId> = engineers.into_iter().map(EngineerId::new).collect();
            serde_json::to_value(service.assign_engineers(visit, &engineers, actor, note)?)?
        }
        Command::Start { visit, code } => {
            serde_json::to_value(service.verify_and_start(visit, &code, actor)?)?
        }
        Command::Outcome {
            visit,
            outcome,
            note,
        } => serde_json::to_value(service.record_outcome(visit, outcome, actor, note)?)?,
        Command::Reschedule {
            visit,
            scheduled_for,
            note,
        } => serde_json::to_value(service.reschedule_visit(visit, scheduled_for, actor, note)?)?,
        Command::Cancel { visit, reason } => {
            serde_json::to_value(service.cancel_visit(visit, actor, reason)?)?
        }
        Command::Show { visit } => serde_json::to_value(service.visit(visit)?)?,
        Command::List { status } => {
            let visits: Vec<Visit> = service.store().list_visits(status)?;
            let summaries: Vec<VisitSummary> = visits.iter().map(VisitSummary::from).collect();
            serde_json::to_value(summaries)?
        }
        Command::History { visit } => serde_json::to_value(service.audit_trail(visit)?)?,
        Command::Device { code } => serde_json::to_value(service.find_device_by_code(&code)?)?,
    };
    Ok(output)
}
