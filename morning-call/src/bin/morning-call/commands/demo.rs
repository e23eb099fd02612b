use std::sync::Arc;

use anyhow::{Result, bail};
use chrono::{Duration, Utc};
use clap::Args;
use comfy_table::Cell;
use morning_call::{
    CancellationToken, Collaborators, CoreConfig, DomainError, MorningCallUpdate, Repositories, SequenceGenerator,
    User, UserId, Usecases,
};
use serde::Serialize;

use crate::output::{Printer, Report};

#[derive(Args)]
pub struct DemoArgs {
    /// Use readable `id-000001` style ids instead of UUIDs
    #[arg(long)]
    sequential_ids: bool,

    /// How many days ahead the demo call is scheduled
    #[arg(long, default_value_t = 2)]
    days_ahead: i64,
}

#[derive(Serialize)]
struct DemoStep {
    step: usize,
    actor: String,
    action: String,
    ok: bool,
    /// Status code of the failure, when the step was refused
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<u16>,
    detail: String,
}

#[derive(Serialize, Default)]
struct DemoReport {
    steps: Vec<DemoStep>,
    unexpected: usize,
}

impl DemoReport {
    fn record(&mut self, actor: &User, action: &str, expect_ok: bool, outcome: Result<String, DomainError>) {
        let step = self.steps.len() + 1;
        let (ok, status, detail) = match outcome {
            Ok(detail) => (true, None, detail),
            Err(err) => {
                let reason = err.reason_code().unwrap_or(err.kind.as_str()).to_string();
                (false, Some(err.status_code()), reason)
            }
        };
        if ok != expect_ok {
            self.unexpected += 1;
        }
        self.steps.push(DemoStep {
            step,
            actor: actor.username.clone(),
            action: action.to_string(),
            ok,
            status,
            detail,
        });
    }
}

impl Report for DemoReport {
    fn table(&self, printer: &Printer) -> comfy_table::Table {
        let mut table = printer.table(&["#", "Actor", "Action", "Result", "Detail"]);
        for step in &self.steps {
            table.add_row(vec![
                Cell::new(step.step),
                Cell::new(&step.actor),
                Cell::new(&step.action),
                printer.outcome_cell(step.status),
                Cell::new(&step.detail),
            ]);
        }
        table
    }

    fn summary(&self) -> String {
        let refused = self.steps.iter().filter(|step| !step.ok).count();
        format!("steps={} refused={refused} unexpected={}", self.steps.len(), self.unexpected)
    }
}

fn related(user: &User, other: &UserId) -> String {
    user.related_user(other)
        .map(|related| related.status.to_string())
        .unwrap_or_else(|| "none".to_string())
}

pub async fn handle_demo(args: DemoArgs, config: &CoreConfig, printer: &Printer) -> Result<()> {
    let mut collaborators = Collaborators::from_config(config);
    if args.sequential_ids {
        collaborators = collaborators.with_ids(Arc::new(SequenceGenerator::new("id")));
    }
    let app = Usecases::new(Repositories::in_memory(), collaborators, config);
    let cancel = CancellationToken::new();
    let users = &app.users;
    let calls = &app.morning_calls;

    printer.section("Morning call walkthrough");
    printer.detail(&format!("scheduling horizon: {} days", config.scheduling.max_days_ahead));
    if args.days_ahead <= 0 || args.days_ahead > config.scheduling.max_days_ahead {
        printer.caution(&format!(
            "--days-ahead {} is outside the scheduling window, the call will be refused",
            args.days_ahead
        ));
    }

    let alice = users.register(&cancel, "alice", "Alice@Example.com").await?;
    let bob = users.register(&cancel, "bob", "bob@example.com").await?;
    let carol = users.register(&cancel, "carol", "carol@example.com").await?;
    for user in [&alice, &bob, &carol] {
        printer.note(&format!("registered {} <{}> as {}", user.username, user.email, user.id));
    }

    let mut report = DemoReport::default();

    let applied = users.apply_friend(&cancel, &alice.id, &bob.id).await;
    report.record(&alice, "apply friend to bob", true, applied.map(|rel| format!("relationship {}", rel.status())));

    let views = async {
        let a = users.get_user(&cancel, &alice.id).await?;
        let b = users.get_user(&cancel, &bob.id).await?;
        Ok::<_, DomainError>(format!("alice sees {}, bob sees {}", related(&a, &bob.id), related(&b, &alice.id)))
    }
    .await;
    report.record(&alice, "compare views", true, views);

    let approved = users.react_friend_apply(&cancel, &bob.id, &alice.id, true).await;
    report.record(&bob, "approve alice", true, approved.map(|status| format!("now {status}")));

    let when = Utc::now() + Duration::days(args.days_ahead);
    let scheduled = calls
        .schedule_morning_call(&cancel, &alice.id, &bob.id, when, "Good morning! Time to get up.")
        .await;
    let call_id = scheduled.as_ref().ok().map(|call| call.id.clone());
    report.record(
        &alice,
        "schedule call for bob",
        true,
        scheduled.map(|call| format!("{} at {}", call.id, call.time.format("%Y-%m-%d %H:%M UTC"))),
    );

    let stranger = calls.schedule_morning_call(&cancel, &carol.id, &bob.id, when, "hi").await;
    report.record(&carol, "schedule call for bob", false, stranger.map(|call| call.id.to_string()));

    let accepts = users
        .get_user(&cancel, &bob.id)
        .await
        .and_then(|bob_view| {
            bob_view
                .can_accept_morning_call(&alice.id)
                .map_err(|reason| DomainError::rejected(reason, "accept morning call"))
        })
        .map(|()| "bob accepts calls from alice".to_string());
    report.record(&bob, "accept calls from alice", true, accepts);

    if let Some(id) = &call_id {
        let update = MorningCallUpdate::new(id.clone()).message("Rise and shine!");
        let updated = calls.update_morning_call(&cancel, &bob.id, update.clone()).await;
        report.record(&bob, "edit alice's call", false, updated.map(|call| call.message));

        let updated = calls.update_morning_call(&cancel, &alice.id, update).await;
        report.record(&alice, "edit call message", true, updated.map(|call| call.message));

        let deleted = calls.delete_morning_call(&cancel, &alice.id, id).await;
        report.record(&alice, "delete call", true, deleted.map(|()| format!("{id} removed")));
    }

    let remaining = async {
        let sent = calls.list_morning_calls(&cancel, &alice.id).await?;
        let received = calls.list_morning_calls(&cancel, &bob.id).await?;
        Ok::<_, DomainError>(format!("alice has {}, bob has {}", sent.len(), received.len()))
    }
    .await;
    report.record(&alice, "list calls", true, remaining);

    let blocked = users.block_friend(&cancel, &bob.id, &carol.id).await;
    report.record(&bob, "block carol", true, blocked.map(|()| "carol blocked".to_string()));

    let refused = users.apply_friend(&cancel, &carol.id, &bob.id).await;
    report.record(&carol, "apply friend to bob", false, refused.map(|rel| rel.id().to_string()));

    printer.emit(&report)?;

    if report.unexpected > 0 {
        printer.error(&format!("{} step(s) did not behave as expected", report.unexpected));
        bail!("demo finished with unexpected results");
    }
    printer.done("walkthrough finished");
    Ok(())
}
