//! Background task announcing escalations as they happen.

use std::time::Duration;
use std::sync::Arc;

use chrono::Utc;
use tokio::task::JoinHandle;
use tracing::{debug, info};
use triagedesk_engine::queue::wait_minutes;
use triagedesk_engine::EscalationScheduler;

use crate::desk::Desk;
use crate::state::QueueEvent;

/// Sleep until the next threshold crossing (or `refresh`, or a store
/// change), then publish an `escalated` event for each new crossing.
pub fn spawn_escalation_ticker(desk: Arc<Desk>, refresh: Duration) -> JoinHandle<()> {
    let mut scheduler = EscalationScheduler::new(*desk.policy(), refresh);

    tokio::spawn(async move {
        info!(refresh_secs = refresh.as_secs(), "escalation ticker started");
        loop {
            let records = desk.store().snapshot().await;
            let now = Utc::now();

            for id in scheduler.poll(&records, now) {
                if let Some(r) = records.iter().find(|r| r.id == id) {
                    desk.publish(QueueEvent::Escalated {
                        id: r.id.clone(),
                        tier: r.triage.tier,
                        wait_minutes: wait_minutes(r, now),
                    });
                }
            }

            let wait = scheduler.next_wake(&records, now);
            debug!(wait_ms = wait.as_millis() as u64, "escalation ticker sleeping");
            tokio::select! {
                _ = tokio::time::sleep(wait)     => {}
                _ = desk.store().changed()       => {}
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;
    use tokio::sync::broadcast;
    use triagedesk_common::{IntakeRequest, PatientId, PatientRecord, Tier};
    use triagedesk_engine::{evaluate, EscalationPolicy, PreparedIntake};
    use triagedesk_llm::RemoteClassifier;

    fn waiting_critical(id: &str, minutes_ago: i64) -> PatientRecord {
        let p = PreparedIntake::from_request(IntakeRequest {
            complaint: "seizure".to_string(),
            ..Default::default()
        })
        .unwrap();
        PatientRecord {
            id: PatientId::from(id),
            created_at: Utc::now() - TimeDelta::minutes(minutes_ago),
            triage: evaluate(&p.complaint, &p.history, &p.vitals),
            complaint: p.complaint,
            history: p.history,
            raw_vitals: p.raw_vitals,
            vitals: p.vitals,
            age: p.age,
            pregnancy: p.pregnancy,
            profile: p.inferred_profile,
        }
    }

    #[tokio::test]
    async fn test_overdue_patient_announced_once() {
        let (tx, mut rx) = broadcast::channel(16);
        let desk = Arc::new(Desk::new(RemoteClassifier::local(), EscalationPolicy::default(), tx));
        desk.store().insert(waiting_critical("ID-LATE01", 15)).await.unwrap();
        desk.store().insert(waiting_critical("ID-FRESH1", 1)).await.unwrap();

        let handle = spawn_escalation_ticker(desk.clone(), Duration::from_secs(60));
        let event = tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .expect("escalation event")
            .unwrap();
        assert_eq!(
            event,
            QueueEvent::Escalated { id: PatientId::from("ID-LATE01"), tier: Tier::Critical, wait_minutes: 15 }
        );

        // a store change wakes the ticker, but nothing new has crossed
        desk.mark_seen(&PatientId::from("ID-FRESH1")).await.unwrap();
        assert!(matches!(rx.recv().await.unwrap(), QueueEvent::MarkedSeen { .. }));
        assert!(tokio::time::timeout(Duration::from_millis(200), rx.recv()).await.is_err());
        handle.abort();
    }
}
