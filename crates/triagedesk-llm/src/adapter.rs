//! Remote classification with silent local fallback.
//!
//! The remote attempt is a `Result`; only here is a failure collapsed into
//! the rule engine's verdict. Callers always get a verdict and a profile,
//! and never see the failure itself. It goes to the log and the audit entry.

use std::sync::Arc;
use std::time::Instant;

use tracing::{info, warn};
use triagedesk_common::{Profile, TriageVerdict};
use triagedesk_engine::{PreparedIntake, RuleEngine};

use crate::audit::ClassificationAuditEntry;
use crate::service::{ClassificationService, ClassifyError};
use crate::wire::{ClassifyRequest, RemoteVerdict, UnknownTierPolicy};

/// Verdict and routing for one intake, plus how it was obtained.
#[derive(Debug, Clone)]
pub struct Classification {
    pub verdict: TriageVerdict,
    pub profile: Profile,
    pub audit: ClassificationAuditEntry,
}

pub struct RemoteClassifier {
    /// `None` runs the rule engine only.
    service: Option<Arc<dyn ClassificationService>>,
    engine: RuleEngine,
    unknown_tier: UnknownTierPolicy,
}

impl RemoteClassifier {
    pub fn new(service: Arc<dyn ClassificationService>, unknown_tier: UnknownTierPolicy) -> Self {
        Self { service: Some(service), engine: RuleEngine::new(), unknown_tier }
    }

    /// Rule engine only; no network traffic.
    pub fn local() -> Self {
        Self { service: None, engine: RuleEngine::new(), unknown_tier: UnknownTierPolicy::default() }
    }

    pub fn with_engine(mut self, engine: RuleEngine) -> Self {
        self.engine = engine;
        self
    }

    pub fn is_remote(&self) -> bool {
        self.service.is_some()
    }

    /// Classify a prepared intake. Never fails.
    pub async fn classify(&self, intake: &PreparedIntake) -> Classification {
        let started = Instant::now();
        let Some(service) = &self.service else {
            let verdict = self.local_verdict(intake);
            let audit = ClassificationAuditEntry::new("rules", false, None, &verdict.reason, 0);
            return Classification { verdict, profile: intake.inferred_profile, audit };
        };

        let outcome = self.try_remote(service.as_ref(), intake).await;
        let latency_ms = started.elapsed().as_millis() as u64;

        match outcome {
            Ok(RemoteVerdict { verdict, profile }) => {
                let audit = ClassificationAuditEntry::new(
                    service.name(), true, None, &verdict.reason, latency_ms,
                );
                info!(
                    service = service.name(),
                    tier = %verdict.tier,
                    latency_ms,
                    "remote classification accepted"
                );
                Classification { verdict, profile, audit }
            }
            Err(e) => {
                warn!(
                    service = service.name(),
                    failure = e.kind(),
                    error = %e,
                    latency_ms,
                    "remote classification failed, using local rules"
                );
                let verdict = self.local_verdict(intake);
                let audit = ClassificationAuditEntry::new(
                    service.name(), false, Some(e.kind().to_string()), &verdict.reason, latency_ms,
                );
                Classification { verdict, profile: intake.inferred_profile, audit }
            }
        }
    }

    async fn try_remote(
        &self,
        service: &dyn ClassificationService,
        intake: &PreparedIntake,
    ) -> Result<RemoteVerdict, ClassifyError> {
        let req = ClassifyRequest::new(&intake.complaint, &intake.history, &intake.raw_vitals);
        let reply = service.classify(&req).await?;
        reply.into_verdict(intake.inferred_profile, self.unknown_tier)
    }

    fn local_verdict(&self, intake: &PreparedIntake) -> TriageVerdict {
        self.engine.evaluate(&intake.complaint, &intake.history, &intake.vitals)
    }
}
