//! The seven bundled sales-outreach agents.
//!
//! Each agent is a [`StepHandler`](outreach_pipeline::StepHandler) that reads
//! its upstream key from shared state and writes exactly one key back:
//!
//! | Agent | Reads | Writes |
//! |-------|-------|--------|
//! | [`ProspectSearchAgent`] | `icp` (config) | `leads` |
//! | [`DataEnrichmentAgent`] | `leads` | `enriched_leads` |
//! | [`ScoringAgent`] | `enriched_leads` | `ranked_leads` |
//! | [`OutreachContentAgent`] | `ranked_leads` | `messages` |
//! | [`OutreachExecutorAgent`] | `messages` | `sent_status` |
//! | [`ResponseTrackerAgent`] | `sent_status` | `responses` |
//! | [`FeedbackTrainerAgent`] | `responses`, `ranked_leads` | `recommendations` |
//!
//! Missing upstream data is logged and yields an empty partial state.
//! External services are simulated; an optional `latency_ms` step setting
//! stands in for network time.

mod data_enrichment;
mod feedback_trainer;
mod outreach_content;
mod outreach_executor;
mod prospect_search;
mod response_tracker;
mod scoring;

pub use data_enrichment::DataEnrichmentAgent;
pub use feedback_trainer::FeedbackTrainerAgent;
pub use outreach_content::OutreachContentAgent;
pub use outreach_executor::{CAMPAIGN_ID, OutreachExecutorAgent};
pub use prospect_search::ProspectSearchAgent;
pub use response_tracker::ResponseTrackerAgent;
pub use scoring::ScoringAgent;

use std::time::Duration;

use outreach_config::secrets::placeholder_name;
use outreach_pipeline::{StepContext, StepDeclaration};
use tracing::debug;

/// Step setting holding the simulated latency in milliseconds.
pub const LATENCY_SETTING: &str = "latency_ms";

/// Sleep for the step's `latency_ms`, returning early if the run is cancelled.
pub(crate) async fn simulate_latency(step: &StepDeclaration, ctx: &StepContext) {
    let Some(ms) = step.get_u64(LATENCY_SETTING).filter(|ms| *ms > 0) else {
        return;
    };
    debug!(step_id = %step.id, latency_ms = ms, "Simulating API latency");
    tokio::select! {
        _ = ctx.cancellation.cancelled() => {
            debug!(step_id = %step.id, "Latency interrupted by cancellation");
        }
        _ = tokio::time::sleep(Duration::from_millis(ms)) => {}
    }
}

/// A configured credential, or `None` if it is blank, a sample value, or a
/// `{{NAME}}` placeholder that no secret replaced.
pub(crate) fn usable_credential<'a>(value: Option<&'a str>, sample: &str) -> Option<&'a str> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty() && !v.contains(sample) && placeholder_name(v).is_none())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_usable_credential() {
        assert_eq!(usable_credential(Some("sk-123"), "YOUR_KEY_HERE"), Some("sk-123"));
        assert_eq!(usable_credential(None, "YOUR_KEY_HERE"), None);
        assert_eq!(usable_credential(Some("  "), "YOUR_KEY_HERE"), None);
        assert_eq!(usable_credential(Some("SG.YOUR_KEY_HERE"), "YOUR_KEY_HERE"), None);
        assert_eq!(usable_credential(Some("{{SENDGRID_API_KEY}}"), "YOUR_KEY_HERE"), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_latency_sleeps_configured_time() {
        let step = StepDeclaration::new("s", "X").with(LATENCY_SETTING, json!(1500));
        let start = tokio::time::Instant::now();
        simulate_latency(&step, &StepContext::detached()).await;
        assert!(start.elapsed() >= Duration::from_millis(1500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_latency_returns_on_cancel() {
        let step = StepDeclaration::new("s", "X").with(LATENCY_SETTING, json!(60_000));
        let ctx = StepContext::detached();
        ctx.cancellation.cancel();
        let start = tokio::time::Instant::now();
        simulate_latency(&step, &ctx).await;
        assert!(start.elapsed() < Duration::from_secs(1));
    }
}
