//! Campaign response tracking.

use async_trait::async_trait;
use outreach_pipeline::{
    HandlerError, PartialState, SharedState, StepContext, StepDeclaration, StepHandler,
};
use tracing::info;

use super::simulate_latency;
use crate::model::{ResponseEvent, to_array};

/// Polls engagement events for the campaign that was just sent.
///
/// The tracking API is simulated: one lead replies and books a meeting, the
/// other opens the email.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseTrackerAgent;

impl ResponseTrackerAgent {
    pub const NAME: &'static str = "ResponseTrackerAgent";
    pub const INPUT: &'static str = "sent_status";
    pub const OUTPUT: &'static str = "responses";

    fn poll() -> Vec<ResponseEvent> {
        vec![
            ResponseEvent {
                email: "alex.chen@innovatetech.com".into(),
                status: "replied".into(),
                reply_text: Some(
                    "This looks interesting. Do you have time to chat next week?".into(),
                ),
                meeting_booked: true,
            },
            ResponseEvent {
                email: "brenda.r@datasolutions.com".into(),
                status: "opened".into(),
                reply_text: None,
                meeting_booked: false,
            },
        ]
    }
}

#[async_trait]
impl StepHandler for ResponseTrackerAgent {
    async fn handle(
        &self,
        state: &SharedState,
        step: &StepDeclaration,
        ctx: &StepContext,
    ) -> Result<PartialState, HandlerError> {
        let records = state.records(Self::INPUT);
        let Some(first) = records.first() else {
            info!(step_id = %step.id, "No sent emails to track; skipping");
            return Ok(PartialState::new());
        };

        let campaign_id = first.get("campaign_id").and_then(|v| v.as_str());
        info!(
            step_id = %step.id,
            campaign_id = campaign_id.unwrap_or("none"),
            "Checking for campaign responses"
        );
        simulate_latency(step, ctx).await;

        let responses = Self::poll();
        info!(step_id = %step.id, count = responses.len(), "Found campaign events");
        Ok(PartialState::new().with(Self::OUTPUT, to_array(&responses)))
    }
}
