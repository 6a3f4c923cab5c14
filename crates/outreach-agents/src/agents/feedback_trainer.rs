//! Campaign feedback and recommendations for the next run.

use async_trait::async_trait;
use chrono::Utc;
use outreach_pipeline::{
    HandlerError, PartialState, SharedState, StepContext, StepDeclaration, StepHandler,
};
use serde_json::Value;
use tracing::{info, warn};

use super::{simulate_latency, usable_credential};
use crate::model::{LeadView, to_array};

/// Turns campaign responses into recommendations and appends them to a sheet.
///
/// The first response with a booked meeting is matched back to its ranked
/// lead by email; that lead's signal becomes the recommendation. The sheet
/// write (to `tools[0].config.sheet_id`) is simulated, and a missing sheet id
/// only skips the write.
#[derive(Debug, Clone, Copy, Default)]
pub struct FeedbackTrainerAgent;

impl FeedbackTrainerAgent {
    pub const NAME: &'static str = "FeedbackTrainerAgent";
    pub const OUTPUT: &'static str = "recommendations";
    pub const NO_MEETINGS: &'static str =
        "No meetings booked. RECOMMENDATION: Consider tweaking email subject lines or the ICP.";
    const SAMPLE_SHEET: &'static str = "YOUR_SHEET_ID";

    fn successful_lead<'a>(responses: &[Value], leads: &'a [Value]) -> Option<LeadView<'a>> {
        responses
            .iter()
            .filter(|r| r.get("meeting_booked").and_then(Value::as_bool) == Some(true))
            .filter_map(|r| r.get("email").and_then(Value::as_str))
            .find_map(|email| {
                leads
                    .iter()
                    .map(LeadView::new)
                    .find(|l| l.email() == Some(email))
            })
    }

    fn recommend(lead: Option<LeadView<'_>>) -> String {
        let Some(lead) = lead else {
            return Self::NO_MEETINGS.to_string();
        };
        format!(
            "Positive response from lead '{}' (Role: {}) from '{}'. \
             SUCCESS SIGNAL: This lead had the '{}' signal. \
             RECOMMENDATION: Prioritize leads with this signal in the next run.",
            lead.contact_or("unknown"),
            lead.role().unwrap_or("unknown"),
            lead.company().unwrap_or("unknown"),
            lead.signal().unwrap_or("unknown"),
        )
    }

    fn append_to_sheet(step: &StepDeclaration, recommendations: &[String]) {
        let Some(sheet_id) = usable_credential(step.tool_setting(0, "sheet_id"), Self::SAMPLE_SHEET)
        else {
            warn!(step_id = %step.id, "Sheet ID not configured; recommendations not written");
            return;
        };
        let written_at = Utc::now().format("%Y-%m-%d %H:%M:%S").to_string();
        for recommendation in recommendations {
            info!(sheet_id = %sheet_id, written_at = %written_at, row = %recommendation, "Appending sheet row");
        }
        info!(sheet_id = %sheet_id, rows = recommendations.len(), "Wrote recommendations to sheet");
    }
}

#[async_trait]
impl StepHandler for FeedbackTrainerAgent {
    async fn handle(
        &self,
        state: &SharedState,
        step: &StepDeclaration,
        ctx: &StepContext,
    ) -> Result<PartialState, HandlerError> {
        let responses = state.records("responses");
        let ranked = state.records("ranked_leads");
        if responses.is_empty() || ranked.is_empty() {
            info!(step_id = %step.id, "Missing responses or ranked leads; skipping");
            return Ok(PartialState::new());
        }

        info!(step_id = %step.id, count = responses.len(), "Analyzing campaign responses");
        let recommendations = vec![Self::recommend(Self::successful_lead(responses, ranked))];

        simulate_latency(step, ctx).await;
        Self::append_to_sheet(step, &recommendations);

        Ok(PartialState::new().with(Self::OUTPUT, to_array(&recommendations)))
    }
}
