//! Personalized email drafting for the top-ranked leads.

use async_trait::async_trait;
use outreach_pipeline::{
    HandlerError, PartialState, SharedState, StepContext, StepDeclaration, StepHandler,
};
use serde_json::json;
use tracing::{info, warn};

use super::{simulate_latency, usable_credential};
use crate::model::{LeadView, OutreachMessage, to_array};

/// Drafts one email body per top lead.
///
/// Requires the language-model key in `tools[0].config.api_key`. Without a
/// usable key the step writes an empty `messages` list so downstream steps see
/// that drafting ran and produced nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutreachContentAgent;

impl OutreachContentAgent {
    pub const NAME: &'static str = "OutreachContentAgent";
    pub const INPUT: &'static str = "ranked_leads";
    pub const OUTPUT: &'static str = "messages";
    /// How many of the highest-ranked leads get a message.
    pub const TOP_LEADS: usize = 2;
    const SAMPLE_KEY: &'static str = "YOUR_COHERE_API_KEY";

    fn draft(lead: LeadView<'_>) -> String {
        let company = lead.company().unwrap_or("your team");
        let role = lead.role().unwrap_or("a leader");
        let mut body = match lead.signal() {
            Some("recent_funding") => {
                format!("Congratulations on the recent funding round at {company}.")
            }
            Some("hiring_for_sales") => {
                format!("I saw {company} is growing its sales team.")
            }
            Some(signal) => format!("I came across {company} recently ({signal})."),
            None => format!("I came across {company} recently."),
        };
        body.push_str(&format!(
            " As {role}, you are probably weighing how to scale without adding overhead."
        ));
        let techs = lead.technologies();
        if !techs.is_empty() {
            body.push_str(&format!(
                " We work with teams running {} and usually see results within a quarter.",
                techs.join(", ")
            ));
        }
        body.push_str(" Would a 15-minute call next week be useful?");
        body
    }
}

#[async_trait]
impl StepHandler for OutreachContentAgent {
    async fn handle(
        &self,
        state: &SharedState,
        step: &StepDeclaration,
        ctx: &StepContext,
    ) -> Result<PartialState, HandlerError> {
        let records = state.records(Self::INPUT);
        if records.is_empty() {
            info!(step_id = %step.id, "No ranked leads to write for; skipping");
            return Ok(PartialState::new());
        }

        if usable_credential(step.tool_setting(0, "api_key"), Self::SAMPLE_KEY).is_none() {
            warn!(step_id = %step.id, "Language model API key not configured; no messages drafted");
            return Ok(PartialState::new().with(Self::OUTPUT, json!([])));
        }

        let top = &records[..records.len().min(Self::TOP_LEADS)];
        info!(step_id = %step.id, count = top.len(), "Drafting outreach messages");

        let mut messages = Vec::with_capacity(top.len());
        for record in top {
            simulate_latency(step, ctx).await;
            let lead = LeadView::new(record);
            info!(
                contact = %lead.contact_or("unknown"),
                company = %lead.company().unwrap_or("unknown"),
                "Drafted email"
            );
            messages.push(OutreachMessage {
                email_body: Self::draft(lead),
                lead: record.clone(),
            });
        }

        Ok(PartialState::new().with(Self::OUTPUT, to_array(&messages)))
    }
}
