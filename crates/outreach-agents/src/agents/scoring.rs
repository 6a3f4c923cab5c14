//! Lead scoring and ranking.

use async_trait::async_trait;
use outreach_pipeline::{
    HandlerError, PartialState, SharedState, StepContext, StepDeclaration, StepHandler,
};
use serde_json::{Value, json};
use tracing::{debug, info};

use super::simulate_latency;
use crate::model::{LeadView, set_field};

/// Scores enriched leads and ranks them highest first.
///
/// | Rule | Points |
/// |------|--------|
/// | role is VP or Director of Engineering | +20 |
/// | role is Director of Sales | +10 |
/// | uses AWS | +10 |
/// | uses Salesforce | +5 |
///
/// Ties keep their input order.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScoringAgent;

impl ScoringAgent {
    pub const NAME: &'static str = "ScoringAgent";
    pub const INPUT: &'static str = "enriched_leads";
    pub const OUTPUT: &'static str = "ranked_leads";

    pub fn score(lead: LeadView<'_>) -> i64 {
        let mut score = match lead.role() {
            Some("VP of Engineering" | "Director of Engineering") => 20,
            Some("Director of Sales") => 10,
            _ => 0,
        };
        if lead.uses("AWS") {
            score += 10;
        }
        if lead.uses("Salesforce") {
            score += 5;
        }
        score
    }
}

#[async_trait]
impl StepHandler for ScoringAgent {
    async fn handle(
        &self,
        state: &SharedState,
        step: &StepDeclaration,
        ctx: &StepContext,
    ) -> Result<PartialState, HandlerError> {
        let records = state.records(Self::INPUT);
        if records.is_empty() {
            info!(step_id = %step.id, "No enriched leads to score; skipping");
            return Ok(PartialState::new());
        }

        info!(step_id = %step.id, count = records.len(), "Scoring leads");
        simulate_latency(step, ctx).await;

        let mut scored: Vec<(i64, Value)> = records
            .iter()
            .map(|record| {
                let lead = LeadView::new(record);
                let score = Self::score(lead);
                debug!(contact = %lead.contact_or("unknown"), score, "Scored lead");
                let mut ranked = record.clone();
                set_field(&mut ranked, "score", json!(score));
                (score, ranked)
            })
            .collect();
        // sort_by is stable, so equal scores keep input order
        scored.sort_by(|a, b| b.0.cmp(&a.0));

        let ranked = scored.into_iter().map(|(_, lead)| lead).collect();
        Ok(PartialState::new().with(Self::OUTPUT, Value::Array(ranked)))
    }
}
