//! Lead enrichment with role and technology data.

use async_trait::async_trait;
use outreach_pipeline::{
    HandlerError, PartialState, SharedState, StepContext, StepDeclaration, StepHandler,
};
use serde_json::{Value, json};
use tracing::{debug, info};

use super::simulate_latency;
use crate::model::{LeadView, set_field};

/// Adds `role` and `technologies` to each lead.
///
/// Enrichment data comes from a fixed lookup keyed on contact name; leads
/// with no match pass through unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct DataEnrichmentAgent;

impl DataEnrichmentAgent {
    pub const NAME: &'static str = "DataEnrichmentAgent";
    pub const INPUT: &'static str = "leads";
    pub const OUTPUT: &'static str = "enriched_leads";

    fn enrich(lead: &mut Value) {
        let (role, technologies): (&str, &[&str]) = {
            let contact = LeadView::new(lead).contact_or("");
            if contact.contains("Alex Chen") {
                ("VP of Engineering", &["Python", "AWS", "React", "Kubernetes"])
            } else if contact.contains("Brenda Rodriguez") {
                ("Director of Sales", &["Salesforce", "HubSpot", "Looker"])
            } else {
                debug!(contact = %contact, "No enrichment data for contact");
                return;
            }
        };
        set_field(lead, "role", json!(role));
        set_field(lead, "technologies", json!(technologies));
    }
}

#[async_trait]
impl StepHandler for DataEnrichmentAgent {
    async fn handle(
        &self,
        state: &SharedState,
        step: &StepDeclaration,
        ctx: &StepContext,
    ) -> Result<PartialState, HandlerError> {
        let records = state.records(Self::INPUT);
        if records.is_empty() {
            info!(step_id = %step.id, "No leads to enrich; skipping");
            return Ok(PartialState::new());
        }

        info!(step_id = %step.id, count = records.len(), "Enriching leads");
        simulate_latency(step, ctx).await;

        let mut leads = records.to_vec();
        leads.iter_mut().for_each(Self::enrich);

        info!(step_id = %step.id, "Enrichment complete");
        Ok(PartialState::new().with(Self::OUTPUT, Value::Array(leads)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_with_leads(leads: serde_json::Value) -> SharedState {
        let mut state = SharedState::new();
        state.merge(PartialState::new().with("leads", leads));
        state
    }

    async fn run(state: &SharedState) -> PartialState {
        DataEnrichmentAgent
            .handle(
                state,
                &StepDeclaration::new("enrich", DataEnrichmentAgent::NAME),
                &StepContext::detached(),
            )
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_enriches_known_contacts() {
        let state = state_with_leads(json!([
            { "contact_name": "Alex Chen", "company": "InnovateTech Inc." },
            { "contact_name": "Brenda Rodriguez", "company": "DataSolutions LLC" },
            { "contact_name": "Sam Lee", "company": "Other" }
        ]));

        let out = run(&state).await;
        let enriched = out.get("enriched_leads").unwrap();

        assert_eq!(enriched[0]["role"], "VP of Engineering");
        assert_eq!(
            enriched[0]["technologies"],
            json!(["Python", "AWS", "React", "Kubernetes"])
        );
        assert_eq!(enriched[1]["role"], "Director of Sales");
        assert!(enriched[2].get("role").is_none());
        assert_eq!(enriched[2]["company"], "Other");
    }

    #[tokio::test]
    async fn test_loosely_typed_leads_pass_through() {
        let state = state_with_leads(json!([
            { "contact_name": "Alex Chen", "technologies": "AWS, Python", "score": 87.5 },
            { "contact_name": "Sam Lee", "company": 42 },
            "not an object"
        ]));

        let out = run(&state).await;
        let enriched = out.get("enriched_leads").unwrap().as_array().unwrap();

        assert_eq!(enriched.len(), 3);
        assert_eq!(enriched[0]["role"], "VP of Engineering");
        assert_eq!(enriched[0]["score"], 87.5);
        assert_eq!(enriched[1], json!({ "contact_name": "Sam Lee", "company": 42 }));
        assert_eq!(enriched[2], "not an object");
    }

    #[tokio::test]
    async fn test_input_leads_untouched() {
        let state = state_with_leads(json!([{ "contact_name": "Alex Chen" }]));
        let before = state.clone();
        run(&state).await;
        assert_eq!(state, before);
        assert!(state.records("leads")[0].get("role").is_none());
    }

    #[tokio::test]
    async fn test_skips_without_leads() {
        assert!(run(&SharedState::new()).await.is_empty());
        assert!(run(&state_with_leads(json!([]))).await.is_empty());
    }
}
