//! Prospect discovery against an ideal customer profile.

use async_trait::async_trait;
use outreach_pipeline::{
    HandlerError, PartialState, SharedState, StepContext, StepDeclaration, StepHandler,
};
use tracing::info;

use super::simulate_latency;
use crate::model::{Lead, to_array};

/// Finds leads matching the step's `icp`.
///
/// The search provider is simulated and always returns the same two leads.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProspectSearchAgent;

impl ProspectSearchAgent {
    pub const NAME: &'static str = "ProspectSearchAgent";
    pub const OUTPUT: &'static str = "leads";

    fn search() -> Vec<Lead> {
        vec![
            Lead {
                company: Some("InnovateTech Inc.".into()),
                contact_name: Some("Alex Chen".into()),
                email: Some("alex.chen@innovatetech.com".into()),
                linkedin: Some("linkedin.com/in/alexcheninnovate".into()),
                signal: Some("recent_funding".into()),
                ..Default::default()
            },
            Lead {
                company: Some("DataSolutions LLC".into()),
                contact_name: Some("Brenda Rodriguez".into()),
                email: Some("brenda.r@datasolutions.com".into()),
                linkedin: Some("linkedin.com/in/brendarodriguezdata".into()),
                signal: Some("hiring_for_sales".into()),
                ..Default::default()
            },
        ]
    }
}

#[async_trait]
impl StepHandler for ProspectSearchAgent {
    async fn handle(
        &self,
        _state: &SharedState,
        step: &StepDeclaration,
        ctx: &StepContext,
    ) -> Result<PartialState, HandlerError> {
        match step.get("icp") {
            Some(icp) => info!(step_id = %step.id, icp = %icp, "Searching with ideal customer profile"),
            None => info!(step_id = %step.id, "No ICP configured; running an open search"),
        }

        simulate_latency(step, ctx).await;

        let leads = Self::search();
        info!(step_id = %step.id, count = leads.len(), "Found leads");
        Ok(PartialState::new().with(Self::OUTPUT, to_array(&leads)))
    }
}
