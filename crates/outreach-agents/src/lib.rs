//! Bundled step handlers for the sales-outreach workflow.
//!
//! Register them all with [`register_builtin_agents`], or start from
//! [`builtin_registry`]:
//!
//! ```rust,ignore
//! let registry = outreach_agents::builtin_registry();
//! let pipeline = PipelineBuilder::new(Arc::new(registry)).build(&document)?;
//! ```

pub mod agents;
pub mod model;

pub use agents::{
    CAMPAIGN_ID, DataEnrichmentAgent, FeedbackTrainerAgent, LATENCY_SETTING, OutreachContentAgent,
    OutreachExecutorAgent, ProspectSearchAgent, ResponseTrackerAgent, ScoringAgent,
};
pub use model::{DeliveryRecord, DeliveryStatus, Lead, LeadView, OutreachMessage, ResponseEvent};

use outreach_pipeline::HandlerRegistry;

/// Agent names of the bundled handlers, in workflow order.
pub const BUILTIN_AGENTS: &[&str] = &[
    ProspectSearchAgent::NAME,
    DataEnrichmentAgent::NAME,
    ScoringAgent::NAME,
    OutreachContentAgent::NAME,
    OutreachExecutorAgent::NAME,
    ResponseTrackerAgent::NAME,
    FeedbackTrainerAgent::NAME,
];

/// Register every bundled agent under its name.
pub fn register_builtin_agents(registry: &mut HandlerRegistry) {
    registry.register(ProspectSearchAgent::NAME, ProspectSearchAgent);
    registry.register(DataEnrichmentAgent::NAME, DataEnrichmentAgent);
    registry.register(ScoringAgent::NAME, ScoringAgent);
    registry.register(OutreachContentAgent::NAME, OutreachContentAgent);
    registry.register(OutreachExecutorAgent::NAME, OutreachExecutorAgent);
    registry.register(ResponseTrackerAgent::NAME, ResponseTrackerAgent);
    registry.register(FeedbackTrainerAgent::NAME, FeedbackTrainerAgent);
}

/// A registry holding just the bundled agents.
pub fn builtin_registry() -> HandlerRegistry {
    let mut registry = HandlerRegistry::new();
    register_builtin_agents(&mut registry);
    registry
}
