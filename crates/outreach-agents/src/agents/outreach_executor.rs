//! Email delivery for drafted messages.

use async_trait::async_trait;
use chrono::Utc;
use outreach_pipeline::{
    HandlerError, PartialState, SharedState, StepContext, StepDeclaration, StepHandler,
};
use serde_json::{Value, json};
use tracing::{debug, info, warn};

use super::{simulate_latency, usable_credential};
use crate::model::{DeliveryRecord, DeliveryStatus, LeadView, to_array};

/// Campaign identifier stamped on every delivered message.
pub const CAMPAIGN_ID: &str = "campaign_XYZ_123";

/// Sends each drafted message and records the outcome.
///
/// Delivery is simulated. Settings:
/// - `tools[0].config.api_key`: mail provider key, required
/// - `sender_email`: from-address, defaults to [`Self::DEFAULT_SENDER`]
/// - `redirect_to`: deliver everything to this address instead of the lead
///
/// Messages whose lead has no email are skipped. A recipient that is not a
/// plausible address is recorded as `failed` and the step carries on.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutreachExecutorAgent;

impl OutreachExecutorAgent {
    pub const NAME: &'static str = "OutreachExecutorAgent";
    pub const INPUT: &'static str = "messages";
    pub const OUTPUT: &'static str = "sent_status";
    pub const DEFAULT_SENDER: &'static str = "outreach@example.com";
    const SAMPLE_KEY: &'static str = "YOUR_KEY_HERE";

    fn deliver(sender: &str, recipient: &str, lead: LeadView<'_>, body: &str) -> DeliveryRecord {
        let timestamp = Utc::now().to_rfc3339();
        let company = lead.company().unwrap_or("your team");
        let subject = format!("A thought for {company}");

        if !is_plausible_address(recipient) {
            warn!(to = %recipient, "Delivery failed: invalid recipient address");
            return DeliveryRecord {
                to: recipient.to_string(),
                status: DeliveryStatus::Failed,
                timestamp,
                campaign_id: None,
                error: Some(format!("invalid recipient address: {recipient}")),
            };
        }

        let html = format!(
            "Hi {},<br><br>{}",
            lead.contact_or("Valued Prospect"),
            body.replace('\n', "<br>")
        );
        debug!(from = %sender, to = %recipient, subject = %subject, bytes = html.len(), "Sending email");
        info!(to = %recipient, "Email sent");

        DeliveryRecord {
            to: recipient.to_string(),
            status: DeliveryStatus::Sent,
            timestamp,
            campaign_id: Some(CAMPAIGN_ID.to_string()),
            error: None,
        }
    }
}

fn is_plausible_address(address: &str) -> bool {
    match address.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.'),
        None => false,
    }
}

#[async_trait]
impl StepHandler for OutreachExecutorAgent {
    async fn handle(
        &self,
        state: &SharedState,
        step: &StepDeclaration,
        ctx: &StepContext,
    ) -> Result<PartialState, HandlerError> {
        let records = state.records(Self::INPUT);
        if records.is_empty() {
            info!(step_id = %step.id, "No messages to send; skipping");
            return Ok(PartialState::new());
        }

        if usable_credential(step.tool_setting(0, "api_key"), Self::SAMPLE_KEY).is_none() {
            warn!(step_id = %step.id, "Mail provider API key not configured; nothing sent");
            return Ok(PartialState::new().with(Self::OUTPUT, json!([])));
        }

        let sender = step.get_str("sender_email").unwrap_or(Self::DEFAULT_SENDER);
        let redirect = step.get_str("redirect_to");
        info!(step_id = %step.id, count = records.len(), "Sending outreach emails");

        let mut sent = Vec::with_capacity(records.len());
        for message in records {
            let lead = LeadView::new(message.get("lead").unwrap_or(&Value::Null));
            let Some(email) = lead.email() else {
                debug!(contact = %lead.contact_or("unknown"), "Lead has no email; skipping");
                continue;
            };
            let body = message
                .get("email_body")
                .and_then(Value::as_str)
                .unwrap_or_default();
            simulate_latency(step, ctx).await;
            sent.push(Self::deliver(sender, redirect.unwrap_or(email), lead, body));
        }

        Ok(PartialState::new().with(Self::OUTPUT, to_array(&sent)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_with_messages() -> SharedState {
        let mut state = SharedState::new();
        state.merge(PartialState::new().with(
            "messages",
            json!([
                { "lead": { "contact_name": "Alex Chen", "email": "alex.chen@innovatetech.com",
                            "company": "InnovateTech Inc." },
                  "email_body": "Line one\nLine two" },
                { "lead": { "contact_name": "No Email" }, "email_body": "x" },
                { "lead": { "contact_name": "Bad", "email": "not-an-address" }, "email_body": "y" }
            ]),
        ));
        state
    }

    fn step(key: &str) -> StepDeclaration {
        StepDeclaration::new("send", OutreachExecutorAgent::NAME).with(
            "tools",
            json!([{ "name": "SendGrid", "config": { "api_key": key } }]),
        )
    }

    async fn run(state: &SharedState, step: &StepDeclaration) -> PartialState {
        OutreachExecutorAgent
            .handle(state, step, &StepContext::detached())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_sends_and_records_status() {
        let out = run(&state_with_messages(), &step("SG.real")).await;
        let sent = out.get("sent_status").unwrap().as_array().unwrap();

        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0]["to"], "alex.chen@innovatetech.com");
        assert_eq!(sent[0]["status"], "sent");
        assert_eq!(sent[0]["campaign_id"], CAMPAIGN_ID);
        assert!(sent[0]["timestamp"].as_str().is_some());

        assert_eq!(sent[1]["status"], "failed");
        assert!(sent[1]["error"].as_str().unwrap().contains("not-an-address"));
    }

    #[tokio::test]
    async fn test_redirect_overrides_recipient() {
        let step = step("SG.real").with("redirect_to", json!("inbox@mycompany.io"));
        let out = run(&state_with_messages(), &step).await;
        let sent = out.get("sent_status").unwrap().as_array().unwrap();
        assert!(sent.iter().all(|r| r["to"] == "inbox@mycompany.io"));
        assert!(sent.iter().all(|r| r["status"] == "sent"));
    }

    #[tokio::test]
    async fn test_loosely_typed_messages_are_sent() {
        let mut state = SharedState::new();
        state.merge(PartialState::new().with(
            "messages",
            json!([
                { "lead": { "email": "lee@x.com", "company": 42, "score": 87.5 }, "email_body": 5 },
                { "lead": "not an object" },
                "not a message"
            ]),
        ));

        let out = run(&state, &step("SG.real")).await;
        let sent = out.get("sent_status").unwrap().as_array().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0]["to"], "lee@x.com");
        assert_eq!(sent[0]["status"], "sent");
    }

    #[tokio::test]
    async fn test_missing_key_sends_nothing() {
        let state = state_with_messages();
        for step in [
            step("SG.YOUR_KEY_HERE"),
            step("{{SENDGRID_API_KEY}}"),
            StepDeclaration::new("send", OutreachExecutorAgent::NAME),
        ] {
            let out = run(&state, &step).await;
            assert_eq!(out.get("sent_status"), Some(&json!([])));
        }
    }

    #[tokio::test]
    async fn test_skips_without_messages() {
        assert!(run(&SharedState::new(), &step("SG.real")).await.is_empty());
    }

    #[test]
    fn test_plausible_address() {
        assert!(is_plausible_address("a@b.com"));
        assert!(!is_plausible_address("@b.com"));
        assert!(!is_plausible_address("a@localhost"));
        assert!(!is_plausible_address("plain"));
    }
}
