//! Records the bundled agents exchange through state.
//!
//! Upstream records are read through [`LeadView`], which never rejects a
//! record: a field of an unexpected type simply reads as absent. Agents that
//! rewrite a list clone each record and insert their own fields, so every
//! record written upstream survives into the replacement list.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A freshly discovered prospect.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Lead {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
    /// Buying signal that surfaced the lead (e.g. `recent_funding`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signal: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Read-only, type-tolerant view over a lead record.
#[derive(Debug, Clone, Copy)]
pub struct LeadView<'a> {
    record: &'a Value,
}

impl<'a> LeadView<'a> {
    pub fn new(record: &'a Value) -> Self {
        Self { record }
    }

    fn text(&self, key: &str) -> Option<&'a str> {
        self.record.get(key)?.as_str()
    }

    pub fn company(&self) -> Option<&'a str> {
        self.text("company")
    }

    pub fn contact_name(&self) -> Option<&'a str> {
        self.text("contact_name")
    }

    pub fn email(&self) -> Option<&'a str> {
        self.text("email").filter(|e| !e.is_empty())
    }

    pub fn signal(&self) -> Option<&'a str> {
        self.text("signal")
    }

    pub fn role(&self) -> Option<&'a str> {
        self.text("role")
    }

    /// Technologies as a list of strings, or a comma-separated string.
    pub fn technologies(&self) -> Vec<&'a str> {
        match self.record.get("technologies") {
            Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).collect(),
            Some(Value::String(s)) => s
                .split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .collect(),
            _ => Vec::new(),
        }
    }

    pub fn uses(&self, technology: &str) -> bool {
        self.technologies().contains(&technology)
    }

    pub fn contact_or(&self, fallback: &'a str) -> &'a str {
        self.contact_name().unwrap_or(fallback)
    }
}

/// Set `key` on a record. Non-object records are left as they are.
pub(crate) fn set_field(record: &mut Value, key: &str, value: Value) {
    if let Some(map) = record.as_object_mut() {
        map.insert(key.to_string(), value);
    }
}

/// A drafted email for one lead.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutreachMessage {
    /// The ranked lead record, copied verbatim.
    pub lead: Value,
    pub email_body: String,
}

/// Delivery outcome of a single message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    Sent,
    Failed,
}

/// One entry of `sent_status`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryRecord {
    pub to: String,
    pub status: DeliveryStatus,
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub campaign_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// A tracked engagement event for a sent email.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseEvent {
    pub email: String,
    pub status: String,
    pub reply_text: Option<String>,
    #[serde(default)]
    pub meeting_booked: bool,
}

/// Serialize records into a JSON array for a partial state.
pub(crate) fn to_array<T: Serialize>(records: &[T]) -> Value {
    Value::Array(
        records
            .iter()
            .filter_map(|r| serde_json::to_value(r).ok())
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_lead_keeps_unknown_fields() {
        let raw = json!({
            "company": "Acme",
            "contact_name": "Pat",
            "crm_id": 42
        });
        let lead: Lead = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(lead.extra.get("crm_id"), Some(&json!(42)));
        assert_eq!(serde_json::to_value(&lead).unwrap(), raw);
    }

    #[test]
    fn test_view_tolerates_off_type_fields() {
        let record = json!({
            "company": 42,
            "contact_name": "Lee",
            "technologies": "AWS, Python",
            "score": 87.5
        });
        let lead = LeadView::new(&record);
        assert_eq!(lead.company(), None);
        assert_eq!(lead.contact_name(), Some("Lee"));
        assert_eq!(lead.technologies(), vec!["AWS", "Python"]);
        assert!(lead.uses("AWS"));
        assert!(!lead.uses("Salesforce"));
    }

    #[test]
    fn test_view_of_non_object_is_empty() {
        let record = json!("just a string");
        let lead = LeadView::new(&record);
        assert_eq!(lead.contact_or("unknown"), "unknown");
        assert!(lead.technologies().is_empty());
        assert_eq!(lead.email(), None);
    }

    #[test]
    fn test_set_field_only_touches_objects() {
        let mut object = json!({ "a": 1 });
        set_field(&mut object, "b", json!(2));
        assert_eq!(object, json!({ "a": 1, "b": 2 }));

        let mut scalar = json!(7);
        set_field(&mut scalar, "b", json!(2));
        assert_eq!(scalar, json!(7));
    }

    #[test]
    fn test_delivery_record_shape() {
        let record = DeliveryRecord {
            to: "a@x.com".into(),
            status: DeliveryStatus::Sent,
            timestamp: "2026-01-01T00:00:00Z".into(),
            campaign_id: Some("c1".into()),
            error: None,
        };
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["status"], "sent");
        assert!(value.get("error").is_none());
    }
}
