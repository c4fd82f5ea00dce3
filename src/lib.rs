//! maildash: Email engagement dashboard
//!
//! Turns a pre-loaded dataset of sent emails (grouped by institution) and
//! delivery certificates into stats, grouped listings, charts and a per-email
//! detail panel.

pub mod charts;
pub mod config;
pub mod controller;
pub mod data_ops;
pub mod detail;
pub mod loader;
pub mod matcher;
pub mod render;
pub mod utils;
pub mod watcher;

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

/// Read a field that may be missing or `null` as its default
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A single tracked email
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailRecord {
    /// Unique per dataset
    pub id: u64,
    /// Address the email was sent to
    #[serde(default, deserialize_with = "null_as_default")]
    pub email: String,
    /// Display name of the recipient
    #[serde(default, deserialize_with = "null_as_default")]
    pub recipient: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub subject: String,
    /// Send timestamp, e.g. "2024-03-01 09:14"
    #[serde(default, deserialize_with = "null_as_default")]
    pub sent: String,
    #[serde(default)]
    pub last_opened: Option<String>,
    /// Tracking source the record came from
    #[serde(default, deserialize_with = "null_as_default")]
    pub source: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub opens: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub clicks: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub pdf_views: u64,
}

impl EmailRecord {
    /// Address shown in listings: email, then recipient, then a dash
    pub fn display_address(&self) -> &str {
        if !self.email.is_empty() {
            &self.email
        } else if !self.recipient.is_empty() {
            &self.recipient
        } else {
            PLACEHOLDER
        }
    }
}

/// Literal rendered for missing optional fields
pub const PLACEHOLDER: &str = "-";

/// Name of the fallback institution group
pub const OTHER_GROUP: &str = "Other";

/// One delivered-to entry on a certificate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipient {
    #[serde(default, deserialize_with = "null_as_default")]
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
}

impl Recipient {
    /// Name if present, otherwise the address
    pub fn label(&self) -> &str {
        match self.name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => &self.email,
        }
    }
}

/// Kind of a certificate timeline event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimelineKind {
    Opened,
    Clicked,
}

impl std::fmt::Display for TimelineKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TimelineKind::Opened => write!(f, "opened"),
            TimelineKind::Clicked => write!(f, "clicked"),
        }
    }
}

/// A single open/click event recorded on a certificate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineEvent {
    #[serde(rename = "type")]
    pub kind: TimelineKind,
    #[serde(default, deserialize_with = "null_as_default")]
    pub actor: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub date: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub time: String,
}

/// Delivery-confirmation record with its open/click timeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CertificateRecord {
    #[serde(default, deserialize_with = "null_as_default")]
    pub subject: String,
    #[serde(default)]
    pub pdf_url: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub delivered_to: Vec<Recipient>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub timeline: Vec<TimelineEvent>,
}

/// The in-memory dataset handed over by the loader
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    /// Group names in display order
    pub groups: Vec<String>,
    /// Records per group
    pub emails: HashMap<String, Vec<EmailRecord>>,
    /// Pre-summed opens per group
    pub totals: HashMap<String, u64>,
    pub certificates: Vec<CertificateRecord>,
}

impl Dataset {
    /// Records of a group; unknown groups are empty
    pub fn emails_in(&self, group: &str) -> &[EmailRecord] {
        self.emails.get(group).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Pre-summed opens of a group, 0 when not supplied
    pub fn total_for(&self, group: &str) -> u64 {
        self.totals.get(group).copied().unwrap_or(0)
    }
}

/// A named group with the records to display under it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupSlice {
    pub name: String,
    pub emails: Vec<EmailRecord>,
}

/// Ordered groups, as produced by a search or taken from the full dataset
pub type GroupedEmails = Vec<GroupSlice>;

/// Aggregates shown in the stat tiles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_emails: u64,
    pub total_opens: u64,
    pub total_clicks: u64,
    pub max_opens: u64,
    pub group_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_record_defaults_missing_fields() {
        let record: EmailRecord = serde_json::from_str(r#"{"id": 7}"#).unwrap();
        assert_eq!(record.id, 7);
        assert_eq!(record.opens, 0);
        assert_eq!(record.clicks, 0);
        assert_eq!(record.pdf_views, 0);
        assert!(record.last_opened.is_none());
        assert_eq!(record.display_address(), "-");
    }

    #[test]
    fn test_email_record_camel_case_fields() {
        let record: EmailRecord = serde_json::from_str(
            r#"{"id": 1, "lastOpened": "2024-02-02 10:00", "pdfViews": 3, "recipient": "Jo"}"#,
        )
        .unwrap();
        assert_eq!(record.last_opened.as_deref(), Some("2024-02-02 10:00"));
        assert_eq!(record.pdf_views, 3);
        assert_eq!(record.display_address(), "Jo");
    }

    #[test]
    fn test_negative_opens_rejected() {
        let result: Result<EmailRecord, _> = serde_json::from_str(r#"{"id": 1, "opens": -4}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_certificate_timeline_type_field() {
        let cert: CertificateRecord = serde_json::from_str(
            r#"{
                "subject": "Appeal",
                "delivered_to": [{"email": "a@x.com"}],
                "timeline": [{"type": "clicked", "actor": "a@x.com", "date": "1 Mar", "time": "09:00"}]
            }"#,
        )
        .unwrap();
        assert_eq!(cert.timeline[0].kind, TimelineKind::Clicked);
        assert!(cert.pdf_url.is_none());
        assert_eq!(cert.delivered_to[0].label(), "a@x.com");
    }

    #[test]
    fn test_null_fields_fall_back_to_defaults() {
        let record: EmailRecord = serde_json::from_str(
            r#"{"id": 1, "subject": null, "source": null, "opens": null, "clicks": null, "lastOpened": null}"#,
        )
        .unwrap();
        assert_eq!(record.subject, "");
        assert_eq!(record.source, "");
        assert_eq!(record.opens, 0);
        assert_eq!(record.clicks, 0);
        assert!(record.last_opened.is_none());

        let cert: CertificateRecord = serde_json::from_str(
            r#"{
                "subject": null,
                "pdf_url": null,
                "delivered_to": [{"email": null, "name": "Clerk"}],
                "timeline": [{"type": "opened", "actor": null, "date": null, "time": null}]
            }"#,
        )
        .unwrap();
        assert_eq!(cert.subject, "");
        assert_eq!(cert.delivered_to[0].label(), "Clerk");
        assert_eq!(cert.timeline[0].actor, "");

        let cert: CertificateRecord =
            serde_json::from_str(r#"{"subject": "Appeal", "delivered_to": null, "timeline": null}"#).unwrap();
        assert!(cert.delivered_to.is_empty());
        assert!(cert.timeline.is_empty());
    }

    #[test]
    fn test_dataset_lookups_default() {
        let dataset = Dataset::default();
        assert!(dataset.emails_in("Police").is_empty());
        assert_eq!(dataset.total_for("Police"), 0);
    }
}
