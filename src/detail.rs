//! Detail panel for a selected email

use crate::config::DashboardConfig;
use crate::matcher::{find_match, recipient_opened};
use crate::render::{classify_engagement, Badge};
use crate::{CertificateRecord, DashboardStats, EmailRecord, TimelineEvent, TimelineKind, PLACEHOLDER};
use serde::Serialize;

/// Everything shown in the detail panel for one email
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailView {
    pub group: String,
    pub id: u64,
    pub subject: String,
    pub opens: u64,
    pub clicks: u64,
    pub pdf_views: u64,
    pub email: String,
    pub recipient: String,
    pub sent: String,
    pub last_opened: String,
    pub institution: String,
    pub source: String,
    /// Opens relative to the busiest email, 0-100; also the bar width
    pub engagement_pct: u8,
    pub badge: Badge,
    pub timeline: TimelineView,
    /// Delivered-to list, only for certificates with activity and several recipients
    pub recipients: Option<Vec<RecipientTag>>,
    /// PDF of the matched certificate
    pub certificate_link: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum TimelineView {
    /// Events from the matched certificate
    Events { events: Vec<TimelineEntry> },
    /// No certificate activity: the email's own counters
    Summary {
        opens: u64,
        clicks: u64,
        last_opened: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEntry {
    pub kind: TimelineKind,
    /// Modifier for the icon style ("open" or "click")
    pub icon_class: &'static str,
    pub icon: &'static str,
    pub label: &'static str,
    pub actor: String,
    /// "{date} at {time}"
    pub when: String,
}

impl From<&TimelineEvent> for TimelineEntry {
    fn from(event: &TimelineEvent) -> Self {
        let (icon_class, icon, label) = match event.kind {
            TimelineKind::Opened => ("open", "\u{1F441}", "Opened"),
            TimelineKind::Clicked => ("click", "\u{1F517}", "Link clicked"),
        };
        Self {
            kind: event.kind,
            icon_class,
            icon,
            label,
            actor: event.actor.clone(),
            when: format!("{} at {}", event.date, event.time),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipientTag {
    pub label: String,
    pub opened: bool,
}

/// Percentage of `max_opens`, rounded and capped at 100; 0 when there are no opens at all
pub fn engagement_pct(opens: u64, max_opens: u64) -> u8 {
    if max_opens == 0 {
        return 0;
    }
    let pct = (opens as f64 / max_opens as f64 * 100.0).round();
    pct.min(100.0) as u8
}

/// Build the detail panel for `email` in `group`
pub fn build_detail(
    email: &EmailRecord,
    group: &str,
    stats: &DashboardStats,
    certificates: &[CertificateRecord],
    config: &DashboardConfig,
) -> DetailView {
    let certificate = find_match(email, certificates).map(|m| m.certificate);

    let certificate_link = certificate
        .and_then(|c| c.pdf_url.clone())
        .filter(|url| !url.is_empty());

    let (timeline, recipients) = match certificate {
        Some(cert) if !cert.timeline.is_empty() => (
            TimelineView::Events {
                events: cert.timeline.iter().map(TimelineEntry::from).collect(),
            },
            recipient_tags(cert),
        ),
        _ => (
            TimelineView::Summary {
                opens: email.opens,
                clicks: email.clicks,
                last_opened: email.last_opened.clone().filter(|s| !s.is_empty()),
            },
            None,
        ),
    };

    DetailView {
        group: group.to_string(),
        id: email.id,
        subject: or_placeholder(&email.subject),
        opens: email.opens,
        clicks: email.clicks,
        pdf_views: email.pdf_views,
        email: email.display_address().to_string(),
        recipient: or_placeholder(&email.recipient),
        sent: or_placeholder(&email.sent),
        last_opened: or_placeholder(email.last_opened.as_deref().unwrap_or("")),
        institution: group.to_string(),
        source: or_placeholder(&email.source),
        engagement_pct: engagement_pct(email.opens, stats.max_opens),
        badge: classify_engagement(email.opens, &config.engagement),
        timeline,
        recipients,
        certificate_link,
    }
}

fn recipient_tags(cert: &CertificateRecord) -> Option<Vec<RecipientTag>> {
    if cert.delivered_to.len() <= 1 {
        return None;
    }
    Some(
        cert.delivered_to
            .iter()
            .map(|r| RecipientTag {
                label: r.label().to_string(),
                opened: recipient_opened(r, &cert.timeline),
            })
            .collect(),
    )
}

fn or_placeholder(s: &str) -> String {
    if s.is_empty() {
        PLACEHOLDER.to_string()
    } else {
        s.to_string()
    }
}
