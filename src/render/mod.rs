//! View models for the dashboard and the surfaces that display them
//!
//! Builders here are pure: they turn records into plain data describing what
//! to show. A [`Surface`] decides how that data is presented (HTML page,
//! terminal, JSON).

pub mod console;
pub mod html;
pub mod json;

pub use console::ConsoleSurface;
pub use html::HtmlSurface;
pub use json::JsonSurface;

use crate::config::{DashboardConfig, EngagementThresholds, InstitutionTable};
use crate::detail::DetailView;
use crate::utils::{date_part, format_count};
use crate::{DashboardStats, EmailRecord, GroupSlice, PLACEHOLDER};
use serde::Serialize;

/// High/Medium/Low classification of an open count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EngagementBand {
    High,
    Medium,
    Low,
}

impl EngagementBand {
    pub fn label(self) -> &'static str {
        match self {
            EngagementBand::High => "High",
            EngagementBand::Medium => "Medium",
            EngagementBand::Low => "Low",
        }
    }

    pub fn style_class(self) -> &'static str {
        match self {
            EngagementBand::High => "badge--high",
            EngagementBand::Medium => "badge--medium",
            EngagementBand::Low => "badge--low",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Badge {
    pub band: EngagementBand,
    pub label: &'static str,
    pub style_class: &'static str,
}

/// Band for `opens`; each band includes its lower bound
pub fn classify_engagement(opens: u64, thresholds: &EngagementThresholds) -> Badge {
    let band = if opens >= thresholds.high {
        EngagementBand::High
    } else if opens >= thresholds.medium {
        EngagementBand::Medium
    } else {
        EngagementBand::Low
    };
    Badge {
        band,
        label: band.label(),
        style_class: band.style_class(),
    }
}

/// Formatted values for the four stat tiles
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatTiles {
    pub total_emails: String,
    pub total_opens: String,
    pub total_clicks: String,
    pub group_count: String,
}

impl From<&DashboardStats> for StatTiles {
    fn from(stats: &DashboardStats) -> Self {
        Self {
            total_emails: format_count(stats.total_emails),
            total_opens: format_count(stats.total_opens),
            total_clicks: format_count(stats.total_clicks),
            group_count: stats.group_count.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupHeaderView {
    /// Position of the group in the current listing
    pub index: usize,
    pub name: String,
    pub icon: String,
    pub color: String,
    pub class_name: String,
    pub count: usize,
    pub opens: u64,
    /// "12 emails · 1,024 opens"
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailRowView {
    pub group: String,
    pub id: u64,
    /// 1-based position within the group
    pub position: usize,
    pub address: String,
    pub subject: String,
    pub date: String,
    pub source: String,
    pub opens: u64,
    /// Lower-cased subject, recipient and address, for client-side search
    pub haystack: [String; 3],
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupView {
    pub header: GroupHeaderView,
    pub rows: Vec<EmailRowView>,
    /// Rows left out because of the display cap
    pub hidden_rows: usize,
}

pub fn group_header(
    name: &str,
    count: usize,
    opens: u64,
    index: usize,
    table: &InstitutionTable,
) -> GroupHeaderView {
    let style = table.style_for(name);
    GroupHeaderView {
        index,
        name: name.to_string(),
        icon: style.icon.clone(),
        color: style.color.clone(),
        class_name: style.class_name.clone(),
        count,
        opens,
        summary: format!("{} emails · {} opens", count, format_count(opens)),
    }
}

/// Row for the email at zero-based `index` within its group
pub fn email_row(email: &EmailRecord, group: &str, index: usize) -> EmailRowView {
    let date = date_part(&email.sent);
    EmailRowView {
        group: group.to_string(),
        id: email.id,
        position: index + 1,
        address: email.display_address().to_string(),
        subject: non_empty_or_placeholder(&email.subject),
        date: non_empty_or_placeholder(date),
        source: non_empty_or_placeholder(&email.source),
        opens: email.opens,
        haystack: [
            email.subject.to_lowercase(),
            email.recipient.to_lowercase(),
            email.email.to_lowercase(),
        ],
    }
}

/// Header plus rows for one group, honoring the display cap
pub fn group_block(group: &GroupSlice, opens: u64, index: usize, config: &DashboardConfig) -> GroupView {
    block(group, opens, index, &config.institutions, config.max_display_items)
}

fn block(group: &GroupSlice, opens: u64, index: usize, table: &InstitutionTable, cap: usize) -> GroupView {
    let shown = group.emails.len().min(cap);
    GroupView {
        header: group_header(&group.name, group.emails.len(), opens, index, table),
        rows: group.emails[..shown]
            .iter()
            .enumerate()
            .map(|(i, e)| email_row(e, &group.name, i))
            .collect(),
        hidden_rows: group.emails.len() - shown,
    }
}

/// Views for an ordered listing; `opens_for` supplies each group's opens total
pub fn group_views(
    groups: &[GroupSlice],
    opens_for: impl Fn(&str) -> u64,
    config: &DashboardConfig,
) -> Vec<GroupView> {
    groups
        .iter()
        .enumerate()
        .map(|(i, g)| group_block(g, opens_for(&g.name), i, config))
        .collect()
}

/// Every row of every group, without the display cap (the search index of the page)
pub fn full_listing(
    groups: &[GroupSlice],
    opens_for: impl Fn(&str) -> u64,
    table: &InstitutionTable,
) -> Vec<GroupView> {
    groups
        .iter()
        .enumerate()
        .map(|(i, g)| block(g, opens_for(&g.name), i, table, usize::MAX))
        .collect()
}

fn non_empty_or_placeholder(s: &str) -> String {
    if s.is_empty() {
        PLACEHOLDER.to_string()
    } else {
        s.to_string()
    }
}

/// The named display slots the controller writes to
pub trait Surface {
    fn show_stats(&mut self, stats: &DashboardStats);
    /// Replace the whole group listing; every group starts collapsed and no
    /// row is active. When a row was active before, the controller also calls
    /// `set_active_email(None)` right after.
    fn show_groups(&mut self, groups: &[GroupView]);
    fn set_group_expanded(&mut self, index: usize, expanded: bool);
    /// Highlight one row (or none)
    fn set_active_email(&mut self, active: Option<(&str, u64)>);
    fn show_detail(&mut self, detail: &DetailView);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: u64) -> EmailRecord {
        EmailRecord {
            id,
            email: String::new(),
            recipient: "Housing Officer".to_string(),
            subject: String::new(),
            sent: "2024-05-02 14:30".to_string(),
            last_opened: None,
            source: String::new(),
            opens: 3,
            clicks: 0,
            pdf_views: 0,
        }
    }

    #[test]
    fn test_classify_engagement_boundaries() {
        let t = EngagementThresholds::default();
        assert_eq!(classify_engagement(99, &t).band, EngagementBand::Medium);
        assert_eq!(classify_engagement(100, &t).band, EngagementBand::High);
        assert_eq!(classify_engagement(19, &t).band, EngagementBand::Low);
        assert_eq!(classify_engagement(20, &t).band, EngagementBand::Medium);
        assert_eq!(classify_engagement(0, &t).style_class, "badge--low");
    }

    #[test]
    fn test_classify_engagement_custom_thresholds() {
        let t = EngagementThresholds { high: 10, medium: 5 };
        let badge = classify_engagement(10, &t);
        assert_eq!(badge.label, "High");
        assert_eq!(badge.style_class, "badge--high");
        assert_eq!(classify_engagement(4, &t).band, EngagementBand::Low);
    }

    #[test]
    fn test_email_row_placeholders_and_date() {
        let row = email_row(&record(9), "Police", 0);
        assert_eq!(row.position, 1);
        assert_eq!(row.address, "Housing Officer");
        assert_eq!(row.subject, "-");
        assert_eq!(row.source, "-");
        assert_eq!(row.date, "2024-05-02");
    }

    #[test]
    fn test_group_header_unknown_group_uses_other() {
        let header = group_header("Parish Council", 2, 1500, 4, &InstitutionTable::default());
        assert_eq!(header.icon, "OTH");
        assert_eq!(header.class_name, "inst-other");
        assert_eq!(header.summary, "2 emails · 1,500 opens");
        assert_eq!(header.index, 4);
    }

    #[test]
    fn test_group_block_caps_rows() {
        let config = DashboardConfig {
            max_display_items: 2,
            ..DashboardConfig::default()
        };
        let group = GroupSlice {
            name: "Media".to_string(),
            emails: (1..=5).map(record).collect(),
        };
        let view = group_block(&group, 15, 0, &config);
        assert_eq!(view.rows.len(), 2);
        assert_eq!(view.hidden_rows, 3);
        assert_eq!(view.header.count, 5);
        assert_eq!(view.rows[1].position, 2);
    }

    #[test]
    fn test_stat_tiles_formatting() {
        let stats = DashboardStats {
            total_emails: 1204,
            total_opens: 56012,
            total_clicks: 7,
            max_opens: 900,
            group_count: 11,
        };
        let tiles = StatTiles::from(&stats);
        assert_eq!(tiles.total_emails, "1,204");
        assert_eq!(tiles.total_opens, "56,012");
        assert_eq!(tiles.group_count, "11");
    }
}
