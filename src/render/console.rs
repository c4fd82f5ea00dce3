//! Console surface with colored output

use super::{EngagementBand, GroupView, StatTiles, Surface};
use crate::config::DashboardConfig;
use crate::detail::{DetailView, TimelineView};
use crate::DashboardStats;
use colored::Colorize;
use std::collections::BTreeSet;

/// Surface for terminal output
pub struct ConsoleSurface {
    title: String,
    /// Whether to use colors
    use_colors: bool,
    /// List rows of collapsed groups too
    verbose: bool,
    tiles: Option<StatTiles>,
    groups: Vec<GroupView>,
    expanded: BTreeSet<usize>,
    active: Option<(String, u64)>,
    detail: Option<DetailView>,
}

impl ConsoleSurface {
    pub fn new(config: &DashboardConfig) -> Self {
        Self {
            title: config.title.clone(),
            use_colors: true,
            verbose: false,
            tiles: None,
            groups: Vec::new(),
            expanded: BTreeSet::new(),
            active: None,
            detail: None,
        }
    }

    /// Disable colors
    pub fn without_colors(mut self) -> Self {
        self.use_colors = false;
        self
    }

    /// Show the rows of every group, expanded or not
    pub fn verbose(mut self) -> Self {
        self.verbose = true;
        self
    }

    /// Render everything shown so far
    pub fn render(&self) -> String {
        let mut out = Vec::new();
        out.push(String::new());
        out.push(self.bold(&format!("📬 {}", self.title)));

        if let Some(t) = &self.tiles {
            out.push(format!(
                "   Emails: {} | Opens: {} | Clicks: {} | Institutions: {}",
                t.total_emails, t.total_opens, t.total_clicks, t.group_count
            ));
        }
        out.push(String::new());

        if self.groups.is_empty() {
            out.push(format!("   {}", self.dimmed("No emails to show.")));
        }
        for group in &self.groups {
            self.push_group(&mut out, group);
        }

        if let Some(detail) = &self.detail {
            out.push(String::new());
            self.push_detail(&mut out, detail);
        }

        out.push(String::new());
        out.join("\n")
    }

    fn push_group(&self, out: &mut Vec<String>, group: &GroupView) {
        let h = &group.header;
        let expanded = self.expanded.contains(&h.index);
        let marker = if expanded { "▾" } else { "▸" };
        out.push(format!(
            "{} {} {}  {}",
            marker,
            self.cyan(&format!("[{}]", h.icon)),
            self.bold(&h.name),
            self.dimmed(&h.summary)
        ));

        if !expanded && !self.verbose {
            return;
        }
        for row in &group.rows {
            let is_active = self
                .active
                .as_ref()
                .is_some_and(|(g, id)| *g == row.group && *id == row.id);
            let line = format!(
                "{:>5}. {}  {}  {} · {}  {}",
                row.position,
                row.address,
                row.subject,
                row.date,
                row.source,
                row.opens
            );
            if is_active {
                let line = line.strip_prefix(' ').unwrap_or(&line);
                out.push(format!("  ›{}", self.bold(line)));
            } else {
                out.push(format!("  {}", line));
            }
        }
        if group.hidden_rows > 0 {
            out.push(format!(
                "       {}",
                self.dimmed(&format!("+{} more", group.hidden_rows))
            ));
        }
    }

    fn push_detail(&self, out: &mut Vec<String>, d: &DetailView) {
        out.push(format!("{} {}", self.bold(&d.subject), self.badge(d.badge.band, d.badge.label)));
        out.push(format!(
            "   Opens: {} | Clicks: {} | PDF views: {}",
            d.opens, d.clicks, d.pdf_views
        ));
        out.push(format!("   Engagement: {}", self.engagement_bar(d.engagement_pct)));
        for (label, value) in [
            ("Email", &d.email),
            ("Recipient", &d.recipient),
            ("Sent", &d.sent),
            ("Last opened", &d.last_opened),
            ("Institution", &d.institution),
            ("Source", &d.source),
        ] {
            out.push(format!("   {:<12} {}", format!("{label}:"), value));
        }
        if let Some(url) = &d.certificate_link {
            out.push(format!("   {:<12} {}", "Certificate:", url));
        }

        out.push(format!("   {}", self.bold("Timeline:")));
        match &d.timeline {
            TimelineView::Events { events } => {
                for e in events {
                    out.push(format!(
                        "     {} {:<13} {}  {}",
                        e.icon,
                        e.label,
                        e.actor,
                        self.dimmed(&e.when)
                    ));
                }
            }
            TimelineView::Summary {
                opens,
                clicks,
                last_opened,
            } => {
                out.push(format!("     {}", self.dimmed("No detailed timeline available.")));
                out.push(format!("     Summary: {} opens, {} clicks", opens, clicks));
                if let Some(last) = last_opened {
                    out.push(format!("     Last: {}", last));
                }
            }
        }

        if let Some(tags) = &d.recipients {
            let labels: Vec<String> = tags
                .iter()
                .map(|t| {
                    if t.opened {
                        self.green(&format!("{} ✓", t.label))
                    } else {
                        t.label.clone()
                    }
                })
                .collect();
            out.push(format!("   Recipients: {}", labels.join(", ")));
        }
    }

    fn engagement_bar(&self, pct: u8) -> String {
        let filled = (pct as usize * 20) / 100;
        let bar = format!("[{}{}] {:>3}%", "█".repeat(filled), "░".repeat(20 - filled), pct);
        if self.use_colors {
            bar.blue().to_string()
        } else {
            bar
        }
    }

    fn badge(&self, band: EngagementBand, label: &str) -> String {
        let text = format!("[{}]", label);
        if !self.use_colors {
            return text;
        }
        match band {
            EngagementBand::High => text.green().bold().to_string(),
            EngagementBand::Medium => text.yellow().to_string(),
            EngagementBand::Low => text.dimmed().to_string(),
        }
    }

    fn bold(&self, s: &str) -> String {
        if self.use_colors {
            s.bold().to_string()
        } else {
            s.to_string()
        }
    }

    fn dimmed(&self, s: &str) -> String {
        if self.use_colors {
            s.dimmed().to_string()
        } else {
            s.to_string()
        }
    }

    fn cyan(&self, s: &str) -> String {
        if self.use_colors {
            s.cyan().to_string()
        } else {
            s.to_string()
        }
    }

    fn green(&self, s: &str) -> String {
        if self.use_colors {
            s.green().to_string()
        } else {
            s.to_string()
        }
    }
}

impl Surface for ConsoleSurface {
    fn show_stats(&mut self, stats: &DashboardStats) {
        self.tiles = Some(StatTiles::from(stats));
    }

    fn show_groups(&mut self, groups: &[GroupView]) {
        self.groups = groups.to_vec();
        self.expanded.clear();
        self.active = None;
    }

    fn set_group_expanded(&mut self, index: usize, expanded: bool) {
        if index >= self.groups.len() {
            return;
        }
        if expanded {
            self.expanded.insert(index);
        } else {
            self.expanded.remove(&index);
        }
    }

    fn set_active_email(&mut self, active: Option<(&str, u64)>) {
        self.active = active.map(|(g, id)| (g.to_string(), id));
    }

    fn show_detail(&mut self, detail: &DetailView) {
        self.detail = Some(detail.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::group_views;
    use crate::{EmailRecord, GroupSlice};

    fn groups(config: &DashboardConfig) -> Vec<GroupView> {
        let record = |id: u64, subject: &str| EmailRecord {
            id,
            email: format!("u{id}@council.gov.uk"),
            recipient: String::new(),
            subject: subject.to_string(),
            sent: "2024-02-10 12:00".to_string(),
            last_opened: None,
            source: "mailtrack".to_string(),
            opens: 3 * id,
            clicks: 0,
            pdf_views: 0,
        };
        let slices = vec![
            GroupSlice {
                name: "Westminster Council".to_string(),
                emails: vec![record(1, "Council tax query"), record(2, "Repairs request")],
            },
            GroupSlice {
                name: "Police".to_string(),
                emails: vec![record(3, "Incident report")],
            },
        ];
        group_views(&slices, |_| 9, config)
    }

    #[test]
    fn test_collapsed_groups_hide_rows() {
        let config = DashboardConfig::default();
        let mut surface = ConsoleSurface::new(&config).without_colors();
        surface.show_stats(&DashboardStats {
            total_emails: 3,
            total_opens: 18,
            total_clicks: 0,
            max_opens: 9,
            group_count: 2,
        });
        surface.show_groups(&groups(&config));
        surface.set_group_expanded(0, true);
        let out = surface.render();

        assert!(out.contains("Email Engagement Dashboard"));
        assert!(out.contains("Emails: 3 | Opens: 18 | Clicks: 0 | Institutions: 2"));
        assert!(out.contains("▾ [WC] Westminster Council  2 emails · 9 opens"));
        assert!(out.contains("▸ [POL] Police"));
        assert!(out.contains("Council tax query"));
        assert!(!out.contains("Incident report"));
    }

    #[test]
    fn test_verbose_lists_all_rows() {
        let config = DashboardConfig::default();
        let mut surface = ConsoleSurface::new(&config).without_colors().verbose();
        surface.show_groups(&groups(&config));
        assert!(surface.render().contains("Incident report"));
    }

    #[test]
    fn test_active_row_marker() {
        let config = DashboardConfig::default();
        let mut surface = ConsoleSurface::new(&config).without_colors();
        surface.show_groups(&groups(&config));
        surface.set_group_expanded(0, true);
        surface.set_active_email(Some(("Westminster Council", 2)));
        let out = surface.render();
        assert!(out.contains("  ›   2. u2@council.gov.uk"));
        assert!(out.contains("      1. u1@council.gov.uk"));
    }

    #[test]
    fn test_engagement_bar_without_colors() {
        let config = DashboardConfig::default();
        let surface = ConsoleSurface::new(&config).without_colors();
        assert_eq!(
            surface.engagement_bar(50),
            format!("[{}{}]  50%", "█".repeat(10), "░".repeat(10))
        );
    }
}
