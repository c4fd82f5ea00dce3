//! JSON surface for machine-readable output

use super::{GroupView, Surface};
use crate::detail::DetailView;
use crate::DashboardStats;
use serde::Serialize;

/// Snapshot of everything the controller has shown
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    pub stats: Option<DashboardStats>,
    pub groups: Vec<GroupView>,
    /// Indices of expanded groups, ascending
    pub expanded: Vec<usize>,
    pub active: Option<ActiveEmail>,
    pub detail: Option<DetailView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActiveEmail {
    pub group: String,
    pub id: u64,
}

/// Surface for JSON output
#[derive(Debug, Default)]
pub struct JsonSurface {
    /// Whether to pretty-print JSON
    pretty: bool,
    snapshot: DashboardSnapshot,
}

impl JsonSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable pretty-printing
    pub fn pretty(mut self) -> Self {
        self.pretty = true;
        self
    }

    pub fn snapshot(&self) -> &DashboardSnapshot {
        &self.snapshot
    }

    pub fn render(&self) -> String {
        if self.pretty {
            serde_json::to_string_pretty(&self.snapshot).unwrap_or_else(|_| "{}".to_string())
        } else {
            serde_json::to_string(&self.snapshot).unwrap_or_else(|_| "{}".to_string())
        }
    }
}

impl Surface for JsonSurface {
    fn show_stats(&mut self, stats: &DashboardStats) {
        self.snapshot.stats = Some(*stats);
    }

    fn show_groups(&mut self, groups: &[GroupView]) {
        self.snapshot.groups = groups.to_vec();
        self.snapshot.expanded.clear();
        self.snapshot.active = None;
    }

    fn set_group_expanded(&mut self, index: usize, expanded: bool) {
        if index >= self.snapshot.groups.len() {
            return;
        }
        let expanded_list = &mut self.snapshot.expanded;
        match (expanded_list.binary_search(&index), expanded) {
            (Err(pos), true) => expanded_list.insert(pos, index),
            (Ok(pos), false) => {
                expanded_list.remove(pos);
            }
            _ => {}
        }
    }

    fn set_active_email(&mut self, active: Option<(&str, u64)>) {
        self.snapshot.active = active.map(|(group, id)| ActiveEmail {
            group: group.to_string(),
            id,
        });
    }

    fn show_detail(&mut self, detail: &DetailView) {
        self.snapshot.detail = Some(detail.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DashboardConfig;
    use crate::render::group_views;
    use crate::{EmailRecord, GroupSlice};

    fn listing() -> Vec<GroupView> {
        let slices: Vec<GroupSlice> = ["Media", "Police", "Government"]
            .iter()
            .enumerate()
            .map(|(i, name)| GroupSlice {
                name: name.to_string(),
                emails: vec![EmailRecord {
                    id: i as u64 + 1,
                    email: format!("desk{i}@example.org"),
                    recipient: String::new(),
                    subject: "Statement".to_string(),
                    sent: String::new(),
                    last_opened: None,
                    source: String::new(),
                    opens: 1,
                    clicks: 0,
                    pdf_views: 0,
                }],
            })
            .collect();
        group_views(&slices, |_| 1, &DashboardConfig::default())
    }

    #[test]
    fn test_expanded_stays_sorted_and_unique() {
        let mut surface = JsonSurface::new();
        surface.show_groups(&listing());
        surface.set_group_expanded(2, true);
        surface.set_group_expanded(0, true);
        surface.set_group_expanded(2, true);
        assert_eq!(surface.snapshot().expanded, vec![0, 2]);
        surface.set_group_expanded(2, false);
        assert_eq!(surface.snapshot().expanded, vec![0]);
    }

    #[test]
    fn test_render_camel_case() {
        let mut surface = JsonSurface::new();
        surface.show_stats(&DashboardStats {
            total_emails: 3,
            total_opens: 3,
            total_clicks: 0,
            max_opens: 1,
            group_count: 3,
        });
        surface.show_groups(&listing());
        surface.set_active_email(Some(("Police", 2)));

        let value: serde_json::Value = serde_json::from_str(&surface.render()).unwrap();
        assert_eq!(value["stats"]["totalEmails"], 3);
        assert_eq!(value["stats"]["groupCount"], 3);
        assert_eq!(value["groups"][1]["header"]["name"], "Police");
        assert_eq!(value["groups"][1]["rows"][0]["address"], "desk1@example.org");
        assert_eq!(value["active"]["group"], "Police");
        assert!(value["detail"].is_null());
    }

    #[test]
    fn test_pretty_output_is_multiline() {
        let surface = JsonSurface::new().pretty();
        assert!(surface.render().contains('\n'));
        assert!(!JsonSurface::new().render().contains('\n'));
    }
}
