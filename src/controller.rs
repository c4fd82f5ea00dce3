//! Application controller: owns the dataset and the UI state, and drives a [`Surface`]
//!
//! Time is passed in explicitly (`now`) so the search debounce is deterministic.

use crate::charts::{render_charts, ChartBackend};
use crate::config::DashboardConfig;
use crate::data_ops::{compute_stats, search, visible_groups, SearchOutcome};
use crate::detail::{build_detail, DetailView};
use crate::render::{full_listing, group_views, GroupView, Surface};
use crate::utils::Debouncer;
use crate::{DashboardStats, Dataset, GroupedEmails};
use std::collections::BTreeSet;
use std::time::Instant;

/// What the user currently sees
#[derive(Debug, Clone, Default)]
pub struct UiState {
    query: String,
    filtered: bool,
    visible: GroupedEmails,
    expanded: BTreeSet<usize>,
    active: Option<(String, u64)>,
}

impl UiState {
    /// Last applied (trimmed) query; empty when showing everything
    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn is_filtered(&self) -> bool {
        self.filtered
    }

    /// Groups in the current listing
    pub fn visible(&self) -> &GroupedEmails {
        &self.visible
    }

    pub fn is_expanded(&self, index: usize) -> bool {
        self.expanded.contains(&index)
    }

    pub fn expanded(&self) -> impl Iterator<Item = usize> + '_ {
        self.expanded.iter().copied()
    }

    pub fn active(&self) -> Option<(&str, u64)> {
        self.active.as_ref().map(|(g, id)| (g.as_str(), *id))
    }

    fn replace_listing(&mut self, visible: GroupedEmails, filtered: bool) {
        self.visible = visible;
        self.filtered = filtered;
        self.expanded.clear();
        self.active = None;
    }

    /// Flip a group; returns the new state
    fn toggle(&mut self, index: usize) -> bool {
        if self.expanded.remove(&index) {
            false
        } else {
            self.expanded.insert(index);
            true
        }
    }
}

pub struct AppController {
    dataset: Dataset,
    config: DashboardConfig,
    stats: DashboardStats,
    state: UiState,
    pending_search: Debouncer<String>,
    searches_applied: usize,
}

impl AppController {
    /// Stats are computed once here and never change afterwards
    pub fn new(dataset: Dataset, config: DashboardConfig) -> Self {
        let stats = compute_stats(&dataset.groups, &dataset.emails);
        let pending_search = Debouncer::new(config.search_delay);
        Self {
            dataset,
            config,
            stats,
            state: UiState::default(),
            pending_search,
            searches_applied: 0,
        }
    }

    pub fn stats(&self) -> &DashboardStats {
        &self.stats
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn state(&self) -> &UiState {
        &self.state
    }

    /// How many searches have been applied to the listing
    pub fn searches_applied(&self) -> usize {
        self.searches_applied
    }

    /// When the pending search becomes due, if one is queued
    pub fn search_deadline(&self) -> Option<Instant> {
        self.pending_search.deadline()
    }

    /// Initial render: stats, full listing, charts, then open the first group.
    /// Returns how many charts were drawn.
    pub fn start(&mut self, surface: &mut dyn Surface, charts: Option<&mut dyn ChartBackend>) -> usize {
        surface.show_stats(&self.stats);
        self.show_listing(surface, SearchOutcome::ShowAll);
        let drawn = render_charts(charts, &self.dataset, &self.config.institutions);
        if !self.state.visible.is_empty() {
            self.toggle_group(surface, 0);
        }
        tracing::debug!(
            groups = self.dataset.groups.len(),
            emails = self.stats.total_emails,
            charts = drawn,
            "dashboard started"
        );
        drawn
    }

    /// Queue a search; only the last input of a burst is applied
    pub fn input_search(&mut self, text: &str, now: Instant) {
        self.pending_search.push(text.trim().to_string(), now);
    }

    /// Apply the queued search if its quiet period has elapsed
    pub fn tick(&mut self, surface: &mut dyn Surface, now: Instant) -> bool {
        match self.pending_search.poll(now) {
            Some(query) => {
                self.apply_search(surface, &query);
                true
            }
            None => false,
        }
    }

    /// Apply the queued search right away
    pub fn flush_search(&mut self, surface: &mut dyn Surface) -> bool {
        match self.pending_search.flush() {
            Some(query) => {
                self.apply_search(surface, &query);
                true
            }
            None => false,
        }
    }

    fn apply_search(&mut self, surface: &mut dyn Surface, query: &str) {
        let q = (!query.is_empty()).then_some(query);
        let outcome = search(&self.dataset.groups, &self.dataset.emails, q);
        let filtered = outcome.is_filtered();
        self.state.query = query.to_string();
        self.show_listing(surface, outcome);
        if filtered {
            for index in 0..self.state.visible.len() {
                self.state.expanded.insert(index);
                surface.set_group_expanded(index, true);
            }
        }
        self.searches_applied += 1;
        tracing::debug!(query, groups = self.state.visible.len(), "search applied");
    }

    fn show_listing(&mut self, surface: &mut dyn Surface, outcome: SearchOutcome) {
        let filtered = outcome.is_filtered();
        let visible = visible_groups(&self.dataset, &outcome);
        let views = group_views(&visible, |g| self.dataset.total_for(g), &self.config);
        let had_active = self.state.active.is_some();
        surface.show_groups(&views);
        self.state.replace_listing(visible, filtered);
        if had_active {
            surface.set_active_email(None);
        }
    }

    /// Expand or collapse a group of the current listing; unknown indices do nothing
    pub fn toggle_group(&mut self, surface: &mut dyn Surface, index: usize) -> bool {
        if index >= self.state.visible.len() {
            tracing::debug!(index, "toggle ignored: no such group");
            return false;
        }
        let expanded = self.state.toggle(index);
        surface.set_group_expanded(index, expanded);
        true
    }

    /// Select an email of the current listing and show its detail panel.
    /// Unknown group/id pairs leave everything unchanged.
    pub fn select_email(&mut self, surface: &mut dyn Surface, group: &str, id: u64) -> bool {
        let email = self
            .state
            .visible
            .iter()
            .find(|g| g.name == group)
            .and_then(|g| g.emails.iter().find(|e| e.id == id));
        let Some(email) = email else {
            tracing::debug!(group, id, "selection ignored: no such email");
            return false;
        };

        let detail = build_detail(
            email,
            group,
            &self.stats,
            &self.dataset.certificates,
            &self.config,
        );
        surface.set_active_email(Some((group, id)));
        surface.show_detail(&detail);
        self.state.active = Some((group.to_string(), id));
        true
    }

    /// Detail panel for any email of the dataset, regardless of the listing
    pub fn detail_for(&self, group: &str, id: u64) -> Option<DetailView> {
        self.dataset
            .emails_in(group)
            .iter()
            .find(|e| e.id == id)
            .map(|e| build_detail(e, group, &self.stats, &self.dataset.certificates, &self.config))
    }

    /// Detail panels for every email, in listing order
    pub fn all_details(&self) -> Vec<DetailView> {
        self.dataset
            .groups
            .iter()
            .flat_map(|g| {
                self.dataset.emails_in(g).iter().map(move |e| {
                    build_detail(e, g, &self.stats, &self.dataset.certificates, &self.config)
                })
            })
            .collect()
    }

    /// Uncapped listing of the whole dataset
    pub fn full_listing(&self) -> Vec<GroupView> {
        let all = visible_groups(&self.dataset, &SearchOutcome::ShowAll);
        full_listing(&all, |g| self.dataset.total_for(g), &self.config.institutions)
    }
}
