//! Config schema and deserialization

use crate::OTHER_GROUP;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

pub const DEFAULT_TITLE: &str = "Email Engagement Dashboard";
pub const DEFAULT_SEARCH_DELAY_MS: u64 = 150;
pub const DEFAULT_MAX_DISPLAY_ITEMS: usize = 200;
pub const DEFAULT_CHART_SCRIPT: &str = "https://cdn.jsdelivr.net/npm/chart.js@4.4.1/dist/chart.umd.min.js";

/// Visual identity of an institution group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstitutionStyle {
    /// Short code shown in the group icon (e.g. "NHS")
    pub icon: String,
    /// CSS color, used for the icon and chart segments
    pub color: String,
    /// CSS class applied to the icon
    pub class_name: String,
}

impl InstitutionStyle {
    pub fn new(icon: &str, color: &str, class_name: &str) -> Self {
        Self {
            icon: icon.to_string(),
            color: color.to_string(),
            class_name: class_name.to_string(),
        }
    }
}

/// Ordered institution lookup with an "Other" fallback
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstitutionTable {
    entries: Vec<(String, InstitutionStyle)>,
    fallback: InstitutionStyle,
}

impl InstitutionTable {
    /// Look up a group's style, falling back to "Other" for unknown names
    pub fn style_for(&self, group: &str) -> &InstitutionStyle {
        self.get(group).unwrap_or(&self.fallback)
    }

    pub fn get(&self, group: &str) -> Option<&InstitutionStyle> {
        self.entries
            .iter()
            .find(|(name, _)| name == group)
            .map(|(_, style)| style)
    }

    /// Replace an existing entry in place or append a new one
    pub fn upsert(&mut self, group: &str, style: InstitutionStyle) {
        if group == OTHER_GROUP {
            self.fallback = style.clone();
        }
        match self.entries.iter().position(|(name, _)| name == group) {
            Some(i) => self.entries[i].1 = style,
            None => self.entries.push((group.to_string(), style)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &InstitutionStyle)> {
        self.entries.iter().map(|(name, style)| (name.as_str(), style))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for InstitutionTable {
    fn default() -> Self {
        let entries = [
            ("Westminster Council", "WC", "#238636", "inst-westminster"),
            ("Liverpool Council", "LC", "#da3633", "inst-liverpool"),
            ("NHS / Health", "NHS", "#1f6feb", "inst-nhs"),
            ("Courts / Legal", "LAW", "#8957e5", "inst-courts"),
            ("Police", "POL", "#0969da", "inst-police"),
            ("NHG Housing", "NHG", "#bf8700", "inst-housing"),
            ("Media", "MED", "#f85149", "inst-media"),
            ("Social Care", "SOC", "#a371f7", "inst-social"),
            ("Self / Internal", "INT", "#3fb950", "inst-self"),
            ("Government", "GOV", "#bc8cff", "inst-gov"),
            (OTHER_GROUP, "OTH", "#6e7681", "inst-other"),
            ("Accommodation", "ACC", "#6e7681", "inst-other"),
        ]
        .into_iter()
        .map(|(name, icon, color, class)| (name.to_string(), InstitutionStyle::new(icon, color, class)))
        .collect();

        Self {
            entries,
            fallback: InstitutionStyle::new("OTH", "#6e7681", "inst-other"),
        }
    }
}

/// Open-count bands: `opens >= high` is High, `opens >= medium` is Medium
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngagementThresholds {
    pub high: u64,
    pub medium: u64,
}

impl Default for EngagementThresholds {
    fn default() -> Self {
        Self { high: 100, medium: 20 }
    }
}

/// Dotted paths of the dataset sections inside a data bundle
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct DataPaths {
    #[serde(default)]
    pub groups: Option<String>,
    #[serde(default)]
    pub data: Option<String>,
    #[serde(default)]
    pub totals: Option<String>,
    #[serde(default)]
    pub certificates: Option<String>,
}

impl DataPaths {
    pub fn groups(&self) -> &str {
        self.groups.as_deref().unwrap_or("emailGroups")
    }

    pub fn data(&self) -> &str {
        self.data.as_deref().unwrap_or("emailData")
    }

    pub fn totals(&self) -> &str {
        self.totals.as_deref().unwrap_or("groupTotals")
    }

    pub fn certificates(&self) -> &str {
        self.certificates.as_deref().unwrap_or("certificateData")
    }

    fn merge_from(&mut self, base: DataPaths) {
        if self.groups.is_none() {
            self.groups = base.groups;
        }
        if self.data.is_none() {
            self.data = base.data;
        }
        if self.totals.is_none() {
            self.totals = base.totals;
        }
        if self.certificates.is_none() {
            self.certificates = base.certificates;
        }
    }
}

/// Root config structure for .maildashrc.json
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Extend another config file (path relative to this config)
    #[serde(default)]
    pub extends: Option<String>,

    /// Page title
    #[serde(default)]
    pub title: Option<String>,

    /// Institution styles merged over the built-in table
    #[serde(default)]
    pub institutions: BTreeMap<String, InstitutionStyle>,

    /// Engagement band thresholds
    #[serde(default)]
    pub engagement: Option<EngagementThresholds>,

    /// Search debounce delay in milliseconds
    #[serde(default)]
    pub search_delay_ms: Option<u64>,

    /// Maximum rows rendered per group
    #[serde(default)]
    pub max_display_items: Option<usize>,

    /// URL of the chart library; an empty string disables charts
    #[serde(default)]
    pub chart_script: Option<String>,

    /// Where the dataset sections live inside the data bundle
    #[serde(default)]
    pub data_paths: DataPaths,
}

impl Config {
    /// Merge CLI overrides into config. CLI values take precedence.
    pub fn merge_with_cli(mut self, cli_title: Option<&str>, no_charts: bool) -> Self {
        if let Some(title) = cli_title {
            self.title = Some(title.to_string());
        }
        if no_charts {
            self.chart_script = Some(String::new());
        }
        self
    }

    /// Merge another config into this one (for extends)
    pub fn merge_from(&mut self, base: Config) {
        // Base values are overridden by this config's values
        if self.title.is_none() {
            self.title = base.title;
        }
        if self.extends.is_none() {
            self.extends = base.extends;
        }
        if self.engagement.is_none() {
            self.engagement = base.engagement;
        }
        if self.search_delay_ms.is_none() {
            self.search_delay_ms = base.search_delay_ms;
        }
        if self.max_display_items.is_none() {
            self.max_display_items = base.max_display_items;
        }
        if self.chart_script.is_none() {
            self.chart_script = base.chart_script;
        }
        for (name, style) in base.institutions {
            self.institutions.entry(name).or_insert(style);
        }
        self.data_paths.merge_from(base.data_paths);
    }

    /// Validate and fill defaults
    pub fn resolve(self) -> anyhow::Result<DashboardConfig> {
        let engagement = self.engagement.unwrap_or_default();
        if engagement.medium > engagement.high {
            anyhow::bail!(
                "Invalid engagement thresholds: medium ({}) is above high ({})",
                engagement.medium,
                engagement.high
            );
        }

        let max_display_items = self.max_display_items.unwrap_or(DEFAULT_MAX_DISPLAY_ITEMS);
        if max_display_items == 0 {
            anyhow::bail!("maxDisplayItems must be at least 1");
        }

        let mut institutions = InstitutionTable::default();
        for (name, style) in self.institutions {
            institutions.upsert(&name, style);
        }

        let chart_script = match self.chart_script {
            Some(url) if url.trim().is_empty() => None,
            Some(url) => Some(url),
            None => Some(DEFAULT_CHART_SCRIPT.to_string()),
        };

        Ok(DashboardConfig {
            title: self.title.unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            institutions,
            engagement,
            search_delay: Duration::from_millis(
                self.search_delay_ms.unwrap_or(DEFAULT_SEARCH_DELAY_MS),
            ),
            max_display_items,
            chart_script,
            data_paths: self.data_paths,
        })
    }
}

/// Fully resolved settings used by the dashboard
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardConfig {
    pub title: String,
    pub institutions: InstitutionTable,
    pub engagement: EngagementThresholds,
    pub search_delay: Duration,
    pub max_display_items: usize,
    /// None when charts are disabled
    pub chart_script: Option<String>,
    pub data_paths: DataPaths,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            institutions: InstitutionTable::default(),
            engagement: EngagementThresholds::default(),
            search_delay: Duration::from_millis(DEFAULT_SEARCH_DELAY_MS),
            max_display_items: DEFAULT_MAX_DISPLAY_ITEMS,
            chart_script: Some(DEFAULT_CHART_SCRIPT.to_string()),
            data_paths: DataPaths::default(),
        }
    }
}
