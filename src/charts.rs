//! Chart adapter: per-group aggregates fed to an external charting capability

use crate::config::InstitutionTable;
use crate::data_ops::{group_counts, group_totals};
use crate::Dataset;
use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;

/// Canvas id of the opens-per-group bar chart
pub const OPENS_CHART_ID: &str = "chartOpens";
/// Canvas id of the emails-per-group doughnut chart
pub const COUNT_CHART_ID: &str = "chartCount";

const GRID_COLOR: &str = "#21262d";
const TICK_COLOR: &str = "#8b949e";

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("chart library unavailable: {0}")]
    Unavailable(String),
    #[error("no chart container named `{0}`")]
    MissingContainer(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    /// Horizontal bars, no legend
    Bar,
    /// Ring with a 65% cutout and a legend on the right
    Doughnut,
}

/// Everything a backend needs to draw one chart
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSpec {
    pub container_id: String,
    pub kind: ChartKind,
    pub labels: Vec<String>,
    pub values: Vec<f64>,
    /// One color per label
    pub colors: Vec<String>,
}

impl ChartSpec {
    /// Chart.js configuration object for this chart
    pub fn to_chartjs(&self) -> Value {
        let axis = json!({
            "grid": { "color": GRID_COLOR },
            "ticks": { "color": TICK_COLOR, "font": { "size": 11 } }
        });
        match self.kind {
            ChartKind::Bar => json!({
                "type": "bar",
                "data": {
                    "labels": self.labels,
                    "datasets": [{
                        "data": self.values,
                        "backgroundColor": self.colors,
                        "borderRadius": 4,
                        "barThickness": 18
                    }]
                },
                "options": {
                    "indexAxis": "y",
                    "responsive": true,
                    "maintainAspectRatio": true,
                    "plugins": { "legend": { "display": false } },
                    "scales": {
                        "x": axis,
                        "y": {
                            "grid": { "display": false },
                            "ticks": { "color": TICK_COLOR, "font": { "size": 11 } }
                        }
                    }
                }
            }),
            ChartKind::Doughnut => json!({
                "type": "doughnut",
                "data": {
                    "labels": self.labels,
                    "datasets": [{
                        "data": self.values,
                        "backgroundColor": self.colors,
                        "borderWidth": 0
                    }]
                },
                "options": {
                    "responsive": true,
                    "maintainAspectRatio": true,
                    "cutout": "65%",
                    "plugins": {
                        "legend": {
                            "display": true,
                            "position": "right",
                            "labels": {
                                "color": TICK_COLOR,
                                "padding": 8,
                                "boxWidth": 12,
                                "font": { "size": 11 }
                            }
                        }
                    }
                }
            }),
        }
    }
}

/// The external charting capability
pub trait ChartBackend {
    fn draw(&mut self, spec: &ChartSpec) -> Result<(), ChartError>;
}

/// Horizontal bar chart, one bar per group
pub fn bar_chart(container_id: &str, labels: &[String], values: &[f64], table: &InstitutionTable) -> ChartSpec {
    chart(ChartKind::Bar, container_id, labels, values, table)
}

/// Doughnut chart, one segment per group
pub fn doughnut_chart(container_id: &str, labels: &[String], values: &[f64], table: &InstitutionTable) -> ChartSpec {
    chart(ChartKind::Doughnut, container_id, labels, values, table)
}

fn chart(kind: ChartKind, container_id: &str, labels: &[String], values: &[f64], table: &InstitutionTable) -> ChartSpec {
    ChartSpec {
        container_id: container_id.to_string(),
        kind,
        labels: labels.to_vec(),
        values: values.to_vec(),
        colors: labels
            .iter()
            .map(|l| table.style_for(l).color.clone())
            .collect(),
    }
}

/// Both dashboard charts, built from the full dataset
pub fn dashboard_charts(dataset: &Dataset, table: &InstitutionTable) -> [ChartSpec; 2] {
    let totals: Vec<f64> = group_totals(&dataset.groups, &dataset.totals)
        .into_iter()
        .map(|v| v as f64)
        .collect();
    let counts: Vec<f64> = group_counts(&dataset.groups, &dataset.emails)
        .into_iter()
        .map(|v| v as f64)
        .collect();
    [
        bar_chart(OPENS_CHART_ID, &dataset.groups, &totals, table),
        doughnut_chart(COUNT_CHART_ID, &dataset.groups, &counts, table),
    ]
}

/// Draw both charts. A missing backend or a failing draw is logged and
/// skipped; the rest of the dashboard does not depend on charts.
/// Returns how many charts were drawn.
pub fn render_charts(
    backend: Option<&mut dyn ChartBackend>,
    dataset: &Dataset,
    table: &InstitutionTable,
) -> usize {
    let Some(backend) = backend else {
        tracing::warn!("chart library not loaded; skipping charts");
        return 0;
    };

    let mut drawn = 0;
    for spec in dashboard_charts(dataset, table) {
        match backend.draw(&spec) {
            Ok(()) => drawn += 1,
            Err(e) => tracing::warn!(container = %spec.container_id, error = %e, "chart skipped"),
        }
    }
    drawn
}

/// Backend that records Chart.js configurations for embedding in a page
#[derive(Debug, Default)]
pub struct ChartJsBackend {
    charts: Vec<(String, Value)>,
}

impl ChartJsBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded `(container id, config)` pairs in draw order
    pub fn charts(&self) -> &[(String, Value)] {
        &self.charts
    }

    pub fn into_charts(self) -> Vec<(String, Value)> {
        self.charts
    }
}

impl ChartBackend for ChartJsBackend {
    fn draw(&mut self, spec: &ChartSpec) -> Result<(), ChartError> {
        if spec.container_id.is_empty() {
            return Err(ChartError::MissingContainer(String::new()));
        }
        let config = spec.to_chartjs();
        match self.charts.iter().position(|(id, _)| *id == spec.container_id) {
            // redrawing a container replaces its chart
            Some(i) => self.charts[i].1 = config,
            None => self.charts.push((spec.container_id.clone(), config)),
        }
        Ok(())
    }
}
