//! Integration tests: load the fixture dataset and drive the controller end to end.

use maildash::charts::{ChartJsBackend, COUNT_CHART_ID, OPENS_CHART_ID};
use maildash::config::{DashboardConfig, DataPaths};
use maildash::controller::AppController;
use maildash::detail::TimelineView;
use maildash::loader::load_dataset;
use maildash::render::{HtmlSurface, JsonSurface};
use std::path::Path;
use std::time::{Duration, Instant};

const DATA: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/dashboard.js");

fn controller() -> AppController {
    let dataset = load_dataset(Path::new(DATA), &DataPaths::default()).unwrap();
    AppController::new(dataset, DashboardConfig::default())
}

#[test]
fn fixture_loads_all_sections() {
    let controller = controller();
    let dataset = controller.dataset();
    assert_eq!(dataset.groups, vec!["Westminster Council", "Police", "Media"]);
    assert_eq!(dataset.total_for("Westminster Council"), 135);
    assert_eq!(dataset.certificates.len(), 1);

    let stats = controller.stats();
    assert_eq!(stats.total_emails, 4);
    assert_eq!(stats.total_opens, 167);
    assert_eq!(stats.total_clicks, 5);
    assert_eq!(stats.max_opens, 120);
    assert_eq!(stats.group_count, 3);
}

#[test]
fn start_draws_both_charts_in_group_order() {
    let mut controller = controller();
    let mut surface = JsonSurface::new();
    let mut backend = ChartJsBackend::new();

    let drawn = controller.start(&mut surface, Some(&mut backend));
    assert_eq!(drawn, 2);

    let charts = backend.charts();
    assert_eq!(charts[0].0, OPENS_CHART_ID);
    assert_eq!(charts[1].0, COUNT_CHART_ID);
    assert_eq!(charts[0].1["type"], "bar");
    assert_eq!(charts[0].1["data"]["labels"][0], "Westminster Council");
    assert_eq!(charts[0].1["data"]["datasets"][0]["data"][0], 135.0);
    assert_eq!(charts[1].1["type"], "doughnut");
    assert_eq!(charts[1].1["data"]["datasets"][0]["data"][0], 2.0);
}

#[test]
fn typing_burst_applies_only_last_query() {
    let mut controller = controller();
    let mut surface = JsonSurface::new();
    controller.start(&mut surface, None);

    let t0 = Instant::now();
    let delay = controller.config().search_delay;
    controller.input_search("c", t0);
    controller.input_search("cr", t0 + Duration::from_millis(40));
    controller.input_search("crime", t0 + Duration::from_millis(80));

    assert!(!controller.tick(&mut surface, t0 + Duration::from_millis(100)));
    assert!(controller.tick(&mut surface, t0 + Duration::from_millis(80) + delay));
    assert_eq!(controller.searches_applied(), 1);

    let snapshot = surface.snapshot();
    assert_eq!(snapshot.groups.len(), 1);
    assert_eq!(snapshot.groups[0].header.name, "Police");
    assert_eq!(snapshot.expanded, vec![0]);
}

#[test]
fn clearing_search_restores_listing_collapsed() {
    let mut controller = controller();
    let mut surface = JsonSurface::new();
    controller.start(&mut surface, None);

    controller.input_search("statement", Instant::now());
    controller.flush_search(&mut surface);
    assert_eq!(surface.snapshot().groups.len(), 1);

    controller.input_search("   ", Instant::now());
    controller.flush_search(&mut surface);
    assert_eq!(surface.snapshot().groups.len(), 3);
    assert!(surface.snapshot().expanded.is_empty());
    assert!(!controller.state().is_filtered());
}

#[test]
fn selecting_matched_email_shows_timeline_and_recipients() {
    let mut controller = controller();
    let mut surface = JsonSurface::new();
    controller.start(&mut surface, None);

    assert!(controller.select_email(&mut surface, "Westminster Council", 1));
    let detail = surface.snapshot().detail.clone().unwrap();
    assert_eq!(detail.institution, "Westminster Council");
    assert_eq!(detail.engagement_pct, 100);
    match &detail.timeline {
        TimelineView::Events { events } => {
            assert_eq!(events.len(), 2);
            assert_eq!(events[0].label, "Opened");
            assert_eq!(events[1].label, "Link clicked");
            assert_eq!(events[1].when, "4 Mar 2024 at 18:05");
        }
        other => panic!("expected events, got {:?}", other),
    }
    let recipients = detail.recipients.unwrap();
    assert_eq!(recipients.len(), 2);
    assert!(recipients[0].opened);
    assert!(!recipients[1].opened);
}

#[test]
fn selecting_unmatched_email_shows_summary() {
    let mut controller = controller();
    let mut surface = JsonSurface::new();
    controller.start(&mut surface, None);

    assert!(controller.select_email(&mut surface, "Media", 4));
    let detail = surface.snapshot().detail.clone().unwrap();
    assert_eq!(detail.email, "News Desk");
    assert_eq!(detail.recipient, "News Desk");
    assert_eq!(detail.source, "-");
    assert!(detail.certificate_link.is_none());
    assert!(detail.recipients.is_none());
    assert!(matches!(
        detail.timeline,
        TimelineView::Summary { opens: 2, clicks: 0, .. }
    ));
}

#[test]
fn page_embeds_index_details_and_charts() {
    let mut controller = controller();
    let mut page = HtmlSurface::new(controller.config())
        .with_index(controller.full_listing())
        .with_details(controller.all_details())
        .with_generated_at("2024-03-05 10:00");
    let mut backend = ChartJsBackend::new();
    controller.start(&mut page, Some(&mut backend));
    let html = page.with_charts(backend.into_charts()).render();

    assert!(html.contains("Generated 2024-03-05 10:00"));
    assert!(html.contains(r#"<template data-detail="Police|3">"#));
    assert!(html.contains(r#"<template data-detail="Media|4">"#));
    assert!(html.contains(r#""searchDelayMs":150"#));
    assert!(html.contains(r#""id":"chartCount""#));
    assert!(html.contains(r#"<div class="group__header group__header--open" data-idx="0">"#));
    assert!(html.contains(r#"<div class="group__header" data-idx="1">"#));
}
