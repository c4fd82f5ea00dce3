//! HTML surface: generates a self-contained interactive dashboard page
//!
//! The initial state (stats, group listing, expansion, selection, detail) is
//! rendered server-side from the controller's calls. The full listing, the
//! per-email detail panels and the chart configurations are embedded so the
//! page keeps searching, toggling and selecting on its own in the browser.

use super::{GroupHeaderView, GroupView, EmailRowView, StatTiles, Surface};
use crate::config::DashboardConfig;
use crate::detail::{DetailView, TimelineView};
use crate::utils::format_count;
use crate::DashboardStats;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeSet;

/// Escape text for HTML element content and quoted attribute values
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Make serialized JSON safe to inline in a `<script>` block
fn escape_json_for_script(s: &str) -> String {
    // `</` only ever occurs inside JSON strings, where `<\/` means the same
    s.replace("</", "<\\/")
}

const CHEVRON: &str = r#"<svg class="group__chevron" viewBox="0 0 24 24" fill="none" stroke="currentColor" stroke-width="2"><path d="M9 18l6-6-6-6"/></svg>"#;

pub fn group_header_html(header: &GroupHeaderView, expanded: bool) -> String {
    format!(
        r#"<div class="group__header{open}" data-idx="{idx}">{CHEVRON}<div class="group__icon {class}" style="background:{color}">{icon}</div><div class="group__info"><div class="group__name">{name}</div><div class="group__stats">{stats}</div></div></div>"#,
        open = if expanded { " group__header--open" } else { "" },
        idx = header.index,
        class = html_escape(&header.class_name),
        color = html_escape(&header.color),
        icon = html_escape(&header.icon),
        name = html_escape(&header.name),
        stats = html_escape(&header.summary),
    )
}

pub fn email_row_html(row: &EmailRowView, active: bool) -> String {
    format!(
        r#"<div class="email-item{active}" data-group="{group}" data-id="{id}"><span class="email-item__num">{pos}</span><div class="email-item__info"><div class="email-item__addr">{addr}</div><div class="email-item__subject">{subject}</div><div class="email-item__meta">{date} · {source}</div></div><span class="email-item__opens">{opens}</span></div>"#,
        active = if active { " email-item--active" } else { "" },
        group = html_escape(&row.group),
        id = row.id,
        pos = row.position,
        addr = html_escape(&row.address),
        subject = html_escape(&row.subject),
        date = html_escape(&row.date),
        source = html_escape(&row.source),
        opens = row.opens,
    )
}

pub fn group_block_html(group: &GroupView, expanded: bool, active: Option<(&str, u64)>) -> String {
    let mut html = String::with_capacity(256 + group.rows.len() * 384);
    html.push_str(r#"<div class="group">"#);
    html.push_str(&group_header_html(&group.header, expanded));
    html.push_str(&format!(
        r#"<div class="group__content{}" data-content="{}">"#,
        if expanded { " group__content--open" } else { "" },
        group.header.index
    ));
    for row in &group.rows {
        let is_active = active.is_some_and(|(g, id)| g == row.group && id == row.id);
        html.push_str(&email_row_html(row, is_active));
    }
    if group.hidden_rows > 0 {
        html.push_str(&format!(
            r#"<div class="group__more">+{} more</div>"#,
            format_count(group.hidden_rows as u64)
        ));
    }
    html.push_str("</div></div>");
    html
}

pub fn stats_html(tiles: &StatTiles) -> String {
    let tile = |id: &str, value: &str, label: &str| {
        format!(
            r#"<div class="stat"><span class="val" id="{id}">{}</span><span class="lbl">{label}</span></div>"#,
            html_escape(value)
        )
    };
    [
        tile("totalEmails", &tiles.total_emails, "Emails"),
        tile("totalOpens", &tiles.total_opens, "Opens"),
        tile("totalClicks", &tiles.total_clicks, "Clicks"),
        tile("totalGroups", &tiles.group_count, "Institutions"),
    ]
    .concat()
}

/// Inner markup of the detail panel
pub fn detail_html(d: &DetailView) -> String {
    let mut html = String::with_capacity(2048);

    html.push_str(&format!(
        r#"<div class="detail__head"><h2 class="detail__subject">{}</h2><span class="badge {}">{}</span></div>"#,
        html_escape(&d.subject),
        d.badge.style_class,
        d.badge.label
    ));

    html.push_str(r#"<div class="metrics">"#);
    for (label, value) in [("Opens", d.opens), ("Clicks", d.clicks), ("PDF views", d.pdf_views)] {
        html.push_str(&format!(
            r#"<div class="metric"><span class="metric__val">{}</span><span class="metric__lbl">{label}</span></div>"#,
            format_count(value)
        ));
    }
    html.push_str("</div>");

    html.push_str(&format!(
        r#"<div class="engagement"><div class="engagement__row"><span>Engagement</span><span class="engagement__pct">{pct}%</span></div><div class="engagement__track"><div class="engagement__bar" style="width:{pct}%"></div></div></div>"#,
        pct = d.engagement_pct
    ));

    html.push_str(r#"<dl class="fields">"#);
    for (label, value) in [
        ("Email", &d.email),
        ("Recipient", &d.recipient),
        ("Sent", &d.sent),
        ("Last opened", &d.last_opened),
        ("Institution", &d.institution),
        ("Source", &d.source),
    ] {
        html.push_str(&format!("<dt>{label}</dt><dd>{}</dd>", html_escape(value)));
    }
    html.push_str("</dl>");

    if let Some(url) = &d.certificate_link {
        html.push_str(&format!(
            r#"<div class="cert-link"><a href="{}" target="_blank" rel="noopener">View delivery certificate</a></div>"#,
            html_escape(url)
        ));
    }

    html.push_str(r#"<h3 class="section-title">Timeline</h3><div class="timeline">"#);
    match &d.timeline {
        TimelineView::Events { events } => {
            for e in events {
                html.push_str(&format!(
                    r#"<div class="timeline__item"><div class="timeline__icon timeline__icon--{}">{}</div><div class="timeline__content"><div class="timeline__action">{}</div><div class="timeline__actor">{}</div><div class="timeline__time">{}</div></div></div>"#,
                    e.icon_class,
                    e.icon,
                    e.label,
                    html_escape(&e.actor),
                    html_escape(&e.when)
                ));
            }
        }
        TimelineView::Summary {
            opens,
            clicks,
            last_opened,
        } => {
            html.push_str(r#"<p class="timeline__empty">No detailed timeline available.</p>"#);
            html.push_str(&format!(
                r#"<p class="timeline__empty timeline__summary">Summary: {opens} opens, {clicks} clicks"#
            ));
            if let Some(last) = last_opened {
                html.push_str(&format!("<br>Last: {}", html_escape(last)));
            }
            html.push_str("</p>");
        }
    }
    html.push_str("</div>");

    if let Some(tags) = &d.recipients {
        html.push_str(r#"<h3 class="section-title">Recipients</h3><div class="recipients">"#);
        for tag in tags {
            html.push_str(&format!(
                r#"<span class="recipient-tag{}">{}</span>"#,
                if tag.opened { " recipient-tag--opened" } else { "" },
                html_escape(&tag.label)
            ));
        }
        html.push_str("</div>");
    }

    html
}

/// Payload read by the page script
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PagePayload<'a> {
    groups: &'a [GroupView],
    search_delay_ms: u64,
    max_display_items: usize,
    charts: Vec<JsChart<'a>>,
}

#[derive(Serialize)]
struct JsChart<'a> {
    id: &'a str,
    config: &'a Value,
}

/// Surface that accumulates dashboard state and renders it as one HTML page
#[derive(Debug, Clone)]
pub struct HtmlSurface {
    title: String,
    chart_script: Option<String>,
    search_delay_ms: u64,
    max_display_items: usize,
    generated_at: String,
    tiles: Option<StatTiles>,
    groups: Vec<GroupView>,
    expanded: BTreeSet<usize>,
    active: Option<(String, u64)>,
    detail: Option<DetailView>,
    index: Vec<GroupView>,
    details: Vec<DetailView>,
    charts: Vec<(String, Value)>,
}

impl HtmlSurface {
    pub fn new(config: &DashboardConfig) -> Self {
        Self {
            title: config.title.clone(),
            chart_script: config.chart_script.clone(),
            search_delay_ms: config.search_delay.as_millis() as u64,
            max_display_items: config.max_display_items,
            generated_at: chrono::Local::now().format("%Y-%m-%d %H:%M").to_string(),
            tiles: None,
            groups: Vec::new(),
            expanded: BTreeSet::new(),
            active: None,
            detail: None,
            index: Vec::new(),
            details: Vec::new(),
            charts: Vec::new(),
        }
    }

    /// Uncapped listing the page searches in the browser
    pub fn with_index(mut self, index: Vec<GroupView>) -> Self {
        self.index = index;
        self
    }

    /// Detail panels the page can show without a round trip
    pub fn with_details(mut self, details: Vec<DetailView>) -> Self {
        self.details = details;
        self
    }

    /// Chart.js configurations, keyed by canvas id
    pub fn with_charts(mut self, charts: Vec<(String, Value)>) -> Self {
        self.charts = charts;
        self
    }

    pub fn with_generated_at(mut self, stamp: impl Into<String>) -> Self {
        self.generated_at = stamp.into();
        self
    }

    pub fn is_expanded(&self, index: usize) -> bool {
        self.expanded.contains(&index)
    }

    /// Generate the full HTML page
    pub fn render(&self) -> String {
        let charts_enabled = self.chart_script.is_some();
        let charts: Vec<JsChart> = if charts_enabled {
            self.charts
                .iter()
                .map(|(id, config)| JsChart { id, config })
                .collect()
        } else {
            Vec::new()
        };
        let payload = PagePayload {
            groups: &self.index,
            search_delay_ms: self.search_delay_ms,
            max_display_items: self.max_display_items,
            charts,
        };
        let data_json = serde_json::to_string(&payload).unwrap_or_else(|_| "{}".to_string());

        let mut html = String::with_capacity(65_536);
        html.push_str(&self.template_head());
        html.push_str("<script>const DATA=");
        html.push_str(&escape_json_for_script(&data_json));
        html.push_str(";</script>\n");

        html.push_str(&format!(
            "<div class=\"shell\">\n  <header>\n    <h1>{}</h1>\n    <span class=\"meta\">Generated {}</span>\n  </header>\n",
            html_escape(&self.title),
            html_escape(&self.generated_at)
        ));
        html.push_str("  <div class=\"stats-bar\" id=\"statsBar\">");
        if let Some(tiles) = &self.tiles {
            html.push_str(&stats_html(tiles));
        }
        html.push_str("</div>\n");

        html.push_str("  <div class=\"main\">\n");
        html.push_str("    <div class=\"controls\"><input type=\"search\" class=\"search\" id=\"searchInput\" placeholder=\"Search subject, recipient or address…\" autocomplete=\"off\"></div>\n");
        html.push_str("    <div class=\"group-list\" id=\"groupList\">");
        html.push_str(&self.listing_html());
        html.push_str("</div>\n  </div>\n");

        html.push_str("  <div class=\"sidebar\">\n");
        if charts_enabled {
            html.push_str("    <div class=\"sb-section\"><h3>Opens by institution</h3><canvas id=\"chartOpens\"></canvas></div>\n");
            html.push_str("    <div class=\"sb-section\"><h3>Emails by institution</h3><canvas id=\"chartCount\"></canvas></div>\n");
        }
        match &self.detail {
            Some(detail) => {
                html.push_str("    <div class=\"detail detail--active\" id=\"detailPanel\">");
                html.push_str(&detail_html(detail));
            }
            None => {
                html.push_str("    <div class=\"detail\" id=\"detailPanel\">");
                html.push_str("<p class=\"empty\">Select an email to see its engagement.</p>");
            }
        }
        html.push_str("</div>\n  </div>\n</div>\n");

        for detail in &self.details {
            html.push_str(&format!(
                "<template data-detail=\"{}|{}\">{}</template>\n",
                html_escape(&detail.group),
                detail.id,
                detail_html(detail)
            ));
        }

        html.push_str(Self::template_script());
        html.push_str("</body>\n</html>\n");
        html
    }

    fn listing_html(&self) -> String {
        if self.groups.is_empty() {
            return "<div class=\"empty\">No emails to show.</div>".to_string();
        }
        let active = self.active.as_ref().map(|(g, id)| (g.as_str(), *id));
        self.groups
            .iter()
            .map(|g| group_block_html(g, self.expanded.contains(&g.header.index), active))
            .collect()
    }

    // ─── HTML template pieces ────────────────────────────────────────────

    fn template_head(&self) -> String {
        let chart_tag = match &self.chart_script {
            Some(src) => format!("<script src=\"{}\"></script>\n", html_escape(src)),
            None => String::new(),
        };
        format!(
            "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"UTF-8\">\n<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n<title>{}</title>\n{}<style>{}</style>\n</head>\n<body>\n",
            html_escape(&self.title),
            chart_tag,
            STYLE
        )
    }

    fn template_script() -> &'static str {
        r##"<script>
(function(){
"use strict";

/* ── helpers ── */
const $=s=>document.querySelector(s);
const $$=s=>[...document.querySelectorAll(s)];
const esc=s=>String(s).replace(/[&<>"']/g,c=>({'&':'&amp;','<':'&lt;','>':'&gt;','"':'&quot;',"'":'&#39;'}[c]));
const fmt=n=>(n||0).toLocaleString('en-US');
const CHEVRON='<svg class="group__chevron" viewBox="0 0 24 24" fill="none" stroke="currentColor" stroke-width="2"><path d="M9 18l6-6-6-6"/></svg>';

function debounce(fn,ms){let t;return(...a)=>{clearTimeout(t);t=setTimeout(()=>fn(...a),ms)}}

/* ── markup (mirrors the server-rendered listing) ── */
function rowHtml(r,i){
  return `<div class="email-item" data-group="${esc(r.group)}" data-id="${r.id}">`+
    `<span class="email-item__num">${i+1}</span>`+
    `<div class="email-item__info"><div class="email-item__addr">${esc(r.address)}</div>`+
    `<div class="email-item__subject">${esc(r.subject)}</div>`+
    `<div class="email-item__meta">${esc(r.date)} · ${esc(r.source)}</div></div>`+
    `<span class="email-item__opens">${r.opens}</span></div>`;
}

function groupHtml(g,idx){
  const h=g.header;
  const shown=g.rows.slice(0,DATA.maxDisplayItems);
  const hidden=g.rows.length-shown.length;
  let html=`<div class="group"><div class="group__header" data-idx="${idx}">${CHEVRON}`+
    `<div class="group__icon ${esc(h.className)}" style="background:${esc(h.color)}">${esc(h.icon)}</div>`+
    `<div class="group__info"><div class="group__name">${esc(h.name)}</div>`+
    `<div class="group__stats">${g.rows.length} emails · ${fmt(h.opens)} opens</div></div></div>`+
    `<div class="group__content" data-content="${idx}">`+shown.map(rowHtml).join('');
  if(hidden>0) html+=`<div class="group__more">+${fmt(hidden)} more</div>`;
  return html+'</div></div>';
}

/* ── search ── */
function filterGroups(q){
  q=q.toLowerCase();
  const out=[];
  for(const g of DATA.groups){
    const rows=g.rows.filter(r=>r.haystack.some(f=>f.includes(q)));
    if(rows.length) out.push({header:g.header,rows});
  }
  return out;
}

function renderGroups(filtered){
  const groups=filtered||DATA.groups;
  const list=$('#groupList');
  list.innerHTML=groups.length?groups.map(groupHtml).join(''):'<div class="empty">No emails to show.</div>';
  bindList();
  if(filtered) expandAll();
}

/* ── groups ── */
function toggleGroup(idx){
  const content=$(`[data-content="${idx}"]`);
  const header=$(`[data-idx="${idx}"]`);
  if(content&&header){
    content.classList.toggle('group__content--open');
    header.classList.toggle('group__header--open');
  }
}

function expandAll(){
  $$('.group__content').forEach(el=>el.classList.add('group__content--open'));
  $$('.group__header').forEach(el=>el.classList.add('group__header--open'));
}

/* ── detail ── */
function selectEmail(el){
  const key=el.dataset.group+'|'+el.dataset.id;
  const tpl=$$('template[data-detail]').find(t=>t.dataset.detail===key);
  if(!tpl) return;
  $$('.email-item').forEach(e=>e.classList.remove('email-item--active'));
  el.classList.add('email-item--active');
  const panel=$('#detailPanel');
  panel.innerHTML=tpl.innerHTML;
  panel.classList.add('detail--active');
}

function bindList(){
  $$('#groupList .email-item').forEach(el=>{el.onclick=()=>selectEmail(el)});
  $$('#groupList .group__header').forEach(el=>{el.onclick=()=>toggleGroup(+el.dataset.idx)});
}

/* ── charts ── */
function initCharts(){
  if(!DATA.charts.length) return;
  if(typeof Chart==='undefined'){console.warn('Chart.js not loaded');return}
  for(const c of DATA.charts){
    const el=document.getElementById(c.id);
    if(el) new Chart(el,c.config);
  }
}

/* ── init ── */
const search=$('#searchInput');
if(search){
  search.addEventListener('input',debounce(e=>{
    const q=e.target.value.trim();
    renderGroups(q?filterGroups(q):null);
  },DATA.searchDelayMs));
}
bindList();
initCharts();

})();
</script>
"##
    }
}

impl Surface for HtmlSurface {
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

const STYLE: &str = r#"
:root{--bg:#0d1117;--surface:#161b22;--surface2:#1c2128;--border:#21262d;--text:#e6edf3;--muted:#8b949e;--green:#3fb950;--yellow:#d29922;--red:#f85149;--blue:#58a6ff;--radius:8px}
*{box-sizing:border-box;margin:0;padding:0}
body{font-family:-apple-system,BlinkMacSystemFont,'Segoe UI',Roboto,sans-serif;background:var(--bg);color:var(--text);line-height:1.5;min-height:100vh}

/* ── Layout ── */
.shell{display:grid;grid-template-columns:1fr 380px;grid-template-rows:auto auto 1fr;min-height:100vh}
@media(max-width:960px){.shell{grid-template-columns:1fr}}
header{grid-column:1/-1;padding:1.25rem 1.5rem;border-bottom:1px solid var(--border);display:flex;align-items:center;gap:1.5rem;flex-wrap:wrap}
header h1{font-size:1.125rem;font-weight:700}
header .meta{font-size:.8125rem;color:var(--muted)}

/* ── Stats bar ── */
.stats-bar{grid-column:1/-1;display:flex;border-bottom:1px solid var(--border);background:var(--surface)}
.stat{flex:1;padding:.875rem 1.25rem;border-right:1px solid var(--border);text-align:center}
.stat:last-child{border-right:none}
.stat .val{font-size:1.5rem;font-weight:700;display:block}
.stat .lbl{font-size:.75rem;color:var(--muted);text-transform:uppercase;letter-spacing:.5px}

/* ── Main + Sidebar ── */
.main{grid-column:1;padding:1rem 1.5rem;overflow-y:auto}
.sidebar{grid-column:2;border-left:1px solid var(--border);padding:1rem 1.25rem;overflow-y:auto;background:var(--surface)}
@media(max-width:960px){.sidebar{grid-column:1;border-left:none;border-top:1px solid var(--border)}}
.controls{margin-bottom:1rem}
.search{background:var(--surface);border:1px solid var(--border);border-radius:var(--radius);padding:.5rem .75rem;color:var(--text);font-size:.8125rem;width:100%;outline:none}
.search:focus{border-color:var(--blue)}
.sb-section{margin-bottom:1.5rem}
.sb-section h3,.section-title{font-size:.75rem;text-transform:uppercase;letter-spacing:.5px;color:var(--muted);margin:.75rem 0 .5rem;padding-bottom:.375rem;border-bottom:1px solid var(--border)}

/* ── Groups ── */
.group{margin-bottom:.5rem}
.group__header{display:flex;align-items:center;gap:.625rem;padding:.5rem .75rem;background:var(--surface);border:1px solid var(--border);border-radius:var(--radius);cursor:pointer;user-select:none}
.group__header:hover{background:var(--surface2)}
.group__chevron{width:14px;height:14px;color:var(--muted);transition:transform .2s}
.group__header--open .group__chevron{transform:rotate(90deg)}
.group__icon{font-size:.625rem;font-weight:700;color:#fff;border-radius:6px;padding:.25rem .375rem;min-width:36px;text-align:center}
.group__name{font-size:.8125rem;font-weight:600}
.group__stats{font-size:.6875rem;color:var(--muted)}
.group__content{display:none;padding-left:1rem}
.group__content--open{display:block}
.group__more{font-size:.75rem;color:var(--muted);padding:.5rem .75rem}

/* ── Email rows ── */
.email-item{display:grid;grid-template-columns:32px minmax(0,1fr) 60px;gap:.5rem;align-items:center;padding:.5rem .75rem;border-bottom:1px solid var(--border);cursor:pointer;font-size:.8125rem}
.email-item:hover{background:var(--surface2)}
.email-item--active{background:var(--surface2);box-shadow:inset 3px 0 0 var(--blue)}
.email-item__num{color:var(--muted);font-variant-numeric:tabular-nums}
.email-item__addr,.email-item__subject{overflow:hidden;text-overflow:ellipsis;white-space:nowrap}
.email-item__subject,.email-item__meta{color:var(--muted);font-size:.75rem}
.email-item__opens{text-align:right;font-weight:600;font-variant-numeric:tabular-nums}

/* ── Detail panel ── */
.detail .empty{color:var(--muted);font-size:.8125rem}
.detail__head{display:flex;gap:.75rem;align-items:flex-start;justify-content:space-between;margin-bottom:.75rem}
.detail__subject{font-size:.9375rem}
.badge{font-size:.6875rem;padding:.125rem .5rem;border-radius:10px;font-weight:600;white-space:nowrap}
.badge--high{background:rgba(63,185,80,.15);color:var(--green)}
.badge--medium{background:rgba(210,153,34,.15);color:var(--yellow)}
.badge--low{background:rgba(139,148,158,.15);color:var(--muted)}
.metrics{display:grid;grid-template-columns:repeat(3,1fr);gap:.5rem;margin-bottom:.75rem}
.metric{background:var(--surface2);border-radius:6px;padding:.5rem;text-align:center}
.metric__val{display:block;font-size:1.125rem;font-weight:700}
.metric__lbl{font-size:.6875rem;color:var(--muted);text-transform:uppercase}
.engagement{margin-bottom:.75rem;font-size:.75rem}
.engagement__row{display:flex;justify-content:space-between;color:var(--muted)}
.engagement__track{height:6px;background:var(--border);border-radius:3px;overflow:hidden;margin-top:4px}
.engagement__bar{height:100%;background:var(--blue);border-radius:3px}
.fields{display:grid;grid-template-columns:auto 1fr;gap:.25rem .75rem;font-size:.8125rem}
.fields dt{color:var(--muted)}
.fields dd{overflow-wrap:anywhere}
.cert-link{margin-top:.75rem;font-size:.8125rem}
.cert-link a{color:var(--blue)}

/* ── Timeline ── */
.timeline__item{display:flex;gap:.625rem;padding:.375rem 0;border-bottom:1px solid var(--border)}
.timeline__icon{width:26px;height:26px;border-radius:50%;display:flex;align-items:center;justify-content:center;font-size:.75rem;flex-shrink:0}
.timeline__icon--open{background:rgba(88,166,255,.15)}
.timeline__icon--click{background:rgba(63,185,80,.15)}
.timeline__action{font-size:.8125rem;font-weight:600}
.timeline__actor,.timeline__time{font-size:.75rem;color:var(--muted)}
.timeline__empty{font-size:.8125rem;color:var(--muted)}
.timeline__summary{margin-top:8px;font-size:11px}
.recipients{display:flex;flex-wrap:wrap;gap:.375rem}
.recipient-tag{font-size:.75rem;padding:.125rem .5rem;border-radius:10px;background:var(--surface2);color:var(--muted)}
.recipient-tag--opened{background:rgba(63,185,80,.15);color:var(--green)}

/* ── Empty state ── */
.empty{text-align:center;padding:3rem 1rem;color:var(--muted);font-size:.875rem}

/* ── Institutions ── */
.inst-westminster{background:#238636}.inst-liverpool{background:#da3633}.inst-nhs{background:#1f6feb}.inst-courts{background:#8957e5}
.inst-police{background:#0969da}.inst-housing{background:#bf8700}.inst-media{background:#f85149}.inst-social{background:#a371f7}
.inst-self{background:#3fb950}.inst-gov{background:#bc8cff}.inst-other{background:#6e7681}
"#;
