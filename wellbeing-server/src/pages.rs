//! Server-rendered HTML for the survey form and the dashboard.
//!
//! The dashboard embeds its chart series as JSON and draws them with Chart.js.

use serde::{Deserialize, Serialize};
use wellbeing_core::{MetricsSnapshot, RecordView, SurveyResponse};

pub const SUCCESS_MESSAGE: &str = "Thanks! Your response was recorded.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlashLevel {
    Success,
    Danger,
}

impl FlashLevel {
    fn css_class(&self) -> &'static str {
        match self {
            Self::Success => "flash success",
            Self::Danger => "flash danger",
        }
    }
}

/// One-shot message shown on the form page after a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flash {
    pub level: FlashLevel,
    pub message: String,
}

impl Flash {
    pub fn success() -> Self {
        Self {
            level: FlashLevel::Success,
            message: SUCCESS_MESSAGE.to_string(),
        }
    }

    pub fn error(reason: impl std::fmt::Display) -> Self {
        Self {
            level: FlashLevel::Danger,
            message: format!("Error: {}", reason),
        }
    }

    /// Query string carrying this flash across the post-submit redirect.
    pub fn to_query(&self) -> String {
        let status = match self.level {
            FlashLevel::Success => "success",
            FlashLevel::Danger => "danger",
        };
        format!(
            "status={}&message={}",
            status,
            urlencoding::encode(&self.message)
        )
    }
}

/// Chart series for the recent window, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChartSeries {
    pub dates: Vec<String>,
    pub stress: Vec<i64>,
    pub workload: Vec<i64>,
    pub satisfaction: Vec<i64>,
}

impl ChartSeries {
    /// `rows` must already be in chronological order.
    pub fn from_chronological(rows: &[SurveyResponse]) -> Self {
        let mut series = Self::default();
        for r in rows {
            series.dates.push(r.created_at.format("%b %d").to_string());
            series.stress.push(r.stress);
            series.workload.push(r.workload);
            series.satisfaction.push(r.satisfaction);
        }
        series
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub metrics: MetricsSnapshot,
    pub chart: ChartSeries,
    pub recent: Vec<RecordView>,
}

impl DashboardView {
    pub fn new(metrics: MetricsSnapshot, recent_chronological: &[SurveyResponse]) -> Self {
        Self {
            metrics,
            chart: ChartSeries::from_chronological(recent_chronological),
            recent: recent_chronological.iter().map(RecordView::from).collect(),
        }
    }
}

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

const STYLE: &str = r#"
<style>
  body { font-family: system-ui, sans-serif; max-width: 860px; margin: 2rem auto; padding: 0 1rem; }
  nav a { margin-right: 1rem; }
  label { display: block; margin-top: 1rem; }
  .flash { padding: .75rem 1rem; border-radius: 4px; margin: 1rem 0; }
  .flash.success { background: #e6f4ea; color: #1e4620; }
  .flash.danger { background: #fdecea; color: #611a15; }
  .cards { display: flex; gap: 1rem; flex-wrap: wrap; }
  .card { border: 1px solid #ddd; border-radius: 6px; padding: 1rem; min-width: 150px; }
  .card .value { font-size: 1.8rem; font-weight: 600; }
  table { border-collapse: collapse; width: 100%; margin-top: 1.5rem; }
  th, td { border-bottom: 1px solid #eee; padding: .4rem; text-align: left; }
</style>
"#;

fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!doctype html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title}</title>
{style}
</head>
<body>
<nav><a href="/">Survey</a><a href="/dashboard">Dashboard</a></nav>
{body}
</body>
</html>
"#,
        title = escape_html(title),
        style = STYLE,
        body = body,
    )
}

fn rating_input(name: &str, label: &str) -> String {
    format!(
        r#"<label for="{name}">{label} (1-10)</label>
<input type="number" id="{name}" name="{name}" min="1" max="10" required>"#,
        name = name,
        label = label,
    )
}

pub fn render_index(flash: Option<&Flash>) -> String {
    let flash_html = flash
        .map(|f| {
            format!(
                r#"<div class="{}">{}</div>"#,
                f.level.css_class(),
                escape_html(&f.message)
            )
        })
        .unwrap_or_default();

    let body = format!(
        r#"<h1>Team Wellbeing Pulse</h1>
{flash}
<form method="post" action="/submit">
{stress}
{workload}
{satisfaction}
<label for="notes">Notes (optional)</label>
<textarea id="notes" name="notes" rows="4" cols="60"></textarea>
<p><button type="submit">Submit</button></p>
</form>"#,
        flash = flash_html,
        stress = rating_input("stress", "Stress"),
        workload = rating_input("workload", "Workload"),
        satisfaction = rating_input("satisfaction", "Satisfaction"),
    );

    layout("Wellbeing Survey", &body)
}

pub fn render_dashboard(view: &DashboardView) -> String {
    let m = &view.metrics;

    let rows: String = view
        .recent
        .iter()
        .map(|r| {
            format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
                r.id,
                escape_html(&r.created_at),
                r.stress,
                r.workload,
                r.satisfaction,
                escape_html(&r.notes)
            )
        })
        .collect();

    // Inside <script>, only "</" can terminate the element early.
    let chart_json = serde_json::to_string(&view.chart)
        .unwrap_or_else(|_| "{}".to_string())
        .replace("</", "<\\/");

    let body = format!(
        r#"<h1>Wellbeing Dashboard</h1>
<div class="cards">
  <div class="card"><div>Wellbeing Score</div><div class="value">{score:.2}</div></div>
  <div class="card"><div>Avg Stress</div><div class="value">{stress:.2}</div></div>
  <div class="card"><div>Avg Workload</div><div class="value">{workload:.2}</div></div>
  <div class="card"><div>Avg Satisfaction</div><div class="value">{satisfaction:.2}</div></div>
</div>
<p>{count} responses in total.</p>
<canvas id="trend" height="120"></canvas>
<table>
<thead><tr><th>ID</th><th>Submitted</th><th>Stress</th><th>Workload</th><th>Satisfaction</th><th>Notes</th></tr></thead>
<tbody>
{rows}</tbody>
</table>
<script src="https://cdn.jsdelivr.net/npm/chart.js"></script>
<script>
const series = {chart};
new Chart(document.getElementById("trend"), {{
  type: "line",
  data: {{
    labels: series.dates,
    datasets: [
      {{ label: "Stress", data: series.stress }},
      {{ label: "Workload", data: series.workload }},
      {{ label: "Satisfaction", data: series.satisfaction }}
    ]
  }},
  options: {{ scales: {{ y: {{ min: 1, max: 10 }} }} }}
}});
</script>"#,
        score = m.wellbeing_score,
        stress = m.avg_stress,
        workload = m.avg_workload,
        satisfaction = m.avg_satisfaction,
        count = m.response_count,
        rows = rows,
        chart = chart_json,
    );

    layout("Wellbeing Dashboard", &body)
}
