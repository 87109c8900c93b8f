//! wellbeing-cli — command-line client for a running wellbeing-server
//!
//! # Subcommands
//! - `submit --stress N --workload N --satisfaction N [--notes TEXT]` — record a survey
//! - `metrics [--json]`                                                — averages and wellbeing score
//! - `responses [--recent N] [--json]`                                 — list responses, newest first
//! - `status`                                                          — show server health

use clap::{Parser, Subcommand};
use serde::Deserialize;

const DEFAULT_SERVER: &str = "http://127.0.0.1:5000";

// ============================================================================
// CLI Definition
// ============================================================================

#[derive(Debug, Parser)]
#[command(
    name = "wellbeing-cli",
    version,
    about = "Submit wellbeing surveys and read the team wellbeing score"
)]
struct Cli {
    /// Wellbeing server URL (overrides WELLBEING_HTTP_URL env var)
    #[arg(long, env = "WELLBEING_HTTP_URL", default_value = DEFAULT_SERVER)]
    server: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Submit one survey response
    Submit {
        /// Stress rating, 1-10
        #[arg(long)]
        stress: i64,

        /// Workload rating, 1-10
        #[arg(long)]
        workload: i64,

        /// Satisfaction rating, 1-10
        #[arg(long)]
        satisfaction: i64,

        /// Optional free-text notes
        #[arg(long, default_value = "")]
        notes: String,
    },

    /// Show averages and the wellbeing score
    Metrics {
        /// Print the raw JSON snapshot
        #[arg(long)]
        json: bool,
    },

    /// List survey responses, newest first
    Responses {
        /// Only the N most recent responses
        #[arg(long)]
        recent: Option<u32>,

        /// Print the raw JSON array
        #[arg(long)]
        json: bool,
    },

    /// Show server status
    Status,
}

// ============================================================================
// API Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct Metrics {
    pub avg_stress: f64,
    pub avg_workload: f64,
    pub avg_satisfaction: f64,
    pub wellbeing_score: f64,
    #[serde(default)]
    pub response_count: i64,
}

#[derive(Debug, Deserialize)]
pub struct Response {
    pub id: i64,
    pub created_at: String,
    pub stress: i64,
    pub workload: i64,
    pub satisfaction: i64,
    #[serde(default)]
    pub notes: String,
}

// ============================================================================
// Rendering
// ============================================================================

/// Ten-cell bar for a 0-100 score, e.g. `[#######   ]`.
pub fn score_bar(score: f64) -> String {
    let filled = (score.clamp(0.0, 100.0) / 10.0).round() as usize;
    format!("[{}{}]", "#".repeat(filled), " ".repeat(10 - filled))
}

pub fn format_metrics(m: &Metrics) -> String {
    format!(
        "Wellbeing score:  {:.2} {}\nAvg stress:       {:.2}\nAvg workload:     {:.2}\nAvg satisfaction: {:.2}\nResponses:        {}",
        m.wellbeing_score,
        score_bar(m.wellbeing_score),
        m.avg_stress,
        m.avg_workload,
        m.avg_satisfaction,
        m.response_count
    )
}

/// One line per response; notes truncated to 40 characters.
pub fn format_response_line(r: &Response) -> String {
    let date: String = r.created_at.chars().take(10).collect();
    let mut line = format!(
        "#{:<5} {}  stress {:>2}  workload {:>2}  satisfaction {:>2}",
        r.id, date, r.stress, r.workload, r.satisfaction
    );
    let notes = r.notes.trim();
    if !notes.is_empty() {
        let preview: String = notes.chars().take(40).collect();
        line.push_str("  ");
        line.push_str(&preview);
        if notes.chars().count() > 40 {
            line.push('…');
        }
    }
    line
}

// ============================================================================
// HTTP Client Calls
// ============================================================================

fn client() -> anyhow::Result<reqwest::blocking::Client> {
    Ok(reqwest::blocking::Client::builder()
        .timeout(std::time::Duration::from_secs(10))
        .build()?)
}

fn get_json(url: &str) -> anyhow::Result<reqwest::blocking::Response> {
    let resp = match client()?.get(url).send() {
        Ok(r) => r,
        Err(e) => {
            eprintln!("wellbeing-cli: connection failed to {}: {}", url, e);
            std::process::exit(1);
        }
    };

    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().unwrap_or_default();
        eprintln!("wellbeing-cli: server returned {}: {}", status, body);
        std::process::exit(1);
    }

    Ok(resp)
}

fn do_submit(
    server: &str,
    stress: i64,
    workload: i64,
    satisfaction: i64,
    notes: &str,
) -> anyhow::Result<()> {
    let url = format!("{}/api/responses", server);
    let body = serde_json::json!({
        "stress": stress,
        "workload": workload,
        "satisfaction": satisfaction,
        "notes": notes,
    });

    let resp = match client()?.post(&url).json(&body).send() {
        Ok(r) => r,
        Err(e) => {
            eprintln!("wellbeing-cli: connection failed to {}: {}", url, e);
            std::process::exit(1);
        }
    };

    let status = resp.status();
    let body: serde_json::Value = resp.json().unwrap_or_default();
    if !status.is_success() {
        eprintln!(
            "wellbeing-cli: submission rejected ({}): {}",
            status,
            body["error"].as_str().unwrap_or("unknown error")
        );
        std::process::exit(1);
    }

    println!("Thanks! Your response was recorded (id {}).", body["id"]);
    Ok(())
}

fn do_metrics(server: &str, json_output: bool) -> anyhow::Result<()> {
    let resp = get_json(&format!("{}/api/metrics", server))?;

    if json_output {
        let body: serde_json::Value = resp.json()?;
        println!("{}", serde_json::to_string_pretty(&body)?);
        return Ok(());
    }

    let metrics: Metrics = resp.json()?;
    println!("{}", format_metrics(&metrics));
    Ok(())
}

fn do_responses(server: &str, recent: Option<u32>, json_output: bool) -> anyhow::Result<()> {
    let url = match recent {
        Some(n) => format!("{}/api/responses/recent?limit={}", server, n),
        None => format!("{}/api/responses", server),
    };
    let resp = get_json(&url)?;

    if json_output {
        let body: serde_json::Value = resp.json()?;
        println!("{}", serde_json::to_string_pretty(&body)?);
        return Ok(());
    }

    let responses: Vec<Response> = resp.json()?;
    if responses.is_empty() {
        eprintln!("No responses recorded yet.");
        return Ok(());
    }
    for r in &responses {
        println!("{}", format_response_line(r));
    }
    Ok(())
}

/// Show the server status by calling GET /health.
fn do_status(server: &str) -> anyhow::Result<()> {
    let url = format!("{}/health", server);

    match client()?.get(&url).send() {
        Ok(r) if r.status().is_success() => {
            let body: serde_json::Value = r.json().unwrap_or_default();
            println!("Wellbeing server: {}", body["status"].as_str().unwrap_or("unknown"));
            println!("Version:          {}", body["version"].as_str().unwrap_or("?"));
            println!("SQLite:           {}", body["sqlite"].as_str().unwrap_or("?"));
            println!("Responses:        {}", body["responses"]);
        }
        Ok(r) => {
            eprintln!("wellbeing-cli: server unhealthy (HTTP {})", r.status());
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("wellbeing-cli: cannot reach {} — {}", url, e);
            std::process::exit(1);
        }
    }

    Ok(())
}

// ============================================================================
// Main
// ============================================================================

fn main() {
    let cli = Cli::parse();
    let server = cli.server.trim_end_matches('/').to_string();

    let result = match cli.command {
        Commands::Submit {
            stress,
            workload,
            satisfaction,
            notes,
        } => do_submit(&server, stress, workload, satisfaction, &notes),
        Commands::Metrics { json } => do_metrics(&server, json),
        Commands::Responses { recent, json } => do_responses(&server, recent, json),
        Commands::Status => do_status(&server),
    };

    if let Err(e) = result {
        eprintln!("wellbeing-cli: {}", e);
        std::process::exit(1);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn mock_response(id: i64, notes: &str) -> Response {
        Response {
            id,
            created_at: "2026-03-04T09:30:00.000000Z".to_string(),
            stress: 4,
            workload: 5,
            satisfaction: 7,
            notes: notes.to_string(),
        }
    }

    #[test]
    fn test_score_bar_bounds() {
        assert_eq!(score_bar(0.0), "[          ]");
        assert_eq!(score_bar(100.0), "[##########]");
        assert_eq!(score_bar(70.0), "[#######   ]");
        assert_eq!(score_bar(250.0), "[##########]");
        assert_eq!(score_bar(-5.0), "[          ]");
    }

    #[test]
    fn test_format_metrics() {
        let m = Metrics {
            avg_stress: 4.0,
            avg_workload: 3.0,
            avg_satisfaction: 8.0,
            wellbeing_score: 70.0,
            response_count: 3,
        };
        let out = format_metrics(&m);
        assert!(out.starts_with("Wellbeing score:  70.00 [#######   ]"));
        assert!(out.contains("Avg stress:       4.00"));
        assert!(out.ends_with("Responses:        3"));
    }

    #[test]
    fn test_metrics_deserialize_without_count() {
        let m: Metrics = serde_json::from_value(serde_json::json!({
            "avg_stress": 0.0,
            "avg_workload": 0.0,
            "avg_satisfaction": 0.0,
            "wellbeing_score": 60.0
        }))
        .unwrap();
        assert_eq!(m.response_count, 0);
        assert_eq!(m.wellbeing_score, 60.0);
    }

    #[test]
    fn test_response_line_without_notes() {
        let line = format_response_line(&mock_response(12, ""));
        assert_eq!(line, "#12    2026-03-04  stress  4  workload  5  satisfaction  7");
    }

    #[test]
    fn test_response_line_truncates_long_notes() {
        let line = format_response_line(&mock_response(1, &"n".repeat(60)));
        assert!(line.ends_with(&format!("{}…", "n".repeat(40))));

        let line = format_response_line(&mock_response(1, "short note"));
        assert!(line.ends_with("  short note"));
    }
}
