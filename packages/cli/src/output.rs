//! Plain-text and JSON rendering of command results.

use seismiq_backtest::{PrecisionReport, RecallReport};
use seismiq_catalog::WindowEntry;
use seismiq_engine::HeatTimeline;
use seismiq_engine_models::{POST_SEISMIC_CODE, ScoreResult};
use seismiq_faults::FaultRegistry;
use seismiq_scan::ScanOutput;
use serde::Serialize;

/// Prints `value` as pretty JSON.
///
/// # Errors
///
/// * If serialization fails
pub fn print_json<T: Serialize>(value: &T) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn score_label(score: &ScoreResult) -> String {
    score.value().map_or_else(
        || format!("POST-SEISMIC ({POST_SEISMIC_CODE})"),
        |v| v.to_string(),
    )
}

/// Summary line of a timeline. A post-seismic current snapshot replaces the
/// heat reading, since the stress it measures has just been released.
fn heat_line(timeline: &HeatTimeline) -> String {
    match timeline.current() {
        Some(current) if current.score.is_post_seismic() => {
            "Status: POST-SEISMIC (energy released)".to_string()
        }
        _ => format!("Heat: {} ({})", timeline.heat.value, timeline.heat.level),
    }
}

pub fn print_score(label: &str, when: &str, score: &ScoreResult) {
    println!("Location: {label}");
    println!("Date:     {when}");
    println!("Fault:    {}", score.fault_context);
    println!("Score:    {}", score_label(score));
    for reason in &score.reasons {
        println!("  - {reason}");
    }
}

pub fn print_timeline(label: &str, timeline: &HeatTimeline) {
    println!("Location: {label}");
    println!("{:>6}  {:<10}  {:>5}  STATUS", "DAYS", "DATE", "SCORE");
    println!("{}", "-".repeat(40));
    for snapshot in &timeline.snapshots {
        println!(
            "{:>6}  {:<10}  {:>5}  {}",
            snapshot.days_before,
            snapshot.at.format("%Y-%m-%d"),
            snapshot.score.display_value(),
            snapshot.status
        );
    }
    println!();
    println!("{}", heat_line(timeline));
    if let Some(current) = timeline.current() {
        println!("Fault: {}", current.score.fault_context);
        for reason in &current.score.reasons {
            println!("  - {reason}");
        }
    }
}

fn history_row(entry: &WindowEntry<'_>) -> String {
    format!(
        "{:<16} {:>6.2} {:>6.2} {:>4.1} {:>8.1}",
        entry.event.timestamp.format("%Y-%m-%d %H:%M"),
        entry.event.latitude,
        entry.event.longitude,
        entry.event.magnitude,
        entry.distance_km
    )
}

pub fn print_history(radius_km: f64, history: &[WindowEntry<'_>]) {
    println!();
    println!("History within {radius_km} km: {} events", history.len());
    println!(
        "{:<16} {:>6} {:>6} {:>4} {:>8}",
        "DATE", "LAT", "LON", "MAG", "DIST KM"
    );
    println!("{}", "-".repeat(44));
    for entry in history {
        println!("{}", history_row(entry));
    }
}

pub fn print_scan(output: &ScanOutput, limit: usize) {
    println!(
        "{:>6} {:>6} {:>5} {:<9} {:>5}  {:<28} REASONS",
        "LAT", "LON", "HEAT", "LEVEL", "SCORE", "FAULT"
    );
    println!("{}", "-".repeat(90));
    for row in output.report.iter().take(limit) {
        println!(
            "{:>6.2} {:>6.2} {:>5} {:<9} {:>5}  {:<28} {}",
            row.lat,
            row.lon,
            row.heat,
            row.level,
            row.current,
            row.fault_context,
            row.reasons.join("; ")
        );
    }
    if output.report.len() > limit {
        println!("... {} more", output.report.len() - limit);
    }
    println!();
    println!(
        "{} cells scanned, {} reported, {} post-seismic",
        output.raster.len(),
        output.report.len(),
        output.post_seismic.len()
    );
}

pub fn print_recall(report: &RecallReport) {
    println!("{:<10} {:>6} {:>6} {:>4}  RESULT", "DATE", "LAT", "LON", "MAG");
    println!("{}", "-".repeat(42));
    for event in &report.events {
        println!(
            "{:<10} {:>6.2} {:>6.2} {:>4.1}  {}",
            event.timestamp.format("%Y-%m-%d"),
            event.latitude,
            event.longitude,
            event.magnitude,
            if event.caught { "CAUGHT" } else { "missed" }
        );
    }
    println!();
    println!(
        "Recall: {}/{} ({:.1}%)",
        report.caught,
        report.events.len(),
        report.recall() * 100.0
    );
}

pub fn print_precision(report: &PrecisionReport) {
    for instant in &report.instants {
        println!(
            "{}: {} alarms, {} confirmed",
            instant.at.format("%Y-%m-%d %H:%M"),
            instant.alarms.len(),
            instant.confirmed()
        );
    }
    println!();
    println!(
        "Precision: {}/{} ({:.1}%)",
        report.confirmed(),
        report.alarms(),
        report.precision() * 100.0
    );
}

pub fn print_faults(faults: &FaultRegistry) {
    println!("{:<32} {:>15} {:>15}", "SEGMENT", "START", "END");
    println!("{}", "-".repeat(64));
    for segment in faults.segments() {
        let (a, b) = segment.line.points();
        println!(
            "{:<32} {:>6.2}, {:>6.2} {:>6.2}, {:>6.2}",
            segment.name,
            a.y(),
            a.x(),
            b.y(),
            b.x()
        );
    }
}

#[derive(Serialize)]
pub struct Summary<'a, T: Serialize> {
    pub rate: f64,
    #[serde(flatten)]
    pub report: &'a T,
}

/// A point result with its optional catalog history.
#[derive(Serialize)]
pub struct WithHistory<'a, T: Serialize> {
    #[serde(flatten)]
    pub result: &'a T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history: Option<&'a [WindowEntry<'a>]>,
}
