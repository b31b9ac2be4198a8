use super::surface::{cell_text, Surface, Table};
use crate::domain::{AnalysisResult, AnomalyPoint, Field, TimelineEvent};
use serde_json::Value;
use std::fmt;
use std::io;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    AnomalyCurve,
    EventTimeline,
    DraftReport,
    ConsistencyCheck,
    FinalReport,
}

impl Section {
    pub fn all() -> &'static [Section] {
        const ALL: &[Section] = &[
            Section::AnomalyCurve,
            Section::EventTimeline,
            Section::DraftReport,
            Section::ConsistencyCheck,
            Section::FinalReport,
        ];
        ALL
    }

    pub fn title(&self) -> &'static str {
        match self {
            Section::AnomalyCurve => "1) Anomaly curve",
            Section::EventTimeline => "2) Event timeline",
            Section::DraftReport => "3) Draft Report",
            Section::ConsistencyCheck => "4) Consistency Check",
            Section::FinalReport => "5) Final Report",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldOutcome {
    Rendered,
    Fallback,
    Placeholder,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RenderReport {
    pub sections: Vec<(Section, FieldOutcome)>,
}

impl RenderReport {
    pub fn outcome(&self, section: Section) -> Option<&FieldOutcome> {
        self.sections
            .iter()
            .find(|(s, _)| *s == section)
            .map(|(_, outcome)| outcome)
    }

    pub fn failures(&self) -> usize {
        self.sections
            .iter()
            .filter(|(_, outcome)| matches!(outcome, FieldOutcome::Failed(_)))
            .count()
    }
}

pub const NO_CURVE: &str = "No anomaly curve provided.";
pub const NO_TIMELINE: &str = "No event timeline provided.";

/// Draws the five sections in order. Each section is independent: a wrong
/// shape or a surface error in one never stops the others.
pub fn render(result: &AnalysisResult, surface: &mut dyn Surface) -> RenderReport {
    let mut report = RenderReport::default();
    for &section in Section::all() {
        let outcome = match draw_section(result, section, surface) {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!(%section, error = %err, "section could not be drawn");
                FieldOutcome::Failed(err.to_string())
            }
        };
        if outcome == FieldOutcome::Fallback {
            warn!(%section, "unexpected shape, showing raw value");
        }
        report.sections.push((section, outcome));
    }
    report
}

fn draw_section(
    result: &AnalysisResult,
    section: Section,
    surface: &mut dyn Surface,
) -> io::Result<FieldOutcome> {
    surface.subheader(section.title())?;
    match section {
        Section::AnomalyCurve => render_curve(result, surface),
        Section::EventTimeline => render_timeline(result.event_timeline(), surface),
        Section::DraftReport => render_text(result.draft_report(), surface),
        Section::ConsistencyCheck => render_text(result.consistency_check(), surface),
        Section::FinalReport => render_text(result.final_report(), surface),
    }
}

fn render_curve(result: &AnalysisResult, surface: &mut dyn Surface) -> io::Result<FieldOutcome> {
    match result.anomaly_curve() {
        Field::Present(points) if !points.is_empty() => {
            surface.line_chart(points)?;
            if let Some(peak) = result.peak_anomaly() {
                surface.text(&format!("Peak anomaly {:.2} at {}", peak.score, peak.t))?;
            }
            surface.table(&curve_table(points))?;
            Ok(FieldOutcome::Rendered)
        }
        Field::Malformed(Value::Array(items)) if !items.is_empty() => {
            render_records_fallback(items, surface)
        }
        _ => {
            surface.info(NO_CURVE)?;
            Ok(FieldOutcome::Placeholder)
        }
    }
}

fn render_timeline(
    field: &Field<Vec<TimelineEvent>>,
    surface: &mut dyn Surface,
) -> io::Result<FieldOutcome> {
    match field {
        Field::Present(events) if !events.is_empty() => {
            surface.table(&timeline_table(events))?;
            Ok(FieldOutcome::Rendered)
        }
        Field::Malformed(Value::Array(items)) if !items.is_empty() => {
            render_records_fallback(items, surface)
        }
        _ => {
            surface.info(NO_TIMELINE)?;
            Ok(FieldOutcome::Placeholder)
        }
    }
}

fn render_records_fallback(items: &[Value], surface: &mut dyn Surface) -> io::Result<FieldOutcome> {
    match Table::from_records(items) {
        Some(table) => surface.table(&table)?,
        None => surface.raw(&Value::Array(items.to_vec()))?,
    }
    Ok(FieldOutcome::Fallback)
}

fn render_text(field: &Field<String>, surface: &mut dyn Surface) -> io::Result<FieldOutcome> {
    match field {
        Field::Present(body) => {
            surface.text(body)?;
            Ok(FieldOutcome::Rendered)
        }
        Field::Missing => {
            surface.text("")?;
            Ok(FieldOutcome::Placeholder)
        }
        Field::Malformed(value) => {
            surface.text(&cell_text(value))?;
            Ok(FieldOutcome::Fallback)
        }
    }
}

fn curve_table(points: &[AnomalyPoint]) -> Table {
    let mut table = Table::new(vec!["t".to_string(), "score".to_string()]);
    for point in points {
        table.push_row(vec![point.t.clone(), format!("{:.2}", point.score)]);
    }
    table
}

fn timeline_table(events: &[TimelineEvent]) -> Table {
    let mut table = Table::new(vec![
        "t".to_string(),
        "event".to_string(),
        "confidence".to_string(),
    ]);
    for event in events {
        table.push_row(vec![
            event.t.clone(),
            event.event.clone(),
            format!("{:.2}", event.confidence),
        ]);
    }
    table
}
