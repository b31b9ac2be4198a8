use super::surface::{Surface, Table};
use crate::domain::AnomalyPoint;
use serde_json::Value;
use std::io::{self, Write};

const SPARK: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];
const BAR_WIDTH: usize = 40;
const MAX_CELL: usize = 48;

pub struct TerminalSurface<W: Write> {
    out: W,
    width: usize,
}

impl<W: Write> TerminalSurface<W> {
    pub fn new(out: W) -> Self {
        Self { out, width: 80 }
    }

    pub fn with_width(mut self, width: usize) -> Self {
        self.width = width.max(20);
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn wrapped(&mut self, prefix: &str, body: &str) -> io::Result<()> {
        let options = textwrap::Options::new(self.width)
            .initial_indent(prefix)
            .subsequent_indent("  ");
        for line in textwrap::wrap(body, options) {
            writeln!(self.out, "{}", line)?;
        }
        Ok(())
    }
}

fn spark(score: f64) -> char {
    let clamped = score.clamp(0.0, 1.0);
    let index = (clamped * (SPARK.len() - 1) as f64).round() as usize;
    SPARK[index.min(SPARK.len() - 1)]
}

fn truncate(cell: &str) -> String {
    let single_line = cell.replace('\n', " ");
    if single_line.chars().count() <= MAX_CELL {
        single_line
    } else {
        let mut cut: String = single_line.chars().take(MAX_CELL - 1).collect();
        cut.push('…');
        cut
    }
}

impl<W: Write> Surface for TerminalSurface<W> {
    fn subheader(&mut self, title: &str) -> io::Result<()> {
        writeln!(self.out)?;
        writeln!(self.out, "{}", title)?;
        writeln!(self.out, "{}", "─".repeat(title.chars().count()))
    }

    fn line_chart(&mut self, points: &[AnomalyPoint]) -> io::Result<()> {
        let line: String = points.iter().map(|p| spark(p.score)).collect();
        writeln!(self.out, "  {}", line)?;
        let label_width = points
            .iter()
            .map(|p| p.t.chars().count())
            .max()
            .unwrap_or(0);
        for point in points {
            let filled = (point.score.clamp(0.0, 1.0) * BAR_WIDTH as f64).round() as usize;
            writeln!(
                self.out,
                "  {:>lw$} │{:<bw$} {:.2}",
                point.t,
                "█".repeat(filled),
                point.score,
                lw = label_width,
                bw = BAR_WIDTH
            )?;
        }
        Ok(())
    }

    fn table(&mut self, table: &Table) -> io::Result<()> {
        let header: Vec<String> = table.columns.iter().map(|c| truncate(c)).collect();
        let rows: Vec<Vec<String>> = table
            .rows
            .iter()
            .map(|row| row.iter().map(|c| truncate(c)).collect())
            .collect();

        let mut widths: Vec<usize> = header.iter().map(|c| c.chars().count()).collect();
        for row in &rows {
            for (i, cell) in row.iter().enumerate() {
                if let Some(width) = widths.get_mut(i) {
                    *width = (*width).max(cell.chars().count());
                }
            }
        }

        let format_row = |cells: &[String]| -> String {
            widths
                .iter()
                .enumerate()
                .map(|(i, width)| {
                    let cell = cells.get(i).map(String::as_str).unwrap_or("");
                    let pad = width.saturating_sub(cell.chars().count());
                    format!("{}{}", cell, " ".repeat(pad))
                })
                .collect::<Vec<_>>()
                .join(" │ ")
        };

        writeln!(self.out, "  {}", format_row(&header).trim_end())?;
        let rule: Vec<String> = widths.iter().map(|w| "─".repeat(*w)).collect();
        writeln!(self.out, "  {}", rule.join("─┼─"))?;
        for row in &rows {
            writeln!(self.out, "  {}", format_row(row).trim_end())?;
        }
        Ok(())
    }

    fn text(&mut self, body: &str) -> io::Result<()> {
        if body.is_empty() {
            return writeln!(self.out);
        }
        for paragraph in body.lines() {
            if paragraph.trim().is_empty() {
                writeln!(self.out)?;
            } else {
                self.wrapped("", paragraph)?;
            }
        }
        Ok(())
    }

    fn info(&mut self, message: &str) -> io::Result<()> {
        self.wrapped("ℹ ", message)
    }

    fn raw(&mut self, value: &Value) -> io::Result<()> {
        let pretty = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
        for line in pretty.lines() {
            writeln!(self.out, "  {}", line)?;
        }
        Ok(())
    }

    fn warning(&mut self, message: &str) -> io::Result<()> {
        self.wrapped("⚠ ", message)
    }

    fn error(&mut self, message: &str, detail: &str) -> io::Result<()> {
        self.wrapped("✖ ", message)?;
        for line in detail.lines() {
            writeln!(self.out, "    {}", line)?;
        }
        Ok(())
    }
}
