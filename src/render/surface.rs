use crate::domain::AnomalyPoint;
use serde_json::Value;
use std::collections::BTreeSet;
use std::io;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    /// Columns follow first appearance. `None` when any item is not an object.
    pub fn from_records(items: &[Value]) -> Option<Self> {
        let records = items
            .iter()
            .map(Value::as_object)
            .collect::<Option<Vec<_>>>()?;

        let mut columns: Vec<String> = Vec::new();
        let mut seen = BTreeSet::new();
        for record in &records {
            for key in record.keys() {
                if seen.insert(key.as_str()) {
                    columns.push(key.clone());
                }
            }
        }

        let mut table = Table::new(columns);
        for record in &records {
            let row = table
                .columns
                .iter()
                .map(|column| record.get(column).map(cell_text).unwrap_or_default())
                .collect();
            table.push_row(row);
        }
        Some(table)
    }
}

pub fn cell_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

pub trait Surface {
    fn subheader(&mut self, title: &str) -> io::Result<()>;
    fn line_chart(&mut self, points: &[AnomalyPoint]) -> io::Result<()>;
    fn table(&mut self, table: &Table) -> io::Result<()>;
    fn text(&mut self, body: &str) -> io::Result<()>;
    fn info(&mut self, message: &str) -> io::Result<()>;
    fn raw(&mut self, value: &Value) -> io::Result<()>;
    fn warning(&mut self, message: &str) -> io::Result<()>;
    fn error(&mut self, message: &str, detail: &str) -> io::Result<()>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum Panel {
    Subheader(String),
    LineChart(Vec<AnomalyPoint>),
    Table(Table),
    Text(String),
    Info(String),
    Raw(Value),
    Warning(String),
    Error { message: String, detail: String },
}

#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub panels: Vec<Panel>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Surface for RecordingSurface {
    fn subheader(&mut self, title: &str) -> io::Result<()> {
        self.panels.push(Panel::Subheader(title.to_string()));
        Ok(())
    }

    fn line_chart(&mut self, points: &[AnomalyPoint]) -> io::Result<()> {
        self.panels.push(Panel::LineChart(points.to_vec()));
        Ok(())
    }

    fn table(&mut self, table: &Table) -> io::Result<()> {
        self.panels.push(Panel::Table(table.clone()));
        Ok(())
    }

    fn text(&mut self, body: &str) -> io::Result<()> {
        self.panels.push(Panel::Text(body.to_string()));
        Ok(())
    }

    fn info(&mut self, message: &str) -> io::Result<()> {
        self.panels.push(Panel::Info(message.to_string()));
        Ok(())
    }

    fn raw(&mut self, value: &Value) -> io::Result<()> {
        self.panels.push(Panel::Raw(value.clone()));
        Ok(())
    }

    fn warning(&mut self, message: &str) -> io::Result<()> {
        self.panels.push(Panel::Warning(message.to_string()));
        Ok(())
    }

    fn error(&mut self, message: &str, detail: &str) -> io::Result<()> {
        self.panels.push(Panel::Error {
            message: message.to_string(),
            detail: detail.to_string(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn records_table_unions_columns() {
        let items = vec![
            json!({"t": "1", "event": "door"}),
            json!({"event": "glass", "confidence": 0.5, "t": null}),
        ];
        let table = Table::from_records(&items).unwrap();
        assert_eq!(table.columns, vec!["t", "event", "confidence"]);
        assert_eq!(table.rows[0], vec!["1", "door", ""]);
        assert_eq!(table.rows[1], vec!["", "glass", "0.5"]);
    }

    #[test]
    fn records_table_rejects_scalars() {
        assert!(Table::from_records(&[json!({"t": 1}), json!("x")]).is_none());
    }
}
