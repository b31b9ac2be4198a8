use crate::domain::AnalysisResult;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::info;

pub const DEFAULT_EXPORT_FILE: &str = "analysis_result.json";

pub fn to_pretty_json(result: &AnalysisResult) -> Result<String> {
    serde_json::to_string_pretty(result).context("cannot serialize analysis result")
}

pub fn write_json(path: impl AsRef<Path>, result: &AnalysisResult) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("cannot create directory {:?}", parent))?;
    }
    let data = to_pretty_json(result)?;
    fs::write(path, data.as_bytes())
        .with_context(|| format!("cannot write analysis result to {:?}", path))?;
    info!(path = %path.display(), bytes = data.len(), "analysis result exported");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> AnalysisResult {
        serde_json::from_value(json!({
            "final_report": "Bruit de verre brisé ≈ 02:15",
            "anomaly_curve": [{"t": "02:15", "score": 0.88}]
        }))
        .unwrap()
    }

    #[test]
    fn pretty_json_keeps_order_indent_and_unicode() {
        let text = to_pretty_json(&sample()).unwrap();
        assert_eq!(
            text,
            "{\n  \"final_report\": \"Bruit de verre brisé ≈ 02:15\",\n  \"anomaly_curve\": [\n    {\n      \"t\": \"02:15\",\n      \"score\": 0.88\n    }\n  ]\n}"
        );
    }

    #[test]
    fn writes_into_new_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join(DEFAULT_EXPORT_FILE);
        write_json(&path, &sample()).unwrap();
        let written = fs::read_to_string(&path).unwrap();
        let reparsed: AnalysisResult = serde_json::from_str(&written).unwrap();
        assert_eq!(reparsed, sample());
    }
}
