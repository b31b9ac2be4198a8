use crate::domain::JsonObject;
use crate::error::ExtractionError;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateSource {
    FencedBlock,
    BraceSpan,
}

/// Finds the text that should hold the JSON object, without parsing it.
///
/// A triple-backtick fence (optionally tagged `json`, any case) wrapping a
/// brace-delimited body wins. Otherwise the span runs from the first `{` to
/// the last `}` in the whole text, so two disjoint objects end up in one
/// candidate.
pub fn locate_json_candidate(text: &str) -> Option<(CandidateSource, &str)> {
    static FENCED: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"(?is)```(?:json)?\s*(\{.*?\})\s*```").unwrap());

    if let Some(body) = FENCED.captures(text).and_then(|caps| caps.get(1)) {
        return Some((CandidateSource::FencedBlock, body.as_str()));
    }

    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end > start {
        return Some((CandidateSource::BraceSpan, &text[start..=end]));
    }
    None
}

/// Extracts exactly one JSON object from free-form model output.
pub fn extract_json_object(text: &str) -> Result<JsonObject, ExtractionError> {
    let (source, candidate) = locate_json_candidate(text).ok_or(ExtractionError::NoJsonFound)?;
    debug!(?source, candidate_len = candidate.len(), "JSON candidate located");
    serde_json::from_str::<JsonObject>(candidate).map_err(ExtractionError::MalformedJson)
}
