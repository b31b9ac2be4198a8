use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("model output did not contain a JSON object")]
    NoJsonFound,

    #[error("located JSON object is malformed: {0}")]
    MalformedJson(#[source] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("HTTP request to model endpoint failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("model endpoint returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("model provider error: {0}")]
    Provider(String),
}

#[derive(Debug, Error)]
pub enum SampleLoadError {
    #[error("cannot read sample '{label}' from {path:?}: {source}")]
    Io {
        label: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("sample '{label}' has an invalid expected document {path:?}: {source}")]
    Parse {
        label: String,
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Error)]
pub enum AnalyzeError {
    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("live mode requested but no credential is configured (looked up {keys})")]
    CredentialMissing { keys: String },

    #[error("unknown sample '{0}'")]
    UnknownSample(String),

    #[error(transparent)]
    SampleLoad(#[from] SampleLoadError),
}

impl AnalyzeError {
    pub fn kind(&self) -> &'static str {
        match self {
            AnalyzeError::Extraction(ExtractionError::NoJsonFound) => "no_json_found",
            AnalyzeError::Extraction(ExtractionError::MalformedJson(_)) => "malformed_json",
            AnalyzeError::Model(_) => "model_call",
            AnalyzeError::CredentialMissing { .. } => "credential_missing",
            AnalyzeError::UnknownSample(_) => "unknown_sample",
            AnalyzeError::SampleLoad(_) => "sample_load",
        }
    }
}
