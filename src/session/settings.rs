use crate::config::{Credential, SecretStore};
use crate::domain::{ModelId, RunMode};
use crate::ingestion::DEFAULT_GEMINI_ENDPOINT;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub credential: Option<Credential>,
    pub endpoint: String,
    pub timeout: Option<Duration>,
    pub require_live: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            credential: None,
            endpoint: DEFAULT_GEMINI_ENDPOINT.to_string(),
            timeout: None,
            require_live: false,
        }
    }
}

impl SessionConfig {
    pub fn from_secrets(secrets: &SecretStore) -> Self {
        Self {
            credential: secrets.credential(),
            ..Self::default()
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_require_live(mut self, require_live: bool) -> Self {
        self.require_live = require_live;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunSettings {
    pub sample: String,
    pub narrative: Option<String>,
    pub mode: RunMode,
    pub model: ModelId,
}

impl RunSettings {
    pub fn demo(sample: impl Into<String>) -> Self {
        Self {
            sample: sample.into(),
            narrative: None,
            mode: RunMode::Demo,
            model: ModelId::default(),
        }
    }

    pub fn live(sample: impl Into<String>, model: ModelId) -> Self {
        Self {
            mode: RunMode::Live,
            model,
            ..Self::demo(sample)
        }
    }

    pub fn with_narrative(mut self, narrative: impl Into<String>) -> Self {
        self.narrative = Some(narrative.into());
        self
    }
}
