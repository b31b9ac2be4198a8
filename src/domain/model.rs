use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ModelId {
    #[default]
    Gemini20Flash,
    Gemini20Pro,
    Gemini15Flash,
    Gemini15Pro,
}

impl ModelId {
    pub fn all() -> &'static [ModelId] {
        const ALL: &[ModelId] = &[
            ModelId::Gemini20Flash,
            ModelId::Gemini20Pro,
            ModelId::Gemini15Flash,
            ModelId::Gemini15Pro,
        ];
        ALL
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ModelId::Gemini20Flash => "gemini-2.0-flash",
            ModelId::Gemini20Pro => "gemini-2.0-pro",
            ModelId::Gemini15Flash => "gemini-1.5-flash",
            ModelId::Gemini15Pro => "gemini-1.5-pro",
        }
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown model '{0}' (expected one of: gemini-2.0-flash, gemini-2.0-pro, gemini-1.5-flash, gemini-1.5-pro)")]
pub struct UnknownModelError(pub String);

impl FromStr for ModelId {
    type Err = UnknownModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        let normalized = normalized.strip_prefix("models/").unwrap_or(&normalized);
        ModelId::all()
            .iter()
            .copied()
            .find(|model| model.as_str() == normalized)
            .ok_or_else(|| UnknownModelError(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunMode {
    #[default]
    Demo,
    Live,
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunMode::Demo => f.write_str("demo"),
            RunMode::Live => f.write_str("live"),
        }
    }
}
