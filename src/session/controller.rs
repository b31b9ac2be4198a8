use super::settings::{RunSettings, SessionConfig};
use crate::config::CREDENTIAL_KEYS;
use crate::domain::{AnalysisResult, ModelId, RunMode};
use crate::error::AnalyzeError;
use crate::ingestion::{GeminiModelClient, ModelInvoker, PromptTemplate};
use crate::render::{render, RenderReport, Surface};
use crate::store::SampleStore;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

pub const MISSING_KEY_NOTICE: &str =
    "No API key found. Set `GEMINI_API_KEY` (recommended). Showing demo output instead.";

#[derive(Debug, Clone)]
pub struct Analysis {
    pub result: AnalysisResult,
    pub mode: RunMode,
    pub model: Option<ModelId>,
    pub sample: String,
    pub produced_at: DateTime<Utc>,
    pub notices: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    Rendered(RenderReport),
    Failed { kind: &'static str, message: String },
}

pub struct PageController {
    session_id: Uuid,
    samples: SampleStore,
    invoker: Option<ModelInvoker>,
    require_live: bool,
    last: Option<Analysis>,
}

impl PageController {
    pub fn new(config: SessionConfig, samples: SampleStore) -> Result<Self, AnalyzeError> {
        let invoker = match &config.credential {
            Some(credential) => {
                debug!(key = credential.key_name, "credential found");
                let client = GeminiModelClient::with_options(
                    credential.secret(),
                    config.endpoint.as_str(),
                    config.timeout,
                )?;
                Some(ModelInvoker::new(Arc::new(client), PromptTemplate::default()))
            }
            None => None,
        };
        Ok(Self::with_invoker(samples, invoker, config.require_live))
    }

    pub fn with_invoker(
        samples: SampleStore,
        invoker: Option<ModelInvoker>,
        require_live: bool,
    ) -> Self {
        let session_id = Uuid::new_v4();
        info!(
            session = %session_id,
            live_available = invoker.is_some(),
            samples = samples.len(),
            "session started"
        );
        Self {
            session_id,
            samples,
            invoker,
            require_live,
            last: None,
        }
    }

    pub fn live_available(&self) -> bool {
        self.invoker.is_some()
    }

    pub fn narrative_for(&self, sample: &str) -> Result<&str, AnalyzeError> {
        self.samples
            .get(sample)
            .map(|s| s.narrative.as_str())
            .ok_or_else(|| AnalyzeError::UnknownSample(sample.to_string()))
    }

    pub fn last_result(&self) -> Option<&Analysis> {
        self.last.as_ref()
    }

    /// On error the previous analysis stays untouched.
    pub fn analyze(&mut self, settings: &RunSettings) -> Result<&Analysis, AnalyzeError> {
        let sample = self
            .samples
            .get(&settings.sample)
            .ok_or_else(|| AnalyzeError::UnknownSample(settings.sample.clone()))?;
        let mut notices = Vec::new();

        let (result, mode, model) = match (settings.mode, &self.invoker) {
            (RunMode::Live, Some(invoker)) => {
                let narrative = settings.narrative.as_deref().unwrap_or(&sample.narrative);
                info!(
                    session = %self.session_id,
                    model = %settings.model,
                    sample = %sample.label,
                    "calling model"
                );
                let result = invoker.invoke(narrative, settings.model)?;
                (result, RunMode::Live, Some(settings.model))
            }
            (RunMode::Live, None) => {
                let missing = AnalyzeError::CredentialMissing {
                    keys: CREDENTIAL_KEYS.join(", "),
                };
                if self.require_live {
                    return Err(missing);
                }
                warn!(session = %self.session_id, error = %missing, "falling back to demo output");
                notices.push(MISSING_KEY_NOTICE.to_string());
                (sample.expected.clone(), RunMode::Demo, None)
            }
            (RunMode::Demo, _) => {
                if settings.narrative.is_some() {
                    debug!("narrative edits are not used in demo mode");
                }
                (sample.expected.clone(), RunMode::Demo, None)
            }
        };

        info!(session = %self.session_id, %mode, sample = %sample.label, "analysis ready");
        let analysis = Analysis {
            result,
            mode,
            model,
            sample: sample.label.clone(),
            produced_at: Utc::now(),
            notices,
        };
        Ok(self.last.insert(analysis))
    }

    pub fn run(&mut self, settings: &RunSettings, surface: &mut dyn Surface) -> RunOutcome {
        let session_id = self.session_id;
        match self.analyze(settings) {
            Ok(analysis) => {
                for notice in &analysis.notices {
                    if let Err(err) = surface.warning(notice) {
                        warn!(error = %err, "notice could not be drawn");
                    }
                }
                RunOutcome::Rendered(render(&analysis.result, surface))
            }
            Err(err) => {
                error!(session = %session_id, kind = err.kind(), error = %err, "analyze failed");
                let detail = format!("{}: {}", err.kind(), err);
                if let Err(io_err) = surface.error("Analyze failed.", &detail) {
                    warn!(error = %io_err, "failure notice could not be drawn");
                }
                RunOutcome::Failed {
                    kind: err.kind(),
                    message: err.to_string(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Credential, SecretStore};
    use crate::ingestion::MockModelClient;
    use crate::render::{Panel, RecordingSurface, Section};
    use serde_json::json;

    const BREAK_IN: &str = "Break-in Narrative";

    fn store() -> SampleStore {
        SampleStore::bundled().unwrap()
    }

    fn with_mock(mock: &MockModelClient) -> PageController {
        let invoker = ModelInvoker::new(Arc::new(mock.clone()), PromptTemplate::default());
        PageController::with_invoker(store(), Some(invoker), false)
    }

    fn bundled_document() -> serde_json::Value {
        serde_json::from_str(include_str!("../../samples/break_in_expected.json")).unwrap()
    }

    #[test]
    fn demo_mode_returns_bundled_document_regardless_of_inputs() {
        let mock = MockModelClient::default();
        let mut with_key = with_mock(&mock);
        let mut without_key = PageController::with_invoker(store(), None, false);
        let settings = RunSettings::demo("break-in-narrative").with_narrative("something else");

        for controller in [&mut with_key, &mut without_key] {
            let analysis = controller.analyze(&settings).unwrap();
            assert_eq!(analysis.mode, RunMode::Demo);
            assert_eq!(analysis.result.to_value(), bundled_document());
            assert!(analysis.notices.is_empty());
        }
        assert!(mock.calls().is_empty());
    }

    #[test]
    fn broken_secrets_file_does_not_block_demo_mode() {
        let dir = tempfile::tempdir().unwrap();
        let default = dir.path().join("secrets.toml");
        std::fs::write(&default, "GEMINI_API_KEY = ").unwrap();
        let secrets = SecretStore::default().overlay(None, &default).unwrap();

        let mut controller = PageController::new(SessionConfig::from_secrets(&secrets), store()).unwrap();
        assert!(!controller.live_available());
        let before = Utc::now();
        let analysis = controller.analyze(&RunSettings::demo(BREAK_IN)).unwrap();
        assert_eq!(analysis.result.to_value(), bundled_document());
        assert_eq!(analysis.sample, BREAK_IN);
        assert_eq!(analysis.model, None);
        assert!(analysis.produced_at >= before);
    }

    #[test]
    fn live_mode_sends_edited_narrative() {
        let mock = MockModelClient::default();
        mock.push_response("```json\n{\"final_report\": \"live\"}\n```");
        let mut controller = with_mock(&mock);

        let settings = RunSettings::live(BREAK_IN, ModelId::Gemini20Pro).with_narrative("edited text");
        let analysis = controller.analyze(&settings).unwrap();
        assert_eq!(analysis.mode, RunMode::Live);
        assert_eq!(analysis.model, Some(ModelId::Gemini20Pro));
        assert_eq!(analysis.result.to_value(), json!({"final_report": "live"}));

        let calls = mock.calls();
        assert_eq!(calls[0].0, ModelId::Gemini20Pro);
        assert!(calls[0].1.ends_with("NARRATIVE:\nedited text"));
    }

    #[test]
    fn live_without_credential_falls_back_with_notice() {
        let mut controller = PageController::new(SessionConfig::default(), store()).unwrap();
        assert!(!controller.live_available());

        let mut surface = RecordingSurface::new();
        let outcome = controller.run(&RunSettings::live(BREAK_IN, ModelId::default()), &mut surface);
        assert!(matches!(outcome, RunOutcome::Rendered(_)));
        assert_eq!(surface.panels[0], Panel::Warning(MISSING_KEY_NOTICE.to_string()));
        let last = controller.last_result().unwrap();
        assert_eq!(last.mode, RunMode::Demo);
        assert_eq!(last.result.to_value(), bundled_document());
    }

    #[test]
    fn require_live_turns_missing_credential_into_failure() {
        let config = SessionConfig::default().with_require_live(true);
        let mut controller = PageController::new(config, store()).unwrap();
        let err = controller
            .analyze(&RunSettings::live(BREAK_IN, ModelId::default()))
            .unwrap_err();
        assert_eq!(err.kind(), "credential_missing");
        assert!(err.to_string().contains("GEMINI_API_KEY, GOOGLE_API_KEY, api_key"));
    }

    #[test]
    fn credential_enables_live_mode() {
        let secrets = SecretStore::from_pairs([("GOOGLE_API_KEY", "k")]);
        let config = SessionConfig::from_secrets(&secrets);
        assert_eq!(config.credential, Some(Credential::new("GOOGLE_API_KEY", "k")));
        let controller = PageController::new(config, store()).unwrap();
        assert!(controller.live_available());
    }

    #[test]
    fn failure_is_reported_and_keeps_previous_result() {
        let mock = MockModelClient::default();
        mock.push_response("{\"final_report\": \"first\"}");
        mock.push_response("I could not produce JSON, sorry.");
        mock.push_response("{ not json }");
        let mut controller = with_mock(&mock);
        let settings = RunSettings::live(BREAK_IN, ModelId::default());

        controller.analyze(&settings).unwrap();

        let mut surface = RecordingSurface::new();
        let outcome = controller.run(&settings, &mut surface);
        assert!(matches!(outcome, RunOutcome::Failed { kind: "no_json_found", .. }));
        assert!(matches!(
            &surface.panels[..],
            [Panel::Error { message, detail }]
                if message == "Analyze failed." && detail.starts_with("no_json_found:")
        ));

        let outcome = controller.run(&settings, &mut RecordingSurface::new());
        assert!(matches!(outcome, RunOutcome::Failed { kind: "malformed_json", .. }));

        let last = controller.last_result().unwrap();
        assert_eq!(last.result.to_value(), json!({"final_report": "first"}));
    }

    #[test]
    fn model_error_is_caught_at_the_boundary() {
        let mock = MockModelClient::default();
        mock.push_failure("HTTP 429");
        let mut controller = with_mock(&mock);
        let outcome = controller.run(
            &RunSettings::live(BREAK_IN, ModelId::default()),
            &mut RecordingSurface::new(),
        );
        assert!(matches!(outcome, RunOutcome::Failed { kind: "model_call", message } if message.contains("HTTP 429")));
        assert!(controller.last_result().is_none());
    }

    #[test]
    fn unknown_sample_is_rejected() {
        let mut controller = PageController::with_invoker(store(), None, false);
        let err = controller.analyze(&RunSettings::demo("flood")).unwrap_err();
        assert!(matches!(err, AnalyzeError::UnknownSample(name) if name == "flood"));
        assert!(controller.narrative_for("flood").is_err());
        assert!(controller.narrative_for(BREAK_IN).unwrap().contains("breaking glass"));
    }

    #[test]
    fn malformed_live_curve_still_renders() {
        let mock = MockModelClient::default();
        mock.push_response("{\"anomaly_curve\": \"flat\"}");
        let mut controller = with_mock(&mock);
        let mut surface = RecordingSurface::new();
        let outcome = controller.run(&RunSettings::live(BREAK_IN, ModelId::default()), &mut surface);
        let RunOutcome::Rendered(report) = outcome else {
            panic!("expected a rendered outcome");
        };
        assert_eq!(report.sections.len(), Section::all().len());
        assert_eq!(report.failures(), 0);
    }
}
