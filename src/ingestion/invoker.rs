use super::extract::extract_json_object;
use super::model_client::ModelClient;
use super::prompt::PromptTemplate;
use crate::domain::{AnalysisResult, ModelId};
use crate::error::AnalyzeError;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

#[derive(Clone)]
pub struct ModelInvoker {
    client: Arc<dyn ModelClient>,
    template: PromptTemplate,
}

impl ModelInvoker {
    pub fn new(client: Arc<dyn ModelClient>, template: PromptTemplate) -> Self {
        Self { client, template }
    }

    pub fn invoke(&self, narrative: &str, model: ModelId) -> Result<AnalysisResult, AnalyzeError> {
        let prompt = self.template.build(narrative);
        let started = Instant::now();
        let text = self.client.generate(model, &prompt)?;
        info!(
            %model,
            prompt_len = prompt.len(),
            response_len = text.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "model call finished"
        );

        let document = extract_json_object(&text)?;
        let result = AnalysisResult::from_object(document);
        let extra = result.extra_keys();
        if !extra.is_empty() {
            warn!(?extra, "model returned keys outside the five sections");
        }
        Ok(result)
    }
}
