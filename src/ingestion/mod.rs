mod extract;
mod invoker;
mod model_client;
mod prompt;

pub use extract::{extract_json_object, locate_json_candidate, CandidateSource};
pub use invoker::ModelInvoker;
pub use model_client::{GeminiModelClient, MockModelClient, ModelClient, DEFAULT_GEMINI_ENDPOINT};
pub use prompt::PromptTemplate;
