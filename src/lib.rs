pub mod config;
pub mod domain;
pub mod error;
pub mod export;
pub mod ingestion;
pub mod render;
pub mod session;
pub mod store;
pub mod utils;

pub use domain::{AnalysisResult, DemoSample, ModelId, RunMode};
pub use error::{AnalyzeError, ExtractionError, ModelError, SampleLoadError};
pub use ingestion::{extract_json_object, ModelClient, ModelInvoker, PromptTemplate};
pub use render::{render, Surface, TerminalSurface};
pub use session::{PageController, RunSettings, SessionConfig};
pub use store::SampleStore;
