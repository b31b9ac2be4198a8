mod model;
mod result;
mod sample;

pub use model::{ModelId, RunMode, UnknownModelError};
pub use result::{
    AnalysisResult, AnomalyPoint, Field, JsonObject, TimelineEvent, ANOMALY_CURVE,
    CONSISTENCY_CHECK, DRAFT_REPORT, EVENT_TIMELINE, FINAL_REPORT, RESULT_KEYS,
};
pub use sample::DemoSample;
