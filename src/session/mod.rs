mod controller;
mod settings;

pub use controller::{Analysis, PageController, RunOutcome, MISSING_KEY_NOTICE};
pub use settings::{RunSettings, SessionConfig};
