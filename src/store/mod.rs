mod catalog;
mod sample_store;

pub use catalog::{SampleEntry, SAMPLE_CATALOG};
pub use sample_store::SampleStore;
