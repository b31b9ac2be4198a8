use super::catalog::{SampleEntry, SAMPLE_CATALOG};
use crate::domain::{AnalysisResult, DemoSample, JsonObject};
use crate::error::SampleLoadError;
use crate::utils::slugify;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Debug, Clone, Default)]
pub struct SampleStore {
    samples: Vec<DemoSample>,
    unavailable: Vec<(String, String)>,
}

impl SampleStore {
    pub fn bundled() -> Result<Self, SampleLoadError> {
        let mut samples = Vec::with_capacity(SAMPLE_CATALOG.len());
        for entry in SAMPLE_CATALOG {
            let path = Path::new("samples").join(entry.expected_file);
            samples.push(build_sample(entry, entry.narrative.to_string(), entry.expected, path)?);
        }
        Ok(Self {
            samples,
            unavailable: Vec::new(),
        })
    }

    /// Samples that fail to load are listed by [`SampleStore::unavailable`].
    pub fn load_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        let mut store = Self::default();
        for entry in SAMPLE_CATALOG {
            match load_entry(dir, entry) {
                Ok(sample) => store.samples.push(sample),
                Err(err) => {
                    warn!(sample = entry.label, error = %err, "demo sample unavailable");
                    store
                        .unavailable
                        .push((entry.label.to_string(), err.to_string()));
                }
            }
        }
        info!(dir = %dir.display(), loaded = store.samples.len(), "demo samples loaded");
        store
    }

    pub fn get(&self, name: &str) -> Option<&DemoSample> {
        self.samples.iter().find(|sample| sample.matches(name))
    }

    pub fn first(&self) -> Option<&DemoSample> {
        self.samples.first()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DemoSample> {
        self.samples.iter()
    }

    pub fn labels(&self) -> Vec<&str> {
        self.samples.iter().map(|s| s.label.as_str()).collect()
    }

    pub fn unavailable(&self) -> &[(String, String)] {
        &self.unavailable
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

fn load_entry(dir: &Path, entry: &SampleEntry) -> Result<DemoSample, SampleLoadError> {
    let narrative_path = dir.join(entry.narrative_file);
    let narrative = read_file(entry, &narrative_path)?;
    let expected_path = dir.join(entry.expected_file);
    let expected = read_file(entry, &expected_path)?;
    build_sample(entry, narrative, &expected, expected_path)
}

fn read_file(entry: &SampleEntry, path: &Path) -> Result<String, SampleLoadError> {
    fs::read_to_string(path).map_err(|source| SampleLoadError::Io {
        label: entry.label.to_string(),
        path: path.to_path_buf(),
        source,
    })
}

fn build_sample(
    entry: &SampleEntry,
    narrative: String,
    expected: &str,
    expected_path: PathBuf,
) -> Result<DemoSample, SampleLoadError> {
    let document: JsonObject =
        serde_json::from_str(expected).map_err(|source| SampleLoadError::Parse {
            label: entry.label.to_string(),
            path: expected_path,
            source,
        })?;
    Ok(DemoSample {
        label: entry.label.to_string(),
        key: slugify(entry.label),
        narrative,
        expected: AnalysisResult::from_object(document),
    })
}
