use super::result::AnalysisResult;

#[derive(Debug, Clone, PartialEq)]
pub struct DemoSample {
    pub label: String,
    pub key: String,
    pub narrative: String,
    pub expected: AnalysisResult,
}

impl DemoSample {
    pub fn matches(&self, name: &str) -> bool {
        let name = name.trim();
        self.label.eq_ignore_ascii_case(name) || self.key.eq_ignore_ascii_case(name)
    }
}
