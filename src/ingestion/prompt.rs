const DEFAULT_INSTRUCTIONS: &str = concat!(
    "You are a forensic analyst. Given the narrative below, produce ONE JSON object (no markdown) with exactly these keys:\n",
    "- anomaly_curve: array of objects with keys t (string) and score (number 0..1)\n",
    "- event_timeline: array of objects with keys t (string), event (string), confidence (number 0..1)\n",
    "- draft_report: string\n",
    "- consistency_check: string\n",
    "- final_report: string\n",
    "\n",
    "Keep it concise but coherent. Do not include any keys beyond the five listed.",
);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    pub instructions: String,
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self {
            instructions: DEFAULT_INSTRUCTIONS.to_string(),
        }
    }
}

impl PromptTemplate {
    pub fn new(instructions: impl Into<String>) -> Self {
        Self {
            instructions: instructions.into(),
        }
    }

    /// Surrounding whitespace of the whole prompt is trimmed.
    pub fn build(&self, narrative: &str) -> String {
        format!("{}\n\nNARRATIVE:\n{}", self.instructions.trim(), narrative)
            .trim()
            .to_string()
    }
}
