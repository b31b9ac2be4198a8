#[derive(Debug, Clone, Copy)]
pub struct SampleEntry {
    pub label: &'static str,
    pub narrative_file: &'static str,
    pub expected_file: &'static str,
    pub(crate) narrative: &'static str,
    pub(crate) expected: &'static str,
}

pub const SAMPLE_CATALOG: &[SampleEntry] = &[
    SampleEntry {
        label: "Break-in Narrative",
        narrative_file: "break_in_narrative.txt",
        expected_file: "break_in_expected.json",
        narrative: include_str!("../../samples/break_in_narrative.txt"),
        expected: include_str!("../../samples/break_in_expected.json"),
    },
    SampleEntry {
        label: "Accident Narrative",
        narrative_file: "accident_narrative.txt",
        expected_file: "accident_expected.json",
        narrative: include_str!("../../samples/accident_narrative.txt"),
        expected: include_str!("../../samples/accident_expected.json"),
    },
    SampleEntry {
        label: "Noise Nuisance Narrative",
        narrative_file: "noise_narrative.txt",
        expected_file: "noise_expected.json",
        narrative: include_str!("../../samples/noise_narrative.txt"),
        expected: include_str!("../../samples/noise_expected.json"),
    },
];
