//! Ranking limits.

/// Number of top-ranked sections mined for sentences.
pub const SECTIONS_FOR_ANALYSIS: usize = 5;

/// Maximum number of sentences reported.
pub const MAX_SUB_SECTIONS: usize = 10;

/// Limits for the ranking stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankOptions {
    /// Top sections examined by the sub-section extractor
    pub sections_for_analysis: usize,

    /// Cap on returned sentences
    pub max_sub_sections: usize,

    /// Embed documents on the rayon pool
    pub parallel: bool,
}

impl RankOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set how many top sections are segmented into sentences.
    pub fn with_sections_for_analysis(mut self, sections: usize) -> Self {
        self.sections_for_analysis = sections;
        self
    }

    /// Set the maximum number of reported sentences.
    pub fn with_max_sub_sections(mut self, hits: usize) -> Self {
        self.max_sub_sections = hits;
        self
    }

    /// Enable or disable parallel embedding.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}

impl Default for RankOptions {
    fn default() -> Self {
        Self {
            sections_for_analysis: SECTIONS_FOR_ANALYSIS,
            max_sub_sections: MAX_SUB_SECTIONS,
            parallel: true,
        }
    }
}
