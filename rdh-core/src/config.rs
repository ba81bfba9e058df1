//! Configuration for printed page walks

/// Controls what [`BlockWalker::print_summary`](crate::BlockWalker::print_summary) emits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct WalkConfig {
    /// Print the 32-bit words of each header before the decoded fields
    pub raw_words: bool,
    /// Words per line in the raw dump
    pub words_per_line: usize,
    /// Print validation messages after each header
    pub validate: bool,
}

impl WalkConfig {
    /// Default configuration: raw words, 8 per line, no validation output
    pub const fn new() -> Self {
        Self {
            raw_words: true,
            words_per_line: 8,
            validate: false,
        }
    }

    /// Enable or disable the raw word dump
    pub const fn with_raw_words(mut self, raw_words: bool) -> Self {
        self.raw_words = raw_words;
        self
    }

    /// Set words per line of the raw dump (at least 1)
    pub const fn with_words_per_line(mut self, words_per_line: usize) -> Self {
        self.words_per_line = if words_per_line == 0 { 1 } else { words_per_line };
        self
    }

    /// Enable or disable per-header validation output
    pub const fn with_validation(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }
}

impl Default for WalkConfig {
    fn default() -> Self {
        Self::new()
    }
}
