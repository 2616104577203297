//! Plagiarism scoring strategy.

/// Computes a plagiarism score in `[0, 100]` for a document's text.
pub trait PlagiarismScorer: Send + Sync {
    fn score(&self, text: &str) -> f32;
}

/// Returns the same score for every document.
#[derive(Debug, Clone, Copy)]
pub struct FixedScorer(pub f32);

impl Default for FixedScorer {
    fn default() -> Self {
        Self(100.0)
    }
}

impl PlagiarismScorer for FixedScorer {
    fn score(&self, _text: &str) -> f32 {
        self.0
    }
}

/// Clamp a strategy's output into the valid score range.
pub fn normalize_score(score: f32) -> f32 {
    if score.is_nan() {
        0.0
    } else {
        score.clamp(0.0, 100.0)
    }
}

/// Strictly greater than the threshold.
pub fn is_plagiarism(score: f32, threshold: f32) -> bool {
    score > threshold
}

/// Count whitespace-separated tokens.
pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}
