use std::fmt;

use serde::{Deserialize, Serialize};

/// Severity band for a reaction score, from weakest to strongest
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ReactionLevel {
    Low,
    BelowAverage,
    Good,
    Notable,
    Strong,
    Buzz,
}

impl ReactionLevel {
    /// Classify a score; bands are half-open at 1, 2, 5, 10 and 50
    pub fn classify(score: f64) -> Self {
        if score < 1.0 {
            ReactionLevel::Low
        } else if score < 2.0 {
            ReactionLevel::BelowAverage
        } else if score < 5.0 {
            ReactionLevel::Good
        } else if score < 10.0 {
            ReactionLevel::Notable
        } else if score < 50.0 {
            ReactionLevel::Strong
        } else {
            ReactionLevel::Buzz
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ReactionLevel::Low => "관심도 낮음",
            ReactionLevel::BelowAverage => "평균 이하",
            ReactionLevel::Good => "양호",
            ReactionLevel::Notable => "주목",
            ReactionLevel::Strong => "강한 반응",
            ReactionLevel::Buzz => "버즈 콘텐츠",
        }
    }
}

impl fmt::Display for ReactionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Views per subscriber, rounded half-to-even to two decimals; 0.0 when there are no subscribers
pub fn reaction_score(view_count: u64, subscriber_count: u64) -> f64 {
    if subscriber_count == 0 {
        return 0.0;
    }
    let ratio = view_count as f64 / subscriber_count as f64;
    (ratio * 100.0).round_ties_even() / 100.0
}
