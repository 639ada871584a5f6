//! Scoring type definitions

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TokenStatus {
    Correct,
    Partial,
    Wrong,
}

/// Verdict for one target token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluatedToken {
    pub text: String,
    pub status: TokenStatus,
}

impl EvaluatedToken {
    pub fn new(text: impl Into<String>, status: TokenStatus) -> Self {
        Self {
            text: text.into(),
            status,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Rating {
    Excellent,
    Good,
    KeepPracticing,
}

impl std::fmt::Display for Rating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rating::Excellent => write!(f, "Excellent"),
            Rating::Good => write!(f, "Good"),
            Rating::KeepPracticing => write!(f, "Keep practicing"),
        }
    }
}

/// One complete scoring pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Evaluation {
    pub tokens: Vec<EvaluatedToken>,
    /// Weighted share of correct tokens among the non-punctuation targets
    pub score: f64,
    /// `None` when the target has nothing but punctuation
    pub rating: Option<Rating>,
}

impl Evaluation {
    /// Every token came back `Correct`.
    pub fn all_correct(&self) -> bool {
        !self.tokens.is_empty() && self.tokens.iter().all(|t| t.status == TokenStatus::Correct)
    }

    pub fn count(&self, status: TokenStatus) -> usize {
        self.tokens.iter().filter(|t| t.status == status).count()
    }
}
