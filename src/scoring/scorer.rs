//! Windowed alignment of spoken tokens against target tokens

use log::debug;

use super::similarity::token_similarity;
use super::types::{EvaluatedToken, Evaluation, Rating, TokenStatus};
use crate::config::ScoringConfig;
use crate::text::{normalize_token, tokenize};

/// Scores spoken attempts with a fixed set of thresholds
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scorer {
    config: ScoringConfig,
}

impl Scorer {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    fn status_for(&self, similarity: f64) -> TokenStatus {
        if similarity >= self.config.correct_threshold {
            TokenStatus::Correct
        } else if similarity >= self.config.partial_threshold {
            TokenStatus::Partial
        } else {
            TokenStatus::Wrong
        }
    }

    /// One verdict per whitespace token of `target`, in order.
    pub fn evaluate(&self, target: &str, spoken: &str) -> Vec<EvaluatedToken> {
        // Punctuation-only spoken tokens never take part in matching
        let spoken: Vec<String> = tokenize(spoken)
            .into_iter()
            .map(normalize_token)
            .filter(|t| !t.is_empty())
            .collect();
        let window = self.config.window.max(1);
        let mut cursor = 0;

        tokenize(target)
            .into_iter()
            .map(|token| {
                let norm = normalize_token(token);
                if norm.is_empty() {
                    return EvaluatedToken::new(token, TokenStatus::Correct);
                }

                let end = (cursor + window).min(spoken.len());
                let mut best: Option<(usize, f64)> = None;
                for (i, candidate) in spoken[cursor..end].iter().enumerate() {
                    let similarity = token_similarity(&norm, candidate);
                    if best.map_or(true, |(_, s)| similarity > s) {
                        best = Some((cursor + i, similarity));
                    }
                }

                let status = match best {
                    Some((index, similarity)) => {
                        let status = self.status_for(similarity);
                        cursor = if status == TokenStatus::Wrong {
                            cursor + 1
                        } else {
                            index + 1
                        };
                        status
                    }
                    None => TokenStatus::Wrong,
                };
                EvaluatedToken::new(token, status)
            })
            .collect()
    }

    /// Score a list of verdicts.
    ///
    /// Punctuation-only tokens are left out of the denominator. Returns a
    /// zero score and no rating when nothing is left.
    pub fn rate(&self, tokens: Vec<EvaluatedToken>) -> Evaluation {
        let mut counted = 0usize;
        let mut total = 0.0;
        let mut any_wrong = false;

        for token in &tokens {
            if normalize_token(&token.text).is_empty() {
                continue;
            }
            counted += 1;
            match token.status {
                TokenStatus::Correct => total += 1.0,
                TokenStatus::Partial => total += self.config.partial_credit,
                TokenStatus::Wrong => any_wrong = true,
            }
        }

        if counted == 0 {
            return Evaluation {
                tokens,
                score: 0.0,
                rating: None,
            };
        }

        let score = total / counted as f64;
        let rating = if !any_wrong && score >= self.config.excellent_score {
            Rating::Excellent
        } else if score >= self.config.good_score {
            Rating::Good
        } else {
            Rating::KeepPracticing
        };
        debug!("scored {} tokens: {:.3} ({})", counted, score, rating);

        Evaluation {
            tokens,
            score,
            rating: Some(rating),
        }
    }

    /// Evaluate and rate in one pass.
    pub fn score(&self, target: &str, spoken: &str) -> Evaluation {
        self.rate(self.evaluate(target, spoken))
    }
}

/// [`Scorer::evaluate`] with the default thresholds.
pub fn evaluate(target: &str, spoken: &str) -> Vec<EvaluatedToken> {
    Scorer::default().evaluate(target, spoken)
}
