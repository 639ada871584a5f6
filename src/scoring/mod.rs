//! # Scoring Module
//!
//! Compare what the learner said with what they were meant to say.
//!
//! ## Sub-modules
//! - `types` - EvaluatedToken, TokenStatus, Evaluation, Rating
//! - `similarity` - Normalized edit-distance similarity of two tokens
//! - `scorer` - Windowed alignment and aggregate rating
//!
//! ## Alignment
//! Target tokens are walked left to right with a cursor into the spoken
//! tokens. Each target token is compared with the next few spoken tokens
//! (three by default) and takes the best match:
//! - similarity >= 0.8 is `Correct`, >= 0.5 is `Partial`, anything else `Wrong`
//! - a match consumes every spoken token up to and including it
//! - a miss still consumes one spoken token, so a single bad word cannot
//!   stall the alignment
//! - punctuation-only targets are `Correct` and consume nothing
//!
//! A small window absorbs the single-word insertions and omissions typical of
//! speech recognition without turning into full sequence alignment.
//!
//! ## Rating
//! Correct tokens count 1, partial ones 0.7, wrong ones 0. `Excellent` needs
//! no wrong token and a score of at least 0.9; `Good` needs 0.6.
//!
//! ## Example
//! ```rust
//! use shadowing::scoring::{evaluate, TokenStatus};
//!
//! let tokens = evaluate("all of the prompts", "all uv the prompts");
//! let statuses: Vec<TokenStatus> = tokens.iter().map(|t| t.status).collect();
//!
//! assert_eq!(statuses[0], TokenStatus::Correct);
//! assert_eq!(statuses[1], TokenStatus::Wrong);
//! assert_eq!(&statuses[2..], &[TokenStatus::Correct, TokenStatus::Correct]);
//! ```

mod scorer;
mod similarity;
mod types;


pub use scorer::{evaluate, Scorer};
pub use similarity::token_similarity;
pub use types::{EvaluatedToken, Evaluation, Rating, TokenStatus};
