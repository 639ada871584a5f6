pub mod api;
pub mod captions;
pub mod config;
pub mod error;
pub mod loop_control;
pub mod practice;
pub mod scoring;
pub mod segmenter;
pub mod session;
pub mod text;
pub mod token_store;
pub mod transcript;

pub use api::*;
pub use captions::{parse, CaptionBatch, RawEvent, Segment};
pub use config::EngineConfig;
pub use error::*;
pub use loop_control::{BoundaryOutcome, LoopController, LoopMode, LoopState, ManualClock, MediaClock};
pub use practice::{resolve, PracticeSelection, Selection, TimeRange};
pub use scoring::{evaluate, EvaluatedToken, Evaluation, Rating, Scorer, TokenStatus};
pub use segmenter::{group, Group};
pub use session::{Highlight, PracticeSession};
