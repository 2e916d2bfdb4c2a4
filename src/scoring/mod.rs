//! Fallback scoring: profile tables, the heuristic engine and the feedback composer.

pub mod engine;
pub mod feedback;
pub mod profile;

pub use engine::{HeuristicScorer, Scorecard, Scorer};
pub use profile::{FeedbackBand, ScoringProfile};
