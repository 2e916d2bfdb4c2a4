//! Essay scoring backend: heuristic grading of two-question Japanese essay
//! tests, the submission workflow around it, and an axum HTTP surface.

pub mod config;
pub mod domain;
pub mod error;
pub mod lifecycle;
pub mod protocol;
pub mod routes;
pub mod scoring;
pub mod seeds;
pub mod state;
pub mod store;
pub mod telemetry;
pub mod util;
pub mod validation;
pub mod workflow;
