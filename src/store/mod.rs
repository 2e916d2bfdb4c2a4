//! Persistence contracts for tests, submissions and results.
//!
//! Each call is a single atomic unit. Implementations report failures as
//! `StorageError` and never retry on their own.

use async_trait::async_trait;

use crate::domain::{EssayTest, ScoringResult, Submission};
use crate::error::StorageError;

pub mod memory;

pub use memory::{InMemoryResultStore, InMemorySubmissionStore, InMemoryTestStore};

pub type StoreResult<T> = Result<T, StorageError>;

#[mockall::automock]
#[async_trait]
pub trait TestStore: Send + Sync {
  async fn get_by_id(&self, id: &str) -> StoreResult<Option<EssayTest>>;
  /// All tests in insertion order.
  async fn get_all(&self) -> StoreResult<Vec<EssayTest>>;
  async fn insert(&self, test: EssayTest) -> StoreResult<()>;
}

#[mockall::automock]
#[async_trait]
pub trait SubmissionStore: Send + Sync {
  /// Fails with `StorageError::Conflict` if the id is already taken.
  async fn create(&self, submission: &Submission) -> StoreResult<()>;
  /// Upsert by id; calling twice with the same value is harmless.
  async fn update(&self, submission: &Submission) -> StoreResult<()>;
  async fn get_by_id(&self, id: &str) -> StoreResult<Option<Submission>>;
  async fn list_by_test(&self, test_id: &str) -> StoreResult<Vec<Submission>>;
}

/// Reads never return a result whose `expires_at` has passed.
#[mockall::automock]
#[async_trait]
pub trait ResultStore: Send + Sync {
  async fn create(&self, result: &ScoringResult) -> StoreResult<()>;
  async fn get_by_id(&self, id: &str) -> StoreResult<Option<ScoringResult>>;
  async fn get_by_submission_id(&self, submission_id: &str) -> StoreResult<Option<ScoringResult>>;
  async fn get_all(&self) -> StoreResult<Vec<ScoringResult>>;
  /// Physically drop expired records; returns how many were removed.
  async fn delete_expired(&self) -> StoreResult<usize>;
}
