//! In-process stores backed by `tokio::sync::RwLock<HashMap<..>>`.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

use crate::domain::{EssayTest, ScoringResult, Submission};
use crate::error::StorageError;
use crate::lifecycle::{system_clock, Clock};
use crate::store::{ResultStore, StoreResult, SubmissionStore, TestStore};

/// Test bank. Keeps insertion order for listing.
#[derive(Default)]
pub struct InMemoryTestStore {
  inner: RwLock<TestBank>,
}

#[derive(Default)]
struct TestBank {
  by_id: HashMap<String, EssayTest>,
  order: Vec<String>,
}

impl InMemoryTestStore {
  pub fn new() -> Self {
    Self::default()
  }
}

#[async_trait]
impl TestStore for InMemoryTestStore {
  #[instrument(level = "debug", skip(self), fields(%id))]
  async fn get_by_id(&self, id: &str) -> StoreResult<Option<EssayTest>> {
    Ok(self.inner.read().await.by_id.get(id).cloned())
  }

  async fn get_all(&self) -> StoreResult<Vec<EssayTest>> {
    let bank = self.inner.read().await;
    Ok(bank.order.iter().filter_map(|id| bank.by_id.get(id).cloned()).collect())
  }

  /// Replaces a test with the same id but keeps its original position.
  #[instrument(level = "debug", skip(self, test), fields(id = %test.id))]
  async fn insert(&self, test: EssayTest) -> StoreResult<()> {
    let mut bank = self.inner.write().await;
    let id = test.id.clone();
    if bank.by_id.insert(id.clone(), test).is_none() {
      bank.order.push(id);
    }
    Ok(())
  }
}

#[derive(Default)]
pub struct InMemorySubmissionStore {
  by_id: RwLock<HashMap<String, Submission>>,
}

impl InMemorySubmissionStore {
  pub fn new() -> Self {
    Self::default()
  }
}

#[async_trait]
impl SubmissionStore for InMemorySubmissionStore {
  #[instrument(level = "debug", skip(self, submission), fields(id = %submission.id))]
  async fn create(&self, submission: &Submission) -> StoreResult<()> {
    let mut by_id = self.by_id.write().await;
    if by_id.contains_key(&submission.id) {
      return Err(StorageError::Conflict { entity: "submission", id: submission.id.clone() });
    }
    by_id.insert(submission.id.clone(), submission.clone());
    Ok(())
  }

  #[instrument(level = "debug", skip(self, submission), fields(id = %submission.id, status = submission.status.as_str()))]
  async fn update(&self, submission: &Submission) -> StoreResult<()> {
    self.by_id.write().await.insert(submission.id.clone(), submission.clone());
    Ok(())
  }

  async fn get_by_id(&self, id: &str) -> StoreResult<Option<Submission>> {
    Ok(self.by_id.read().await.get(id).cloned())
  }

  async fn list_by_test(&self, test_id: &str) -> StoreResult<Vec<Submission>> {
    let mut out: Vec<Submission> = self
      .by_id
      .read()
      .await
      .values()
      .filter(|s| s.test_id == test_id)
      .cloned()
      .collect();
    out.sort_by_key(|s| s.created_at);
    Ok(out)
  }
}

/// Results keyed by id with a secondary index on submission id.
pub struct InMemoryResultStore {
  inner: RwLock<ResultIndex>,
  clock: Clock,
}

#[derive(Default)]
struct ResultIndex {
  by_id: HashMap<String, ScoringResult>,
  by_submission: HashMap<String, String>,
}

impl Default for InMemoryResultStore {
  fn default() -> Self {
    Self::with_clock(system_clock())
  }
}

impl InMemoryResultStore {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_clock(clock: Clock) -> Self {
    Self { inner: RwLock::new(ResultIndex::default()), clock }
  }

  /// Stored records including expired ones not yet reaped.
  pub async fn raw_len(&self) -> usize {
    self.inner.read().await.by_id.len()
  }

  fn live(&self, result: Option<&ScoringResult>) -> Option<ScoringResult> {
    let now = (self.clock)();
    result.filter(|r| !r.is_expired_at(now)).cloned()
  }
}

#[async_trait]
impl ResultStore for InMemoryResultStore {
  #[instrument(level = "debug", skip(self, result), fields(id = %result.id, submission_id = %result.submission_id))]
  async fn create(&self, result: &ScoringResult) -> StoreResult<()> {
    let mut index = self.inner.write().await;
    if index.by_id.contains_key(&result.id) {
      return Err(StorageError::Conflict { entity: "result", id: result.id.clone() });
    }
    index.by_id.insert(result.id.clone(), result.clone());
    index.by_submission.insert(result.submission_id.clone(), result.id.clone());
    Ok(())
  }

  #[instrument(level = "debug", skip(self), fields(%id))]
  async fn get_by_id(&self, id: &str) -> StoreResult<Option<ScoringResult>> {
    let index = self.inner.read().await;
    Ok(self.live(index.by_id.get(id)))
  }

  #[instrument(level = "debug", skip(self), fields(%submission_id))]
  async fn get_by_submission_id(&self, submission_id: &str) -> StoreResult<Option<ScoringResult>> {
    let index = self.inner.read().await;
    let found = index.by_submission.get(submission_id).and_then(|id| index.by_id.get(id));
    Ok(self.live(found))
  }

  async fn get_all(&self) -> StoreResult<Vec<ScoringResult>> {
    let now = (self.clock)();
    let mut out: Vec<ScoringResult> = self
      .inner
      .read()
      .await
      .by_id
      .values()
      .filter(|r| !r.is_expired_at(now))
      .cloned()
      .collect();
    out.sort_by_key(|r| r.created_at);
    Ok(out)
  }

  #[instrument(level = "debug", skip(self))]
  async fn delete_expired(&self) -> StoreResult<usize> {
    let now = (self.clock)();
    let mut index = self.inner.write().await;
    let expired: Vec<String> = index
      .by_id
      .values()
      .filter(|r| r.is_expired_at(now))
      .map(|r| r.id.clone())
      .collect();
    for id in &expired {
      if let Some(r) = index.by_id.remove(id) {
        index.by_submission.remove(&r.submission_id);
      }
    }
    debug!(target: "results", removed = expired.len(), remaining = index.by_id.len(), "Expired results deleted");
    Ok(expired.len())
  }
}
