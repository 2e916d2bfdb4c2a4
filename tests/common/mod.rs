//! Shared fixtures and wiring for the integration suites.

#![allow(dead_code)]

pub mod fixtures;

pub use fixtures::Fixtures;

use std::sync::Arc;

use essay_scoring_backend::lifecycle::ResultLifecycle;
use essay_scoring_backend::scoring::{HeuristicScorer, ScoringProfile};
use essay_scoring_backend::store::{
  InMemoryResultStore, InMemorySubmissionStore, InMemoryTestStore, ResultStore, SubmissionStore,
  TestStore,
};
use essay_scoring_backend::workflow::SubmissionWorkflow;

/// Workflow over in-memory stores, with any store swappable for a mock.
pub struct WorkflowBuilder {
  tests: Arc<InMemoryTestStore>,
  submissions: Arc<dyn SubmissionStore>,
  results: Arc<dyn ResultStore>,
}

impl WorkflowBuilder {
  pub fn new() -> Self {
    Self {
      tests: Arc::new(InMemoryTestStore::new()),
      submissions: Arc::new(InMemorySubmissionStore::new()),
      results: Arc::new(InMemoryResultStore::new()),
    }
  }

  pub fn with_submissions(mut self, store: Arc<dyn SubmissionStore>) -> Self {
    self.submissions = store;
    self
  }

  pub fn with_results(mut self, store: Arc<dyn ResultStore>) -> Self {
    self.results = store;
    self
  }

  /// Seeds the canonical test plus a three-question test the default profile cannot grade.
  pub async fn build(self) -> SubmissionWorkflow {
    self.tests.insert(essay_scoring_backend::seeds::canonical_test()).await.unwrap();
    self.tests.insert(Fixtures::three_question_test()).await.unwrap();
    SubmissionWorkflow::new(
      self.tests,
      self.submissions,
      self.results,
      Arc::new(HeuristicScorer::new(Arc::new(ScoringProfile::default()))),
      ResultLifecycle::default(),
    )
  }
}
