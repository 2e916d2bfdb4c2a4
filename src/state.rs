//! Application state: the submission workflow wired to in-memory stores.
//!
//! This module owns:
//!   - the test bank (built-in seeds + configured tests)
//!   - submission and result stores
//!   - the heuristic scorer built from the (validated) scoring profile
//!   - the loaded `AppConfig`

use std::sync::Arc;

use tracing::{error, info, instrument};

use crate::config::AppConfig;
use crate::lifecycle::ResultLifecycle;
use crate::scoring::HeuristicScorer;
use crate::store::{
    InMemoryResultStore, InMemorySubmissionStore, InMemoryTestStore, ResultStore, TestStore,
};
use crate::workflow::SubmissionWorkflow;

#[derive(Clone)]
pub struct AppState {
    pub workflow: SubmissionWorkflow,
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Build state from config: seed the test bank, resolve the scoring profile,
    /// and wire the workflow to fresh in-memory stores.
    #[instrument(level = "info", skip_all)]
    pub async fn from_config(mut config: AppConfig) -> Self {
        config.enforce_limits();
        let tests = Arc::new(InMemoryTestStore::new());
        for test in config.test_bank() {
            let id = test.id.clone();
            if let Err(e) = tests.insert(test).await {
                error!(target: "essay_backend", %id, error = %e, "Failed to load test into bank");
            }
        }
        let inventory = tests.get_all().await.map(|t| t.len()).unwrap_or(0);
        info!(target: "essay_backend", tests = inventory, "Startup test inventory");

        let profile = config.scoring_profile();
        info!(
            target: "scoring",
            scored_by = %profile.scored_by,
            questions = profile.questions.len(),
            max_total = profile.max_total,
            "Scoring profile ready"
        );

        let workflow = SubmissionWorkflow::new(
            tests,
            Arc::new(InMemorySubmissionStore::new()),
            Arc::new(InMemoryResultStore::new()),
            Arc::new(HeuristicScorer::new(Arc::new(profile))),
            ResultLifecycle::with_ttl_days(config.results.ttl_days),
        );

        Self { workflow, config: Arc::new(config) }
    }

    pub fn results(&self) -> Arc<dyn ResultStore> {
        self.workflow.results()
    }
}
