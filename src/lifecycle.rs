//! Result lifecycle: stamping expiry on new results and reaping expired ones.

use std::{sync::Arc, time::Duration as StdDuration};

use chrono::{DateTime, Duration, Utc};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::domain::{EssayTest, ScoringResult, Submission};
use crate::scoring::Scorecard;
use crate::store::ResultStore;

/// Source of "now" for expiry checks. Swappable in tests.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

pub fn system_clock() -> Clock {
  Arc::new(Utc::now)
}

pub const DEFAULT_TTL_DAYS: i64 = 30;

#[derive(Clone, Debug)]
pub struct ResultLifecycle {
  ttl: Duration,
}

impl Default for ResultLifecycle {
  fn default() -> Self {
    Self::with_ttl_days(DEFAULT_TTL_DAYS)
  }
}

impl ResultLifecycle {
  /// Falls back to the default window when `days` is not positive or does not fit a `Duration`.
  pub fn with_ttl_days(days: i64) -> Self {
    let ttl = Duration::try_days(days)
      .filter(|d| *d > Duration::zero())
      .unwrap_or_else(|| Duration::days(DEFAULT_TTL_DAYS));
    Self { ttl }
  }

  /// Build the persisted result for a scored submission.
  pub fn issue(
    &self,
    card: Scorecard,
    submission: &Submission,
    test: &EssayTest,
    now: DateTime<Utc>,
  ) -> ScoringResult {
    ScoringResult {
      id: Uuid::new_v4().to_string(),
      submission_id: submission.id.clone(),
      test_id: test.id.clone(),
      test_title: test.title.clone(),
      total_score: card.total_score,
      max_score: card.max_score,
      percentage: card.percentage,
      details: card.details,
      feedback: card.feedback,
      scored_by: card.scored_by,
      created_at: now,
      expires_at: now.checked_add_signed(self.ttl).unwrap_or(DateTime::<Utc>::MAX_UTC),
    }
  }

  pub fn is_live(&self, result: &ScoringResult, now: DateTime<Utc>) -> bool {
    !result.is_expired_at(now)
  }
}

/// Periodically purge expired results. Failures are logged and the loop keeps going.
pub fn spawn_reaper(store: Arc<dyn ResultStore>, every: StdDuration) -> JoinHandle<()> {
  tokio::spawn(async move {
    let mut ticker = tokio::time::interval(every);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    info!(target: "results", interval_secs = every.as_secs(), "Result reaper started");
    loop {
      ticker.tick().await;
      match store.delete_expired().await {
        Ok(0) => debug!(target: "results", "Reaper pass: nothing expired"),
        Ok(n) => info!(target: "results", removed = n, "Reaper pass removed expired results"),
        Err(e) => error!(target: "results", error = %e, "Reaper pass failed"),
      }
    }
  })
}
