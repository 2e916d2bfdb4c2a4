//! Loading service configuration from TOML.
//!
//! The file named by `ESSAY_CONFIG_PATH` is optional. A missing path means
//! defaults; an unreadable or invalid file is logged and defaults are used.
//! `PORT`/`SERVER_PORT` and `CORS_ALLOWED_ORIGINS` override the file.

use serde::Deserialize;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::domain::EssayTest;
use crate::scoring::profile::ProfileError;
use crate::scoring::ScoringProfile;
use crate::seeds::builtin_tests;

pub const CONFIG_PATH_ENV: &str = "ESSAY_CONFIG_PATH";

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("failed to read {path}: {source}")]
  Read {
    path: String,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to parse {path}: {source}")]
  Parse {
    path: String,
    #[source]
    source: toml::de::Error,
  },

  #[error("invalid scoring profile: {0}")]
  Profile(#[from] ProfileError),

  #[error("{field} = {value} is outside {min}..={max}")]
  OutOfRange { field: &'static str, value: i128, min: i128, max: i128 },
}

pub const MAX_TTL_DAYS: i64 = 3650;
pub const MAX_REAP_INTERVAL_SECS: u64 = 7 * 24 * 3600;
pub const MAX_SUBMIT_TIMEOUT_SECS: u64 = 3600;

fn check_range(field: &'static str, value: i128, min: i128, max: i128) -> Result<(), ConfigError> {
  if value < min || value > max {
    return Err(ConfigError::OutOfRange { field, value, min, max });
  }
  Ok(())
}

#[derive(Clone, Debug, Deserialize, Default)]
pub struct AppConfig {
  #[serde(default)]
  pub server: ServerConfig,
  #[serde(default)]
  pub results: ResultsConfig,
  #[serde(default)]
  pub workflow: WorkflowConfig,
  /// Full replacement for the built-in scoring tables.
  #[serde(default)]
  pub scoring: Option<ScoringProfile>,
  /// Appended to the built-in test bank.
  #[serde(default)]
  pub tests: Vec<EssayTest>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ServerConfig {
  #[serde(default = "default_port")] pub port: u16,
  #[serde(default = "default_cors_origins")] pub cors_allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self { port: default_port(), cors_allowed_origins: default_cors_origins() }
  }
}

#[derive(Clone, Debug, Deserialize)]
pub struct ResultsConfig {
  #[serde(default = "default_ttl_days")] pub ttl_days: i64,
  #[serde(default = "default_reap_interval")] pub reap_interval_secs: u64,
}

impl Default for ResultsConfig {
  fn default() -> Self {
    Self { ttl_days: default_ttl_days(), reap_interval_secs: default_reap_interval() }
  }
}

#[derive(Clone, Debug, Deserialize)]
pub struct WorkflowConfig {
  #[serde(default = "default_submit_timeout")] pub submit_timeout_secs: u64,
}

impl Default for WorkflowConfig {
  fn default() -> Self {
    Self { submit_timeout_secs: default_submit_timeout() }
  }
}

fn default_port() -> u16 { 5000 }
fn default_ttl_days() -> i64 { crate::lifecycle::DEFAULT_TTL_DAYS }
fn default_reap_interval() -> u64 { 3600 }
fn default_submit_timeout() -> u64 { 10 }

fn default_cors_origins() -> Vec<String> {
  ["http://localhost:3000", "http://localhost:3001", "http://localhost:3002"]
    .into_iter()
    .map(String::from)
    .collect()
}

/// Allowed CORS origins after resolving the `"*"` wildcard.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CorsOrigins {
  Any,
  List(Vec<String>),
}

/// Split a comma-separated origin list, dropping blanks.
pub fn parse_origin_list(raw: &str) -> Vec<String> {
  raw.split(',').map(str::trim).filter(|s| !s.is_empty()).map(String::from).collect()
}

impl AppConfig {
  pub fn from_toml_str(raw: &str, path: &str) -> Result<Self, ConfigError> {
    toml::from_str::<AppConfig>(raw).map_err(|source| ConfigError::Parse { path: path.to_string(), source })
  }

  pub fn from_file(path: &str) -> Result<Self, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read { path: path.to_string(), source })?;
    Self::from_toml_str(&raw, path)
  }

  /// Load from `ESSAY_CONFIG_PATH` (if set), then apply env overrides.
  pub fn load_from_env() -> Self {
    let mut cfg = match std::env::var(CONFIG_PATH_ENV) {
      Ok(path) => match Self::from_file(&path) {
        Ok(cfg) => {
          info!(target: "essay_backend", %path, "Loaded config (TOML)");
          cfg
        }
        Err(e) => {
          error!(target: "essay_backend", %path, error = %e, "Config unusable; using defaults");
          Self::default()
        }
      },
      Err(_) => {
        info!(target: "essay_backend", "No {} set; using defaults", CONFIG_PATH_ENV);
        Self::default()
      }
    };
    cfg.apply_env_overrides(|key| std::env::var(key).ok());
    cfg.enforce_limits();
    cfg
  }

  /// Reset any numeric setting outside its accepted range to the default, logging each one.
  pub fn enforce_limits(&mut self) {
    let ttl = self.results.ttl_days;
    if let Err(e) = check_range("results.ttl_days", ttl.into(), 1, MAX_TTL_DAYS.into()) {
      error!(target: "essay_backend", error = %e, "Rejecting setting; using default");
      self.results.ttl_days = default_ttl_days();
    }
    let reap = self.results.reap_interval_secs;
    if let Err(e) = check_range("results.reap_interval_secs", reap.into(), 1, MAX_REAP_INTERVAL_SECS.into()) {
      error!(target: "essay_backend", error = %e, "Rejecting setting; using default");
      self.results.reap_interval_secs = default_reap_interval();
    }
    let timeout = self.workflow.submit_timeout_secs;
    if let Err(e) = check_range("workflow.submit_timeout_secs", timeout.into(), 1, MAX_SUBMIT_TIMEOUT_SECS.into()) {
      error!(target: "essay_backend", error = %e, "Rejecting setting; using default");
      self.workflow.submit_timeout_secs = default_submit_timeout();
    }
  }

  /// `lookup` is `std::env::var` in production; injected so tests need not touch the process env.
  pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
    let port = lookup("PORT").or_else(|| lookup("SERVER_PORT"));
    if let Some(raw) = port {
      match raw.trim().parse::<u16>() {
        Ok(p) => self.server.port = p,
        Err(e) => warn!(target: "essay_backend", value = %raw, error = %e, "Ignoring invalid port override"),
      }
    }
    if let Some(raw) = lookup("CORS_ALLOWED_ORIGINS") {
      let origins = parse_origin_list(&raw);
      if !origins.is_empty() {
        self.server.cors_allowed_origins = origins;
      }
    }
  }

  pub fn cors_origins(&self) -> CorsOrigins {
    if self.server.cors_allowed_origins.iter().any(|o| o == "*") {
      CorsOrigins::Any
    } else {
      CorsOrigins::List(self.server.cors_allowed_origins.clone())
    }
  }

  pub fn checked_profile(&self) -> Result<ScoringProfile, ConfigError> {
    match &self.scoring {
      Some(profile) => {
        profile.validate()?;
        Ok(profile.clone())
      }
      None => Ok(ScoringProfile::default()),
    }
  }

  /// The configured profile if it validates, otherwise the built-in one.
  pub fn scoring_profile(&self) -> ScoringProfile {
    self.checked_profile().unwrap_or_else(|e| {
      error!(target: "scoring", error = %e, "Rejecting configured scoring profile; using built-in tables");
      ScoringProfile::default()
    })
  }

  /// Built-in tests followed by well-formed configured ones.
  pub fn test_bank(&self) -> Vec<EssayTest> {
    let mut bank = builtin_tests();
    for test in &self.tests {
      let mut test = test.clone();
      if let Err(number) = test.normalize_questions() {
        error!(target: "essay_backend", id = %test.id, question = number, "Skipping configured test: question numbers must run 1..n");
        continue;
      }
      bank.push(test);
    }
    bank
  }
}

#[cfg(test)]
mod tests {
  use std::collections::HashMap;

  use super::*;

  #[test]
  fn empty_file_yields_defaults() {
    let cfg = AppConfig::from_toml_str("", "inline").unwrap();
    assert_eq!(cfg.server.port, 5000);
    assert_eq!(cfg.server.cors_allowed_origins.len(), 3);
    assert_eq!(cfg.results.ttl_days, 30);
    assert_eq!(cfg.results.reap_interval_secs, 3600);
    assert_eq!(cfg.workflow.submit_timeout_secs, 10);
    assert!(cfg.scoring.is_none());
    assert_eq!(cfg.test_bank().len(), 1);
  }

  #[test]
  fn sections_override_defaults() {
    let raw = r#"
      [server]
      port = 8080
      cors_allowed_origins = ["*"]

      [results]
      ttl_days = 7

      [workflow]
      submit_timeout_secs = 3
    "#;
    let cfg = AppConfig::from_toml_str(raw, "inline").unwrap();
    assert_eq!(cfg.server.port, 8080);
    assert_eq!(cfg.cors_origins(), CorsOrigins::Any);
    assert_eq!(cfg.results.ttl_days, 7);
    assert_eq!(cfg.results.reap_interval_secs, 3600);
    assert_eq!(cfg.workflow.submit_timeout_secs, 3);
  }

  #[test]
  fn malformed_toml_is_a_parse_error() {
    let err = AppConfig::from_toml_str("[server\nport = ", "bad.toml").unwrap_err();
    assert!(matches!(err, ConfigError::Parse { ref path, .. } if path == "bad.toml"));
  }

  #[test]
  fn missing_file_is_a_read_error() {
    let err = AppConfig::from_file("/definitely/not/here.toml").unwrap_err();
    assert!(matches!(err, ConfigError::Read { .. }));
  }

  #[test]
  fn env_overrides_take_precedence() {
    let env: HashMap<&str, &str> = HashMap::from([
      ("SERVER_PORT", "6001"),
      ("CORS_ALLOWED_ORIGINS", " https://a.example , ,https://b.example"),
    ]);
    let mut cfg = AppConfig::default();
    cfg.apply_env_overrides(|k| env.get(k).map(|v| v.to_string()));
    assert_eq!(cfg.server.port, 6001);
    assert_eq!(
      cfg.cors_origins(),
      CorsOrigins::List(vec!["https://a.example".into(), "https://b.example".into()])
    );
  }

  #[test]
  fn port_prefers_port_and_ignores_garbage() {
    let mut cfg = AppConfig::default();
    cfg.apply_env_overrides(|k| match k {
      "PORT" => Some("7000".into()),
      "SERVER_PORT" => Some("7001".into()),
      _ => None,
    });
    assert_eq!(cfg.server.port, 7000);

    cfg.apply_env_overrides(|k| (k == "PORT").then(|| "not-a-port".to_string()));
    assert_eq!(cfg.server.port, 7000);
  }

  #[test]
  fn out_of_range_numbers_fall_back_to_defaults() {
    let raw = r#"
      [results]
      ttl_days = 0
      reap_interval_secs = 0

      [workflow]
      submit_timeout_secs = 9223372036854775807
    "#;
    let mut cfg = AppConfig::from_toml_str(raw, "inline").unwrap();
    cfg.enforce_limits();
    assert_eq!(cfg.results.ttl_days, 30);
    assert_eq!(cfg.results.reap_interval_secs, 3600);
    assert_eq!(cfg.workflow.submit_timeout_secs, 10);

    cfg.results.ttl_days = -5;
    cfg.enforce_limits();
    assert_eq!(cfg.results.ttl_days, 30);

    cfg.results.ttl_days = i64::MAX;
    cfg.enforce_limits();
    assert_eq!(cfg.results.ttl_days, 30);
  }

  #[test]
  fn in_range_numbers_are_kept() {
    let mut cfg = AppConfig::default();
    cfg.results.ttl_days = MAX_TTL_DAYS;
    cfg.results.reap_interval_secs = 1;
    cfg.workflow.submit_timeout_secs = MAX_SUBMIT_TIMEOUT_SECS;
    cfg.enforce_limits();
    assert_eq!(cfg.results.ttl_days, MAX_TTL_DAYS);
    assert_eq!(cfg.results.reap_interval_secs, 1);
    assert_eq!(cfg.workflow.submit_timeout_secs, MAX_SUBMIT_TIMEOUT_SECS);
    assert!(matches!(
      check_range("x", 0, 1, 2),
      Err(ConfigError::OutOfRange { field: "x", value: 0, .. })
    ));
  }

  #[test]
  fn invalid_profile_falls_back_to_default() {
    let mut profile = ScoringProfile::default();
    profile.questions[0].criteria[0].weight = 0.9;
    let cfg = AppConfig { scoring: Some(profile), ..AppConfig::default() };
    assert!(matches!(cfg.checked_profile(), Err(ConfigError::Profile(ProfileError::WeightSum { .. }))));
    assert_eq!(cfg.scoring_profile(), ScoringProfile::default());
  }

  #[test]
  fn configured_tests_are_appended_unless_numbering_is_broken() {
    let raw = r#"
      [[tests]]
      id = "extra-ok"
      title = "追加テスト"
      [[tests.questions]]
      id = "b"
      number = 2
      points = 70
      [[tests.questions]]
      id = "a"
      number = 1
      points = 30

      [[tests]]
      id = "extra-gap"
      title = "欠番"
      [[tests.questions]]
      id = "x"
      number = 1
      points = 30
      [[tests.questions]]
      id = "y"
      number = 3
      points = 70
    "#;
    let cfg = AppConfig::from_toml_str(raw, "inline").unwrap();
    let bank = cfg.test_bank();
    let ids: Vec<&str> = bank.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec![crate::seeds::CANONICAL_TEST_ID, "extra-ok"]);
    assert_eq!(bank[1].questions[0].id, "a");
  }
}
