//! The outcome of one import run.

use serde::Serialize;
use strum::Display;

/// How the availability pass went.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AvailabilityStatus {
  Ok,
  NoData,
  NotSupported,
  Error,
  NotConfigured,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportReport {
  pub imported:            usize,
  pub availability_count:  usize,
  pub availability_status: AvailabilityStatus,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub availability_error:  Option<String>,
}

/// A non-fatal problem met during the availability pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SoftCondition {
  NotSupported(String),
  Failed(String),
}

impl SoftCondition {
  fn message(&self) -> &str {
    match self {
      Self::NotSupported(m) | Self::Failed(m) => m,
    }
  }
}

/// Result of the availability pass, before it is folded into a report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct AvailabilityOutcome {
  pub count: usize,
  pub last:  Option<SoftCondition>,
}

impl AvailabilityOutcome {
  /// Only the most recent soft condition decides between `not_supported`
  /// and `error`.
  pub fn status(&self) -> AvailabilityStatus {
    match (&self.last, self.count) {
      (Some(SoftCondition::NotSupported(_)), _) => AvailabilityStatus::NotSupported,
      (Some(SoftCondition::Failed(_)), 0) => AvailabilityStatus::Error,
      (_, n) if n > 0 => AvailabilityStatus::Ok,
      _ => AvailabilityStatus::NoData,
    }
  }
}

impl ImportReport {
  pub(crate) fn new(imported: usize, outcome: Option<AvailabilityOutcome>) -> Self {
    match outcome {
      None => Self {
        imported,
        availability_count: 0,
        availability_status: AvailabilityStatus::NotConfigured,
        availability_error: None,
      },
      Some(outcome) => Self {
        imported,
        availability_count: outcome.count,
        availability_status: outcome.status(),
        availability_error: outcome.last.as_ref().map(|c| c.message().to_string()),
      },
    }
  }
}
