//! Deadline arithmetic and classification.
//!
//! Nothing here reads the system clock: every function takes `now` as an
//! argument, so classifying two cases concurrently needs no shared state.

use chrono::{DateTime, Months, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

const SECONDS_PER_DAY: i64 = 86_400;

// ─── Period ──────────────────────────────────────────────────────────────────

/// A statutory or SLA period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "unit", content = "count", rename_all = "snake_case")]
pub enum Period {
  Days(u32),
  /// Calendar months; the day of month is clamped to the target month's
  /// length (31 Jan + 1 month = 28/29 Feb).
  Months(u32),
}

impl Period {
  /// The instant `self` after `start`, or `None` on overflow.
  pub fn after(self, start: DateTime<Utc>) -> Option<DateTime<Utc>> {
    match self {
      Self::Days(n) => start.checked_add_signed(TimeDelta::days(i64::from(n))),
      Self::Months(n) => start.checked_add_months(Months::new(n)),
    }
  }
}

// ─── Classification ──────────────────────────────────────────────────────────

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DeadlineBucket {
  None,
  Overdue,
  #[serde(alias = "dueSoon")]
  #[strum(to_string = "due_soon", serialize = "dueSoon")]
  DueSoon,
  Normal,
}

/// The result of [`classify`]; a projection, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
  pub bucket:     DeadlineBucket,
  /// `ceil((deadline - now) / 1 day)`; at most `-1` once the deadline has
  /// passed. `None` when there is no deadline.
  pub days_delta: Option<i64>,
}

impl Classification {
  pub const NONE: Self = Self {
    bucket:     DeadlineBucket::None,
    days_delta: None,
  };
}

/// Classify `deadline` relative to `now`.
///
/// - no deadline → `none`
/// - `deadline < now` → `overdue`
/// - `0 <= days_delta <= due_soon_days` → `due_soon`
/// - otherwise → `normal`
pub fn classify(
  deadline: Option<DateTime<Utc>>,
  now: DateTime<Utc>,
  due_soon_days: i64,
) -> Classification {
  let Some(deadline) = deadline else {
    return Classification::NONE;
  };

  let delta = day_delta(deadline, now);

  if deadline < now {
    return Classification {
      bucket:     DeadlineBucket::Overdue,
      days_delta: Some(delta.min(-1)),
    };
  }

  let bucket = if delta <= due_soon_days {
    DeadlineBucket::DueSoon
  } else {
    DeadlineBucket::Normal
  };
  Classification {
    bucket,
    days_delta: Some(delta),
  }
}

/// `ceil((deadline - now) / 1 day)`.
fn day_delta(deadline: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
  let secs = (deadline - now).num_seconds();
  let floor = secs.div_euclid(SECONDS_PER_DAY);
  if secs.rem_euclid(SECONDS_PER_DAY) == 0 {
    floor
  } else {
    floor + 1
  }
}
