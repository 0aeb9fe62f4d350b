//! Rate limiting state machine.
//!
//! The state of a recipient is never stored; it is derived from its ledger record and the
//! current block on every request.

use crate::record::AccountRecord;

pub use primitives::params::MAX_RETRIES;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Admission {
  /// No record yet. Always admitted.
  Unregistered,
  /// The cooldown window has elapsed and the retry counter starts over.
  CooledDown,
  /// Inside the window with retries left.
  WithinWindow,
  /// Inside the window with no retries left.
  LimitReached,
}

impl Admission {
  pub fn is_admitted(self) -> bool {
    !matches!(self, Admission::LimitReached)
  }
}

/// Classify a request made at block `now` against a window of `min_delay` blocks.
pub fn decide(record: Option<&AccountRecord>, now: u64, min_delay: u64) -> Admission {
  let Some(record) = record else {
    return Admission::Unregistered;
  };
  if now.saturating_sub(record.last_request_height) >= min_delay {
    Admission::CooledDown
  } else if record.retry_count < MAX_RETRIES {
    Admission::WithinWindow
  } else {
    Admission::LimitReached
  }
}
