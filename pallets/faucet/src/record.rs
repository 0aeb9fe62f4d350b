//! Recipient ledger entries and their fixed-width storage layout.
//!
//! A record is persisted as exactly [`ENCODED_LEN`] bytes:
//!
//! | bytes    | field                 | encoding              |
//! |----------|-----------------------|-----------------------|
//! | `0..4`   | `retry_count`         | `u32`, big-endian     |
//! | `4..36`  | `total_received`      | 256-bit, big-endian   |
//! | `36..44` | `last_request_height` | `u64`, big-endian     |
//!
//! An empty blob means "never registered" and is never produced by [`encode`].

use crate::admission::MAX_RETRIES;
use frame::deps::sp_core::U256;

/// Size of an encoded [`AccountRecord`].
pub const ENCODED_LEN: u32 = 44;

const RETRY_LEN: usize = 4;
const TOTAL_LEN: usize = 32;

/// Faucet history of a single recipient.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AccountRecord {
  /// Requests made inside the current cooldown window, at most `MAX_RETRIES`.
  pub retry_count: u32,
  /// Everything ever paid out to the recipient.
  pub total_received: U256,
  /// Block of the latest successful payout.
  pub last_request_height: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecordError {
  /// Stored blob is neither empty nor `ENCODED_LEN` bytes long.
  InvalidLength(usize),
}

impl AccountRecord {
  /// Record of a recipient funded for the first time.
  pub fn registered(amount: u128, now: u64) -> Self {
    Self {
      retry_count: 0,
      total_received: U256::from(amount),
      last_request_height: now,
    }
  }

  /// Record after an operator funded an already registered recipient again.
  ///
  /// The total keeps accumulating while the window starts over at `now` with no retries
  /// used. Returns `None` if the total would overflow.
  pub fn after_registration(&self, amount: u128, now: u64) -> Option<Self> {
    Some(Self {
      retry_count: 0,
      total_received: self.total_received.checked_add(U256::from(amount))?,
      last_request_height: now.max(self.last_request_height),
    })
  }

  /// Record after a successful top-up at block `now`.
  ///
  /// A counter already at the limit restarts at 1: the payout itself opens the next cycle.
  /// Returns `None` if the total would overflow.
  pub fn after_top_up(&self, amount: u128, now: u64) -> Option<Self> {
    let retry_count = if self.retry_count >= MAX_RETRIES {
      1
    } else {
      self.retry_count.saturating_add(1)
    };
    Some(Self {
      retry_count,
      total_received: self.total_received.checked_add(U256::from(amount))?,
      last_request_height: now.max(self.last_request_height),
    })
  }
}

/// Serialize a record into its fixed-width layout.
pub fn encode(record: &AccountRecord) -> [u8; ENCODED_LEN as usize] {
  let mut out = [0u8; ENCODED_LEN as usize];
  out[..RETRY_LEN].copy_from_slice(&record.retry_count.to_be_bytes());
  // `byte(0)` is the least significant byte.
  for i in 0..TOTAL_LEN {
    out[RETRY_LEN + TOTAL_LEN - 1 - i] = record.total_received.byte(i);
  }
  out[RETRY_LEN + TOTAL_LEN..].copy_from_slice(&record.last_request_height.to_be_bytes());
  out
}

/// Parse a stored blob. An empty blob decodes to `None`.
pub fn decode(bytes: &[u8]) -> Result<Option<AccountRecord>, RecordError> {
  if bytes.is_empty() {
    return Ok(None);
  }
  let invalid = || RecordError::InvalidLength(bytes.len());
  if bytes.len() != ENCODED_LEN as usize {
    return Err(invalid());
  }
  let (retry, rest) = bytes.split_at(RETRY_LEN);
  let (total, height) = rest.split_at(TOTAL_LEN);
  Ok(Some(AccountRecord {
    retry_count: u32::from_be_bytes(retry.try_into().map_err(|_| invalid())?),
    total_received: U256::from_big_endian(total),
    last_request_height: u64::from_be_bytes(height.try_into().map_err(|_| invalid())?),
  }))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn layout_is_big_endian_and_ordered() {
    let record = AccountRecord {
      retry_count: 2,
      total_received: U256::from(0x0102u64),
      last_request_height: 0x0a0b,
    };
    let bytes = encode(&record);
    assert_eq!(bytes.len(), 44);
    assert_eq!(&bytes[..4], &[0, 0, 0, 2]);
    assert!(bytes[4..34].iter().all(|b| *b == 0));
    assert_eq!(&bytes[34..36], &[0x01, 0x02]);
    assert_eq!(&bytes[36..], &[0, 0, 0, 0, 0, 0, 0x0a, 0x0b]);
  }

  #[test]
  fn decode_inverts_encode() {
    let records = [
      AccountRecord::default(),
      AccountRecord::registered(500_000_000_000_000_000, 1),
      AccountRecord {
        retry_count: MAX_RETRIES,
        total_received: U256::MAX,
        last_request_height: u64::MAX,
      },
    ];
    for record in records {
      assert_eq!(decode(&encode(&record)), Ok(Some(record)));
    }
  }

  #[test]
  fn zero_record_is_not_absent() {
    let bytes = encode(&AccountRecord::default());
    assert_eq!(decode(&bytes), Ok(Some(AccountRecord::default())));
    assert_eq!(decode(&[]), Ok(None));
  }

  #[test]
  fn truncated_blob_is_rejected() {
    let bytes = encode(&AccountRecord::registered(7, 3));
    assert_eq!(decode(&bytes[..43]), Err(RecordError::InvalidLength(43)));
    assert_eq!(decode(&[0u8; 45]), Err(RecordError::InvalidLength(45)));
  }

  #[test]
  fn top_up_counts_and_restarts_cycle() {
    let record = AccountRecord::registered(10, 1);
    let first = record.after_top_up(5, 2).unwrap();
    assert_eq!(first.retry_count, 1);
    assert_eq!(first.total_received, U256::from(15u64));
    assert_eq!(first.last_request_height, 2);

    let at_limit = AccountRecord {
      retry_count: MAX_RETRIES,
      ..first
    };
    assert_eq!(at_limit.after_top_up(5, 9).unwrap().retry_count, 1);
  }

  #[test]
  fn overflowing_total_is_refused() {
    let record = AccountRecord {
      total_received: U256::MAX,
      ..Default::default()
    };
    assert_eq!(record.after_top_up(1, 1), None);
    assert_eq!(record.after_registration(1, 1), None);
  }

  #[test]
  fn re_registration_opens_fresh_window() {
    let record = AccountRecord {
      retry_count: MAX_RETRIES,
      total_received: U256::from(4u64),
      last_request_height: 5,
    };
    let updated = record.after_registration(6, 8).unwrap();
    assert_eq!(updated.retry_count, 0);
    assert_eq!(updated.total_received, U256::from(10u64));
    assert_eq!(updated.last_request_height, 8);
  }
}
