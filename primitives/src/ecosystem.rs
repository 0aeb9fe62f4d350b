//! Ecosystem Constants for the Faucet Chain
//!
//! This module centralizes the faucet's pallet ID, unit of account and the default
//! tunables used by runtime configurations and test mocks.

/// Balance type alias for consistency across ecosystem
pub type Balance = u128;

/// Block number type used by the faucet's account records.
pub type BlockNumber = u64;

/// Pallet identifiers for deriving pallet-owned accounts.
///
/// The faucet reserve lives on the account derived from this ID via
/// `PalletId::into_account_truncating()`.
pub mod pallet_ids {
  /// Faucet pallet ID (rate-limited native token dispenser)
  pub const FAUCET_PALLET_ID: &[u8; 8] = b"py/fauct";
}

/// Default faucet parameters.
///
/// Every amount is expressed in base units. The owner can override each of them
/// on-chain; these values only seed storage.
pub mod params {
  use super::{Balance, BlockNumber};

  /// One whole native token (10^18 base units).
  pub const UNIT: Balance = 1_000_000_000_000_000_000;

  /// Requests a recipient may make inside one cooldown window.
  pub const MAX_RETRIES: u32 = 3;

  /// Cooldown window in blocks (24h at 10s/block).
  pub const MIN_BLOCK_DELAY: BlockNumber = 8_640;

  /// Amount paid out on every regular top-up (1.0).
  pub const TOPUP_AMOUNT: Balance = UNIT;

  /// Amount paid out when an operator registers a new recipient (0.5).
  pub const INITIAL_TOPUP_AMOUNT: Balance = UNIT / 2;

  /// Operators below this balance get replenished before they act (1.0).
  pub const OPERATOR_THRESHOLD_BALANCE: Balance = UNIT;

  /// Amount sent to an operator on replenishment (10.0).
  pub const OPERATOR_TRANSFER_BALANCE: Balance = 10 * UNIT;

  /// Reserve level below which the faucet raises a low balance event (10.0).
  pub const CONTRACT_MINIMUM_BALANCE: Balance = 10 * UNIT;

  /// Upper bound on the operator set.
  pub const MAX_OPERATORS: u32 = 32;
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn pallet_ids_are_correct_length() {
    assert_eq!(pallet_ids::FAUCET_PALLET_ID.len(), 8);
  }

  #[test]
  fn replenishment_lifts_operator_above_threshold() {
    assert!(params::OPERATOR_TRANSFER_BALANCE > params::OPERATOR_THRESHOLD_BALANCE);
  }

  #[test]
  fn registration_pays_less_than_a_top_up() {
    assert!(params::INITIAL_TOPUP_AMOUNT > 0);
    assert!(params::INITIAL_TOPUP_AMOUNT < params::TOPUP_AMOUNT);
  }
}
