use crate as pallet_faucet;
use polkadot_sdk::frame_support::{
  PalletId, construct_runtime, derive_impl,
  traits::{ConstU32, ConstU64, ConstU128, Get},
};
use polkadot_sdk::frame_system;
use polkadot_sdk::sp_runtime::{
  BuildStorage,
  testing::H256,
  traits::{BlakeTwo256, IdentityLookup},
};
use primitives::ecosystem::params::{
  CONTRACT_MINIMUM_BALANCE, INITIAL_TOPUP_AMOUNT, MIN_BLOCK_DELAY, OPERATOR_THRESHOLD_BALANCE,
  OPERATOR_TRANSFER_BALANCE, TOPUP_AMOUNT, UNIT,
};

pub const OWNER: u64 = 1;
pub const OPERATOR: u64 = 2;
pub const OPERATOR_2: u64 = 3;
pub const ALICE: u64 = 10;
pub const BOB: u64 = 11;
pub const STRANGER: u64 = 99;

/// Reserve the faucet starts with (500.0)
pub const INITIAL_RESERVE: u128 = 500 * UNIT;
pub const OWNER_BALANCE: u128 = UNIT / 10;
pub const MAX_OPERATORS: u32 = 4;

type Block = frame_system::mocking::MockBlock<Test>;

construct_runtime!(
  pub struct Test {
    System: frame_system,
    Balances: polkadot_sdk::pallet_balances,
    Faucet: pallet_faucet,
  }
);

#[derive_impl(frame_system::config_preludes::TestDefaultConfig)]
impl frame_system::Config for Test {
  type Block = Block;
  type AccountId = u64;
  type Lookup = IdentityLookup<Self::AccountId>;
  type Hash = H256;
  type Hashing = BlakeTwo256;
  type AccountData = polkadot_sdk::pallet_balances::AccountData<u128>;
}

impl polkadot_sdk::pallet_balances::Config for Test {
  type MaxLocks = ();
  type MaxReserves = ();
  type ReserveIdentifier = [u8; 8];
  type Balance = u128;
  type DustRemoval = ();
  type RuntimeEvent = RuntimeEvent;
  type ExistentialDeposit = ConstU128<1>;
  type AccountStore = System;
  type WeightInfo = ();
  type FreezeIdentifier = ();
  type MaxFreezes = ();
  type RuntimeHoldReason = RuntimeHoldReason;
  type RuntimeFreezeReason = RuntimeFreezeReason;
  type DoneSlashHandler = ();
}

pub struct FaucetPalletId;
impl Get<PalletId> for FaucetPalletId {
  fn get() -> PalletId {
    PalletId(*primitives::pallet_ids::FAUCET_PALLET_ID)
  }
}

impl pallet_faucet::Config for Test {
  type Currency = Balances;
  type PalletId = FaucetPalletId;
  type MaxOperators = ConstU32<{ MAX_OPERATORS }>;
  type DefaultMinBlockDelay = ConstU64<{ MIN_BLOCK_DELAY }>;
  type DefaultTopupAmount = ConstU128<{ TOPUP_AMOUNT }>;
  type DefaultInitialTopupAmount = ConstU128<{ INITIAL_TOPUP_AMOUNT }>;
  type DefaultOperatorThresholdBalance = ConstU128<{ OPERATOR_THRESHOLD_BALANCE }>;
  type DefaultOperatorTransferBalance = ConstU128<{ OPERATOR_TRANSFER_BALANCE }>;
  type DefaultContractMinimumBalance = ConstU128<{ CONTRACT_MINIMUM_BALANCE }>;
  type WeightInfo = ();
}

pub fn new_test_ext() -> polkadot_sdk::sp_io::TestExternalities {
  new_test_ext_with_operators(vec![])
}

/// Test externalities with `operators` seeded through the faucet genesis
pub fn new_test_ext_with_operators(operators: Vec<u64>) -> polkadot_sdk::sp_io::TestExternalities {
  let mut t = frame_system::GenesisConfig::<Test>::default()
    .build_storage()
    .unwrap();

  polkadot_sdk::pallet_balances::GenesisConfig::<Test> {
    balances: vec![
      (Faucet::account_id(), INITIAL_RESERVE),
      (OWNER, OWNER_BALANCE),
    ],
    dev_accounts: None,
  }
  .assimilate_storage(&mut t)
  .unwrap();

  pallet_faucet::GenesisConfig::<Test> {
    owner: Some(OWNER),
    operators,
  }
  .assimilate_storage(&mut t)
  .unwrap();

  let mut ext: polkadot_sdk::sp_io::TestExternalities = t.into();
  // Events are only recorded from block 1 onwards
  ext.execute_with(|| System::set_block_number(1));
  ext
}

/// Move the chain to block `n`
pub fn run_to_block(n: u64) {
  System::set_block_number(n);
}
