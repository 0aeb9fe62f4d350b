#![cfg(feature = "runtime-benchmarks")]

use crate::*;
use polkadot_sdk::frame_benchmarking::{account, v2::*};
use polkadot_sdk::frame_support::traits::{Get, fungible::Mutate};
use polkadot_sdk::frame_system::{self, RawOrigin};
use polkadot_sdk::sp_runtime::traits::{One, Saturating};
use primitives::params::UNIT;

fn setup_owner<T: Config>() -> T::AccountId {
  let owner: T::AccountId = whitelisted_caller();
  Owner::<T>::put(&owner);
  owner
}

fn fund_reserve<T: Config>() {
  T::Currency::set_balance(&Pallet::<T>::account_id(), 1_000_000 * UNIT);
}

/// Fill the operator set with `count` fresh accounts, `account("operator", 0, 0)` first
fn fill_operators<T: Config>(count: u32) {
  Operators::<T>::mutate(|operators| {
    for i in 0..count {
      let _ = operators.try_push(account("operator", i, 0));
    }
  });
}

#[benchmarks]
mod benches {
  use super::*;

  #[benchmark]
  fn add_operator() {
    let owner = setup_owner::<T>();
    fund_reserve::<T>();
    fill_operators::<T>(T::MaxOperators::get().saturating_sub(1));
    // Zero balance forces the replenishment transfer
    let operator: T::AccountId = account("new_operator", 0, 0);

    #[extrinsic_call]
    add_operator(RawOrigin::Signed(owner), operator.clone());

    assert!(Pallet::<T>::is_operator(&operator));
  }

  #[benchmark]
  fn remove_operator() {
    let owner = setup_owner::<T>();
    let count = T::MaxOperators::get();
    fill_operators::<T>(count);
    let operator: T::AccountId = account("operator", count - 1, 0);

    #[extrinsic_call]
    remove_operator(RawOrigin::Signed(owner), operator.clone());

    assert!(!Pallet::<T>::is_operator(&operator));
  }

  #[benchmark]
  fn register() {
    setup_owner::<T>();
    fund_reserve::<T>();
    fill_operators::<T>(T::MaxOperators::get());
    let operator: T::AccountId = account("operator", 0, 0);
    let recipient: T::AccountId = account("recipient", 0, 0);

    #[extrinsic_call]
    register(RawOrigin::Signed(operator), recipient.clone(), None);

    assert!(Pallet::<T>::is_registered(&recipient));
    assert_eq!(TotalRecipients::<T>::get(), 1);
  }

  #[benchmark]
  fn top_up() {
    fund_reserve::<T>();
    let caller: T::AccountId = whitelisted_caller();
    // Window elapsed with the counter exhausted: the reset is written before the payout
    let exhausted = AccountRecord {
      retry_count: MAX_RETRIES,
      ..AccountRecord::registered(UNIT, 0)
    };
    Pallet::<T>::store_recipient(&caller, &exhausted);
    frame_system::Pallet::<T>::set_block_number(
      MinBlockDelay::<T>::get().saturating_add(One::one()),
    );
    // Reserve always reported as low
    ContractMinimumBalance::<T>::put(Balance::MAX);

    #[extrinsic_call]
    top_up(RawOrigin::Signed(caller.clone()));

    assert_eq!(Pallet::<T>::recipient_retry_count(&caller), Some(1));
  }

  #[benchmark]
  fn set_min_block_delay() {
    let owner = setup_owner::<T>();
    let new_delay = MinBlockDelay::<T>::get().saturating_add(One::one());

    #[extrinsic_call]
    set_min_block_delay(RawOrigin::Signed(owner), new_delay);

    assert_eq!(MinBlockDelay::<T>::get(), new_delay);
  }

  #[benchmark]
  fn set_topup_amount() {
    let owner = setup_owner::<T>();

    #[extrinsic_call]
    set_topup_amount(RawOrigin::Signed(owner), 2 * UNIT);

    assert_eq!(TopupAmount::<T>::get(), 2 * UNIT);
  }

  #[benchmark]
  fn set_initial_topup_amount() {
    let owner = setup_owner::<T>();

    #[extrinsic_call]
    set_initial_topup_amount(RawOrigin::Signed(owner), UNIT);
  }

  #[benchmark]
  fn set_operator_threshold_balance() {
    let owner = setup_owner::<T>();

    #[extrinsic_call]
    set_operator_threshold_balance(RawOrigin::Signed(owner), 2 * UNIT);
  }

  #[benchmark]
  fn set_operator_transfer_balance() {
    let owner = setup_owner::<T>();

    #[extrinsic_call]
    set_operator_transfer_balance(RawOrigin::Signed(owner), 20 * UNIT);
  }

  #[benchmark]
  fn set_contract_minimum_balance() {
    let owner = setup_owner::<T>();

    #[extrinsic_call]
    set_contract_minimum_balance(RawOrigin::Signed(owner), 20 * UNIT);
  }

  #[benchmark]
  fn destruct() {
    let owner = setup_owner::<T>();
    fund_reserve::<T>();

    #[extrinsic_call]
    destruct(RawOrigin::Signed(owner));

    assert!(Destroyed::<T>::get());
  }

  #[cfg(test)]
  use crate::mock::{Test, new_test_ext};
  #[cfg(test)]
  impl_benchmark_test_suite!(Pallet, new_test_ext(), Test);
}
