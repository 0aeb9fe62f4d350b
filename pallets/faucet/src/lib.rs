//! Faucet Pallet
//!
//! Rate-limited dispenser of native tokens held on a pallet-owned reserve account.
//!
//! - The owner (set at genesis) manages operators and tunables and can shut the faucet down.
//! - Operators register recipients, paying them an initial allotment. Operators are topped up
//!   from the reserve whenever their own balance falls below a threshold.
//! - Registered recipients request top-ups themselves, at most `MAX_RETRIES` times inside a
//!   window of `MinBlockDelay` blocks.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub use pallet::*;

pub mod admission;
pub mod record;
pub use admission::{Admission, MAX_RETRIES};
pub use record::{AccountRecord, RecordError};

#[cfg(test)]
mod mock;

#[cfg(feature = "runtime-benchmarks")]
mod benchmarking;

pub mod weights;
pub use weights::WeightInfo;

const LOG_TARGET: &str = "runtime::faucet";

#[frame::pallet]
pub mod pallet {
  use super::{AccountRecord, Admission, LOG_TARGET, WeightInfo, admission, record};
  use alloc::vec::Vec;
  use frame::deps::{
    frame_support::{
      PalletId,
      storage::with_storage_layer,
      traits::{
        fungible::{Inspect as NativeInspect, Mutate as NativeMutate},
        tokens::{Fortitude, Preservation},
      },
    },
    sp_core::U256,
    sp_runtime::traits::{AccountIdConversion, SaturatedConversion, TrailingZeroInput, Zero},
  };
  use frame::prelude::*;

  pub use primitives::Balance;

  /// Fixed-width encoded [`AccountRecord`] as kept in [`Recipients`].
  pub type RecordBlob = BoundedVec<u8, ConstU32<{ record::ENCODED_LEN }>>;

  /// Configuration trait for the faucet pallet
  #[pallet::config]
  pub trait Config: frame_system::Config<RuntimeEvent: From<Event<Self>>> {
    /// Native currency paid out by the faucet
    type Currency: NativeInspect<Self::AccountId, Balance = Balance>
      + NativeMutate<Self::AccountId, Balance = Balance>;

    /// The pallet ID; its derived account holds the reserve
    #[pallet::constant]
    type PalletId: Get<PalletId>;

    /// Maximum number of operators
    #[pallet::constant]
    type MaxOperators: Get<u32>;

    /// Default cooldown window in blocks
    #[pallet::constant]
    type DefaultMinBlockDelay: Get<BlockNumberFor<Self>>;

    /// Default amount paid per top-up
    #[pallet::constant]
    type DefaultTopupAmount: Get<Balance>;

    /// Default amount paid on registration
    #[pallet::constant]
    type DefaultInitialTopupAmount: Get<Balance>;

    /// Default balance below which operators are replenished
    #[pallet::constant]
    type DefaultOperatorThresholdBalance: Get<Balance>;

    /// Default amount sent to a replenished operator
    #[pallet::constant]
    type DefaultOperatorTransferBalance: Get<Balance>;

    /// Default reserve level that triggers a low balance event
    #[pallet::constant]
    type DefaultContractMinimumBalance: Get<Balance>;

    /// Weight information for extrinsics
    type WeightInfo: WeightInfo;
  }

  #[pallet::pallet]
  pub struct Pallet<T>(_);

  /// Faucet owner, fixed at genesis
  #[pallet::storage]
  #[pallet::getter(fn owner)]
  pub type Owner<T: Config> = StorageValue<_, T::AccountId, OptionQuery>;

  /// Operators allowed to register recipients, in insertion order
  #[pallet::storage]
  pub type Operators<T: Config> =
    StorageValue<_, BoundedVec<T::AccountId, T::MaxOperators>, ValueQuery>;

  /// Recipient ledger. Always read through [`Pallet::recipient`].
  #[pallet::storage]
  pub type Recipients<T: Config> =
    StorageMap<_, Blake2_128Concat, T::AccountId, RecordBlob, OptionQuery>;

  /// Number of distinct recipients ever registered
  #[pallet::storage]
  #[pallet::getter(fn total_recipients)]
  pub type TotalRecipients<T: Config> = StorageValue<_, u64, ValueQuery>;

  /// Cooldown window in blocks
  #[pallet::storage]
  #[pallet::getter(fn min_block_delay)]
  pub type MinBlockDelay<T: Config> =
    StorageValue<_, BlockNumberFor<T>, ValueQuery, T::DefaultMinBlockDelay>;

  /// Amount paid per top-up
  #[pallet::storage]
  #[pallet::getter(fn topup_amount)]
  pub type TopupAmount<T: Config> = StorageValue<_, Balance, ValueQuery, T::DefaultTopupAmount>;

  /// Default amount paid on registration
  #[pallet::storage]
  #[pallet::getter(fn initial_topup_amount)]
  pub type InitialTopupAmount<T: Config> =
    StorageValue<_, Balance, ValueQuery, T::DefaultInitialTopupAmount>;

  /// Operators below this balance are replenished
  #[pallet::storage]
  #[pallet::getter(fn operator_threshold_balance)]
  pub type OperatorThresholdBalance<T: Config> =
    StorageValue<_, Balance, ValueQuery, T::DefaultOperatorThresholdBalance>;

  /// Amount sent to a replenished operator
  #[pallet::storage]
  #[pallet::getter(fn operator_transfer_balance)]
  pub type OperatorTransferBalance<T: Config> =
    StorageValue<_, Balance, ValueQuery, T::DefaultOperatorTransferBalance>;

  /// Reserve level below which a low balance event is raised
  #[pallet::storage]
  #[pallet::getter(fn contract_minimum_balance)]
  pub type ContractMinimumBalance<T: Config> =
    StorageValue<_, Balance, ValueQuery, T::DefaultContractMinimumBalance>;

  /// Set once by `destruct`; every call is refused afterwards
  #[pallet::storage]
  #[pallet::getter(fn is_destroyed)]
  pub type Destroyed<T: Config> = StorageValue<_, bool, ValueQuery>;

  #[pallet::event]
  #[pallet::generate_deposit(pub(super) fn deposit_event)]
  pub enum Event<T: Config> {
    /// Operator added by the owner
    OperatorAdded { operator: T::AccountId },
    /// Operator removed by the owner
    OperatorRemoved { operator: T::AccountId },
    /// Operator balance topped up from the reserve
    OperatorReplenished {
      operator: T::AccountId,
      amount: Balance,
    },
    /// Recipient funded by an operator
    AddressRegistered {
      recipient: T::AccountId,
      amount: Balance,
    },
    /// Recipient topped itself up
    TopUp {
      recipient: T::AccountId,
      amount: Balance,
    },
    /// Reserve dropped below `ContractMinimumBalance`
    MinimumBalanceBelowThreshold { balance: Balance },
    /// Cooldown window changed
    MinBlockDelayUpdated {
      old_delay: BlockNumberFor<T>,
      new_delay: BlockNumberFor<T>,
    },
    /// Top-up amount changed
    TopupAmountUpdated {
      old_amount: Balance,
      new_amount: Balance,
    },
    /// Registration amount changed
    InitialTopupAmountUpdated {
      old_amount: Balance,
      new_amount: Balance,
    },
    /// Operator replenishment threshold changed
    OperatorThresholdBalanceUpdated {
      old_amount: Balance,
      new_amount: Balance,
    },
    /// Operator replenishment amount changed
    OperatorTransferBalanceUpdated {
      old_amount: Balance,
      new_amount: Balance,
    },
    /// Low reserve threshold changed
    ContractMinimumBalanceUpdated {
      old_amount: Balance,
      new_amount: Balance,
    },
    /// Reserve returned to the owner and faucet disabled
    FaucetDestroyed {
      beneficiary: T::AccountId,
      amount: Balance,
    },
  }

  #[pallet::error]
  pub enum Error<T> {
    /// Caller is not the owner
    NotOwner,
    /// Caller is not an operator
    NotOperator,
    /// Operator account is the zero account or the faucet itself
    InvalidOperator,
    /// Operator is already registered
    OperatorAlreadyExists,
    /// Operator is not registered
    OperatorNotFound,
    /// Operator set is full
    TooManyOperators,
    /// Zero amount not allowed
    ZeroAmount,
    /// Recipient was never registered
    NotRegistered,
    /// Retry limit reached inside the cooldown window
    RateLimited,
    /// Native transfer out of the reserve failed
    TransferFailed,
    /// Arithmetic overflow occurred
    ArithmeticOverflow,
    /// Stored recipient record cannot be decoded
    CorruptedRecord,
    /// Faucet has been destroyed
    FaucetDestroyed,
  }

  #[pallet::call]
  impl<T: Config> Pallet<T> {
    /// Add an operator (owner only).
    ///
    /// An operator below `OperatorThresholdBalance` receives `OperatorTransferBalance`.
    #[pallet::call_index(0)]
    #[pallet::weight(T::WeightInfo::add_operator())]
    pub fn add_operator(origin: OriginFor<T>, operator: T::AccountId) -> DispatchResult {
      Self::ensure_owner(origin)?;
      Self::ensure_active()?;
      ensure!(!Self::is_null_account(&operator), Error::<T>::InvalidOperator);
      Operators::<T>::try_mutate(|operators| -> DispatchResult {
        ensure!(
          !operators.contains(&operator),
          Error::<T>::OperatorAlreadyExists
        );
        operators
          .try_push(operator.clone())
          .map_err(|_| Error::<T>::TooManyOperators)?;
        Ok(())
      })?;
      Self::replenish_operator(&operator);
      Self::deposit_event(Event::OperatorAdded { operator });
      Ok(())
    }

    /// Remove an operator (owner only)
    #[pallet::call_index(1)]
    #[pallet::weight(T::WeightInfo::remove_operator())]
    pub fn remove_operator(origin: OriginFor<T>, operator: T::AccountId) -> DispatchResult {
      Self::ensure_owner(origin)?;
      Self::ensure_active()?;
      Operators::<T>::try_mutate(|operators| -> DispatchResult {
        let position = operators
          .iter()
          .position(|existing| existing == &operator)
          .ok_or(Error::<T>::OperatorNotFound)?;
        operators.remove(position);
        Ok(())
      })?;
      Self::deposit_event(Event::OperatorRemoved { operator });
      Ok(())
    }

    /// Fund `recipient` and record it in the ledger (operators only).
    ///
    /// `amount` defaults to `InitialTopupAmount`. Registering an existing recipient again adds
    /// to its total and restarts its window with no retries used.
    #[pallet::call_index(2)]
    #[pallet::weight(T::WeightInfo::register())]
    pub fn register(
      origin: OriginFor<T>,
      recipient: T::AccountId,
      amount: Option<Balance>,
    ) -> DispatchResult {
      let operator = ensure_signed(origin)?;
      Self::ensure_active()?;
      ensure!(Self::is_operator(&operator), Error::<T>::NotOperator);
      let amount = amount.unwrap_or_else(InitialTopupAmount::<T>::get);
      ensure!(!amount.is_zero(), Error::<T>::ZeroAmount);

      Self::replenish_operator(&operator);

      let now = Self::current_height();
      let existing = Self::recipient(&recipient)?;
      let record = match &existing {
        Some(record) => record
          .after_registration(amount, now)
          .ok_or(Error::<T>::ArithmeticOverflow)?,
        None => AccountRecord::registered(amount, now),
      };

      Self::disburse(&recipient, amount)?;

      if existing.is_none() {
        TotalRecipients::<T>::mutate(|total| *total = total.saturating_add(1));
      }
      Self::store_recipient(&recipient, &record);
      Self::deposit_event(Event::AddressRegistered { recipient, amount });
      Ok(())
    }

    /// Request `TopupAmount` for the caller, a registered recipient.
    #[pallet::call_index(3)]
    #[pallet::weight(T::WeightInfo::top_up())]
    pub fn top_up(origin: OriginFor<T>) -> DispatchResult {
      let who = ensure_signed(origin)?;
      Self::ensure_active()?;
      let mut record = Self::recipient(&who)?.ok_or(Error::<T>::NotRegistered)?;
      let now = Self::current_height();

      match admission::decide(Some(&record), now, Self::delay_in_blocks()) {
        Admission::LimitReached => return Err(Error::<T>::RateLimited.into()),
        Admission::CooledDown => {
          record.retry_count = 0;
          Self::store_recipient(&who, &record);
        }
        Admission::Unregistered | Admission::WithinWindow => {}
      }

      let amount = TopupAmount::<T>::get();
      ensure!(!amount.is_zero(), Error::<T>::ZeroAmount);
      let updated = record
        .after_top_up(amount, now)
        .ok_or(Error::<T>::ArithmeticOverflow)?;

      Self::disburse(&who, amount)?;

      Self::store_recipient(&who, &updated);
      Self::deposit_event(Event::TopUp {
        recipient: who,
        amount,
      });
      Self::check_reserve();
      Ok(())
    }

    /// Update the cooldown window (owner only)
    #[pallet::call_index(4)]
    #[pallet::weight(T::WeightInfo::set_min_block_delay())]
    pub fn set_min_block_delay(
      origin: OriginFor<T>,
      new_delay: BlockNumberFor<T>,
    ) -> DispatchResult {
      Self::ensure_owner(origin)?;
      Self::ensure_active()?;
      let old_delay = MinBlockDelay::<T>::get();
      MinBlockDelay::<T>::put(new_delay);
      Self::deposit_event(Event::MinBlockDelayUpdated {
        old_delay,
        new_delay,
      });
      Ok(())
    }

    /// Update the per-request top-up amount (owner only)
    #[pallet::call_index(5)]
    #[pallet::weight(T::WeightInfo::set_topup_amount())]
    pub fn set_topup_amount(origin: OriginFor<T>, new_amount: Balance) -> DispatchResult {
      Self::ensure_owner(origin)?;
      Self::ensure_active()?;
      let old_amount = TopupAmount::<T>::get();
      TopupAmount::<T>::put(new_amount);
      Self::deposit_event(Event::TopupAmountUpdated {
        old_amount,
        new_amount,
      });
      Ok(())
    }

    /// Update the registration amount (owner only)
    #[pallet::call_index(6)]
    #[pallet::weight(T::WeightInfo::set_initial_topup_amount())]
    pub fn set_initial_topup_amount(origin: OriginFor<T>, new_amount: Balance) -> DispatchResult {
      Self::ensure_owner(origin)?;
      Self::ensure_active()?;
      let old_amount = InitialTopupAmount::<T>::get();
      InitialTopupAmount::<T>::put(new_amount);
      Self::deposit_event(Event::InitialTopupAmountUpdated {
        old_amount,
        new_amount,
      });
      Ok(())
    }

    /// Update the operator replenishment threshold (owner only)
    #[pallet::call_index(7)]
    #[pallet::weight(T::WeightInfo::set_operator_threshold_balance())]
    pub fn set_operator_threshold_balance(
      origin: OriginFor<T>,
      new_amount: Balance,
    ) -> DispatchResult {
      Self::ensure_owner(origin)?;
      Self::ensure_active()?;
      let old_amount = OperatorThresholdBalance::<T>::get();
      OperatorThresholdBalance::<T>::put(new_amount);
      Self::deposit_event(Event::OperatorThresholdBalanceUpdated {
        old_amount,
        new_amount,
      });
      Ok(())
    }

    /// Update the operator replenishment amount (owner only)
    #[pallet::call_index(8)]
    #[pallet::weight(T::WeightInfo::set_operator_transfer_balance())]
    pub fn set_operator_transfer_balance(
      origin: OriginFor<T>,
      new_amount: Balance,
    ) -> DispatchResult {
      Self::ensure_owner(origin)?;
      Self::ensure_active()?;
      let old_amount = OperatorTransferBalance::<T>::get();
      OperatorTransferBalance::<T>::put(new_amount);
      Self::deposit_event(Event::OperatorTransferBalanceUpdated {
        old_amount,
        new_amount,
      });
      Ok(())
    }

    /// Update the low reserve threshold (owner only)
    #[pallet::call_index(9)]
    #[pallet::weight(T::WeightInfo::set_contract_minimum_balance())]
    pub fn set_contract_minimum_balance(
      origin: OriginFor<T>,
      new_amount: Balance,
    ) -> DispatchResult {
      Self::ensure_owner(origin)?;
      Self::ensure_active()?;
      let old_amount = ContractMinimumBalance::<T>::get();
      ContractMinimumBalance::<T>::put(new_amount);
      Self::deposit_event(Event::ContractMinimumBalanceUpdated {
        old_amount,
        new_amount,
      });
      Ok(())
    }

    /// Send the whole reserve to the owner and disable the faucet (owner only)
    #[pallet::call_index(10)]
    #[pallet::weight(T::WeightInfo::destruct())]
    pub fn destruct(origin: OriginFor<T>) -> DispatchResult {
      let owner = Self::ensure_owner(origin)?;
      Self::ensure_active()?;
      let amount = T::Currency::reducible_balance(
        &Self::account_id(),
        Preservation::Expendable,
        Fortitude::Polite,
      );
      if !amount.is_zero() {
        Self::disburse(&owner, amount)?;
      }
      Destroyed::<T>::put(true);
      Self::deposit_event(Event::FaucetDestroyed {
        beneficiary: owner,
        amount,
      });
      Ok(())
    }
  }

  impl<T: Config> Pallet<T> {
    /// Reserve account
    pub fn account_id() -> T::AccountId {
      T::PalletId::get().into_account_truncating()
    }

    pub fn is_owner(who: &T::AccountId) -> bool {
      Owner::<T>::get().as_ref() == Some(who)
    }

    pub fn is_operator(who: &T::AccountId) -> bool {
      Operators::<T>::get().contains(who)
    }

    /// Operators in insertion order
    pub fn list_operators() -> Vec<T::AccountId> {
      Operators::<T>::get().into_inner()
    }

    /// Decode the ledger entry of `who`. Absent and empty entries are `None`.
    pub fn recipient(who: &T::AccountId) -> Result<Option<AccountRecord>, Error<T>> {
      match Recipients::<T>::get(who) {
        None => Ok(None),
        Some(blob) => record::decode(&blob).map_err(|err| {
          log::error!(target: LOG_TARGET, "undecodable record for {:?}: {:?}", who, err);
          Error::<T>::CorruptedRecord
        }),
      }
    }

    pub fn is_registered(who: &T::AccountId) -> bool {
      matches!(Self::recipient(who), Ok(Some(_)))
    }

    pub fn recipient_retry_count(who: &T::AccountId) -> Option<u32> {
      Self::recipient(who).ok().flatten().map(|r| r.retry_count)
    }

    /// Total paid out to `who`, zero for unknown accounts
    pub fn recipient_total(who: &T::AccountId) -> U256 {
      Self::recipient(who)
        .ok()
        .flatten()
        .map(|r| r.total_received)
        .unwrap_or_default()
    }

    pub fn recipient_last_request_block(who: &T::AccountId) -> Option<u64> {
      Self::recipient(who)
        .ok()
        .flatten()
        .map(|r| r.last_request_height)
    }

    /// Whether a request by `who` would pass the rate limit at the current block.
    ///
    /// Read-only: an elapsed window is reported as admitted but only reset by `top_up`.
    /// Always `false` once the faucet is destroyed.
    pub fn can_request(who: &T::AccountId) -> bool {
      if Destroyed::<T>::get() {
        return false;
      }
      match Self::recipient(who) {
        Ok(record) => {
          admission::decide(record.as_ref(), Self::current_height(), Self::delay_in_blocks())
            .is_admitted()
        }
        Err(_) => false,
      }
    }

    pub(crate) fn store_recipient(who: &T::AccountId, entry: &AccountRecord) {
      let blob = RecordBlob::truncate_from(record::encode(entry).to_vec());
      Recipients::<T>::insert(who, blob);
    }

    fn ensure_owner(origin: OriginFor<T>) -> Result<T::AccountId, DispatchError> {
      let who = ensure_signed(origin)?;
      ensure!(Self::is_owner(&who), Error::<T>::NotOwner);
      Ok(who)
    }

    fn ensure_active() -> DispatchResult {
      ensure!(!Destroyed::<T>::get(), Error::<T>::FaucetDestroyed);
      Ok(())
    }

    /// The all-zero account or the reserve account itself
    fn is_null_account(who: &T::AccountId) -> bool {
      let zero = T::AccountId::decode(&mut TrailingZeroInput::zeroes()).ok();
      zero.as_ref() == Some(who) || *who == Self::account_id()
    }

    fn current_height() -> u64 {
      frame_system::Pallet::<T>::block_number().saturated_into()
    }

    fn delay_in_blocks() -> u64 {
      MinBlockDelay::<T>::get().saturated_into()
    }

    /// Pay `amount` out of the reserve. Nothing is recorded here; callers write the ledger
    /// only once this returned `Ok`.
    fn disburse(recipient: &T::AccountId, amount: Balance) -> DispatchResult {
      T::Currency::transfer(
        &Self::account_id(),
        recipient,
        amount,
        Preservation::Expendable,
      )
      .map(|_| ())
      .map_err(|err| {
        log::warn!(
          target: LOG_TARGET,
          "transfer of {} to {:?} failed: {:?}",
          amount,
          recipient,
          err
        );
        Error::<T>::TransferFailed.into()
      })
    }

    /// Top `operator` up to working balance if it fell below the threshold.
    ///
    /// Best effort: a failed transfer is logged and leaves no trace in storage.
    fn replenish_operator(operator: &T::AccountId) {
      if T::Currency::balance(operator) >= OperatorThresholdBalance::<T>::get() {
        return;
      }
      let amount = OperatorTransferBalance::<T>::get();
      match with_storage_layer(|| Self::disburse(operator, amount)) {
        Ok(()) => Self::deposit_event(Event::OperatorReplenished {
          operator: operator.clone(),
          amount,
        }),
        Err(_) => {
          log::info!(target: LOG_TARGET, "operator {:?} left unreplenished", operator)
        }
      }
    }

    fn check_reserve() {
      let balance = T::Currency::balance(&Self::account_id());
      if balance < ContractMinimumBalance::<T>::get() {
        Self::deposit_event(Event::MinimumBalanceBelowThreshold { balance });
      }
    }
  }

  /// Genesis configuration: the owner and the initial operator set
  #[pallet::genesis_config]
  #[derive(frame::prelude::DefaultNoBound)]
  pub struct GenesisConfig<T: Config> {
    pub owner: Option<T::AccountId>,
    pub operators: Vec<T::AccountId>,
  }

  #[pallet::genesis_build]
  impl<T: Config> BuildGenesisConfig for GenesisConfig<T> {
    fn build(&self) {
      // Reserve account survives zero native balance via provider reference
      frame_system::Pallet::<T>::inc_providers(&Pallet::<T>::account_id());
      if let Some(owner) = &self.owner {
        Owner::<T>::put(owner);
      }
      let mut operators = BoundedVec::<T::AccountId, T::MaxOperators>::default();
      for operator in &self.operators {
        assert!(
          !operators.contains(operator),
          "duplicate operator in faucet genesis"
        );
        operators
          .try_push(operator.clone())
          .expect("faucet genesis operators exceed MaxOperators");
      }
      Operators::<T>::put(operators);
    }
  }
}
