// Transfer Port - the ledger's only way to move stable-token value

use crate::identity::Address;
use std::sync::Arc;
use thiserror::Error;

/// Errors reported by a transfer port
///
/// Any error means no balance changed on either side.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransferError {
    #[error("Insufficient balance: available {available}, required {required}")]
    InsufficientBalance { available: u64, required: u64 },

    #[error("Balance would overflow")]
    Overflow,

    #[error("Transfer amount must be positive")]
    ZeroAmount,

    #[error("Transfer rejected: {0}")]
    Rejected(String),
}

/// Capability for moving stable-token value between accounts
///
/// `transfer_in` pulls funds from an account into ledger custody,
/// `transfer_out` pays funds from custody to an account. Both are
/// all-or-nothing: `Ok` is a durable commitment, `Err` leaves both
/// balances untouched.
pub trait TransferPort: Send + Sync {
    /// Address of the stable token this port moves
    fn token_address(&self) -> &Address;

    /// Move `amount` from `from` into custody account `to`
    fn transfer_in(&self, from: &Address, to: &Address, amount: u64) -> Result<(), TransferError>;

    /// Move `amount` out of custody account `from` to `to`
    fn transfer_out(&self, from: &Address, to: &Address, amount: u64) -> Result<(), TransferError>;
}

impl<T: TransferPort + ?Sized> TransferPort for Arc<T> {
    fn token_address(&self) -> &Address {
        (**self).token_address()
    }

    fn transfer_in(&self, from: &Address, to: &Address, amount: u64) -> Result<(), TransferError> {
        (**self).transfer_in(from, to, amount)
    }

    fn transfer_out(&self, from: &Address, to: &Address, amount: u64) -> Result<(), TransferError> {
        (**self).transfer_out(from, to, amount)
    }
}
