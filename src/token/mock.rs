// Mock transfer port for testing ledger behaviour around transfer failures

use crate::identity::Address;
use crate::token::traits::{TransferError, TransferPort};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

/// Direction of a recorded transfer
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransferDirection {
    In,
    Out,
}

/// A transfer the mock accepted
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordedTransfer {
    pub direction: TransferDirection,
    pub from: Address,
    pub to: Address,
    pub amount: u64,
}

/// Mock implementation of TransferPort (defaults to success)
pub struct MockTransferPort {
    token: Address,
    should_succeed: bool,
    failure_message: Option<String>,
    failures_before_success: usize,
    successes_before_failure: Option<usize>,
    call_count: AtomicUsize,
    accepted: Mutex<Vec<RecordedTransfer>>,
}

impl MockTransferPort {
    /// Create a mock port that accepts every transfer
    pub fn new(token: Address) -> Self {
        Self {
            token,
            should_succeed: true,
            failure_message: None,
            failures_before_success: 0,
            successes_before_failure: None,
            call_count: AtomicUsize::new(0),
            accepted: Mutex::new(Vec::new()),
        }
    }

    /// Configure to always fail with a message
    pub fn with_failure(mut self, message: &str) -> Self {
        self.should_succeed = false;
        self.failure_message = Some(message.to_string());
        self
    }

    /// Fail N times, then succeed
    pub fn with_failures_then_success(mut self, failures: usize) -> Self {
        self.should_succeed = true;
        self.failures_before_success = failures;
        self
    }

    /// Succeed N times, then fail every later call
    pub fn with_successes_then_failure(mut self, successes: usize, message: &str) -> Self {
        self.should_succeed = true;
        self.successes_before_failure = Some(successes);
        self.failure_message = Some(message.to_string());
        self
    }

    /// Number of transfer calls received, successful or not
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Transfers that were accepted, in call order
    pub fn accepted(&self) -> Vec<RecordedTransfer> {
        self.accepted
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn respond(
        &self,
        direction: TransferDirection,
        from: &Address,
        to: &Address,
        amount: u64,
    ) -> Result<(), TransferError> {
        let call_num = self.call_count.fetch_add(1, Ordering::SeqCst);

        let failure = || {
            TransferError::Rejected(
                self.failure_message
                    .clone()
                    .unwrap_or_else(|| "Mock failure".to_string()),
            )
        };

        let exhausted = self
            .successes_before_failure
            .is_some_and(|successes| call_num >= successes);
        if call_num < self.failures_before_success || !self.should_succeed || exhausted {
            return Err(failure());
        }

        self.accepted
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(RecordedTransfer {
                direction,
                from: *from,
                to: *to,
                amount,
            });
        Ok(())
    }
}

impl TransferPort for MockTransferPort {
    fn token_address(&self) -> &Address {
        &self.token
    }

    fn transfer_in(&self, from: &Address, to: &Address, amount: u64) -> Result<(), TransferError> {
        self.respond(TransferDirection::In, from, to, amount)
    }

    fn transfer_out(&self, from: &Address, to: &Address, amount: u64) -> Result<(), TransferError> {
        self.respond(TransferDirection::Out, from, to, amount)
    }
}
