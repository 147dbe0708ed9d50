use crate::campaign::CampaignId;
use crate::token::TransferError;
use thiserror::Error;

/// Errors surfaced by ledger operations
///
/// A mutation that returns any of these changed nothing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("Campaign {0} not found")]
    NotFound(CampaignId),

    #[error("Caller is not authorized for this operation")]
    Unauthorized,

    #[error("Campaign {0} is closed to donations")]
    CampaignClosed(CampaignId),

    #[error("Campaign {0} has already been withdrawn")]
    AlreadyWithdrawn(CampaignId),

    #[error("Goal not met: raised {raised}, goal {goal}")]
    GoalNotMet { raised: u64, goal: u64 },

    #[error("Refund not available: {0}")]
    RefundNotAvailable(String),

    #[error("Transfer failed: {0}")]
    TransferFailed(#[from] TransferError),
}
