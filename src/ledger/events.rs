use crate::campaign::CampaignId;
use crate::identity::Address;

/// Events emitted by committed ledger mutations
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LedgerEvent {
    CampaignCreated {
        campaign_id: CampaignId,
        owner: Address,
        goal_amount: u64,
        deadline: u64,
    },
    DonationReceived {
        campaign_id: CampaignId,
        donor: Address,
        amount: u64,
        raised_amount: u64,
    },
    FundsWithdrawn {
        campaign_id: CampaignId,
        owner: Address,
        amount: u64,
    },
    DonationRefunded {
        campaign_id: CampaignId,
        donor: Address,
        amount: u64,
    },
    /// Campaign reached a terminal state (withdrawn or fully refunded)
    CampaignClosed { campaign_id: CampaignId },
}

impl LedgerEvent {
    /// Campaign the event refers to
    pub fn campaign_id(&self) -> CampaignId {
        match self {
            LedgerEvent::CampaignCreated { campaign_id, .. }
            | LedgerEvent::DonationReceived { campaign_id, .. }
            | LedgerEvent::FundsWithdrawn { campaign_id, .. }
            | LedgerEvent::DonationRefunded { campaign_id, .. }
            | LedgerEvent::CampaignClosed { campaign_id } => *campaign_id,
        }
    }
}
