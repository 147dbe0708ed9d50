// Ledger State - every campaign and donation record the ledger owns

use crate::campaign::{Campaign, CampaignId, DonationBook, DonationRecord};
use crate::identity::Address;
use crate::ledger::error::LedgerError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when loading ledger state
#[derive(Error, Debug)]
pub enum LedgerStateError {
    #[error("Deserialization failed: {0}")]
    DeserializationFailed(String),

    #[error("Inconsistent ledger state: {0}")]
    Inconsistent(String),
}

/// Statistics about the ledger
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LedgerStatistics {
    pub total_campaigns: u64,
    pub open_campaigns: u64,
    pub donor_records: usize,
    // Sums across campaigns; each campaign alone may reach u64::MAX
    pub total_raised: u128,
    pub total_withdrawn: u128,
    pub total_refunded: u128,
    /// Funds the custody account should currently hold
    pub custody_balance: u128,
}

/// The ledger aggregate: campaigns in creation order plus the donation book
///
/// Pure data. All validation and transfer handling lives in
/// `CampaignLedger`; the `apply_*` methods here are only called after a
/// mutation has passed every check and its transfer has committed.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LedgerState {
    /// Stable token the ledger was deployed against
    token: Address,
    /// Account holding donated funds until withdrawal or refund
    custody: Address,
    /// Campaigns; position == id
    campaigns: Vec<Campaign>,
    donations: DonationBook,
    total_withdrawn: u128,
    total_refunded: u128,
    /// Incremented by every committed mutation
    version: u64,
}

impl LedgerState {
    /// Create an empty state for a freshly deployed ledger
    pub fn new(token: Address, custody: Address) -> Self {
        Self {
            token,
            custody,
            campaigns: Vec::new(),
            donations: DonationBook::new(),
            total_withdrawn: 0,
            total_refunded: 0,
            version: 0,
        }
    }

    pub fn token(&self) -> &Address {
        &self.token
    }

    pub fn custody(&self) -> &Address {
        &self.custody
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn is_empty(&self) -> bool {
        self.campaigns.is_empty()
    }

    /// Count of campaigns ever created
    pub fn total_campaigns(&self) -> u64 {
        self.campaigns.len() as u64
    }

    pub fn campaigns(&self) -> &[Campaign] {
        &self.campaigns
    }

    pub fn campaign(&self, id: CampaignId) -> Option<&Campaign> {
        self.campaigns.get(id.index())
    }

    pub fn donations(&self) -> &DonationBook {
        &self.donations
    }

    pub fn donation(&self, id: CampaignId, donor: &Address) -> Option<&DonationRecord> {
        self.donations.get(id, donor)
    }

    /// Funds held in custody across every campaign
    pub fn custody_balance(&self) -> u128 {
        self.campaigns
            .iter()
            .map(|c| u128::from(c.held_amount()))
            .sum()
    }

    pub fn statistics(&self) -> LedgerStatistics {
        LedgerStatistics {
            total_campaigns: self.total_campaigns(),
            open_campaigns: self.campaigns.iter().filter(|c| !c.is_closed()).count() as u64,
            donor_records: self.donations.len(),
            total_raised: self
                .campaigns
                .iter()
                .map(|c| u128::from(c.raised_amount()))
                .sum(),
            total_withdrawn: self.total_withdrawn,
            total_refunded: self.total_refunded,
            custody_balance: self.custody_balance(),
        }
    }

    // ========================================================================
    // COMMIT STEPS
    // ========================================================================

    pub(crate) fn push_campaign(&mut self, owner: Address, goal_amount: u64, deadline: u64, now: u64) -> CampaignId {
        let id = CampaignId(self.campaigns.len() as u64);
        self.campaigns.push(Campaign::new(id, owner, goal_amount, deadline, now));
        self.version += 1;
        id
    }

    fn campaign_mut(&mut self, id: CampaignId) -> Result<&mut Campaign, LedgerError> {
        self.campaigns.get_mut(id.index()).ok_or(LedgerError::NotFound(id))
    }

    /// Returns the campaign's new raised total
    pub(crate) fn apply_donation(&mut self, id: CampaignId, donor: &Address, amount: u64) -> Result<u64, LedgerError> {
        if self.campaign(id).is_none() {
            return Err(LedgerError::NotFound(id));
        }
        let first = self.donations.credit(id, donor, amount);
        let campaign = self.campaign_mut(id)?;
        campaign.record_donation(amount, first);
        let raised = campaign.raised_amount();
        self.version += 1;
        Ok(raised)
    }

    /// Returns the amount released to the owner
    pub(crate) fn apply_withdrawal(&mut self, id: CampaignId) -> Result<u64, LedgerError> {
        let campaign = self.campaign_mut(id)?;
        let amount = campaign.held_amount();
        campaign.mark_withdrawn();
        self.total_withdrawn += u128::from(amount);
        self.version += 1;
        Ok(amount)
    }

    /// Returns the refunded amount and whether the campaign is now closed
    pub(crate) fn apply_refund(&mut self, id: CampaignId, donor: &Address) -> Result<(u64, bool), LedgerError> {
        if self.campaign(id).is_none() {
            return Err(LedgerError::NotFound(id));
        }
        let amount = self.donations.settle(id, donor);
        let closed = self.campaign_mut(id)?.record_refund(amount);
        self.total_refunded += u128::from(amount);
        self.version += 1;
        Ok((amount, closed))
    }

    // ========================================================================
    // SERIALIZATION
    // ========================================================================

    /// Serialize the state to bytes
    pub fn to_bytes(&self) -> Vec<u8> {
        postcard::to_allocvec(self).unwrap_or_default()
    }

    /// Deserialize state from bytes, rebuilding indexes and checking invariants
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, LedgerStateError> {
        let mut state: LedgerState = postcard::from_bytes(bytes)
            .map_err(|e| LedgerStateError::DeserializationFailed(e.to_string()))?;
        state.donations.rebuild_index();
        state.check_consistency()?;
        Ok(state)
    }

    /// Verify the accounting invariants hold
    pub fn check_consistency(&self) -> Result<(), LedgerStateError> {
        for (pos, campaign) in self.campaigns.iter().enumerate() {
            if campaign.id().index() != pos {
                return Err(LedgerStateError::Inconsistent(format!(
                    "campaign at position {} has id {}",
                    pos,
                    campaign.id()
                )));
            }

            let contributed: u128 = self
                .donations
                .records_for(campaign.id())
                .iter()
                .map(|r| u128::from(r.contributed()))
                .sum();
            if contributed != u128::from(campaign.raised_amount()) {
                return Err(LedgerStateError::Inconsistent(format!(
                    "campaign {} raised {} but donation records sum to {}",
                    campaign.id(),
                    campaign.raised_amount(),
                    contributed
                )));
            }

            if !campaign.is_withdrawn() {
                let outstanding = self.donations.outstanding_for(campaign.id());
                if outstanding != u128::from(campaign.held_amount()) {
                    return Err(LedgerStateError::Inconsistent(format!(
                        "campaign {} holds {} but donors are owed {}",
                        campaign.id(),
                        campaign.held_amount(),
                        outstanding
                    )));
                }
            }
        }
        Ok(())
    }
}
