use crate::identity::Address;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Sequential campaign identifier, starting at 0
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CampaignId(pub u64);

impl CampaignId {
    /// Get the raw value
    pub fn value(&self) -> u64 {
        self.0
    }

    /// Position of this campaign in creation order
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for CampaignId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u64> for CampaignId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// Lifecycle view of a campaign at a given time
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CampaignStatus {
    /// Accepting donations
    Active,
    /// Goal reached, funds waiting for the owner
    Successful,
    /// Deadline passed without reaching the goal; refunds are open
    Expired,
    /// Owner took the funds
    Withdrawn,
    /// Every donor was refunded
    Refunded,
}

impl CampaignStatus {
    /// Terminal statuses never change again
    pub fn is_terminal(&self) -> bool {
        matches!(self, CampaignStatus::Withdrawn | CampaignStatus::Refunded)
    }
}

impl fmt::Display for CampaignStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CampaignStatus::Active => "active",
            CampaignStatus::Successful => "successful",
            CampaignStatus::Expired => "expired",
            CampaignStatus::Withdrawn => "withdrawn",
            CampaignStatus::Refunded => "refunded",
        };
        f.write_str(s)
    }
}

/// A single fundraising campaign
///
/// Identity, owner, goal and deadline are fixed at creation. The ledger is
/// the only writer of the accounting fields, so they are exposed read-only.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Campaign {
    id: CampaignId,
    owner: Address,
    goal_amount: u64,
    deadline: u64,
    created_at: u64,
    raised_amount: u64,
    refunded_amount: u64,
    donor_count: u32,
    withdrawn: bool,
    closed: bool,
}

impl Campaign {
    pub(crate) fn new(id: CampaignId, owner: Address, goal_amount: u64, deadline: u64, created_at: u64) -> Self {
        Self {
            id,
            owner,
            goal_amount,
            deadline,
            created_at,
            raised_amount: 0,
            refunded_amount: 0,
            donor_count: 0,
            withdrawn: false,
            closed: false,
        }
    }

    pub fn id(&self) -> CampaignId {
        self.id
    }

    pub fn owner(&self) -> &Address {
        &self.owner
    }

    pub fn goal_amount(&self) -> u64 {
        self.goal_amount
    }

    pub fn deadline(&self) -> u64 {
        self.deadline
    }

    pub fn created_at(&self) -> u64 {
        self.created_at
    }

    /// Sum of every accepted donation (refunds do not reduce it)
    pub fn raised_amount(&self) -> u64 {
        self.raised_amount
    }

    /// Total returned to donors through refunds
    pub fn refunded_amount(&self) -> u64 {
        self.refunded_amount
    }

    pub fn donor_count(&self) -> u32 {
        self.donor_count
    }

    pub fn is_withdrawn(&self) -> bool {
        self.withdrawn
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn goal_met(&self) -> bool {
        self.raised_amount >= self.goal_amount
    }

    /// Deadline is inclusive: donations are still accepted at `now == deadline`
    pub fn is_expired_at(&self, now: u64) -> bool {
        now > self.deadline
    }

    /// Whether a donation would be accepted at `now`
    pub fn accepts_donations_at(&self, now: u64) -> bool {
        !self.closed && !self.is_expired_at(now)
    }

    /// Whether donors may reclaim their contributions at `now`
    pub fn refunds_open_at(&self, now: u64) -> bool {
        self.is_expired_at(now) && !self.goal_met() && !self.withdrawn
    }

    /// Funds still held in custody on behalf of this campaign
    pub fn held_amount(&self) -> u64 {
        if self.withdrawn {
            0
        } else {
            self.raised_amount - self.refunded_amount
        }
    }

    /// Status evaluated against the given clock reading
    pub fn status_at(&self, now: u64) -> CampaignStatus {
        if self.withdrawn {
            CampaignStatus::Withdrawn
        } else if self.closed {
            CampaignStatus::Refunded
        } else if self.goal_met() {
            CampaignStatus::Successful
        } else if self.is_expired_at(now) {
            CampaignStatus::Expired
        } else {
            CampaignStatus::Active
        }
    }

    // Mutators used by the ledger once a transfer has been committed

    pub(crate) fn record_donation(&mut self, amount: u64, first_from_donor: bool) {
        self.raised_amount += amount;
        if first_from_donor {
            self.donor_count += 1;
        }
    }

    pub(crate) fn mark_withdrawn(&mut self) {
        self.withdrawn = true;
        self.closed = true;
    }

    /// Returns true when this refund settled the last outstanding donor
    pub(crate) fn record_refund(&mut self, amount: u64) -> bool {
        self.refunded_amount += amount;
        if self.refunded_amount == self.raised_amount {
            self.closed = true;
        }
        self.closed
    }
}
