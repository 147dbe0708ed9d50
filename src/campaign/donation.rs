// Donation book - per-donor, per-campaign cumulative contributions

use crate::campaign::model::CampaignId;
use crate::identity::Address;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Cumulative donation record of one donor to one campaign
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DonationRecord {
    campaign_id: CampaignId,
    donor: Address,
    /// Outstanding amount, i.e. the refund entitlement
    amount: u64,
    /// Lifetime contributions, kept after a refund for audit
    contributed: u64,
}

impl DonationRecord {
    fn new(campaign_id: CampaignId, donor: Address) -> Self {
        Self {
            campaign_id,
            donor,
            amount: 0,
            contributed: 0,
        }
    }

    pub fn campaign_id(&self) -> CampaignId {
        self.campaign_id
    }

    pub fn donor(&self) -> &Address {
        &self.donor
    }

    /// Amount still recorded for this donor (0 once refunded)
    pub fn amount(&self) -> u64 {
        self.amount
    }

    pub fn contributed(&self) -> u64 {
        self.contributed
    }

    pub fn is_settled(&self) -> bool {
        self.amount == 0
    }
}

/// All donation records, grouped by campaign in first-donation order
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct DonationBook {
    records: BTreeMap<CampaignId, Vec<DonationRecord>>,
    /// Index: (campaign, donor) -> position in that campaign's record list
    #[serde(skip)]
    index: HashMap<(CampaignId, Address), usize>,
}

impl DonationBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the lookup index (after deserialization)
    pub(crate) fn rebuild_index(&mut self) {
        self.index.clear();
        for (campaign_id, records) in &self.records {
            for (pos, record) in records.iter().enumerate() {
                self.index.insert((*campaign_id, record.donor), pos);
            }
        }
    }

    /// Get a donor's record for a campaign
    pub fn get(&self, campaign_id: CampaignId, donor: &Address) -> Option<&DonationRecord> {
        let pos = *self.index.get(&(campaign_id, *donor))?;
        self.records.get(&campaign_id)?.get(pos)
    }

    /// Outstanding amount recorded for a donor (0 if none)
    pub fn amount_of(&self, campaign_id: CampaignId, donor: &Address) -> u64 {
        self.get(campaign_id, donor).map(|r| r.amount).unwrap_or(0)
    }

    /// Records for one campaign in first-donation order
    pub fn records_for(&self, campaign_id: CampaignId) -> &[DonationRecord] {
        self.records
            .get(&campaign_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Sum of outstanding amounts for a campaign
    pub fn outstanding_for(&self, campaign_id: CampaignId) -> u128 {
        self.records_for(campaign_id)
            .iter()
            .map(|r| u128::from(r.amount))
            .sum()
    }

    /// Total number of (campaign, donor) records
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Add to a donor's cumulative record. Returns true if this is the
    /// donor's first contribution to the campaign.
    pub(crate) fn credit(&mut self, campaign_id: CampaignId, donor: &Address, amount: u64) -> bool {
        let records = self.records.entry(campaign_id).or_default();
        let (pos, first) = match self.index.get(&(campaign_id, *donor)) {
            Some(pos) => (*pos, false),
            None => {
                records.push(DonationRecord::new(campaign_id, *donor));
                let pos = records.len() - 1;
                self.index.insert((campaign_id, *donor), pos);
                (pos, true)
            }
        };

        let record = &mut records[pos];
        record.amount += amount;
        record.contributed += amount;
        first
    }

    /// Zero a donor's record, returning the amount it held
    pub(crate) fn settle(&mut self, campaign_id: CampaignId, donor: &Address) -> u64 {
        let Some(pos) = self.index.get(&(campaign_id, *donor)).copied() else {
            return 0;
        };
        match self.records.get_mut(&campaign_id).and_then(|r| r.get_mut(pos)) {
            Some(record) => std::mem::take(&mut record.amount),
            None => 0,
        }
    }
}
