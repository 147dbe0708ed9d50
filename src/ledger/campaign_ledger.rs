// Campaign Ledger - validates, moves funds, then commits
//
// Mutations are serialized by `write_gate`. Each one reads the clock once,
// validates against committed state, calls the transfer port without holding
// the state lock, and only then takes the write lock to apply. Readers take
// the read lock and never see a half-applied mutation.

use crate::campaign::{Campaign, CampaignId, CampaignStatus, DonationRecord};
use crate::config::LedgerConfig;
use crate::identity::Address;
use crate::ledger::clock::Clock;
use crate::ledger::error::LedgerError;
use crate::ledger::events::LedgerEvent;
use crate::ledger::state::{LedgerState, LedgerStatistics};
use crate::token::TransferPort;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info, warn};

/// The campaign ledger
pub struct CampaignLedger {
    config: LedgerConfig,
    port: Box<dyn TransferPort>,
    clock: Arc<dyn Clock>,
    state: RwLock<LedgerState>,
    write_gate: Mutex<()>,
    events: Mutex<Vec<LedgerEvent>>,
}

impl CampaignLedger {
    /// Deploy a fresh, empty ledger
    ///
    /// The port must move the token named in `config.token_address`.
    pub fn deploy(
        config: LedgerConfig,
        port: Box<dyn TransferPort>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, LedgerError> {
        let state = LedgerState::new(config.token_address, config.custody_address);
        let ledger = Self::restore(config, state, port, clock)?;
        info!(
            token = %ledger.config.token_address,
            custody = %ledger.config.custody_address,
            "ledger deployed"
        );
        Ok(ledger)
    }

    /// Rebuild a ledger around previously persisted state
    pub fn restore(
        config: LedgerConfig,
        state: LedgerState,
        port: Box<dyn TransferPort>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, LedgerError> {
        config
            .validate()
            .map_err(|e| LedgerError::InvalidParameters(e.to_string()))?;

        if port.token_address() != &config.token_address {
            return Err(LedgerError::InvalidParameters(format!(
                "transfer port moves token {} but ledger is configured for {}",
                port.token_address(),
                config.token_address
            )));
        }
        if state.token() != &config.token_address || state.custody() != &config.custody_address {
            return Err(LedgerError::InvalidParameters(
                "persisted state belongs to a different token or custody account".to_string(),
            ));
        }

        Ok(Self {
            config,
            port,
            clock,
            state: RwLock::new(state),
            write_gate: Mutex::new(()),
            events: Mutex::new(Vec::new()),
        })
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn token_address(&self) -> &Address {
        &self.config.token_address
    }

    pub fn custody_address(&self) -> &Address {
        &self.config.custody_address
    }

    fn gate(&self) -> MutexGuard<'_, ()> {
        self.write_gate.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn read_state(&self) -> RwLockReadGuard<'_, LedgerState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, LedgerState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, event: LedgerEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }

    fn committed_campaign(&self, id: CampaignId) -> Result<Campaign, LedgerError> {
        self.read_state()
            .campaign(id)
            .cloned()
            .ok_or(LedgerError::NotFound(id))
    }

    // ========================================================================
    // MUTATIONS
    // ========================================================================

    /// Register a new campaign and return its id
    pub fn create_campaign(
        &self,
        owner: Address,
        goal_amount: u64,
        deadline: u64,
    ) -> Result<CampaignId, LedgerError> {
        let _gate = self.gate();
        let now = self.clock.now();

        if owner.is_zero() {
            return Err(LedgerError::InvalidParameters(
                "owner cannot be the zero address".to_string(),
            ));
        }
        if owner == self.config.custody_address {
            return Err(LedgerError::InvalidParameters(
                "owner cannot be the custody account".to_string(),
            ));
        }
        if goal_amount == 0 {
            return Err(LedgerError::InvalidParameters(
                "goal amount must be positive".to_string(),
            ));
        }
        if deadline <= now {
            return Err(LedgerError::InvalidParameters(format!(
                "deadline {} is not after current time {}",
                deadline, now
            )));
        }

        let id = self.write_state().push_campaign(owner, goal_amount, deadline, now);

        info!(campaign_id = id.value(), owner = %owner.short(), goal_amount, deadline, "campaign created");
        self.emit(LedgerEvent::CampaignCreated {
            campaign_id: id,
            owner,
            goal_amount,
            deadline,
        });
        Ok(id)
    }

    /// Accept a donation into custody
    pub fn donate(&self, id: CampaignId, donor: Address, amount: u64) -> Result<(), LedgerError> {
        let _gate = self.gate();
        let now = self.clock.now();

        let campaign = self.committed_campaign(id)?;
        if !campaign.accepts_donations_at(now) {
            return Err(LedgerError::CampaignClosed(id));
        }
        if amount == 0 {
            return Err(LedgerError::InvalidParameters(
                "donation amount must be positive".to_string(),
            ));
        }
        // Custody paying itself moves nothing but would still credit the campaign
        if donor == self.config.custody_address {
            return Err(LedgerError::InvalidParameters(
                "custody account cannot donate".to_string(),
            ));
        }
        if campaign.raised_amount().checked_add(amount).is_none() {
            return Err(LedgerError::InvalidParameters(
                "donation would overflow the campaign total".to_string(),
            ));
        }

        if let Err(e) = self.port.transfer_in(&donor, &self.config.custody_address, amount) {
            warn!(campaign_id = id.value(), donor = %donor.short(), amount, error = %e, "donation transfer failed");
            return Err(e.into());
        }

        let raised_amount = self.write_state().apply_donation(id, &donor, amount)?;

        info!(campaign_id = id.value(), donor = %donor.short(), amount, raised_amount, "donation recorded");
        self.emit(LedgerEvent::DonationReceived {
            campaign_id: id,
            donor,
            amount,
            raised_amount,
        });
        Ok(())
    }

    /// Release every raised token to the campaign owner
    ///
    /// Allowed once the goal is met, whether or not the deadline has passed.
    /// Returns the amount paid out.
    pub fn withdraw(&self, id: CampaignId, caller: Address) -> Result<u64, LedgerError> {
        let _gate = self.gate();

        let campaign = self.committed_campaign(id)?;
        if &caller != campaign.owner() {
            return Err(LedgerError::Unauthorized);
        }
        if campaign.is_withdrawn() {
            return Err(LedgerError::AlreadyWithdrawn(id));
        }
        if !campaign.goal_met() {
            return Err(LedgerError::GoalNotMet {
                raised: campaign.raised_amount(),
                goal: campaign.goal_amount(),
            });
        }

        let amount = campaign.held_amount();
        if let Err(e) = self
            .port
            .transfer_out(&self.config.custody_address, campaign.owner(), amount)
        {
            warn!(campaign_id = id.value(), amount, error = %e, "withdrawal transfer failed");
            return Err(e.into());
        }

        let paid = self.write_state().apply_withdrawal(id)?;

        info!(campaign_id = id.value(), owner = %caller.short(), amount = paid, "funds withdrawn");
        self.emit(LedgerEvent::FundsWithdrawn {
            campaign_id: id,
            owner: caller,
            amount: paid,
        });
        self.emit(LedgerEvent::CampaignClosed { campaign_id: id });
        Ok(paid)
    }

    /// Return a donor's recorded contribution after a failed campaign
    ///
    /// Settles one donor at a time. The campaign closes once the last
    /// outstanding donor has been refunded. Returns the amount paid back.
    pub fn refund(&self, id: CampaignId, donor: Address) -> Result<u64, LedgerError> {
        let _gate = self.gate();
        let now = self.clock.now();

        let (campaign, owed) = {
            let state = self.read_state();
            let campaign = state.campaign(id).cloned().ok_or(LedgerError::NotFound(id))?;
            let owed = state.donations().amount_of(id, &donor);
            (campaign, owed)
        };

        if !campaign.refunds_open_at(now) {
            let reason = match campaign.status_at(now) {
                CampaignStatus::Active => format!("campaign {} is open until {}", id, campaign.deadline()),
                status => format!("campaign {} is {}", id, status),
            };
            return Err(LedgerError::RefundNotAvailable(reason));
        }
        if owed == 0 {
            return Err(LedgerError::RefundNotAvailable(format!(
                "no outstanding donation from {} to campaign {}",
                donor, id
            )));
        }

        if let Err(e) = self
            .port
            .transfer_out(&self.config.custody_address, &donor, owed)
        {
            warn!(campaign_id = id.value(), donor = %donor.short(), amount = owed, error = %e, "refund transfer failed");
            return Err(e.into());
        }

        let (amount, closed) = self.write_state().apply_refund(id, &donor)?;

        info!(campaign_id = id.value(), donor = %donor.short(), amount, closed, "donation refunded");
        self.emit(LedgerEvent::DonationRefunded {
            campaign_id: id,
            donor,
            amount,
        });
        if closed {
            self.emit(LedgerEvent::CampaignClosed { campaign_id: id });
        }
        Ok(amount)
    }

    // ========================================================================
    // QUERIES
    // ========================================================================

    /// Every campaign in creation order
    pub fn get_all_campaigns(&self) -> Vec<Campaign> {
        self.read_state().campaigns().to_vec()
    }

    /// Number of campaigns ever created
    pub fn get_total_campaigns(&self) -> u64 {
        self.read_state().total_campaigns()
    }

    pub fn get_campaign(&self, id: CampaignId) -> Result<Campaign, LedgerError> {
        self.committed_campaign(id)
    }

    /// Outstanding amount recorded for a donor (their refund entitlement)
    pub fn donation_of(&self, id: CampaignId, donor: &Address) -> Result<u64, LedgerError> {
        let state = self.read_state();
        if state.campaign(id).is_none() {
            return Err(LedgerError::NotFound(id));
        }
        Ok(state.donation(id, donor).map(DonationRecord::amount).unwrap_or(0))
    }

    /// Donation records for a campaign in first-donation order
    pub fn donors(&self, id: CampaignId) -> Result<Vec<DonationRecord>, LedgerError> {
        let state = self.read_state();
        if state.campaign(id).is_none() {
            return Err(LedgerError::NotFound(id));
        }
        Ok(state.donations().records_for(id).to_vec())
    }

    pub fn campaigns_by_owner(&self, owner: &Address) -> Vec<Campaign> {
        self.read_state()
            .campaigns()
            .iter()
            .filter(|c| c.owner() == owner)
            .cloned()
            .collect()
    }

    /// Status of a campaign at the current clock reading
    pub fn status(&self, id: CampaignId) -> Result<CampaignStatus, LedgerError> {
        let now = self.clock.now();
        Ok(self.committed_campaign(id)?.status_at(now))
    }

    pub fn statistics(&self) -> LedgerStatistics {
        self.read_state().statistics()
    }

    /// Copy of the committed state, for persistence
    pub fn snapshot(&self) -> LedgerState {
        self.read_state().clone()
    }

    /// Poll for events (clears the event queue)
    pub fn poll_events(&self) -> Vec<LedgerEvent> {
        let events = std::mem::take(&mut *self.events.lock().unwrap_or_else(PoisonError::into_inner));
        debug!(count = events.len(), "events polled");
        events
    }
}
