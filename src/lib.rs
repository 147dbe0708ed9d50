// Charity donation ledger
//
// A registry of fundraising campaigns that accepts stable-token donations,
// tracks per-campaign totals, and pays out either to the campaign owner
// (goal met) or back to donors (goal missed by the deadline).

pub mod campaign;
pub mod config;
pub mod identity;
pub mod ledger;
pub mod storage;
pub mod token;

pub use campaign::{Campaign, CampaignId, CampaignStatus};
pub use config::LedgerConfig;
pub use identity::Address;
pub use ledger::{CampaignLedger, Clock, LedgerError, ManualClock, SystemClock};
pub use token::{InMemoryToken, TransferPort};
