// Ledger module - THE CAMPAIGN LEDGER
// Owns all campaign and donation state and enforces the accounting invariants

mod campaign_ledger;
mod clock;
mod error;
mod events;
mod state;

pub use campaign_ledger::CampaignLedger;
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::LedgerError;
pub use events::LedgerEvent;
pub use state::{LedgerState, LedgerStateError, LedgerStatistics};
