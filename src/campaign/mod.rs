// Campaign module - fundraising campaigns and the donations they hold

mod donation;
mod model;

pub use donation::{DonationBook, DonationRecord};
pub use model::{Campaign, CampaignId, CampaignStatus};
