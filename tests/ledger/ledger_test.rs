// Campaign Ledger Tests
// Tests for campaign creation, donations, withdrawals and refunds

use charity_ledger::campaign::{CampaignId, CampaignStatus};
use charity_ledger::config::LedgerConfig;
use charity_ledger::identity::Address;
use charity_ledger::ledger::{CampaignLedger, LedgerError, LedgerEvent, ManualClock};
use charity_ledger::token::{InMemoryToken, MockTransferPort};
use std::sync::Arc;

const START: u64 = 1_700_000_000;

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

struct Harness {
    ledger: CampaignLedger,
    token: Arc<InMemoryToken>,
    clock: Arc<ManualClock>,
}

fn token_address() -> Address {
    Address::from_label("usdc")
}

fn setup() -> Harness {
    let token = Arc::new(InMemoryToken::new(token_address()));
    let clock = Arc::new(ManualClock::new(START));
    let ledger = CampaignLedger::deploy(
        LedgerConfig::new(token_address()),
        Box::new(Arc::clone(&token)),
        clock.clone(),
    )
    .unwrap();

    Harness { ledger, token, clock }
}

fn funded(h: &Harness, label: &str, amount: u64) -> Address {
    let account = Address::from_label(label);
    h.token.mint(&account, amount).unwrap();
    account
}

/// Ledger over a port that accepts any amount, for totals no real token supply allows
fn unbounded_ledger() -> CampaignLedger {
    CampaignLedger::deploy(
        LedgerConfig::new(token_address()),
        Box::new(MockTransferPort::new(token_address())),
        Arc::new(ManualClock::new(START)),
    )
    .unwrap()
}

// ============================================================================
// DEPLOYMENT
// ============================================================================

#[test]
fn test_fresh_ledger_is_empty() {
    let h = setup();

    assert_eq!(h.ledger.get_total_campaigns(), 0);
    assert!(h.ledger.get_all_campaigns().is_empty());
    assert_eq!(h.ledger.token_address(), &token_address());
}

#[test]
fn test_deploy_rejects_port_for_other_token() {
    let port = MockTransferPort::new(Address::from_label("dai"));
    let result = CampaignLedger::deploy(
        LedgerConfig::new(token_address()),
        Box::new(port),
        Arc::new(ManualClock::new(START)),
    );

    assert!(matches!(result, Err(LedgerError::InvalidParameters(_))));
}

#[test]
fn test_deploy_rejects_zero_token_address() {
    let port = MockTransferPort::new(Address::ZERO);
    let result = CampaignLedger::deploy(
        LedgerConfig::new(Address::ZERO),
        Box::new(port),
        Arc::new(ManualClock::new(START)),
    );

    assert!(matches!(result, Err(LedgerError::InvalidParameters(_))));
}

// ============================================================================
// CAMPAIGN CREATION
// ============================================================================

#[test]
fn test_create_campaign_assigns_sequential_ids() {
    let h = setup();
    let owner = Address::from_label("owner");

    let first = h.ledger.create_campaign(owner, 1000, START + 100).unwrap();
    let second = h.ledger.create_campaign(owner, 500, START + 200).unwrap();

    assert_eq!(first, CampaignId(0));
    assert_eq!(second, CampaignId(1));
    assert_eq!(h.ledger.get_total_campaigns(), 2);
}

#[test]
fn test_created_campaign_fields() {
    let h = setup();
    let owner = Address::from_label("owner");

    let id = h.ledger.create_campaign(owner, 1000, START + 100).unwrap();
    let campaign = h.ledger.get_campaign(id).unwrap();

    assert_eq!(campaign.owner(), &owner);
    assert_eq!(campaign.goal_amount(), 1000);
    assert_eq!(campaign.deadline(), START + 100);
    assert_eq!(campaign.created_at(), START);
    assert_eq!(campaign.raised_amount(), 0);
    assert!(!campaign.is_withdrawn());
    assert!(!campaign.is_closed());
}

#[test]
fn test_create_campaign_zero_goal_fails() {
    let h = setup();

    let result = h.ledger.create_campaign(Address::from_label("owner"), 0, START + 100);

    assert!(matches!(result, Err(LedgerError::InvalidParameters(_))));
    assert_eq!(h.ledger.get_total_campaigns(), 0);
}

#[test]
fn test_create_campaign_deadline_must_be_in_future() {
    let h = setup();
    let owner = Address::from_label("owner");

    let now = h.ledger.create_campaign(owner, 100, START);
    let past = h.ledger.create_campaign(owner, 100, START - 1);

    assert!(matches!(now, Err(LedgerError::InvalidParameters(_))));
    assert!(matches!(past, Err(LedgerError::InvalidParameters(_))));
    assert_eq!(h.ledger.get_total_campaigns(), 0);
}

#[test]
fn test_create_campaign_zero_owner_fails() {
    let h = setup();

    let result = h.ledger.create_campaign(Address::ZERO, 100, START + 10);

    assert!(matches!(result, Err(LedgerError::InvalidParameters(_))));
}

#[test]
fn test_failed_creation_does_not_consume_id() {
    let h = setup();
    let owner = Address::from_label("owner");

    let _ = h.ledger.create_campaign(owner, 0, START + 10);
    let id = h.ledger.create_campaign(owner, 10, START + 10).unwrap();

    assert_eq!(id, CampaignId(0));
}

#[test]
fn test_create_campaign_custody_owner_fails() {
    let h = setup();
    let custody = *h.ledger.custody_address();

    let result = h.ledger.create_campaign(custody, 100, START + 10);

    assert!(matches!(result, Err(LedgerError::InvalidParameters(_))));
    assert_eq!(h.ledger.get_total_campaigns(), 0);
}

// ============================================================================
// DONATIONS
// ============================================================================

#[test]
fn test_donate_moves_funds_into_custody() {
    let h = setup();
    let alice = funded(&h, "alice", 1000);
    let id = h.ledger.create_campaign(Address::from_label("owner"), 500, START + 100).unwrap();

    h.ledger.donate(id, alice, 300).unwrap();

    assert_eq!(h.token.balance_of(&alice), 700);
    assert_eq!(h.token.balance_of(h.ledger.custody_address()), 300);
    assert_eq!(h.ledger.get_campaign(id).unwrap().raised_amount(), 300);
}

#[test]
fn test_donations_from_same_donor_accumulate() {
    let h = setup();
    let alice = funded(&h, "alice", 1000);
    let id = h.ledger.create_campaign(Address::from_label("owner"), 500, START + 100).unwrap();

    h.ledger.donate(id, alice, 100).unwrap();
    h.ledger.donate(id, alice, 150).unwrap();

    assert_eq!(h.ledger.donation_of(id, &alice).unwrap(), 250);
    let campaign = h.ledger.get_campaign(id).unwrap();
    assert_eq!(campaign.raised_amount(), 250);
    assert_eq!(campaign.donor_count(), 1);
}

#[test]
fn test_donors_listed_in_first_donation_order() {
    let h = setup();
    let alice = funded(&h, "alice", 1000);
    let bob = funded(&h, "bob", 1000);
    let id = h.ledger.create_campaign(Address::from_label("owner"), 5000, START + 100).unwrap();

    h.ledger.donate(id, bob, 10).unwrap();
    h.ledger.donate(id, alice, 20).unwrap();
    h.ledger.donate(id, bob, 30).unwrap();

    let donors = h.ledger.donors(id).unwrap();
    assert_eq!(donors.len(), 2);
    assert_eq!(donors[0].donor(), &bob);
    assert_eq!(donors[0].amount(), 40);
    assert_eq!(donors[1].donor(), &alice);
    assert_eq!(donors[1].amount(), 20);
}

#[test]
fn test_donate_unknown_campaign_fails() {
    let h = setup();
    let alice = funded(&h, "alice", 1000);

    let result = h.ledger.donate(CampaignId(7), alice, 100);

    assert!(matches!(result, Err(LedgerError::NotFound(CampaignId(7)))));
}

#[test]
fn test_donate_zero_amount_fails() {
    let h = setup();
    let alice = funded(&h, "alice", 1000);
    let id = h.ledger.create_campaign(Address::from_label("owner"), 500, START + 100).unwrap();

    let result = h.ledger.donate(id, alice, 0);

    assert!(matches!(result, Err(LedgerError::InvalidParameters(_))));
}

#[test]
fn test_donate_at_deadline_is_accepted() {
    let h = setup();
    let alice = funded(&h, "alice", 1000);
    let id = h.ledger.create_campaign(Address::from_label("owner"), 500, START + 100).unwrap();

    h.clock.set(START + 100);

    assert!(h.ledger.donate(id, alice, 100).is_ok());
}

#[test]
fn test_donate_after_deadline_fails_for_all_amounts() {
    let h = setup();
    let alice = funded(&h, "alice", 1000);
    let id = h.ledger.create_campaign(Address::from_label("owner"), 500, START + 100).unwrap();

    h.clock.set(START + 101);

    for amount in [0, 1, 100, 1000, u64::MAX] {
        let result = h.ledger.donate(id, alice, amount);
        assert!(matches!(result, Err(LedgerError::CampaignClosed(_))), "amount {}", amount);
    }
    assert_eq!(h.token.balance_of(&alice), 1000);
}

#[test]
fn test_donate_after_withdrawal_fails() {
    let h = setup();
    let alice = funded(&h, "alice", 1000);
    let owner = Address::from_label("owner");
    let id = h.ledger.create_campaign(owner, 100, START + 100).unwrap();

    h.ledger.donate(id, alice, 100).unwrap();
    h.ledger.withdraw(id, owner).unwrap();

    let result = h.ledger.donate(id, alice, 50);
    assert!(matches!(result, Err(LedgerError::CampaignClosed(_))));
}

#[test]
fn test_donate_beyond_goal_before_deadline_is_accepted() {
    let h = setup();
    let alice = funded(&h, "alice", 1000);
    let id = h.ledger.create_campaign(Address::from_label("owner"), 100, START + 100).unwrap();

    h.ledger.donate(id, alice, 100).unwrap();
    h.ledger.donate(id, alice, 50).unwrap();

    assert_eq!(h.ledger.get_campaign(id).unwrap().raised_amount(), 150);
}

#[test]
fn test_donate_with_insufficient_balance_fails() {
    let h = setup();
    let alice = funded(&h, "alice", 50);
    let id = h.ledger.create_campaign(Address::from_label("owner"), 100, START + 100).unwrap();

    let result = h.ledger.donate(id, alice, 80);

    assert!(matches!(result, Err(LedgerError::TransferFailed(_))));
    assert_eq!(h.ledger.get_campaign(id).unwrap().raised_amount(), 0);
    assert_eq!(h.ledger.donation_of(id, &alice).unwrap(), 0);
}

#[test]
fn test_donate_from_custody_account_fails() {
    let h = setup();
    let alice = funded(&h, "alice", 500);
    let custody = *h.ledger.custody_address();
    let a = h.ledger.create_campaign(Address::from_label("owner_a"), 1_000, START + 100).unwrap();
    let b = h.ledger.create_campaign(Address::from_label("owner_b"), 500, START + 100).unwrap();
    h.ledger.donate(a, alice, 500).unwrap();

    let result = h.ledger.donate(b, custody, 500);

    assert!(matches!(result, Err(LedgerError::InvalidParameters(_))));
    assert_eq!(h.ledger.get_campaign(b).unwrap().raised_amount(), 0);
    assert!(matches!(
        h.ledger.withdraw(b, Address::from_label("owner_b")),
        Err(LedgerError::GoalNotMet { raised: 0, goal: 500 })
    ));

    // funds held for the other campaign stay refundable
    h.clock.advance(101);
    assert_eq!(h.ledger.refund(a, alice).unwrap(), 500);
    assert_eq!(h.token.balance_of(&alice), 500);
    assert_eq!(h.token.balance_of(&custody), 0);
}

#[test]
fn test_donate_overflowing_campaign_total_fails() {
    let ledger = unbounded_ledger();
    let alice = Address::from_label("alice");
    let id = ledger.create_campaign(Address::from_label("owner"), 10, START + 100).unwrap();
    ledger.donate(id, alice, u64::MAX).unwrap();

    let result = ledger.donate(id, Address::from_label("bob"), 1);

    assert!(matches!(result, Err(LedgerError::InvalidParameters(_))));
    assert_eq!(ledger.get_campaign(id).unwrap().raised_amount(), u64::MAX);
    assert_eq!(ledger.donors(id).unwrap().len(), 1);
}

// ============================================================================
// WITHDRAWAL
// ============================================================================

#[test]
fn test_withdraw_pays_owner_everything_raised() {
    let h = setup();
    let alice = funded(&h, "alice", 1000);
    let owner = Address::from_label("owner");
    let id = h.ledger.create_campaign(owner, 500, START + 100).unwrap();

    h.ledger.donate(id, alice, 600).unwrap();
    let paid = h.ledger.withdraw(id, owner).unwrap();

    assert_eq!(paid, 600);
    assert_eq!(h.token.balance_of(&owner), 600);
    assert_eq!(h.token.balance_of(h.ledger.custody_address()), 0);

    let campaign = h.ledger.get_campaign(id).unwrap();
    assert!(campaign.is_withdrawn());
    assert!(campaign.is_closed());
    assert_eq!(campaign.raised_amount(), 600);
}

#[test]
fn test_withdraw_by_non_owner_fails() {
    let h = setup();
    let alice = funded(&h, "alice", 1000);
    let owner = Address::from_label("owner");
    let id = h.ledger.create_campaign(owner, 500, START + 100).unwrap();
    h.ledger.donate(id, alice, 500).unwrap();

    let result = h.ledger.withdraw(id, alice);

    assert!(matches!(result, Err(LedgerError::Unauthorized)));
    assert!(!h.ledger.get_campaign(id).unwrap().is_withdrawn());
}

#[test]
fn test_withdraw_twice_fails() {
    let h = setup();
    let alice = funded(&h, "alice", 1000);
    let owner = Address::from_label("owner");
    let id = h.ledger.create_campaign(owner, 500, START + 100).unwrap();
    h.ledger.donate(id, alice, 500).unwrap();

    h.ledger.withdraw(id, owner).unwrap();
    let result = h.ledger.withdraw(id, owner);

    assert!(matches!(result, Err(LedgerError::AlreadyWithdrawn(_))));
    assert_eq!(h.token.balance_of(&owner), 500);
}

#[test]
fn test_withdraw_before_goal_fails() {
    let h = setup();
    let alice = funded(&h, "alice", 1000);
    let owner = Address::from_label("owner");
    let id = h.ledger.create_campaign(owner, 500, START + 100).unwrap();
    h.ledger.donate(id, alice, 499).unwrap();

    let result = h.ledger.withdraw(id, owner);

    assert!(matches!(
        result,
        Err(LedgerError::GoalNotMet { raised: 499, goal: 500 })
    ));
}

#[test]
fn test_withdraw_after_deadline_with_goal_met_succeeds() {
    let h = setup();
    let alice = funded(&h, "alice", 1000);
    let owner = Address::from_label("owner");
    let id = h.ledger.create_campaign(owner, 500, START + 100).unwrap();
    h.ledger.donate(id, alice, 500).unwrap();

    h.clock.advance(1000);

    assert_eq!(h.ledger.withdraw(id, owner).unwrap(), 500);
}

#[test]
fn test_withdraw_after_deadline_without_goal_fails() {
    let h = setup();
    let alice = funded(&h, "alice", 1000);
    let owner = Address::from_label("owner");
    let id = h.ledger.create_campaign(owner, 500, START + 100).unwrap();
    h.ledger.donate(id, alice, 100).unwrap();

    h.clock.advance(1000);

    assert!(matches!(
        h.ledger.withdraw(id, owner),
        Err(LedgerError::GoalNotMet { .. })
    ));
}

#[test]
fn test_withdraw_unknown_campaign_fails() {
    let h = setup();

    let result = h.ledger.withdraw(CampaignId(3), Address::from_label("owner"));

    assert!(matches!(result, Err(LedgerError::NotFound(CampaignId(3)))));
}

// ============================================================================
// REFUNDS
// ============================================================================

#[test]
fn test_refund_before_deadline_unavailable() {
    let h = setup();
    let alice = funded(&h, "alice", 1000);
    let id = h.ledger.create_campaign(Address::from_label("owner"), 500, START + 100).unwrap();
    h.ledger.donate(id, alice, 100).unwrap();

    h.clock.set(START + 100);

    assert!(matches!(
        h.ledger.refund(id, alice),
        Err(LedgerError::RefundNotAvailable(_))
    ));
}

#[test]
fn test_refund_after_failed_campaign_returns_donation() {
    let h = setup();
    let alice = funded(&h, "alice", 1000);
    let id = h.ledger.create_campaign(Address::from_label("owner"), 500, START + 100).unwrap();
    h.ledger.donate(id, alice, 100).unwrap();

    h.clock.set(START + 101);
    let refunded = h.ledger.refund(id, alice).unwrap();

    assert_eq!(refunded, 100);
    assert_eq!(h.token.balance_of(&alice), 1000);
    assert_eq!(h.ledger.donation_of(id, &alice).unwrap(), 0);
}

#[test]
fn test_refund_when_goal_met_unavailable() {
    let h = setup();
    let alice = funded(&h, "alice", 1000);
    let id = h.ledger.create_campaign(Address::from_label("owner"), 500, START + 100).unwrap();
    h.ledger.donate(id, alice, 500).unwrap();

    h.clock.advance(500);

    assert!(matches!(
        h.ledger.refund(id, alice),
        Err(LedgerError::RefundNotAvailable(_))
    ));
}

#[test]
fn test_refund_unavailable_reason_names_status() {
    let h = setup();
    let alice = funded(&h, "alice", 1000);
    let owner = Address::from_label("owner");
    let id = h.ledger.create_campaign(owner, 100, START + 100).unwrap();
    h.ledger.donate(id, alice, 100).unwrap();
    h.clock.advance(101);

    match h.ledger.refund(id, alice) {
        Err(LedgerError::RefundNotAvailable(reason)) => assert!(reason.contains("successful"), "{}", reason),
        other => panic!("unexpected result: {:?}", other),
    }

    h.ledger.withdraw(id, owner).unwrap();
    match h.ledger.refund(id, alice) {
        Err(LedgerError::RefundNotAvailable(reason)) => assert!(reason.contains("withdrawn"), "{}", reason),
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn test_refund_twice_fails() {
    let h = setup();
    let alice = funded(&h, "alice", 1000);
    let bob = funded(&h, "bob", 1000);
    let id = h.ledger.create_campaign(Address::from_label("owner"), 500, START + 100).unwrap();
    h.ledger.donate(id, alice, 100).unwrap();
    h.ledger.donate(id, bob, 100).unwrap();

    h.clock.advance(500);
    h.ledger.refund(id, alice).unwrap();

    assert!(matches!(
        h.ledger.refund(id, alice),
        Err(LedgerError::RefundNotAvailable(_))
    ));
    assert_eq!(h.token.balance_of(&alice), 1000);
}

#[test]
fn test_refund_for_non_donor_unavailable() {
    let h = setup();
    let alice = funded(&h, "alice", 1000);
    let id = h.ledger.create_campaign(Address::from_label("owner"), 500, START + 100).unwrap();
    h.ledger.donate(id, alice, 100).unwrap();

    h.clock.advance(500);

    assert!(matches!(
        h.ledger.refund(id, Address::from_label("mallory")),
        Err(LedgerError::RefundNotAvailable(_))
    ));
}

#[test]
fn test_refund_unknown_campaign_fails() {
    let h = setup();

    let result = h.ledger.refund(CampaignId(0), Address::from_label("alice"));

    assert!(matches!(result, Err(LedgerError::NotFound(_))));
}

#[test]
fn test_campaign_closes_when_last_donor_refunded() {
    let h = setup();
    let alice = funded(&h, "alice", 1000);
    let bob = funded(&h, "bob", 1000);
    let id = h.ledger.create_campaign(Address::from_label("owner"), 5000, START + 100).unwrap();
    h.ledger.donate(id, alice, 100).unwrap();
    h.ledger.donate(id, bob, 200).unwrap();

    h.clock.advance(500);

    h.ledger.refund(id, alice).unwrap();
    let campaign = h.ledger.get_campaign(id).unwrap();
    assert!(!campaign.is_closed());
    assert_eq!(campaign.refunded_amount(), 100);

    h.ledger.refund(id, bob).unwrap();
    let campaign = h.ledger.get_campaign(id).unwrap();
    assert!(campaign.is_closed());
    assert_eq!(campaign.refunded_amount(), 300);
    assert_eq!(campaign.raised_amount(), 300);
    assert_eq!(h.token.balance_of(h.ledger.custody_address()), 0);
}

// ============================================================================
// STATUS, QUERIES AND EVENTS
// ============================================================================

#[test]
fn test_status_follows_lifecycle() {
    let h = setup();
    let alice = funded(&h, "alice", 1000);
    let owner = Address::from_label("owner");
    let winner = h.ledger.create_campaign(owner, 100, START + 100).unwrap();
    let loser = h.ledger.create_campaign(owner, 900, START + 100).unwrap();

    assert_eq!(h.ledger.status(winner).unwrap(), CampaignStatus::Active);

    h.ledger.donate(winner, alice, 100).unwrap();
    h.ledger.donate(loser, alice, 50).unwrap();
    assert_eq!(h.ledger.status(winner).unwrap(), CampaignStatus::Successful);
    assert_eq!(h.ledger.status(loser).unwrap(), CampaignStatus::Active);

    h.clock.advance(200);
    assert_eq!(h.ledger.status(loser).unwrap(), CampaignStatus::Expired);

    h.ledger.withdraw(winner, owner).unwrap();
    h.ledger.refund(loser, alice).unwrap();
    assert_eq!(h.ledger.status(winner).unwrap(), CampaignStatus::Withdrawn);
    assert_eq!(h.ledger.status(loser).unwrap(), CampaignStatus::Refunded);
    assert!(h.ledger.status(loser).unwrap().is_terminal());
}

#[test]
fn test_campaigns_by_owner() {
    let h = setup();
    let ann = Address::from_label("ann");
    let ben = Address::from_label("ben");

    h.ledger.create_campaign(ann, 10, START + 10).unwrap();
    h.ledger.create_campaign(ben, 10, START + 10).unwrap();
    h.ledger.create_campaign(ann, 20, START + 10).unwrap();

    let ids: Vec<u64> = h
        .ledger
        .campaigns_by_owner(&ann)
        .iter()
        .map(|c| c.id().value())
        .collect();
    assert_eq!(ids, vec![0, 2]);
}

#[test]
fn test_single_item_queries_report_not_found() {
    let h = setup();
    let alice = Address::from_label("alice");

    assert!(matches!(h.ledger.get_campaign(CampaignId(0)), Err(LedgerError::NotFound(_))));
    assert!(matches!(h.ledger.donation_of(CampaignId(0), &alice), Err(LedgerError::NotFound(_))));
    assert!(matches!(h.ledger.donors(CampaignId(0)), Err(LedgerError::NotFound(_))));
    assert!(matches!(h.ledger.status(CampaignId(0)), Err(LedgerError::NotFound(_))));
}

#[test]
fn test_events_emitted_for_committed_mutations() {
    let h = setup();
    let alice = funded(&h, "alice", 1000);
    let owner = Address::from_label("owner");
    let id = h.ledger.create_campaign(owner, 100, START + 100).unwrap();
    h.ledger.donate(id, alice, 100).unwrap();
    let _ = h.ledger.donate(id, alice, 0);
    h.ledger.withdraw(id, owner).unwrap();

    let events = h.ledger.poll_events();
    assert_eq!(events.len(), 4);
    assert!(matches!(events[0], LedgerEvent::CampaignCreated { goal_amount: 100, .. }));
    assert!(matches!(events[1], LedgerEvent::DonationReceived { amount: 100, raised_amount: 100, .. }));
    assert!(matches!(events[2], LedgerEvent::FundsWithdrawn { amount: 100, .. }));
    assert_eq!(events[3], LedgerEvent::CampaignClosed { campaign_id: id });
    assert!(events.iter().all(|e| e.campaign_id() == id));

    assert!(h.ledger.poll_events().is_empty());
}

#[test]
fn test_statistics_sum_beyond_single_campaign_range() {
    let ledger = unbounded_ledger();
    let owner = Address::from_label("owner");
    let alice = Address::from_label("alice");
    let big = ledger.create_campaign(owner, u64::MAX, START + 100).unwrap();
    let small = ledger.create_campaign(owner, 1, START + 100).unwrap();
    ledger.donate(big, alice, u64::MAX).unwrap();
    ledger.donate(small, alice, 1).unwrap();

    let expected = u128::from(u64::MAX) + 1;
    let stats = ledger.statistics();
    assert_eq!(stats.total_raised, expected);
    assert_eq!(stats.custody_balance, expected);

    assert_eq!(ledger.withdraw(big, owner).unwrap(), u64::MAX);
    assert_eq!(ledger.withdraw(small, owner).unwrap(), 1);

    let stats = ledger.statistics();
    assert_eq!(stats.total_withdrawn, expected);
    assert_eq!(stats.custody_balance, 0);
    assert!(ledger.snapshot().check_consistency().is_ok());
}

#[test]
fn test_statistics_track_custody() {
    let h = setup();
    let alice = funded(&h, "alice", 1000);
    let owner = Address::from_label("owner");
    let a = h.ledger.create_campaign(owner, 100, START + 100).unwrap();
    let b = h.ledger.create_campaign(owner, 900, START + 100).unwrap();
    h.ledger.donate(a, alice, 150).unwrap();
    h.ledger.donate(b, alice, 200).unwrap();
    h.ledger.withdraw(a, owner).unwrap();

    let stats = h.ledger.statistics();
    assert_eq!(stats.total_campaigns, 2);
    assert_eq!(stats.open_campaigns, 1);
    assert_eq!(stats.total_raised, 350);
    assert_eq!(stats.total_withdrawn, 150);
    assert_eq!(stats.total_refunded, 0);
    assert_eq!(stats.custody_balance, 200);
    assert_eq!(stats.custody_balance, u128::from(h.token.balance_of(h.ledger.custody_address())));
}
