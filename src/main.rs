// charity - operator CLI for a locally persisted campaign ledger
//
// Every command opens the store, rebuilds the ledger, runs one operation and
// commits ledger state together with the reference-token balances.

use charity_ledger::campaign::{Campaign, CampaignId};
use charity_ledger::config::{ConfigError, LedgerConfig, DEFAULT_DATA_DIR, ENV_CUSTODY_ADDRESS, ENV_DATA_DIR};
use charity_ledger::identity::{Address, AddressError};
use charity_ledger::ledger::{CampaignLedger, Clock, LedgerError, LedgerState, SystemClock};
use charity_ledger::storage::{LedgerStore, StoreError};
use charity_ledger::token::{InMemoryToken, TransferError};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error};

#[derive(Error, Debug)]
enum CliError {
    #[error("No ledger deployed in {}; run `charity deploy` first", .0.display())]
    NotDeployed(PathBuf),

    #[error("A ledger is already deployed in {}", .0.display())]
    AlreadyDeployed(PathBuf),

    #[error("Invalid account '{input}': {source}")]
    InvalidAccount {
        input: String,
        #[source]
        source: AddressError,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Token(#[from] TransferError),
}

/// Charity donation ledger
#[derive(Parser)]
#[command(name = "charity")]
#[command(about = "Charity donation ledger - campaigns, donations, withdrawals and refunds", long_about = None)]
#[command(version)]
struct Cli {
    /// Directory holding the ledger store
    #[arg(long, env = ENV_DATA_DIR, default_value = DEFAULT_DATA_DIR)]
    data_dir: PathBuf,

    /// Log filter (overridden by RUST_LOG)
    #[arg(long, env = "CHARITY_LOG", default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Deploy a new ledger bound to a stable token
    Deploy {
        /// Stable-token address (0x...); read from STABLE_TOKEN_ADDRESS when omitted
        #[arg(long)]
        token: Option<String>,
        /// Custody account; derived from the token when omitted
        #[arg(long, env = ENV_CUSTODY_ADDRESS)]
        custody: Option<String>,
    },
    /// Credit reference-token balance to an account
    Mint { account: String, amount: u64 },
    /// Create a campaign; prints its id
    Create {
        owner: String,
        goal: u64,
        /// Seconds from now until the deadline
        duration_secs: u64,
    },
    /// Donate to a campaign
    Donate { campaign: u64, donor: String, amount: u64 },
    /// Withdraw a successful campaign's funds to its owner
    Withdraw { campaign: u64, caller: String },
    /// Reclaim a donation from a campaign that missed its goal
    Refund { campaign: u64, donor: String },
    /// List every campaign in creation order
    List,
    /// Print the number of campaigns ever created
    Total,
    /// Show one campaign and its donors
    Show { campaign: u64 },
    /// Print an account's reference-token balance
    Balance { account: String },
    /// Print ledger statistics
    Stats,
}

/// Accounts are given either as 0x-hex or as a label hashed into an address
fn parse_account(input: &str) -> Result<Address, CliError> {
    if input.starts_with("0x") {
        Address::parse(input).map_err(|source| CliError::InvalidAccount {
            input: input.to_string(),
            source,
        })
    } else {
        Ok(Address::from_label(input))
    }
}

fn format_time(ts: u64) -> String {
    DateTime::<Utc>::from_timestamp(ts as i64, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| ts.to_string())
}

fn print_campaign(campaign: &Campaign, now: u64) {
    println!(
        "{:>5}  owner={}  goal={}  raised={}  refunded={}  donors={}  deadline={}  status={}",
        campaign.id(),
        campaign.owner(),
        campaign.goal_amount(),
        campaign.raised_amount(),
        campaign.refunded_amount(),
        campaign.donor_count(),
        format_time(campaign.deadline()),
        campaign.status_at(now)
    );
}

struct Session {
    store: LedgerStore,
    token: Arc<InMemoryToken>,
    ledger: CampaignLedger,
}

impl Session {
    fn open(data_dir: &Path, clock: Arc<dyn Clock>) -> Result<Self, CliError> {
        let store = LedgerStore::open(data_dir)?;
        let config = store
            .load_config()?
            .ok_or_else(|| CliError::NotDeployed(data_dir.to_path_buf()))?;

        let token = Arc::new(match store.load_balances()? {
            Some(balances) => InMemoryToken::from_balances(balances),
            None => InMemoryToken::new(config.token_address),
        });
        let state = store
            .load_state()?
            .unwrap_or_else(|| LedgerState::new(config.token_address, config.custody_address));

        let ledger = CampaignLedger::restore(config, state, Box::new(Arc::clone(&token)), clock)?;
        debug!(version = ledger.snapshot().version(), "ledger loaded");
        Ok(Self { store, token, ledger })
    }

    fn commit(&self) -> Result<(), CliError> {
        self.store
            .commit(&self.ledger.snapshot(), &self.token.export_balances())?;
        Ok(())
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    if let Command::Deploy { token, custody } = &cli.command {
        let store = LedgerStore::open(&cli.data_dir)?;
        if store.is_deployed()? {
            return Err(CliError::AlreadyDeployed(cli.data_dir.clone()));
        }

        let mut config = match token {
            Some(token) => {
                let token_address = Address::parse(token).map_err(|source| CliError::InvalidAccount {
                    input: token.clone(),
                    source,
                })?;
                LedgerConfig::new(token_address)
            }
            None => LedgerConfig::from_env()?,
        };
        if let Some(custody) = custody {
            config = config.with_custody(parse_account(custody)?);
        }
        config.validate()?;

        let port = Arc::new(InMemoryToken::new(config.token_address));
        let ledger = CampaignLedger::deploy(config.clone(), Box::new(Arc::clone(&port)), clock)?;
        store.save_config(&config)?;
        store.commit(&ledger.snapshot(), &port.export_balances())?;

        println!("deployed ledger for token {}", config.token_address);
        println!("custody account {}", config.custody_address);
        return Ok(());
    }

    let session = Session::open(&cli.data_dir, Arc::clone(&clock))?;
    let ledger = &session.ledger;

    match cli.command {
        Command::Deploy { .. } => {}
        Command::Mint { account, amount } => {
            let account = parse_account(&account)?;
            let balance = session.token.mint(&account, amount)?;
            session.commit()?;
            println!("{} balance {}", account, balance);
        }
        Command::Create { owner, goal, duration_secs } => {
            let owner = parse_account(&owner)?;
            let deadline = clock.now().saturating_add(duration_secs);
            let id = ledger.create_campaign(owner, goal, deadline)?;
            session.commit()?;
            println!("created campaign {} (deadline {})", id.value(), format_time(deadline));
        }
        Command::Donate { campaign, donor, amount } => {
            let id = CampaignId(campaign);
            ledger.donate(id, parse_account(&donor)?, amount)?;
            session.commit()?;
            println!("campaign {} raised {}", id, ledger.get_campaign(id)?.raised_amount());
        }
        Command::Withdraw { campaign, caller } => {
            let paid = ledger.withdraw(CampaignId(campaign), parse_account(&caller)?)?;
            session.commit()?;
            println!("withdrew {}", paid);
        }
        Command::Refund { campaign, donor } => {
            let refunded = ledger.refund(CampaignId(campaign), parse_account(&donor)?)?;
            session.commit()?;
            println!("refunded {}", refunded);
        }
        Command::List => {
            let now = clock.now();
            for campaign in ledger.get_all_campaigns() {
                print_campaign(&campaign, now);
            }
        }
        Command::Total => {
            println!("{}", ledger.get_total_campaigns());
        }
        Command::Show { campaign } => {
            let id = CampaignId(campaign);
            print_campaign(&ledger.get_campaign(id)?, clock.now());
            for record in ledger.donors(id)? {
                println!(
                    "       donor={}  outstanding={}  contributed={}",
                    record.donor(),
                    record.amount(),
                    record.contributed()
                );
            }
        }
        Command::Balance { account } => {
            let account = parse_account(&account)?;
            println!("{} balance {}", account, session.token.balance_of(&account));
        }
        Command::Stats => {
            let stats = ledger.statistics();
            println!("campaigns        {}", stats.total_campaigns);
            println!("open campaigns   {}", stats.open_campaigns);
            println!("donor records    {}", stats.donor_records);
            println!("total raised     {}", stats.total_raised);
            println!("total withdrawn  {}", stats.total_withdrawn);
            println!("total refunded   {}", stats.total_refunded);
            println!("custody balance  {}", stats.custody_balance);
        }
    }

    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| cli.log_level.clone().into());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "command failed");
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
