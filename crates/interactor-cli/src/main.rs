//! DeFi Interactor CLI
//!
//! The `defi-interactor` command reads role membership and governance state
//! from a deployed interactor and proposes role changes to its Safe.
//!
//! ## Commands
//!
//! - `accounts`: List managed accounts and the roles each holds
//! - `permissions`: Show the roles held by one address
//! - `status`: Show the governing Safe and the pause flag
//! - `watch`: Refetch managed accounts on an interval
//! - `balance`: Show the native balance of a wallet
//! - `encode`: Encode interactor calldata by function name
//! - `propose`: Propose a role change or pause toggle to the Safe

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use alloy_primitives::{Address, B256};
use alloy_signer_local::PrivateKeySigner;
use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::{info, warn, Instrument, Level, Span};

use defi_interactor_core::config::{ENV_CHAIN_ID, ENV_INTERACTOR, ENV_RPC_URL, ENV_SAFE};
use defi_interactor_core::obs::interactor_span;
use defi_interactor_core::proposal::read_safe_nonce;
use defi_interactor_core::{
    build_safe_tx, check_permissions, encode_function_call, fetch_managed_accounts, grant_role,
    interactor_abi, pause, read_status, read_wallet_balance, revoke_role, safe_tx_hash, unpause,
    AccountReader, ChainClient, DefiInteractor, FetchOutcome, InteractorConfig, ManagedAccount,
    ManagedAccountsQuery, MultisigProposer, RoleId, RolePreset, RoleSet, SafeTransactionService,
    TransactionRequest, WalletBalance,
};

const PRIVATE_KEY_ENV: &str = "INTERACTOR_PRIVATE_KEY";

#[derive(Parser)]
#[command(name = "defi-interactor")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Inspect and govern a DeFi Interactor deployment", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON output and JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    #[command(flatten)]
    chain: ChainArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Where the deployment lives. Flags override the environment.
#[derive(Args, Debug)]
struct ChainArgs {
    /// JSON-RPC endpoint of the chain node
    #[arg(long, global = true, env = ENV_RPC_URL)]
    rpc_url: Option<String>,

    /// Chain id the deployment lives on, decimal or 0x-prefixed hex
    #[arg(long, global = true, env = ENV_CHAIN_ID)]
    chain_id: Option<String>,

    /// Address of the DeFi Interactor contract
    #[arg(long, global = true, env = ENV_INTERACTOR)]
    interactor: Option<Address>,

    /// Address of the governing Safe (read from the contract if omitted)
    #[arg(long, global = true, env = ENV_SAFE)]
    safe: Option<Address>,
}

#[derive(Subcommand)]
enum Commands {
    /// List managed accounts with their role flags
    Accounts {
        /// Role set to query (defaults to ROLE_PRESET or deposit-withdraw)
        #[arg(long, value_enum)]
        roles: Option<RolesArg>,
    },

    /// Show which roles an address holds
    Permissions {
        /// Address to check
        address: Address,

        #[arg(long, value_enum)]
        roles: Option<RolesArg>,
    },

    /// Show the governing Safe and whether the interactor is paused
    Status {
        /// Address of the connected wallet, checked against the Safe
        #[arg(long)]
        connected: Option<Address>,
    },

    /// Refetch managed accounts on an interval and print every change
    Watch {
        #[arg(long, default_value = "12")]
        interval_secs: u64,

        /// Stop after this many refetches (runs until interrupted if omitted)
        #[arg(long)]
        iterations: Option<u64>,

        #[arg(long, value_enum)]
        roles: Option<RolesArg>,
    },

    /// Show the native balance of a wallet on the configured network
    Balance {
        /// Wallet to read (defaults to the owner key's address, then the Safe)
        #[arg(long)]
        address: Option<Address>,

        /// Hex private key whose address is read when --address is omitted
        #[arg(long, env = PRIVATE_KEY_ENV, hide_env_values = true)]
        private_key: Option<String>,
    },

    /// ABI-encode an interactor call from string arguments
    Encode {
        /// Function name, e.g. grantRole
        function: String,

        /// Arguments in declaration order
        args: Vec<String>,
    },

    /// Propose a transaction to the governing Safe
    Propose {
        #[command(subcommand)]
        action: ProposeAction,

        /// Build and hash the Safe transaction without signing or posting it
        #[arg(long, global = true)]
        dry_run: bool,

        /// Safe nonce to propose at (defaults to the on-chain nonce)
        #[arg(long, global = true)]
        nonce: Option<u64>,

        /// Hex private key of a Safe owner
        #[arg(long, global = true, env = PRIVATE_KEY_ENV, hide_env_values = true)]
        private_key: Option<String>,
    },
}

#[derive(Subcommand)]
enum ProposeAction {
    /// Grant a role to a member
    Grant {
        member: Address,
        /// Role name (e.g. deposit) or numeric id
        role: String,
    },

    /// Revoke a role from a member
    Revoke {
        member: Address,
        /// Role name (e.g. withdraw) or numeric id
        role: String,
    },

    /// Activate the emergency pause
    Pause,

    /// Lift the emergency pause
    Unpause,
}

#[derive(Clone, Copy, ValueEnum)]
enum RolesArg {
    DepositWithdraw,
    ExecuteTransfer,
}

impl From<RolesArg> for RolePreset {
    fn from(arg: RolesArg) -> Self {
        match arg {
            RolesArg::DepositWithdraw => RolePreset::DepositWithdraw,
            RolesArg::ExecuteTransfer => RolePreset::ExecuteTransfer,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    defi_interactor_core::init_tracing(cli.json, level);

    let json = cli.json;
    match cli.command {
        Commands::Encode { function, args } => cmd_encode(&function, &args, json),
        Commands::Accounts { roles } => {
            let session = Session::open(&cli.chain)?;
            let roles = role_set(&session.config, roles);
            cmd_accounts(&session.interactor, roles, json)
                .instrument(session.span())
                .await
        }
        Commands::Permissions { address, roles } => {
            let session = Session::open(&cli.chain)?;
            let roles = role_set(&session.config, roles);
            cmd_permissions(&session.interactor, address, roles, json)
                .instrument(session.span())
                .await
        }
        Commands::Status { connected } => {
            let session = Session::open(&cli.chain)?;
            cmd_status(&session, connected, json)
                .instrument(session.span())
                .await
        }
        Commands::Watch {
            interval_secs,
            iterations,
            roles,
        } => {
            let session = Session::open(&cli.chain)?;
            let span = session.span();
            let roles = role_set(&session.config, roles);
            cmd_watch(
                session.interactor,
                roles,
                Duration::from_secs(interval_secs.max(1)),
                iterations,
                json,
            )
            .instrument(span)
            .await
        }
        Commands::Balance {
            address,
            private_key,
        } => {
            let session = Session::open(&cli.chain)?;
            cmd_balance(&session, address, private_key, json)
                .instrument(session.span())
                .await
        }
        Commands::Propose {
            action,
            dry_run,
            nonce,
            private_key,
        } => {
            let session = Session::open(&cli.chain)?;
            let request = ProposeRequest {
                action,
                dry_run,
                nonce,
                private_key,
            };
            cmd_propose(&session, request, json)
                .instrument(session.span())
                .await
        }
    }
}

/// Environment settings with command-line flags taking precedence.
fn load_config(args: &ChainArgs) -> Result<InteractorConfig> {
    let interactor = args.interactor.map(|a| a.to_string());
    let safe = args.safe.map(|a| a.to_string());

    InteractorConfig::from_lookup(|key| match key {
        ENV_RPC_URL => args.rpc_url.clone(),
        ENV_CHAIN_ID => args.chain_id.clone(),
        ENV_INTERACTOR => interactor.clone(),
        ENV_SAFE => safe.clone(),
        _ => std::env::var(key).ok(),
    })
    .context("Failed to load interactor configuration")
}

/// Configuration plus the clients built from it, for one on-chain command.
struct Session {
    config: InteractorConfig,
    client: Arc<ChainClient>,
    interactor: DefiInteractor,
}

impl Session {
    fn open(args: &ChainArgs) -> Result<Self> {
        let config = load_config(args)?;
        let client = Arc::new(
            ChainClient::connect_http(&config.rpc_url)
                .with_context(|| format!("Invalid RPC endpoint {}", config.rpc_url))?,
        );
        let interactor = DefiInteractor::new(config.interactor, client.clone());
        Ok(Session {
            config,
            client,
            interactor,
        })
    }

    fn span(&self) -> Span {
        interactor_span(self.config.interactor, self.config.chain_id)
    }

    /// Configured Safe, else the one the interactor reports.
    async fn safe(&self) -> Result<Address> {
        match self.config.safe {
            Some(safe) => Ok(safe),
            None => self
                .interactor
                .safe()
                .await
                .context("Failed to read the governing Safe"),
        }
    }
}

fn warn_on_chain_mismatch(configured: u64, actual: u64) {
    if configured != actual {
        warn!(configured, actual, "RPC endpoint serves a different chain");
    }
}

fn role_set(config: &InteractorConfig, arg: Option<RolesArg>) -> RoleSet {
    arg.map(RolePreset::from).unwrap_or(config.roles).roles()
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_accounts(accounts: &[ManagedAccount], roles: &RoleSet) {
    if accounts.is_empty() {
        println!("No managed accounts");
        return;
    }
    for account in accounts {
        let badges: Vec<&str> = account
            .held_roles()
            .into_iter()
            .map(|id| roles.info(id).name)
            .collect();
        println!("{}  {}", account.address, badges.join(", "));
    }
}

/// List managed accounts
async fn cmd_accounts(interactor: &DefiInteractor, roles: RoleSet, json: bool) -> Result<()> {
    let accounts = fetch_managed_accounts(interactor, &roles)
        .await
        .context("Failed to load managed accounts")?;

    if json {
        return print_json(&accounts);
    }
    print_accounts(&accounts, &roles);
    Ok(())
}

/// Show roles held by one address
async fn cmd_permissions(
    interactor: &DefiInteractor,
    address: Address,
    roles: RoleSet,
    json: bool,
) -> Result<()> {
    let permissions = check_permissions(interactor, address, &roles)
        .await
        .with_context(|| format!("Failed to check roles of {address}"))?;

    if json {
        return print_json(&permissions);
    }

    println!("Address: {}", permissions.member);
    for role in &permissions.roles {
        let mark = if role.held { "yes" } else { "no" };
        println!(
            "  {:<9} {:<3}  {}",
            role.role.name, mark, role.role.description
        );
    }
    if !permissions.has_any_role() {
        println!("  (no roles)");
    }
    Ok(())
}

/// Show governance status
async fn cmd_status(session: &Session, connected: Option<Address>, json: bool) -> Result<()> {
    match session.client.chain_id().await {
        Ok(actual) => warn_on_chain_mismatch(session.config.chain_id, actual),
        Err(e) => warn!(error = %e, "could not read chain id"),
    }

    let status = read_status(&session.interactor, connected)
        .await
        .context("Failed to read interactor status")?;

    if json {
        return print_json(&status);
    }

    println!("Interactor: {}", status.interactor);
    println!("Safe:       {}", status.safe);
    println!(
        "Paused:     {}",
        if status.paused { "yes" } else { "no" }
    );
    if let Some(is_owner) = status.connected_is_safe_owner {
        println!(
            "Connected:  {}",
            if is_owner {
                "Safe (governance actions available)"
            } else {
                "not the Safe (read-only)"
            }
        );
    }
    Ok(())
}

/// Refetch on an interval
async fn cmd_watch(
    interactor: DefiInteractor,
    roles: RoleSet,
    interval: Duration,
    iterations: Option<u64>,
    json: bool,
) -> Result<()> {
    let query = Arc::new(ManagedAccountsQuery::new(Arc::new(interactor), roles));
    let mut ticker = tokio::time::interval(interval);
    let mut last: Option<Vec<ManagedAccount>> = None;
    let mut done = 0u64;

    loop {
        ticker.tick().await;
        let outcome = query.spawn_refetch().await.context("Refetch task failed")?;
        done += 1;

        match outcome {
            FetchOutcome::Committed(Ok(accounts)) => {
                if last.as_ref() != Some(&accounts) {
                    if json {
                        print_json(&query.snapshot())?;
                    } else {
                        println!("-- refetch {done}");
                        print_accounts(&accounts, query.roles());
                    }
                    last = Some(accounts);
                }
            }
            FetchOutcome::Committed(Err(err)) => {
                warn!(error = %err, "refetch failed");
                if json {
                    print_json(&query.snapshot())?;
                }
                last = None;
            }
            FetchOutcome::Superseded { .. } => {}
        }

        if iterations.is_some_and(|limit| done >= limit) {
            return Ok(());
        }
    }
}

fn render_balance(balance: &WalletBalance) -> String {
    format!(
        "Address: {}\nNetwork: {} (chain {})\nBalance: {}",
        balance.address, balance.network, balance.chain_id, balance
    )
}

/// Show a wallet's native balance
async fn cmd_balance(
    session: &Session,
    address: Option<Address>,
    private_key: Option<String>,
    json: bool,
) -> Result<()> {
    let address = match (address, private_key) {
        (Some(address), _) => address,
        (None, Some(key)) => PrivateKeySigner::from_str(key.trim())
            .context("Invalid private key")?
            .address(),
        (None, None) => session.safe().await?,
    };

    let balance = read_wallet_balance(session.client.as_ref(), address)
        .await
        .with_context(|| format!("Failed to read the balance of {address}"))?;
    warn_on_chain_mismatch(session.config.chain_id, balance.chain_id);

    if json {
        return print_json(&balance);
    }
    println!("{}", render_balance(&balance));
    Ok(())
}

/// Encode calldata by function name
fn cmd_encode(function: &str, args: &[String], json: bool) -> Result<()> {
    let data = encode_function_call(&interactor_abi(), function, args)
        .with_context(|| format!("Failed to encode {function}"))?;

    if json {
        return print_json(&serde_json::json!({ "function": function, "data": data }));
    }
    println!("{data}");
    Ok(())
}

struct ProposeRequest {
    action: ProposeAction,
    dry_run: bool,
    nonce: Option<u64>,
    private_key: Option<String>,
}

#[derive(Serialize)]
struct DryRun<'a> {
    safe: Address,
    nonce: u64,
    safe_tx_hash: B256,
    transactions: &'a [TransactionRequest],
}

fn proposal_transactions(
    action: &ProposeAction,
    interactor: Address,
    roles: &RoleSet,
) -> Result<Vec<TransactionRequest>> {
    let resolve = |role: &str| -> Result<RoleId> {
        roles
            .resolve(role)
            .with_context(|| format!("Unknown role `{role}`"))
    };
    Ok(match action {
        ProposeAction::Grant { member, role } => {
            vec![grant_role(interactor, *member, resolve(role)?)]
        }
        ProposeAction::Revoke { member, role } => {
            vec![revoke_role(interactor, *member, resolve(role)?)]
        }
        ProposeAction::Pause => vec![pause(interactor)],
        ProposeAction::Unpause => vec![unpause(interactor)],
    })
}

/// Propose to the Safe
async fn cmd_propose(session: &Session, request: ProposeRequest, json: bool) -> Result<()> {
    let config = &session.config;
    let transactions =
        proposal_transactions(&request.action, config.interactor, &config.roles.roles())?;

    let safe = session.safe().await?;

    if request.dry_run {
        let nonce = match request.nonce {
            Some(nonce) => nonce,
            None => read_safe_nonce(session.client.as_ref(), safe)
                .await
                .context("Failed to read Safe nonce")?,
        };
        let tx = build_safe_tx(&transactions, config.multisend, nonce)?;
        let hash = safe_tx_hash(&tx, config.chain_id, safe);
        let dry_run = DryRun {
            safe,
            nonce,
            safe_tx_hash: hash,
            transactions: &transactions,
        };
        if json {
            return print_json(&dry_run);
        }
        println!("Safe:        {safe}");
        println!("Nonce:       {nonce}");
        println!("SafeTxHash:  {hash}");
        println!("(dry run, nothing signed or posted)");
        return Ok(());
    }

    let key = match request.private_key {
        Some(key) => key,
        None => bail!("A Safe owner key is required; set {PRIVATE_KEY_ENV} or pass --private-key"),
    };
    let signer = PrivateKeySigner::from_str(key.trim()).context("Invalid private key")?;
    let base_url = config.tx_service_base().with_context(|| {
        format!(
            "No Safe Transaction Service known for chain {}; set SAFE_TX_SERVICE_URL",
            config.chain_id
        )
    })?;

    let mut service = SafeTransactionService::with_base_url(
        &base_url,
        config.chain_id,
        safe,
        session.client.clone(),
        Arc::new(signer),
    )?
    .multisend(config.multisend)
    .origin("defi-interactor-cli");
    if let Some(nonce) = request.nonce {
        service = service.nonce(nonce);
    }

    let receipt = service
        .propose(&transactions)
        .await
        .context("Failed to propose transaction")?;
    info!(safe_tx_hash = %receipt.safe_tx_hash, "proposal submitted");

    if json {
        return print_json(&receipt);
    }
    println!("Proposed to Safe {safe}");
    println!("Nonce:       {}", receipt.nonce);
    println!("SafeTxHash:  {}", receipt.safe_tx_hash);
    println!("Waiting for the remaining owners to confirm.");
    Ok(())
}
