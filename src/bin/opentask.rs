//! OpenTask - command-line shell over the decentralized task board
//!
//! ## Usage
//!
//! ```bash
//! # Browse the board, read-only
//! opentask tasks --status open
//!
//! # Everything that signs needs a key
//! export OPENTASK_PRIVATE_KEY=0x...
//! opentask post --title "Design a logo" --description "Need a vector logo" --reward 1.5
//! opentask claim 3
//! opentask submit 3
//! opentask approve 3
//! opentask me
//! ```

use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};

use opentask_client::app::{EthersApp, Screen};
use opentask_client::config::Config;
use opentask_client::contract::Receipt;
use opentask_client::error::Error;
use opentask_client::form::Field;
use opentask_client::non_blocking_tracing;
use opentask_client::notify::Notification;
use opentask_client::pages::{PostPage, Route, Submission};
use opentask_client::types::{AddressExt, TaskId};
use opentask_client::view::{StatusFilter, TaskAction, TaskCard};

/// OpenTask - post, claim and approve escrowed tasks on Shardeum
#[derive(Parser)]
#[command(name = "opentask")]
#[command(version)]
struct Cli {
    /// JSON-RPC endpoint of the network [env: OPENTASK_RPC_URL]
    #[arg(long, global = true)]
    rpc_url: Option<String>,

    /// Address of the deployed task board contract [env: OPENTASK_CONTRACT_ADDRESS]
    #[arg(long, global = true)]
    contract: Option<String>,

    /// Key of the wallet that signs transactions
    #[arg(long, global = true, env = "OPENTASK_PRIVATE_KEY", hide_env_values = true)]
    private_key: Option<String>,

    /// Print tasks as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// What the board is about
    About,
    /// List every task on the board
    Tasks {
        /// all, open, claimed, completed or approved
        #[arg(short, long, default_value = "all")]
        status: StatusFilter,
    },
    /// Post a task, escrowing its reward
    Post {
        #[arg(short, long)]
        title: String,
        #[arg(short, long)]
        description: String,
        /// Reward in SHM
        #[arg(short, long)]
        reward: String,
    },
    /// Claim an open task
    Claim {
        #[arg(value_parser = parse_task_id)]
        id: TaskId,
    },
    /// Mark a claimed task as done
    Submit {
        #[arg(value_parser = parse_task_id)]
        id: TaskId,
    },
    /// Approve submitted work and release the reward
    Approve {
        #[arg(value_parser = parse_task_id)]
        id: TaskId,
    },
    /// Tasks you posted and claimed
    Me,
    /// Connect the wallet, switching it onto the board's network
    Connect,
    /// Show the network the board lives on
    Network,
}

fn parse_task_id(raw: &str) -> Result<TaskId, String> {
    TaskId::from_dec_str(raw).map_err(|e| format!("invalid task id {:?}: {}", raw, e))
}

fn print_notification(n: Notification) {
    let marker = if n.is_error() { "!" } else { "*" };
    eprintln!("{} {}: {}", marker, n.title, n.description);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _guard = non_blocking_tracing::setup_with_default("warn");

    let config = Config::from_env()?.with_overrides(cli.rpc_url.as_deref(), cli.contract.as_deref())?;
    let mut app = EthersApp::with_local_wallet(
        config,
        cli.private_key.as_deref(),
        Arc::new(print_notification),
    )?;
    app.mount().await;

    let result = run(&app, cli.command, cli.json).await;
    app.unmount();
    result
}

async fn run(app: &EthersApp, command: Commands, json: bool) -> anyhow::Result<()> {
    match command {
        Commands::About => {
            if let Screen::Landing(landing) = app.open(Route::Landing).await {
                println!("{}", landing);
            }
            Ok(())
        }
        Commands::Tasks { status } => cmd_tasks(app, status, json).await,
        Commands::Post {
            title,
            description,
            reward,
        } => cmd_post(app, title, description, reward).await,
        Commands::Claim { id } => cmd_act(app, id, TaskAction::Claim).await,
        Commands::Submit { id } => cmd_act(app, id, TaskAction::SubmitWork).await,
        Commands::Approve { id } => cmd_act(app, id, TaskAction::Approve).await,
        Commands::Me => cmd_me(app, json).await,
        Commands::Connect => cmd_connect(app).await,
        Commands::Network => {
            let network = &app.config().network;
            println!("{} ({}, chain id {})", network.chain_name, network.chain_id_hex(), network.chain_id);
            println!("{}", serde_json::to_string_pretty(network)?);
            Ok(())
        }
    }
}

async fn cmd_tasks(app: &EthersApp, status: StatusFilter, json: bool) -> anyhow::Result<()> {
    let mut page = app.browse().await;
    page.select_tab(status);

    let viewer = app.connection().account();
    let cards = page.cards(viewer.as_ref());
    if json {
        let tasks: Vec<_> = cards.iter().map(|c| &c.task).collect();
        println!("{}", serde_json::to_string_pretty(&tasks)?);
        return Ok(());
    }

    let counts = page.counts();
    let tabs: Vec<String> = StatusFilter::TABS
        .iter()
        .map(|tab| format!("{} ({})", tab.label(), counts.get(*tab)))
        .collect();
    println!("{}", tabs.join(" | "));
    print_cards(&cards, "No tasks found");
    Ok(())
}

async fn cmd_post(app: &EthersApp, title: String, description: String, reward: String) -> anyhow::Result<()> {
    let mut page = PostPage::new();
    page.edit(Field::Title, title);
    page.edit(Field::Description, description);
    page.edit(Field::Reward, reward);

    match page.submit(app.gateway()).await {
        Submission::Created { receipt, redirect } => {
            print_receipt(app, &receipt);
            println!("See {}", redirect);
            Ok(())
        }
        Submission::Invalid => {
            for field in [Field::Title, Field::Description, Field::Reward] {
                if let Some(message) = page.errors().get(field) {
                    eprintln!("  {:?}: {}", field, message);
                }
            }
            bail!("the task was not posted")
        }
        Submission::NotConnected => Err(Error::WalletNotConnected.into()),
        Submission::Failed => bail!("the task was not posted"),
    }
}

async fn cmd_act(app: &EthersApp, task_id: TaskId, expected: TaskAction) -> anyhow::Result<()> {
    let mut page = app.browse().await;
    let viewer = app.connection().account();
    let card = page.card(task_id, viewer.as_ref())?;
    if card.action != Some(expected) {
        return Err(Error::ActionUnavailable {
            action: expected.label(),
            task_id,
        }
        .into());
    }

    let receipt = page.perform(app.gateway(), task_id).await?;
    print_receipt(app, &receipt);
    if let Ok(card) = page.card(task_id, viewer.as_ref()) {
        println!("{}", card);
    }
    Ok(())
}

async fn cmd_me(app: &EthersApp, json: bool) -> anyhow::Result<()> {
    let account = app
        .connection()
        .account()
        .context("Connect your wallet to view your personal dashboard")?;
    let page = app.dashboard().await;
    if json {
        let value = serde_json::json!({
            "posted": page.posted(),
            "claimed": page.claimed(),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("My Dashboard  {}", account.short());
    println!("{}", page.stats());
    println!();
    println!("Posted");
    print_cards(&page.posted_cards(Some(&account)), "You haven't posted any tasks yet");
    println!();
    println!("Claimed");
    print_cards(&page.claimed_cards(Some(&account)), "You haven't claimed any tasks yet");
    Ok(())
}

async fn cmd_connect(app: &EthersApp) -> anyhow::Result<()> {
    match app.manager().connect().await {
        Some(account) => {
            println!("{}", account.checksummed());
            Ok(())
        }
        None => bail!("wallet not connected"),
    }
}

fn print_cards(cards: &[TaskCard], empty: &str) {
    if cards.is_empty() {
        println!("  {}", empty);
    }
    for card in cards {
        println!("{}", card);
        println!();
    }
}

fn print_receipt(app: &EthersApp, receipt: &Receipt) {
    let tx = format!("{:?}", receipt.tx_hash);
    match receipt.block_number {
        Some(block) => println!("{} mined in block {}", tx, block),
        None => println!("{} mined", tx),
    }
    if let Some(url) = app.config().network.explorer_tx_url(&tx) {
        println!("{}", url);
    }
}
