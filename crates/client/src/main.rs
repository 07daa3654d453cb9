use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;
use serde::Serialize;

use ceramerp_accounting::Period;
use ceramerp_auth::{Area, Permission};
use ceramerp_client::{ClientConfig, ErpClient};
use ceramerp_inventory::{MovementFilter, StockAdjustment, StockId, WarehouseId};
use ceramerp_products::ItemId;

#[derive(Parser)]
#[command(name = "ceramerp", about = "Ceramics ERP client", version)]
struct Cli {
    /// Configuration file (TOML). Defaults to ./ceramerp.toml when present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(subcommand)]
    Customers(ListCommand),
    #[command(subcommand)]
    Suppliers(ListCommand),
    #[command(subcommand)]
    Items(ListCommand),
    #[command(subcommand)]
    Warehouses(ListCommand),
    #[command(subcommand)]
    Stock(StockCommand),
    #[command(subcommand)]
    Orders(OrdersCommand),
    #[command(subcommand)]
    Accounting(AccountingCommand),
    #[command(subcommand)]
    Treasury(TreasuryCommand),
    #[command(subcommand)]
    Taxes(TaxesCommand),
    #[command(subcommand)]
    Dashboard(DashboardCommand),
}

#[derive(Subcommand)]
enum ListCommand {
    List,
}

#[derive(Subcommand)]
enum StockCommand {
    List,
    /// Rows below their minimum quantity.
    Low,
    /// Set the quantity of one stock row, keeping its thresholds.
    Adjust {
        id: StockId,
        quantity: Decimal,
    },
    Movements(MovementArgs),
}

#[derive(Args)]
struct MovementArgs {
    #[arg(long)]
    item: Option<ItemId>,
    #[arg(long)]
    warehouse: Option<WarehouseId>,
    #[arg(long, default_value_t = 100)]
    limit: usize,
}

#[derive(Subcommand)]
enum OrdersCommand {
    Purchases,
    Sales,
}

#[derive(Subcommand)]
enum AccountingCommand {
    Entries,
    TrialBalance,
    /// VAT collected minus deductible for a `YYYY-MM` period.
    Vat { period: Period },
}

#[derive(Subcommand)]
enum TreasuryCommand {
    Transactions,
    Balances,
}

#[derive(Subcommand)]
enum TaxesCommand {
    List,
    Upcoming {
        #[arg(long, default_value_t = 30)]
        days: i64,
    },
}

#[derive(Subcommand)]
enum DashboardCommand {
    Revenue,
    Cashflow,
    Expenses,
    Summary,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = ClientConfig::load(cli.config.as_deref()).context("failed to load configuration")?;
    ceramerp_observability::init(config.log.format, &config.log.filter);

    let client = ErpClient::connect(&config).context("failed to create backend client")?;
    if let Some(credentials) = &config.credentials {
        client
            .session()
            .sign_in(&credentials.email, &credentials.password)
            .await
            .with_context(|| format!("failed to sign in as {}", credentials.email))?;
    }

    let result = run(&client, cli.command).await;
    if config.credentials.is_some() {
        client.session().sign_out().await;
    }
    result
}

async fn run(client: &ErpClient, command: Commands) -> Result<()> {
    let today = Local::now().date_naive();
    match command {
        Commands::Customers(ListCommand::List) => {
            print_json(&client.customers().list().await.context("failed to list customers")?)
        }
        Commands::Suppliers(ListCommand::List) => {
            print_json(&client.suppliers().list().await.context("failed to list suppliers")?)
        }
        Commands::Items(ListCommand::List) => {
            print_json(&client.items().list().await.context("failed to list items")?)
        }
        Commands::Warehouses(ListCommand::List) => print_json(
            &client
                .warehouses()
                .list()
                .await
                .context("failed to list warehouses")?,
        ),
        Commands::Stock(command) => stock(client, command).await,
        Commands::Orders(OrdersCommand::Purchases) => print_json(
            &client
                .purchase_orders()
                .list()
                .await
                .context("failed to list purchase orders")?,
        ),
        Commands::Orders(OrdersCommand::Sales) => print_json(
            &client
                .sales_orders()
                .list()
                .await
                .context("failed to list sales orders")?,
        ),
        Commands::Accounting(command) => accounting(client, command).await,
        Commands::Treasury(TreasuryCommand::Transactions) => print_json(
            &client
                .treasury()
                .transactions()
                .await
                .context("failed to list transactions")?,
        ),
        Commands::Treasury(TreasuryCommand::Balances) => print_json(
            &client
                .treasury()
                .balances()
                .await
                .context("failed to compute bank balances")?,
        ),
        Commands::Taxes(TaxesCommand::List) => {
            print_json(&client.taxes().list().await.context("failed to list taxes")?)
        }
        Commands::Taxes(TaxesCommand::Upcoming { days }) => print_json(
            &client
                .taxes()
                .upcoming(today, days)
                .await
                .context("failed to list upcoming taxes")?,
        ),
        Commands::Dashboard(command) => dashboard(client, command, today).await,
    }
}

async fn stock(client: &ErpClient, command: StockCommand) -> Result<()> {
    let hooks = client.stock();
    match command {
        StockCommand::List => print_json(&hooks.list().await.context("failed to list stock")?),
        StockCommand::Low => {
            print_json(&hooks.low_stock().await.context("failed to list low stock")?)
        }
        StockCommand::Adjust { id, quantity } => {
            client
                .session()
                .require(Permission::manage(Area::Inventory))
                .context("stock adjustment needs a signed-in inventory manager")?;
            let row = hooks
                .get(id)
                .await
                .with_context(|| format!("failed to read stock row {id}"))?;
            let adjusted = hooks
                .adjust(id, StockAdjustment::keeping_thresholds(quantity, &row))
                .await
                .with_context(|| format!("failed to adjust stock row {id}"))?;
            print_json(&adjusted)
        }
        StockCommand::Movements(args) => {
            let filter = MovementFilter {
                item_id: args.item,
                warehouse_id: args.warehouse,
                ..MovementFilter::default()
            }
            .limit(args.limit);
            print_json(&hooks.movements(filter).await.context("failed to list movements")?)
        }
    }
}

async fn accounting(client: &ErpClient, command: AccountingCommand) -> Result<()> {
    match command {
        AccountingCommand::Entries => print_json(
            &client
                .accounting()
                .entries()
                .await
                .context("failed to list entries")?,
        ),
        AccountingCommand::TrialBalance => print_json(
            &client
                .accounting()
                .trial_balance()
                .await
                .context("failed to compute trial balance")?,
        ),
        AccountingCommand::Vat { period } => print_json(
            &client
                .taxes()
                .vat_summary(period)
                .await
                .with_context(|| format!("failed to compute VAT for {period}"))?,
        ),
    }
}

async fn dashboard(client: &ErpClient, command: DashboardCommand, today: NaiveDate) -> Result<()> {
    let hooks = client.dashboard();
    match command {
        DashboardCommand::Revenue => {
            print_json(&hooks.revenue(today).await.context("failed to load revenue")?)
        }
        DashboardCommand::Cashflow => {
            print_json(&hooks.cashflow(today).await.context("failed to load cashflow")?)
        }
        DashboardCommand::Expenses => {
            print_json(&hooks.expenses(today).await.context("failed to load expenses")?)
        }
        DashboardCommand::Summary => {
            print_json(&hooks.summary().await.context("failed to load summary")?)
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("failed to render output")?;
    println!("{rendered}");
    Ok(())
}
