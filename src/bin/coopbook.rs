use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use coopbook::prelude::*;

#[derive(Parser)]
#[command(name = "coopbook")]
#[command(about = "Farm records and reports from the command line", long_about = None)]
struct Cli {
    #[arg(long, env = "COOPBOOK_EMAIL")]
    email: String,

    #[arg(long, env = "COOPBOOK_PASSWORD", hide_env_values = true)]
    password: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Headline numbers: birds, today's eggs, coops, sales, last seven days
    Dashboard,

    /// Production, sales, costs and profit over a window
    Report {
        /// 7d, 30d or all
        #[arg(long, default_value = "30d")]
        window: ReportWindow,
    },

    /// Print every row of one table
    List {
        #[arg(value_enum)]
        table: Table,

        #[arg(long)]
        limit: Option<u32>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Table {
    Coops,
    Chickens,
    Production,
    Feed,
    Health,
    Sales,
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn list<R: Record>(
    records: Records<R>,
    session: &SessionContext,
    limit: Option<u32>,
) -> anyhow::Result<()> {
    let filter = match limit {
        Some(limit) => ListFilter::new().limit(limit),
        None => ListFilter::new(),
    };
    let rows = records
        .list(session, &filter)
        .await
        .with_context(|| format!("listing {}", R::TABLE))?;
    print_json(&rows)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let book = CoopBook::from_env().context("loading Supabase configuration")?;
    let session = book
        .sign_in(&cli.email, &cli.password)
        .await
        .context("signing in")?;

    match cli.command {
        Commands::Dashboard => {
            let stats = book.dashboard(&session).await?;
            if stats.needs_first_coop() {
                eprintln!("No coops yet. Create one to start recording.");
            }
            print_json(&stats)?;
        }
        Commands::Report { window } => {
            print_json(&book.report(&session, window).await?)?;
        }
        Commands::List { table, limit } => match table {
            Table::Coops => list(book.coops(), &session, limit).await?,
            Table::Chickens => list(book.chickens(), &session, limit).await?,
            Table::Production => list(book.egg_production(), &session, limit).await?,
            Table::Feed => list(book.feed(), &session, limit).await?,
            Table::Health => list(book.health_records(), &session, limit).await?,
            Table::Sales => list(book.sales(), &session, limit).await?,
        },
    }

    if let Err(e) = book.sign_out(&session).await {
        tracing::warn!(error = %e, "sign-out failed");
    }
    Ok(())
}
