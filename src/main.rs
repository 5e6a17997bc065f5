use clap::Parser;
use trademind::cli::commands::{Cli, Commands};
use trademind::config::AppConfig;
use trademind::domain::entities::source_table::SourceTable;
use trademind::domain::ports::trade_repository::TradeFilter;
use trademind::domain::values::column_mapping::{ColumnMapping, TradeField};
use trademind::domain::values::retrieval_mode::RetrievalMode;
use trademind::TradeMind;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "trademind=info".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    // Detection needs no database.
    if let Commands::Detect { file } = &cli.command {
        if let Err(e) = detect(file) {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
        return;
    }

    let tm = match TradeMind::new(&config) {
        Ok(tm) => tm,
        Err(e) => {
            eprintln!("Error initializing TradeMind: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = run_command(tm, cli.command).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn load_table(path: &str) -> Result<SourceTable, Box<dyn std::error::Error>> {
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

fn detect(path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let table = load_table(path)?;
    let mapping = ColumnMapping::detect(&table.columns);
    println!("{}", serde_json::to_string_pretty(&mapping)?);
    let missing: Vec<String> = mapping.missing_required().iter().map(TradeField::to_string).collect();
    if !missing.is_empty() {
        eprintln!("Unmapped required fields: {}", missing.join(", "));
    }
    Ok(())
}

async fn run_command(tm: TradeMind, cmd: Commands) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        Commands::Detect { file } => detect(&file)?,
        Commands::Import { file, mapping } => {
            let table = load_table(&file)?;
            let mapping: Option<ColumnMapping> = mapping.map(|m| serde_json::from_str(&m)).transpose()?;
            let report = tm.import(&table, mapping)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Trades { limit, code } => {
            let trades = tm.trades(&TradeFilter { limit: Some(limit), stock_code: code, newest_first: true })?;
            println!("{}", serde_json::to_string_pretty(&trades)?);
        }
        Commands::Positions { recompute } => {
            if recompute {
                tm.recompute_positions()?;
            }
            println!("{}", serde_json::to_string_pretty(&tm.positions()?)?);
        }
        Commands::Build => {
            let report = tm.build_memory().await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Query { text, limit, mode } => {
            if let Some(mode) = mode {
                let mode: RetrievalMode = mode.parse().map_err(|e: String| e)?;
                tm.set_mode(mode);
            }
            let hits = tm.query(&text, limit).await?;
            println!("{}", serde_json::to_string_pretty(&hits)?);
        }
        Commands::Ask { question, session } => {
            let session = session.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
            let answer = tm.ask(&session, &question).await?;
            println!("{answer}");
            eprintln!("session: {session}");
        }
        Commands::Graph => {
            let view = tm.refresh_knowledge_view()?;
            println!("{}", serde_json::to_string_pretty(&view)?);
        }
        Commands::Mode => {
            println!("{}", tm.mode());
        }
        Commands::Reset { yes } => {
            if !yes {
                return Err("refusing to drop remote memory without --yes".into());
            }
            tm.reset_memory().await?;
            println!("Remote memory cleared");
        }
    }
    Ok(())
}
