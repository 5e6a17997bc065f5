use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "trademind", about = "Trading journal with a position ledger and memory retrieval")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the column mapping detected for a table file
    Detect {
        /// JSON table: {"columns": [...], "rows": [[...], ...]}
        file: String,
    },
    /// Import trades from a table file and recompute positions
    Import {
        file: String,
        /// JSON column mapping overriding detection, e.g. {"trade_date": "Date"}
        #[arg(long)]
        mapping: Option<String>,
    },
    /// List trades, newest first
    Trades {
        #[arg(long, default_value = "20")]
        limit: usize,
        #[arg(long)]
        code: Option<String>,
    },
    /// Show open positions
    Positions {
        /// Replay the ledger before listing
        #[arg(long)]
        recompute: bool,
    },
    /// Push the ledger into remote memory and rebuild the embedding index
    Build,
    /// Retrieve memories related to a query
    Query {
        text: String,
        #[arg(long, default_value = "10")]
        limit: usize,
        /// Force a retrieval mode for this query (remote_graph, local_embedding, keyword)
        #[arg(long)]
        mode: Option<String>,
    },
    /// Ask the assistant a question
    Ask {
        question: String,
        /// Conversation id; a new one is generated when omitted
        #[arg(long)]
        session: Option<String>,
    },
    /// Rebuild and print the node/edge view of the ledger
    Graph,
    /// Show the retrieval mode derived from configuration and the stored index
    Mode,
    /// Drop all remote memory
    Reset {
        #[arg(long)]
        yes: bool,
    },
}
