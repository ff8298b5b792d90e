use chrono::NaiveDate;
use clap::Subcommand;

/// Obligation commands.
#[derive(Clone, Debug, Subcommand)]
pub enum ObligationCommands {
    /// Create an obligation under an article.
    Create {
        #[arg(long)]
        article: String,
        #[arg(long)]
        title: String,
        #[arg(long)]
        summary: Option<String>,
        /// low, medium, high, critical
        #[arg(long)]
        risk_level: Option<String>,
        #[arg(long)]
        owner: Option<String>,
        /// Due date as YYYY-MM-DD.
        #[arg(long)]
        due: Option<NaiveDate>,
    },
    /// Update obligation fields.
    Update {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        summary: Option<String>,
        #[arg(long)]
        risk_level: Option<String>,
        #[arg(long)]
        owner: Option<String>,
        #[arg(long)]
        due: Option<NaiveDate>,
    },
    /// List obligations.
    List {
        #[arg(long)]
        article: Option<String>,
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        risk_level: Option<String>,
        #[arg(long)]
        owner: Option<String>,
    },
    /// Get an obligation by ID.
    Get { id: String },
    /// Move one obligation to a new status.
    Transition { id: String, status: String },
    /// Move several obligations to a new status, all or nothing.
    BulkTransition {
        #[arg(long)]
        status: String,
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Delete an obligation.
    Delete { id: String },
    /// Systems an obligation is mapped to.
    Systems { id: String },
}
