use clap::Subcommand;

/// Regulation commands.
#[derive(Clone, Debug, Subcommand)]
pub enum RegulationCommands {
    /// Create a regulation.
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        slug: String,
        #[arg(long)]
        framework: Option<String>,
        #[arg(long)]
        full_title: Option<String>,
    },
    /// List regulations.
    List,
    /// Get a regulation by ID.
    Get { id: String },
    /// Delete a regulation with its articles and obligations.
    Delete { id: String },
}
