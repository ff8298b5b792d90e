use clap::Subcommand;

/// Article commands.
#[derive(Clone, Debug, Subcommand)]
pub enum ArticleCommands {
    /// Create an article under a regulation.
    Create {
        #[arg(long)]
        regulation: String,
        /// Article number as cited, e.g. "6" or "6(1)".
        #[arg(long)]
        number: String,
        #[arg(long)]
        title: Option<String>,
    },
    /// List the articles of a regulation.
    List {
        #[arg(long)]
        regulation: String,
    },
}
