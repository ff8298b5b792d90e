use clap::Subcommand;

/// Organization commands. These do not require `--org`.
#[derive(Clone, Debug, Subcommand)]
pub enum OrgCommands {
    /// Create an organization.
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        slug: String,
    },
    /// List organizations.
    List,
    /// Get an organization by ID.
    Get { id: String },
    /// Delete an organization and everything it owns.
    Delete { id: String },
}
