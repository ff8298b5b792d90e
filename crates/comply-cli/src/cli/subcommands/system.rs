use clap::Subcommand;

/// System and mapping commands.
#[derive(Clone, Debug, Subcommand)]
pub enum SystemCommands {
    /// Register an internal system.
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        slug: String,
        #[arg(long)]
        category: Option<String>,
        /// low, medium, high, critical
        #[arg(long)]
        criticality: Option<String>,
    },
    /// List systems.
    List,
    /// Map an obligation to a system.
    Map { obligation: String, system: String },
    /// Remove an obligation-to-system mapping.
    Unmap { obligation: String, system: String },
    /// Obligations mapped to a system.
    Obligations { system: String },
}
