use clap::Subcommand;

use crate::cli::subcommands::{
    ArticleCommands, AuditCommands, ObligationCommands, OrgCommands, RegulationCommands,
    SystemCommands,
};

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Create or upgrade the store schema.
    Migrate,
    /// Organizations (tenants).
    Org {
        #[command(subcommand)]
        action: OrgCommands,
    },
    /// Regulations in the active organization.
    Regulation {
        #[command(subcommand)]
        action: RegulationCommands,
    },
    /// Articles of a regulation.
    Article {
        #[command(subcommand)]
        action: ArticleCommands,
    },
    /// Obligations and their status workflow.
    Obligation {
        #[command(subcommand)]
        action: ObligationCommands,
    },
    /// Internal systems and obligation mappings.
    System {
        #[command(subcommand)]
        action: SystemCommands,
    },
    /// Audit log queries and export.
    Audit {
        #[command(subcommand)]
        action: AuditCommands,
    },
}
