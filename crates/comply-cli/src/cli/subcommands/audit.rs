use std::path::PathBuf;

use clap::Subcommand;

/// Audit log commands.
#[derive(Clone, Debug, Subcommand)]
pub enum AuditCommands {
    /// One page of the audit log, newest first.
    List {
        #[arg(long)]
        entity_type: Option<String>,
        #[arg(long)]
        entity_id: Option<String>,
        #[arg(long)]
        action: Option<String>,
        #[arg(long, default_value_t = 0)]
        offset: u32,
    },
    /// Every entry for one entity, oldest first.
    History { entity_type: String, entity_id: String },
    /// Rebuild an entity's last known state from its audit diffs.
    Reconstruct { entity_type: String, entity_id: String },
    /// Write the full audit log as JSON Lines.
    Export { path: PathBuf },
}
