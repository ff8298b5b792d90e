use clap::Parser;

pub mod global;
pub mod root_commands;
pub mod subcommands;

pub use global::{GlobalFlags, OutputFormat};
pub use root_commands::Commands;

/// Top-level CLI parser for the `comply` binary.
#[derive(Debug, Parser)]
#[command(name = "comply", version, about = "Comply - tenant-scoped compliance tracking")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format: json, raw
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Max results to return
    #[arg(short, long, global = true)]
    pub limit: Option<u32>,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Store path (overrides `database.path`)
    #[arg(long, global = true)]
    pub db: Option<String>,

    /// Active organization id
    #[arg(long, global = true)]
    pub org: Option<String>,

    /// Acting user id recorded in the audit log
    #[arg(long, global = true)]
    pub user: Option<String>,
}

impl Cli {
    /// Extract ergonomic global flags struct for command handlers.
    #[must_use]
    pub fn global_flags(&self) -> GlobalFlags {
        GlobalFlags {
            format: self.format,
            limit: self.limit,
            quiet: self.quiet,
            verbose: self.verbose,
            db: self.db.clone(),
            org: self.org.clone(),
            user: self.user.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::{CommandFactory, Parser};

    use super::subcommands::{AuditCommands, ObligationCommands, OrgCommands};
    use super::{Cli, Commands, OutputFormat};

    #[test]
    fn clap_command_tree_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_parse_before_subcommand() {
        let cli = Cli::try_parse_from([
            "comply", "--format", "raw", "--org", "org-1", "--user", "u1", "audit", "list",
        ])
        .expect("cli should parse");

        assert_eq!(cli.format, OutputFormat::Raw);
        let flags = cli.global_flags();
        assert_eq!(flags.org.as_deref(), Some("org-1"));
        assert_eq!(flags.user.as_deref(), Some("u1"));
        assert!(matches!(
            cli.command,
            Commands::Audit {
                action: AuditCommands::List { .. }
            }
        ));
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from(["comply", "migrate", "--db", ":memory:", "--quiet"])
            .expect("cli should parse");

        assert!(cli.quiet);
        assert_eq!(cli.db.as_deref(), Some(":memory:"));
        assert!(matches!(cli.command, Commands::Migrate));
    }

    #[test]
    fn bulk_transition_collects_ids() {
        let cli = Cli::try_parse_from([
            "comply",
            "obligation",
            "bulk-transition",
            "--status",
            "verified",
            "obl-1",
            "obl-2",
        ])
        .expect("cli should parse");

        match cli.command {
            Commands::Obligation {
                action: ObligationCommands::BulkTransition { ids, status },
            } => {
                assert_eq!(ids, vec!["obl-1", "obl-2"]);
                assert_eq!(status, "verified");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn bulk_transition_requires_ids() {
        let parsed =
            Cli::try_parse_from(["comply", "obligation", "bulk-transition", "--status", "verified"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn org_create_requires_slug() {
        assert!(Cli::try_parse_from(["comply", "org", "create", "--name", "Acme"]).is_err());
        let cli = Cli::try_parse_from(["comply", "org", "create", "--name", "Acme", "--slug", "acme"])
            .expect("cli should parse");
        assert!(matches!(
            cli.command,
            Commands::Org {
                action: OrgCommands::Create { .. }
            }
        ));
    }

    #[test]
    fn output_format_rejects_invalid_value() {
        assert!(Cli::try_parse_from(["comply", "--format", "xml", "migrate"]).is_err());
    }
}
