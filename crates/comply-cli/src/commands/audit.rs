mod export;
mod list;

use comply_core::enums::EntityType;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::AuditCommands;
use crate::commands::shared::parse::parse_enum;
use crate::context::AppContext;
use crate::output::output;

/// Handle `comply audit`.
pub async fn handle(
    action: &AuditCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let org = ctx.require_org()?;
    match action {
        AuditCommands::List {
            entity_type,
            entity_id,
            action,
            offset,
        } => {
            list::run(
                entity_type.as_deref(),
                entity_id.as_deref(),
                action.as_deref(),
                *offset,
                org,
                ctx,
                flags,
            )
            .await
        }
        AuditCommands::History {
            entity_type,
            entity_id,
        } => {
            let entity_type = parse_enum::<EntityType>(entity_type, "entity type")?;
            let history = ctx
                .service
                .audit_history(org, entity_type, entity_id)
                .await?;
            output(&history, flags.format)
        }
        AuditCommands::Reconstruct {
            entity_type,
            entity_id,
        } => {
            let entity_type = parse_enum::<EntityType>(entity_type, "entity type")?;
            let rebuilt = ctx
                .service
                .reconstruct(org, entity_type, entity_id)
                .await?;
            output(&rebuilt, flags.format)
        }
        AuditCommands::Export { path } => export::run(path, org, ctx, flags).await,
    }
}
