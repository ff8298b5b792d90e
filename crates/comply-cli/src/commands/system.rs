use comply_core::enums::Criticality;
use comply_db::repos::system::NewSystem;
use serde_json::json;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::SystemCommands;
use crate::commands::shared::parse::parse_opt_enum;
use crate::context::AppContext;
use crate::output::output;

/// Handle `comply system`.
pub async fn handle(
    action: &SystemCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let org = ctx.require_org()?;
    match action {
        SystemCommands::Create {
            name,
            slug,
            category,
            criticality,
        } => {
            let criticality: Option<Criticality> =
                parse_opt_enum(criticality.as_deref(), "criticality")?;
            let system = ctx
                .service
                .create_system(
                    &ctx.request,
                    org,
                    NewSystem {
                        name: name.clone(),
                        slug: slug.clone(),
                        category: category.clone(),
                        criticality: criticality.unwrap_or_default(),
                    },
                )
                .await?;
            output(&system, flags.format)
        }
        SystemCommands::List => output(&ctx.service.list_systems(org).await?, flags.format),
        SystemCommands::Map { obligation, system } => {
            let mapping = ctx
                .service
                .map_obligation_to_system(&ctx.request, org, obligation, system)
                .await?;
            output(&mapping, flags.format)
        }
        SystemCommands::Unmap { obligation, system } => {
            ctx.service
                .unmap_obligation_from_system(&ctx.request, org, obligation, system)
                .await?;
            output(
                &json!({ "unmapped": { "obligation": obligation, "system": system } }),
                flags.format,
            )
        }
        SystemCommands::Obligations { system } => {
            output(&ctx.service.obligations_for_system(org, system).await?, flags.format)
        }
    }
}
