use comply_db::repos::regulation::NewRegulation;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::RegulationCommands;
use crate::context::AppContext;
use crate::output::output;

/// Handle `comply regulation`.
pub async fn handle(
    action: &RegulationCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let org = ctx.require_org()?;
    match action {
        RegulationCommands::Create {
            name,
            slug,
            framework,
            full_title,
        } => {
            let regulation = ctx
                .service
                .create_regulation(
                    &ctx.request,
                    org,
                    NewRegulation {
                        name: name.clone(),
                        slug: slug.clone(),
                        framework: framework.clone(),
                        full_title: full_title.clone(),
                    },
                )
                .await?;
            output(&regulation, flags.format)
        }
        RegulationCommands::List => output(&ctx.service.list_regulations(org).await?, flags.format),
        RegulationCommands::Get { id } => {
            output(&ctx.service.get_regulation(org, id).await?, flags.format)
        }
        RegulationCommands::Delete { id } => {
            let deletion = ctx.service.delete_regulation(&ctx.request, org, id).await?;
            output(&deletion, flags.format)
        }
    }
}
