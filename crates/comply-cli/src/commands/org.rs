use serde_json::json;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::OrgCommands;
use crate::context::AppContext;
use crate::output::output;

/// Handle `comply org`.
pub async fn handle(
    action: &OrgCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        OrgCommands::Create { name, slug } => {
            let org = ctx
                .service
                .create_organization(&ctx.request, name, slug)
                .await?;
            output(&org, flags.format)
        }
        OrgCommands::List => output(&ctx.service.list_organizations().await?, flags.format),
        OrgCommands::Get { id } => output(&ctx.service.get_organization(id).await?, flags.format),
        OrgCommands::Delete { id } => {
            ctx.service.delete_organization(&ctx.request, id).await?;
            output(&json!({ "deleted": id }), flags.format)
        }
    }
}
