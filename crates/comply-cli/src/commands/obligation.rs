mod create;
mod list;
mod transition;
mod update;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::ObligationCommands;
use crate::context::AppContext;
use crate::output::output;

/// Handle `comply obligation`.
pub async fn handle(
    action: &ObligationCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let org = ctx.require_org()?;
    match action {
        ObligationCommands::Create {
            article,
            title,
            summary,
            risk_level,
            owner,
            due,
        } => {
            create::run(
                create::Args {
                    article,
                    title,
                    summary: summary.as_deref(),
                    risk_level: risk_level.as_deref(),
                    owner: owner.as_deref(),
                    due: *due,
                },
                org,
                ctx,
                flags,
            )
            .await
        }
        ObligationCommands::Update {
            id,
            title,
            summary,
            risk_level,
            owner,
            due,
        } => {
            update::run(
                id,
                update::Args {
                    title: title.as_deref(),
                    summary: summary.clone(),
                    risk_level: risk_level.as_deref(),
                    owner: owner.clone(),
                    due: *due,
                },
                org,
                ctx,
                flags,
            )
            .await
        }
        ObligationCommands::List {
            article,
            status,
            risk_level,
            owner,
        } => {
            list::run(
                article.as_deref(),
                status.as_deref(),
                risk_level.as_deref(),
                owner.as_deref(),
                org,
                ctx,
                flags,
            )
            .await
        }
        ObligationCommands::Get { id } => {
            output(&ctx.service.get_obligation(org, id).await?, flags.format)
        }
        ObligationCommands::Transition { id, status } => {
            transition::run_single(id, status, org, ctx, flags).await
        }
        ObligationCommands::BulkTransition { status, ids } => {
            transition::run_bulk(ids, status, org, ctx, flags).await
        }
        ObligationCommands::Delete { id } => {
            let deleted = ctx.service.delete_obligation(&ctx.request, org, id).await?;
            output(&deleted, flags.format)
        }
        ObligationCommands::Systems { id } => {
            output(&ctx.service.systems_for_obligation(org, id).await?, flags.format)
        }
    }
}
