use crate::cli::GlobalFlags;
use crate::cli::subcommands::ArticleCommands;
use crate::context::AppContext;
use crate::output::output;

/// Handle `comply article`.
pub async fn handle(
    action: &ArticleCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let org = ctx.require_org()?;
    match action {
        ArticleCommands::Create {
            regulation,
            number,
            title,
        } => {
            let article = ctx
                .service
                .create_article(&ctx.request, org, regulation, number, title.as_deref())
                .await?;
            output(&article, flags.format)
        }
        ArticleCommands::List { regulation } => {
            output(&ctx.service.list_articles(org, regulation).await?, flags.format)
        }
    }
}
