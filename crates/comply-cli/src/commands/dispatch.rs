use crate::cli::GlobalFlags;
use crate::cli::root_commands::Commands;
use crate::commands;
use crate::context::AppContext;

/// Dispatch a parsed command to the corresponding handler module.
pub async fn dispatch(
    command: Commands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match command {
        Commands::Migrate => commands::migrate::handle(ctx, flags),
        Commands::Org { action } => commands::org::handle(&action, ctx, flags).await,
        Commands::Regulation { action } => commands::regulation::handle(&action, ctx, flags).await,
        Commands::Article { action } => commands::article::handle(&action, ctx, flags).await,
        Commands::Obligation { action } => commands::obligation::handle(&action, ctx, flags).await,
        Commands::System { action } => commands::system::handle(&action, ctx, flags).await,
        Commands::Audit { action } => commands::audit::handle(&action, ctx, flags).await,
    }
}
