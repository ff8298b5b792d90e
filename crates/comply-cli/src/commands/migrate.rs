use serde_json::json;

use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::output;

/// Handle `comply migrate`.
///
/// Opening the store already applied the schema; this reports where.
pub fn handle(ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    tracing::info!(path = %ctx.config.database.path, "schema up to date");
    output(
        &json!({
            "database": ctx.config.database.path,
            "migrated": true,
        }),
        flags.format,
    )
}
