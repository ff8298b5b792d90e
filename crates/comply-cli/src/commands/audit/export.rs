use std::path::Path;

use serde_json::json;

use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::output;

pub async fn run(
    path: &Path,
    org: &str,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let entries = ctx.service.export_audit_log(org, path).await?;
    output(
        &json!({
            "organization_id": org,
            "path": path.display().to_string(),
            "entries": entries,
        }),
        flags.format,
    )
}
