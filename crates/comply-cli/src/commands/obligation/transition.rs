use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::output;

/// The store validates `status`; an unknown value is rejected before lookup.
pub async fn run_single(
    id: &str,
    status: &str,
    org: &str,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let transition = ctx
        .service
        .transition_obligation(&ctx.request, org, id, status)
        .await?;
    output(&transition, flags.format)
}

pub async fn run_bulk(
    ids: &[String],
    status: &str,
    org: &str,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let bulk = ctx
        .service
        .bulk_transition_obligations(&ctx.request, org, ids, status)
        .await?;
    output(&bulk, flags.format)
}
