use comply_core::enums::{ObligationStatus, RiskLevel};
use comply_db::repos::obligation::ObligationFilter;

use crate::cli::GlobalFlags;
use crate::commands::shared::parse::parse_opt_enum;
use crate::context::AppContext;
use crate::output::output;

pub async fn run(
    article: Option<&str>,
    status: Option<&str>,
    risk_level: Option<&str>,
    owner: Option<&str>,
    org: &str,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let filter = ObligationFilter {
        article_id: article.map(str::to_string),
        status: parse_opt_enum::<ObligationStatus>(status, "status")?,
        risk_level: parse_opt_enum::<RiskLevel>(risk_level, "risk level")?,
        owner_id: owner.map(str::to_string),
        limit: flags.limit,
    };
    let obligations = ctx.service.list_obligations(org, &filter).await?;
    output(&obligations, flags.format)
}
