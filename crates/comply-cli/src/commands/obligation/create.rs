use chrono::NaiveDate;
use comply_core::enums::RiskLevel;
use comply_db::repos::obligation::NewObligation;

use crate::cli::GlobalFlags;
use crate::commands::shared::parse::parse_opt_enum;
use crate::context::AppContext;
use crate::output::output;

pub struct Args<'a> {
    pub article: &'a str,
    pub title: &'a str,
    pub summary: Option<&'a str>,
    pub risk_level: Option<&'a str>,
    pub owner: Option<&'a str>,
    pub due: Option<NaiveDate>,
}

pub async fn run(
    args: Args<'_>,
    org: &str,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let risk_level: Option<RiskLevel> = parse_opt_enum(args.risk_level, "risk level")?;
    let obligation = ctx
        .service
        .create_obligation(
            &ctx.request,
            org,
            args.article,
            NewObligation {
                title: args.title.to_string(),
                summary: args.summary.map(str::to_string),
                risk_level: risk_level.unwrap_or_default(),
                owner_id: args.owner.map(str::to_string),
                due_date: args.due,
            },
        )
        .await?;
    output(&obligation, flags.format)
}
