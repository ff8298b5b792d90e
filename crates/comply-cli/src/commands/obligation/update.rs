use chrono::NaiveDate;
use comply_core::enums::RiskLevel;
use comply_db::updates::obligation::ObligationUpdateBuilder;

use crate::cli::GlobalFlags;
use crate::commands::shared::parse::parse_enum;
use crate::context::AppContext;
use crate::output::output;

pub struct Args<'a> {
    pub title: Option<&'a str>,
    pub summary: Option<String>,
    pub risk_level: Option<&'a str>,
    pub owner: Option<String>,
    pub due: Option<NaiveDate>,
}

pub async fn run(
    id: &str,
    args: Args<'_>,
    org: &str,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    if args.title.is_none()
        && args.summary.is_none()
        && args.risk_level.is_none()
        && args.owner.is_none()
        && args.due.is_none()
    {
        anyhow::bail!(
            "At least one of --title, --summary, --risk-level, --owner, or --due must be provided"
        );
    }

    let mut builder = ObligationUpdateBuilder::new();
    if let Some(title) = args.title {
        builder = builder.title(title);
    }
    if let Some(summary) = args.summary {
        builder = builder.summary(Some(summary));
    }
    if let Some(risk_level) = args.risk_level {
        builder = builder.risk_level(parse_enum::<RiskLevel>(risk_level, "risk level")?);
    }
    if let Some(owner) = args.owner {
        builder = builder.owner_id(Some(owner));
    }
    if let Some(due) = args.due {
        builder = builder.due_date(Some(due));
    }

    let obligation = ctx
        .service
        .update_obligation(&ctx.request, org, id, builder.build())
        .await?;
    output(&obligation, flags.format)
}
