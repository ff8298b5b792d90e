use comply_core::enums::{AuditAction, EntityType};
use comply_db::repos::audit::AuditQuery;

use crate::cli::GlobalFlags;
use crate::commands::shared::parse::parse_opt_enum;
use crate::context::AppContext;
use crate::output::output;

pub async fn run(
    entity_type: Option<&str>,
    entity_id: Option<&str>,
    action: Option<&str>,
    offset: u32,
    org: &str,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let query = AuditQuery {
        entity_type: parse_opt_enum::<EntityType>(entity_type, "entity type")?,
        entity_id: entity_id.map(str::to_string),
        action: parse_opt_enum::<AuditAction>(action, "action")?,
        limit: flags.limit,
        offset,
    };
    let page = ctx.service.get_audit_log(org, &query).await?;
    output(&page, flags.format)
}
