use anyhow::Context;
use comply_config::ComplyConfig;
use comply_core::context::RequestContext;
use comply_db::service::ComplyService;

use crate::cli::GlobalFlags;

/// Shared application resources initialized once at startup.
pub struct AppContext {
    pub service: ComplyService,
    pub config: ComplyConfig,
    /// Actor and tenant taken from `--user` and `--org`.
    pub request: RequestContext,
}

impl AppContext {
    pub async fn init(config: ComplyConfig, flags: &GlobalFlags) -> anyhow::Result<Self> {
        let service = ComplyService::from_config(&config)
            .await
            .with_context(|| format!("failed to open store at {}", config.database.path))?;

        Ok(Self {
            service,
            config,
            request: RequestContext {
                active_organization_id: flags.org.clone(),
                user_id: flags.user.clone(),
            },
        })
    }

    /// The organization every tenant-scoped command acts within.
    pub fn require_org(&self) -> anyhow::Result<&str> {
        self.request
            .organization_id()
            .ok_or_else(|| anyhow::anyhow!("no organization selected. Pass --org <id>."))
    }
}
