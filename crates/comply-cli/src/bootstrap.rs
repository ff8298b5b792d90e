use anyhow::Context;
use comply_config::ComplyConfig;

use crate::cli::GlobalFlags;

/// Load layered configuration, then apply command-line overrides.
pub fn load_config(flags: &GlobalFlags) -> anyhow::Result<ComplyConfig> {
    let mut config = ComplyConfig::load_with_dotenv().context("failed to load configuration")?;
    apply_overrides(&mut config, flags);
    Ok(config)
}

fn apply_overrides(config: &mut ComplyConfig, flags: &GlobalFlags) {
    if let Some(path) = &flags.db {
        config.database.path.clone_from(path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::OutputFormat;

    fn flags(db: Option<&str>) -> GlobalFlags {
        GlobalFlags {
            format: OutputFormat::Json,
            limit: None,
            quiet: false,
            verbose: false,
            db: db.map(str::to_string),
            org: None,
            user: None,
        }
    }

    #[test]
    fn db_flag_overrides_config_path() {
        let mut config = ComplyConfig::default();
        apply_overrides(&mut config, &flags(Some(":memory:")));
        assert!(config.database.is_in_memory());
    }

    #[test]
    fn config_path_kept_without_flag() {
        let mut config = ComplyConfig::default();
        apply_overrides(&mut config, &flags(None));
        assert_eq!(config.database.path, "comply.db");
    }
}
