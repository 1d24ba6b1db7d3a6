use std::collections::HashMap;

use anyhow::Result;
use config::{Config, Environment, File, Source};
use serde::{Deserialize, Serialize};
use svckit::config::{ApiConfig, FeedConfig, ObservabilityConfig};

const ENV_PREFIX: &str = "OMNIROUTE";

/// Single variable selecting the REST base URL.
pub const API_BASE_VAR: &str = "OMNIROUTE_API_BASE";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    pub api: ApiConfig,
    pub feed: FeedConfig,
    pub observability: ObservabilityConfig,
}

/// File (optional) < `OMNIROUTE_<SECTION>__<KEY>` < `OMNIROUTE_API_BASE`.
pub fn load_config(path: &str) -> Result<ConsoleConfig> {
    build(File::with_name(path).required(false), None)
}

fn build<S>(file: S, env: Option<HashMap<String, String>>) -> Result<ConsoleConfig>
where
    S: Source + Send + Sync + 'static,
{
    let api_base = match &env {
        Some(vars) => vars.get(API_BASE_VAR).cloned(),
        None => std::env::var(API_BASE_VAR).ok(),
    };

    let config = Config::builder()
        .add_source(file)
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .source(env),
        )
        .set_override_option("api.base_url", api_base)?
        .build()?;

    Ok(config.try_deserialize()?)
}
