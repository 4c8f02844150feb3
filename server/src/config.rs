use std::{fmt, str::FromStr, time::Duration};

use serde::Deserialize;
use shared::{IdentityPolicy, ReferenceZone, WEB_FLOW_COMMITTER};

const DEFAULT_GITHUB_TIMEOUT_IN_SECONDS: u64 = 10;

/// Process environment, read with `envy` after `.env` is loaded.
#[derive(Debug, Deserialize)]
pub struct Env {
    pub github_token: String,
    pub cron_secret: String,
    pub api_key: String,
    pub timezone: Option<String>,
    pub github_api_url: Option<String>,
    pub github_timeout_in_seconds: Option<u64>,
    pub sentinel_committer: Option<String>,
    /// Runs the streak sweep in-process when set. Leave unset if an external scheduler calls
    /// `/api/streaks-check`.
    pub sweep_interval_in_minutes: Option<u64>,
}

impl Env {
    pub fn load() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();
        Ok(envy::from_env::<Env>()?)
    }
}

#[derive(Clone)]
pub struct Secrets {
    pub cron_secret: String,
    pub api_key: String,
}

impl fmt::Debug for Secrets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Secrets").finish_non_exhaustive()
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub zone: ReferenceZone,
    pub identity_policy: IdentityPolicy,
    pub github_timeout: Duration,
    pub sweep_interval: Option<Duration>,
    pub secrets: Secrets,
}

impl TryFrom<&Env> for AppConfig {
    type Error = anyhow::Error;

    fn try_from(env: &Env) -> anyhow::Result<Self> {
        let zone = match env.timezone.as_deref() {
            Some(name) => ReferenceZone::from_str(name).map_err(anyhow::Error::msg)?,
            None => ReferenceZone::default(),
        };
        let sentinel = env
            .sentinel_committer
            .clone()
            .unwrap_or_else(|| WEB_FLOW_COMMITTER.to_owned());
        let github_timeout = env
            .github_timeout_in_seconds
            .unwrap_or(DEFAULT_GITHUB_TIMEOUT_IN_SECONDS)
            .max(1);

        Ok(Self {
            zone,
            identity_policy: IdentityPolicy::with_sentinel(sentinel),
            github_timeout: Duration::from_secs(github_timeout),
            sweep_interval: env
                .sweep_interval_in_minutes
                .filter(|minutes| *minutes > 0)
                .map(|minutes| Duration::from_secs(minutes * 60)),
            secrets: Secrets {
                cron_secret: env.cron_secret.clone(),
                api_key: env.api_key.clone(),
            },
        })
    }
}
