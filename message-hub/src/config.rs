use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Environment variable read by [MediatorConfig::from_env] for the publish strategy.
pub const PUBLISH_STRATEGY_ENV: &str = "MEDIATOR_PUBLISH_STRATEGY";

/// Environment variable read by [MediatorConfig::from_env] for the failure policy.
pub const FAILURE_POLICY_ENV: &str = "MEDIATOR_FAILURE_POLICY";

/// How notification handlers are invoked during a publish.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PublishStrategy {
    /// Handlers run one after another, in registration order.
    #[default]
    Sequential,
    /// Handlers are polled together on the publishing task, in no particular order.
    Concurrent,
}

/// What happens to the remaining handlers when a notification handler fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Stop at the first failure and return it.
    #[default]
    FailFast,
    /// Run every handler and return all the failures together.
    FailSoft,
}

impl FromStr for PublishStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sequential" => Ok(PublishStrategy::Sequential),
            "concurrent" => Ok(PublishStrategy::Concurrent),
            other => Err(Error::Config(format!("unknown publish strategy `{}`", other))),
        }
    }
}

impl FromStr for FailurePolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "fail_fast" => Ok(FailurePolicy::FailFast),
            "fail_soft" => Ok(FailurePolicy::FailSoft),
            other => Err(Error::Config(format!("unknown failure policy `{}`", other))),
        }
    }
}

/// Dispatch settings of a mediator.
///
/// Deserializes from a partial document, missing fields take their default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MediatorConfig {
    pub publish_strategy: PublishStrategy,
    pub failure_policy: FailurePolicy,
}

impl MediatorConfig {
    /// Reads the configuration from `MEDIATOR_PUBLISH_STRATEGY` and `MEDIATOR_FAILURE_POLICY`.
    pub fn from_env() -> crate::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration using `lookup` to fetch each variable.
    pub fn from_lookup<F>(lookup: F) -> crate::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = MediatorConfig::default();

        if let Some(value) = lookup(PUBLISH_STRATEGY_ENV) {
            config.publish_strategy = value.parse()?;
        }

        if let Some(value) = lookup(FAILURE_POLICY_ENV) {
            config.failure_policy = value.parse()?;
        }

        Ok(config)
    }
}
