mod client;
mod normalize;
mod target;

use serde::Serialize;

use crate::{Config, Error};

pub use client::{HostIntelClient, UpstreamError};
pub use normalize::NormalizedHostRecord;
pub use target::TargetPolicy;

pub const NOT_FOUND_MESSAGE: &str = "No data for this IP";

#[derive(Serialize, Debug)]
#[serde(untagged)]
pub enum LookupOutcome {
    Found(Box<NormalizedHostRecord>),
    NotFound { found: bool, message: &'static str },
}

impl LookupOutcome {
    fn not_found() -> Self {
        Self::NotFound {
            found: false,
            message: NOT_FOUND_MESSAGE,
        }
    }
}

/// Validates a target, asks the provider about it once and reshapes the
/// answer. Holds no per-request state.
#[derive(Clone)]
pub struct LookupRelay {
    client: HostIntelClient,
    policy: TargetPolicy,
}

impl LookupRelay {
    pub fn new(client: HostIntelClient, policy: TargetPolicy) -> Self {
        Self { client, policy }
    }

    pub fn from_config(config: &Config) -> Result<Self, Error> {
        let client = HostIntelClient::new(&config.upstream, config.api_key.as_str())?;
        Ok(Self::new(client, TargetPolicy::from_strict(config.strict_ipv4)))
    }

    pub async fn lookup(&self, target: &str) -> Result<LookupOutcome, Error> {
        let ip = self.policy.check(target)?;

        match self.client.host(ip).await {
            Ok(payload) => {
                debug!(ip, "host found upstream");
                Ok(LookupOutcome::Found(Box::new(
                    NormalizedHostRecord::from_payload(payload),
                )))
            }
            Err(UpstreamError::NotFound) => {
                debug!(ip, "no upstream data");
                Ok(LookupOutcome::not_found())
            }
            Err(err) => Err(err.into()),
        }
    }
}
