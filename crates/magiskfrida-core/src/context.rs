//! Shared build context.
//!
//! Groups the state every pipeline stage needs so it can be cloned cheaply
//! into worker tasks.

use std::fmt;
use std::sync::Arc;

use crate::config::BuildConfig;
use crate::error::Result;
use crate::reporter::Reporter;

#[derive(Clone)]
pub struct BuildContext {
    pub config: Arc<BuildConfig>,
    pub client: reqwest::Client,
    pub reporter: Arc<dyn Reporter>,
}

impl fmt::Debug for BuildContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuildContext")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl BuildContext {
    /// Build a context with a fresh HTTP client.
    ///
    /// Per-request timeouts are applied by each caller, so the client itself
    /// carries none.
    pub fn new(config: BuildConfig, reporter: Arc<dyn Reporter>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(crate::USER_AGENT)
            .tcp_nodelay(true)
            .build()?;
        Ok(Self::with_client(config, client, reporter))
    }

    pub fn with_client(
        config: BuildConfig,
        client: reqwest::Client,
        reporter: Arc<dyn Reporter>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            client,
            reporter,
        }
    }
}
