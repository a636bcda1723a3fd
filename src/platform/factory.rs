//! Platform service construction

use crate::error::Result;
use crate::platform::{GitHubService, PlatformService};
use crate::types::{Credentials, PlatformConfig};
use std::sync::Arc;
use std::time::Duration;

/// Builds a platform service once the repository and credentials are known
pub trait PlatformFactory: Send + Sync {
    /// Create a service for `config`, authenticating with `credentials`
    fn create(
        &self,
        config: &PlatformConfig,
        credentials: &Credentials,
        timeout: Duration,
    ) -> Result<Arc<dyn PlatformService>>;
}

/// Factory producing [`GitHubService`] instances
#[derive(Debug, Clone, Default)]
pub struct GitHubFactory {
    api_base: Option<String>,
}

impl GitHubFactory {
    /// Factory for github.com (or the enterprise host found in the remote)
    pub fn new() -> Self {
        Self::default()
    }

    /// Factory that talks to an explicit API base URL
    pub fn with_api_base(api_base: impl Into<String>) -> Self {
        Self {
            api_base: Some(api_base.into()),
        }
    }
}

impl PlatformFactory for GitHubFactory {
    fn create(
        &self,
        config: &PlatformConfig,
        credentials: &Credentials,
        timeout: Duration,
    ) -> Result<Arc<dyn PlatformService>> {
        let service = match &self.api_base {
            Some(base) => {
                GitHubService::with_api_base(credentials, config.clone(), base.clone(), timeout)?
            }
            None => GitHubService::new(
                credentials,
                config.owner.clone(),
                config.repo.clone(),
                config.host.clone(),
                timeout,
            )?,
        };
        Ok(Arc::new(service))
    }
}
