//! Demographics provider, currently disabled.
//!
//! The census endpoints this provider targeted proved unstable, so every
//! lookup answers `Ok(None)` without touching the network and the report's
//! demographics section stays `null`. The port stays wired so re-enabling
//! the lookup is a change local to this crate.

use async_trait::async_trait;
use tracing::warn;

use areaguide_core::{
    model::Demographics,
    ports::{DemographicsPort, PortError},
};

/// Placeholder demographics provider that always reports no data.
#[derive(Debug, Clone, Copy, Default)]
pub struct OnsClient;

impl OnsClient {
    /// Create the placeholder provider.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl DemographicsPort for OnsClient {
    async fn for_area(&self, area_code: &str) -> Result<Option<Demographics>, PortError> {
        warn!(area_code, "demographics lookup disabled, skipping");
        Ok(None)
    }
}
