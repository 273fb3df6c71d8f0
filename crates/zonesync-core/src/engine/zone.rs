//! Zone resolution
//!
//! Maps a domain name to the provider's zone identifier. A missing zone is
//! an expected outcome and is returned as `Ok(None)`.

use crate::error::Result;
use crate::traits::{DnsProvider, ZoneId};
use tracing::{debug, info, warn};

/// Look up the zone id for `domain_name`
///
/// Returns the id of the first listed zone named `domain_name`, or `None`
/// when there is none. Provider errors are returned as-is, without retry.
pub async fn resolve_zone(provider: &dyn DnsProvider, domain_name: &str) -> Result<Option<ZoneId>> {
    debug!("Looking up zone for domain '{}'", domain_name);

    let zones = provider.list_zones(domain_name).await?;

    match zones.into_iter().find(|zone| zone.has_name(domain_name)) {
        Some(zone) => {
            info!("Zone ID for domain '{}': {}", domain_name, zone.id);
            Ok(Some(zone.id))
        }
        None => {
            warn!("No zone found for domain '{}'", domain_name);
            Ok(None)
        }
    }
}
