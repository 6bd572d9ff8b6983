//! Mapping from configuration to cache store settings

use adoptly_common::cache::CacheConfig;
use adoptly_domain::CacheSettings;

/// Build a store configuration from configured cache settings
pub fn cache_config(settings: &CacheSettings) -> CacheConfig {
    let builder = CacheConfig::builder()
        .dedupe_interval(settings.dedupe_interval())
        .error_retry(settings.error_retry_count, settings.error_retry_interval())
        .revalidate_on_focus(settings.revalidate_on_focus)
        .revalidate_on_reconnect(settings.revalidate_on_reconnect)
        .focus_throttle_interval(settings.focus_throttle());

    match settings.stale_after() {
        Some(age) => builder.stale_after(age),
        None => builder,
    }
    .build()
}
