//! Default values and functions for configuration

/// Sleep between polling passes
pub(crate) const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;

pub(crate) const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Timeout used when a descendant search has to find its own root
pub(crate) const DEFAULT_ROOT_REFRESH_TIMEOUT_SECS: u64 = 2;

pub(crate) fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

pub(crate) fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

pub(crate) fn default_root_refresh_timeout_secs() -> u64 {
    DEFAULT_ROOT_REFRESH_TIMEOUT_SECS
}

pub(crate) fn default_top_level_sentinels() -> Vec<String> {
    vec![
        "currentwindow".to_string(),
        "current=window".to_string(),
        "current".to_string(),
    ]
}
