/// Server the tools talk to when `--url` is not given.
pub(crate) const DEFAULT_URL: &str = "http://localhost:8069";
/// Model id sent in every chat request.
pub(crate) const DEFAULT_MODEL: &str = "gpt-4";

pub(super) const DEFAULT_REQUEST_TIMEOUT: &str = "30s";
pub(super) const DEFAULT_CONNECT_TIMEOUT: &str = "5s";
pub(super) const DEFAULT_POLL_TIMEOUT: &str = "5s";
pub(super) const DEFAULT_INTERVAL: &str = "5s";
pub(super) const DEFAULT_HISTORY_MAX: &str = "10000";
pub(super) const DEFAULT_TREND_WINDOW: &str = "10";
pub(super) const DEFAULT_LOG_DIR: &str = ".";
