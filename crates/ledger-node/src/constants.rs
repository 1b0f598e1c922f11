pub(crate) const DEFAULT_LISTEN: &str = "127.0.0.1:8080";
pub(crate) const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
pub(crate) const DEFAULT_MAX_BODY_BYTES: usize = 1 << 20;
pub(crate) const DEFAULT_LOG_FILTER: &str = "info,ledger_node=debug,ledger_core=debug";
