//! Process-level, read-once configuration surface.
//!
//! Shaped after the teacher repo's `RpcConfig`: a plain struct with a
//! `Default` impl, overridable field-by-field by whatever wraps the engine
//! (the bundled CLI, in this workspace). Never mutated once a scan has
//! started.

use std::time::Duration;

/// Tunable limits for the scan engine. Read once at scan start; immutable
/// for the duration of the scan.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Worker thread count. Defaults to hardware parallelism.
    pub max_workers: usize,
    /// Caps `nonce_end - nonce_start` for any single scan.
    pub max_nonce_range: u64,
    /// Used when a `ScanRequest.timeout_ms` of 0 requests "use the default".
    pub default_timeout: Duration,
    /// Caps the effective hit limit even when a request asks for more.
    pub max_hit_limit: u64,
    /// Nonces per dispatch batch.
    pub batch_size: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_workers: num_cpus::get(),
            max_nonce_range: 10_000_000,
            default_timeout: Duration::from_secs(60),
            max_hit_limit: 100_000,
            batch_size: 4096,
        }
    }
}

impl EngineConfig {
    pub fn with_max_workers(mut self, workers: usize) -> Self {
        self.max_workers = workers.max(1);
        self
    }

    pub fn with_max_nonce_range(mut self, max_nonce_range: u64) -> Self {
        self.max_nonce_range = max_nonce_range;
        self
    }

    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    pub fn with_max_hit_limit(mut self, max_hit_limit: u64) -> Self {
        self.max_hit_limit = max_hit_limit;
        self
    }
}
