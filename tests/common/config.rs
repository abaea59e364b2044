//! Test configuration helpers for creating downloaders against a fake archive

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use zeit_archive_dl::{ArchiveDownloader, Config, MemoryLogger, RetryConfig, SourceConfig};

/// Cookie sent by every test run
pub const TEST_COOKIE: &str = "zeit_sso=integration";

/// Configuration pointing every endpoint at `origin` and writing below `base`
pub fn archive_config(origin: &str, base: &Path) -> Config {
    Config {
        auth_cookie: TEST_COOKIE.to_string(),
        base_path: base.to_path_buf(),
        endpoints: SourceConfig::with_origin(origin),
        retry: RetryConfig {
            max_attempts: 2,
            initial_delay: Duration::from_millis(5),
            max_delay: Duration::from_millis(20),
            backoff_multiplier: 2.0,
            jitter: false,
        },
        ..Default::default()
    }
}

/// Build a downloader for `config` that records its log lines
pub fn create_downloader(config: Config) -> (ArchiveDownloader, Arc<MemoryLogger>) {
    let logger = Arc::new(MemoryLogger::new());
    let downloader = ArchiveDownloader::new(config, logger.clone())
        .unwrap_or_else(|e| panic!("failed to create downloader: {}", e));
    (downloader, logger)
}
