pub const DEFAULT_CONFIG_PATH: &str = "config.yml";

pub const DEFAULT_MAX_BACKLOG: usize = 1024;
pub const DEFAULT_BROADCAST_CAPACITY: usize = 256;
pub const DEFAULT_LOCK_TIMEOUT_MS: u64 = 5000;
