use std::env;
use std::path::PathBuf;

/// Process configuration, read once at startup. `DATABASE_URL` and the
/// AI client settings are read where they are used.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub upload_dir: PathBuf,
    pub max_file_size: usize,
    pub worker_count: usize,
    pub queue_capacity: usize,
}

impl Config {
    pub fn from_env() -> Self {
        Config {
            port: env_parsed("PORT", 3000),
            upload_dir: PathBuf::from(
                env::var("UPLOAD_DIR").unwrap_or_else(|_| "./uploads".to_string()),
            ),
            max_file_size: env_parsed("MAX_FILE_SIZE", 10 * 1024 * 1024),
            worker_count: env_parsed("WORKER_COUNT", 3),
            queue_capacity: env_parsed("QUEUE_CAPACITY", 64),
        }
    }
}

fn env_parsed<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_env() {
        // Only asserts fields no test environment is expected to set.
        let config = Config::from_env();
        assert!(config.worker_count >= 1);
        assert!(config.queue_capacity >= 1);
        assert!(config.max_file_size > 0);
    }
}
