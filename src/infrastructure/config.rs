use std::env;

/// Default cap on records per batch invocation
pub const DEFAULT_MAX_BATCH_SIZE: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Full,
    Compact,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Empty means any origin
    pub cors_allowed_origins: Vec<String>,
    pub max_batch_size: usize,
    pub log_format: LogFormat,
    pub profile: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; `from_env` passes the process environment
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let profile = lookup("PROFILE").unwrap_or_else(|| "default".to_string());

        Self {
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: lookup("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(8000),
            cors_allowed_origins: lookup("CORS_ALLOWED_ORIGINS")
                .map(|s| {
                    s.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
            max_batch_size: lookup("MAX_BATCH_SIZE")
                .and_then(|s| s.parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or(DEFAULT_MAX_BATCH_SIZE),
            log_format: match lookup("LOG_FORMAT").as_deref() {
                Some("compact") => LogFormat::Compact,
                _ => LogFormat::Full,
            },
            profile,
        }
    }

    /// Apply `--port <n>` and `--profile <name>` command line overrides
    pub fn with_args(mut self, args: &[String]) -> Self {
        let value_of = |flag: &str| {
            args.iter()
                .position(|arg| arg == flag)
                .and_then(|pos| args.get(pos + 1))
        };

        if let Some(port) = value_of("--port").and_then(|p| p.parse().ok()) {
            self.port = port;
        }
        if let Some(profile) = value_of("--profile") {
            self.profile = profile.clone();
        }
        self
    }
}
