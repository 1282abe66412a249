//! Server configuration

/// Server configuration loaded from environment variables
pub struct Config {
    /// Upstream REST API base URL. Absence is reported per request, not at startup.
    pub api_url: Option<String>,
    pub bind_address: String,
    pub cors_origins: Vec<String>,
    pub rate_limit_rps: u32,
    pub upstream_timeout_secs: u64,
    /// Mark session cookies `Secure`
    pub secure_cookies: bool,
    /// Where the session gate sends users without a usable session
    pub login_path: String,
    /// Built dashboard bundle served under `/dashboard`
    pub dashboard_dir: Option<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            api_url: std::env::var("API_URL")
                .ok()
                .map(|url| url.trim().to_string())
                .filter(|url| !url.is_empty()),
            bind_address: std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:8080".into()),
            cors_origins: std::env::var("CORS_ORIGINS")
                .map(|origins| parse_list(&origins))
                .unwrap_or_else(|_| vec!["*".to_string()]),
            rate_limit_rps: parse_or("RATE_LIMIT_RPS", 100),
            upstream_timeout_secs: parse_or("UPSTREAM_TIMEOUT_SECS", 30),
            secure_cookies: std::env::var("APP_ENV").is_ok_and(|env| env == "production"),
            login_path: std::env::var("LOGIN_PATH").unwrap_or_else(|_| "/login".into()),
            dashboard_dir: std::env::var("DASHBOARD_DIR").ok().filter(|d| !d.is_empty()),
        }
    }
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, "Ignoring unparseable setting");
            default
        }),
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_cors_origins() {
        assert_eq!(
            parse_list(" https://a.test, ,https://b.test "),
            vec!["https://a.test".to_string(), "https://b.test".to_string()]
        );
    }
}
