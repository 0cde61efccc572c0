use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.socialdata.tools";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

pub struct Config {
    pub mode: String, // "stdio" or "server"
    pub port: u16,
    pub base_url: String,
    /// Read once at startup; `None` is tolerated until the first tool call.
    pub api_key: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        let mode = std::env::var("MODE").unwrap_or_else(|_| "stdio".into());
        let port = std::env::var("PORT")
            .ok()
            .and_then(|s| s.parse::<u16>().ok())
            .unwrap_or(8080);
        let base_url = std::env::var("SOCIALDATA_BASE_URL")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.into());
        let api_key = std::env::var("SOCIALDATA_API_KEY")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        Self {
            mode,
            port,
            base_url,
            api_key,
        }
    }

    pub fn is_stdio(&self) -> bool {
        self.mode == "stdio"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear() {
        for k in ["MODE", "PORT", "SOCIALDATA_BASE_URL", "SOCIALDATA_API_KEY"] {
            std::env::remove_var(k);
        }
    }

    #[test]
    #[serial]
    fn defaults_to_stdio_and_public_host_without_key() {
        clear();
        let cfg = Config::from_env();
        assert_eq!(cfg.mode, "stdio");
        assert!(cfg.is_stdio());
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.base_url, DEFAULT_BASE_URL);
        assert!(cfg.api_key.is_none());
    }

    #[test]
    #[serial]
    fn parses_env_overrides() {
        clear();
        std::env::set_var("MODE", "server");
        std::env::set_var("PORT", "9090");
        std::env::set_var("SOCIALDATA_BASE_URL", "http://127.0.0.1:1234");
        std::env::set_var("SOCIALDATA_API_KEY", " sk-test ");
        let cfg = Config::from_env();
        assert_eq!(cfg.mode, "server");
        assert!(!cfg.is_stdio());
        assert_eq!(cfg.port, 9090);
        assert_eq!(cfg.base_url, "http://127.0.0.1:1234");
        assert_eq!(cfg.api_key.as_deref(), Some("sk-test"));
        clear();
    }

    #[test]
    #[serial]
    fn blank_key_counts_as_absent() {
        clear();
        std::env::set_var("SOCIALDATA_API_KEY", "   ");
        assert!(Config::from_env().api_key.is_none());
        clear();
    }
}
