// Runtime configuration, resolved from the environment once at startup

#[derive(Debug, Clone)]
pub struct Config {
    /// Listen address, e.g. "127.0.0.1:8787".
    pub bind_addr: String,
    /// Timeout for full metadata extraction.
    pub info_timeout_secs: u64,
    /// Timeout for the lighter title-only lookup.
    pub basic_info_timeout_secs: u64,
    /// Per-backend deadline for handshake + first chunk in the relay.
    pub attempt_timeout_secs: u64,
    /// CORS allow-list; empty means permissive development defaults.
    pub allowed_origins: Vec<String>,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            bind_addr: bind_addr_from(
                std::env::var("TUBERELAY_ADDR").ok(),
                std::env::var("PORT").ok(),
            ),
            info_timeout_secs: read_u64_env("TUBERELAY_INFO_TIMEOUT").unwrap_or(30),
            basic_info_timeout_secs: read_u64_env("TUBERELAY_BASIC_TIMEOUT").unwrap_or(15),
            attempt_timeout_secs: read_u64_env("TUBERELAY_ATTEMPT_TIMEOUT").unwrap_or(5),
            allowed_origins: parse_origins(
                std::env::var("ALLOWED_ORIGINS").ok().as_deref().unwrap_or(""),
            ),
        }
    }
}

fn bind_addr_from(addr: Option<String>, port: Option<String>) -> String {
    if let Some(configured) = addr {
        let trimmed = configured.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    if let Some(port) = port.and_then(|p| p.trim().parse::<u16>().ok()) {
        return format!("0.0.0.0:{}", port);
    }

    "127.0.0.1:8787".to_string()
}

fn read_u64_env(name: &str) -> Option<u64> {
    std::env::var(name)
        .ok()
        .and_then(|value| value.trim().parse().ok())
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(ToString::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_addr_precedence() {
        assert_eq!(
            bind_addr_from(Some("0.0.0.0:9000".to_string()), Some("3000".to_string())),
            "0.0.0.0:9000"
        );
        assert_eq!(
            bind_addr_from(None, Some("3000".to_string())),
            "0.0.0.0:3000"
        );
        assert_eq!(bind_addr_from(None, Some("nope".to_string())), "127.0.0.1:8787");
        assert_eq!(bind_addr_from(Some("  ".to_string()), None), "127.0.0.1:8787");
    }

    #[test]
    fn test_parse_origins() {
        assert!(parse_origins("").is_empty());
        assert_eq!(
            parse_origins("https://a.example, https://b.example ,"),
            vec!["https://a.example", "https://b.example"]
        );
    }
}
