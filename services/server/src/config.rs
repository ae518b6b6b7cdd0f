/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// TCP port for the HTTP server (default 3310). Env var: `SERVER_PORT`.
    pub server_port: u16,
    /// Path prefixes that skip tenant isolation entirely (default
    /// `/healthz,/readyz`). Env var: `PUBLIC_PATH_PREFIXES`, comma-separated.
    pub public_prefixes: Vec<String>,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self {
            database_url: std::env::var("DATABASE_URL").expect("DATABASE_URL"),
            server_port: std::env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3310),
            public_prefixes: std::env::var("PUBLIC_PATH_PREFIXES")
                .ok()
                .map(|v| parse_prefixes(&v))
                .unwrap_or_else(default_prefixes),
        }
    }
}

fn parse_prefixes(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_owned)
        .collect()
}

fn default_prefixes() -> Vec<String> {
    vec!["/healthz".to_owned(), "/readyz".to_owned()]
}
