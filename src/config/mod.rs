use serde::Deserialize;

/// Default signing secret, only acceptable outside production.
pub const DEV_JWT_SECRET: &str = "development-secret-change-in-production";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_environment")]
    pub environment: String,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub email: EmailConfig,
    pub main_app: MainAppConfig,
    pub notifications: NotificationsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    pub jwt_secret: String,
    #[serde(default = "default_token_ttl_hours")]
    pub token_ttl_hours: i64,
}

/// Transactional email provider (Resend-style HTTP API).
///
/// An empty `api_key` means the provider is not configured; email endpoints
/// report it instead of failing at startup.
#[derive(Debug, Clone, Deserialize)]
pub struct EmailConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_email_base_url")]
    pub base_url: String,
    #[serde(default = "default_from_email")]
    pub from_email: String,
    #[serde(default = "default_from_name")]
    pub from_name: String,
}

/// Main application reached by the cache-invalidation proxy.
#[derive(Debug, Clone, Deserialize)]
pub struct MainAppConfig {
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NotificationsConfig {
    /// Mentor notification type used when a generic "general" notification
    /// targets a mentor. The mentor taxonomy has no "general" entry.
    #[serde(default = "default_mentor_type")]
    pub mentor_default_type: String,
}

fn default_environment() -> String {
    "development".to_string()
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_max_connections() -> u32 {
    10
}

fn default_token_ttl_hours() -> i64 {
    24
}

fn default_email_base_url() -> String {
    "https://api.resend.com".to_string()
}

fn default_from_email() -> String {
    "noreply@directiva.mx".to_string()
}

fn default_from_name() -> String {
    "Hablemos Emprendimiento".to_string()
}

fn default_mentor_type() -> String {
    "new_meeting_request".to_string()
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(config::Environment::default().separator("__"))
            .set_default("environment", "development")?
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("database.url", "postgres://localhost/panel_admin")?
            .set_default("database.max_connections", 10)?
            .set_default("auth.jwt_secret", DEV_JWT_SECRET)?
            .set_default("auth.token_ttl_hours", 24)?
            .set_default("email.api_key", "")?
            .set_default("email.base_url", "https://api.resend.com")?
            .set_default("email.from_email", "noreply@directiva.mx")?
            .set_default("email.from_name", "Hablemos Emprendimiento")?
            .set_default("main_app.url", "")?
            .set_default("notifications.mentor_default_type", "new_meeting_request")?
            .build()?;

        let config: Config = config.try_deserialize()?;
        config.validate()?;

        Ok(config)
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Dev-mode fallbacks are allowed everywhere except production, where a
    /// default signing secret or an unusable proxy URL is a startup error.
    fn validate(&self) -> anyhow::Result<()> {
        if !self.is_production() {
            return Ok(());
        }

        if self.auth.jwt_secret.is_empty() || self.auth.jwt_secret == DEV_JWT_SECRET {
            anyhow::bail!("AUTH__JWT_SECRET debe estar configurado en producción");
        }

        if self.main_app.url.is_empty() || !is_valid_http_url(&self.main_app.url) {
            anyhow::bail!("MAIN_APP__URL debe estar configurado en producción");
        }

        Ok(())
    }
}

pub fn is_valid_http_url(url: &str) -> bool {
    match reqwest::Url::parse(url) {
        Ok(parsed) => matches!(parsed.scheme(), "http" | "https"),
        Err(_) => false,
    }
}
