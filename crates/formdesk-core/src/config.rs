//! Configuration module
//!
//! This module provides configuration structures for the intake API: server and
//! CORS settings, rate limits, upload limits, helpdesk credentials, bot
//! verification and geocoding. Credentials are optional at startup; handlers
//! report missing ones as a server misconfiguration per request.

use std::collections::HashMap;
use std::env;
use std::path::PathBuf;

// Common constants
const SERVER_PORT: u16 = 3000;
const TRUSTED_PROXY_COUNT: usize = 1;
const TICKET_RATE_LIMIT_PER_MINUTE: u32 = 5;
const GEOCODE_RATE_LIMIT_PER_MINUTE: u32 = 20;
const RATE_LIMIT_WINDOW_SECS: u64 = 60;
const MAX_FILE_SIZE_BYTES: usize = 5 * 1024 * 1024;
const MAX_FILES: usize = 20;
const MAX_FIELD_LENGTH: usize = 10_000;
const HELPDESK_TIMEOUT_SECS: u64 = 30;
const DEFAULT_FORM_TYPES: &str = "contact-form,business-lead,support-request,quote-request,feedback";
const DEFAULT_FILE_TYPES: &str = "image/jpeg,image/png,image/gif,image/webp,image/heic,\
application/pdf,application/msword,\
application/vnd.openxmlformats-officedocument.wordprocessingml.document,\
application/vnd.ms-excel,\
application/vnd.openxmlformats-officedocument.spreadsheetml.sheet,\
text/plain,text/csv";
const BOT_VERIFY_URL: &str = "https://challenges.cloudflare.com/turnstile/v0/siteverify";
const GEOCODE_BASE_URL: &str = "https://maps.googleapis.com";

/// HTTP server, CORS and logging settings
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub port: u16,
    pub environment: String,
    /// Exact-match origin allow-list; no wildcard support.
    pub allowed_origins: Vec<String>,
    pub trusted_proxy_count: usize,
    pub log_format: String,
}

/// Fixed-window rate limits, per client IP
#[derive(Clone, Debug)]
pub struct RateLimitConfig {
    pub ticket_limit_per_window: u32,
    pub geocode_limit_per_window: u32,
    pub window_secs: u64,
}

/// Submission limits applied by the multipart decoder and the validator
#[derive(Clone, Debug)]
pub struct IntakeConfig {
    pub allowed_form_types: Vec<String>,
    pub allowed_file_types: Vec<String>,
    pub max_file_size_bytes: usize,
    pub max_files: usize,
    pub max_field_length: usize,
    /// Where uploads are spooled; the system temp dir when unset.
    pub temp_dir: Option<PathBuf>,
}

/// Credentials and routing for the external helpdesk
#[derive(Clone, Debug)]
pub struct HelpdeskConfig {
    pub base_url: Option<String>,
    pub username: Option<String>,
    pub api_key: Option<String>,
    pub support_email: Option<String>,
    /// form type -> sender integration id
    pub routing: HashMap<String, u64>,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct BotVerificationConfig {
    pub secret: Option<String>,
    pub verify_url: String,
}

#[derive(Clone, Debug)]
pub struct GeocodingConfig {
    pub api_key: Option<String>,
    pub base_url: String,
}

/// Application configuration
#[derive(Clone, Debug, Default)]
pub struct Config {
    pub server: ServerConfig,
    pub rate_limit: RateLimitConfig,
    pub intake: IntakeConfig,
    pub helpdesk: HelpdeskConfig,
    pub bot_verification: BotVerificationConfig,
    pub geocoding: GeocodingConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: SERVER_PORT,
            environment: "development".to_string(),
            allowed_origins: Vec::new(),
            trusted_proxy_count: TRUSTED_PROXY_COUNT,
            log_format: "compact".to_string(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            ticket_limit_per_window: TICKET_RATE_LIMIT_PER_MINUTE,
            geocode_limit_per_window: GEOCODE_RATE_LIMIT_PER_MINUTE,
            window_secs: RATE_LIMIT_WINDOW_SECS,
        }
    }
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            allowed_form_types: parse_list(DEFAULT_FORM_TYPES, false),
            allowed_file_types: parse_list(DEFAULT_FILE_TYPES, true),
            max_file_size_bytes: MAX_FILE_SIZE_BYTES,
            max_files: MAX_FILES,
            max_field_length: MAX_FIELD_LENGTH,
            temp_dir: None,
        }
    }
}

impl Default for HelpdeskConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            username: None,
            api_key: None,
            support_email: None,
            routing: HashMap::new(),
            timeout_secs: HELPDESK_TIMEOUT_SECS,
        }
    }
}

impl Default for BotVerificationConfig {
    fn default() -> Self {
        Self {
            secret: None,
            verify_url: BOT_VERIFY_URL.to_string(),
        }
    }
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: GEOCODE_BASE_URL.to_string(),
        }
    }
}

impl Config {
    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.server.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let server = ServerConfig {
            port: env::var("PORT")
                .unwrap_or_else(|_| SERVER_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            environment,
            allowed_origins: parse_list(&env::var("ALLOWED_ORIGINS").unwrap_or_default(), false),
            trusted_proxy_count: env::var("TRUSTED_PROXY_COUNT")
                .unwrap_or_else(|_| TRUSTED_PROXY_COUNT.to_string())
                .parse()
                .unwrap_or(TRUSTED_PROXY_COUNT),
            log_format: env::var("LOG_FORMAT")
                .unwrap_or_else(|_| "compact".to_string())
                .to_lowercase(),
        };

        let rate_limit = RateLimitConfig {
            ticket_limit_per_window: env::var("TICKET_RATE_LIMIT_PER_MINUTE")
                .unwrap_or_else(|_| TICKET_RATE_LIMIT_PER_MINUTE.to_string())
                .parse()
                .unwrap_or(TICKET_RATE_LIMIT_PER_MINUTE),
            geocode_limit_per_window: env::var("GEOCODE_RATE_LIMIT_PER_MINUTE")
                .unwrap_or_else(|_| GEOCODE_RATE_LIMIT_PER_MINUTE.to_string())
                .parse()
                .unwrap_or(GEOCODE_RATE_LIMIT_PER_MINUTE),
            window_secs: env::var("RATE_LIMIT_WINDOW_SECS")
                .unwrap_or_else(|_| RATE_LIMIT_WINDOW_SECS.to_string())
                .parse()
                .unwrap_or(RATE_LIMIT_WINDOW_SECS),
        };

        let intake = IntakeConfig {
            allowed_form_types: parse_list(
                &env::var("ALLOWED_FORM_TYPES").unwrap_or_else(|_| DEFAULT_FORM_TYPES.to_string()),
                false,
            ),
            allowed_file_types: parse_list(
                &env::var("ALLOWED_FILE_TYPES").unwrap_or_else(|_| DEFAULT_FILE_TYPES.to_string()),
                true,
            ),
            max_file_size_bytes: env::var("MAX_FILE_SIZE")
                .unwrap_or_else(|_| MAX_FILE_SIZE_BYTES.to_string())
                .parse()
                .unwrap_or(MAX_FILE_SIZE_BYTES),
            max_files: env::var("MAX_FILES")
                .unwrap_or_else(|_| MAX_FILES.to_string())
                .parse()
                .unwrap_or(MAX_FILES),
            max_field_length: env::var("MAX_FIELD_LENGTH")
                .unwrap_or_else(|_| MAX_FIELD_LENGTH.to_string())
                .parse()
                .unwrap_or(MAX_FIELD_LENGTH),
            temp_dir: non_empty_var("UPLOAD_TEMP_DIR").map(PathBuf::from),
        };

        let helpdesk = HelpdeskConfig {
            base_url: non_empty_var("HELPDESK_BASE_URL").or_else(|| {
                non_empty_var("HELPDESK_SUBDOMAIN")
                    .map(|subdomain| format!("https://{}.gorgias.com", subdomain))
            }),
            username: non_empty_var("HELPDESK_USERNAME"),
            api_key: non_empty_var("HELPDESK_API_KEY"),
            support_email: non_empty_var("HELPDESK_SUPPORT_EMAIL"),
            routing: parse_routing(&env::var("HELPDESK_ROUTING").unwrap_or_default()),
            timeout_secs: env::var("HELPDESK_TIMEOUT_SECS")
                .unwrap_or_else(|_| HELPDESK_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(HELPDESK_TIMEOUT_SECS),
        };

        let bot_verification = BotVerificationConfig {
            secret: non_empty_var("BOT_VERIFY_SECRET"),
            verify_url: env::var("BOT_VERIFY_URL").unwrap_or_else(|_| BOT_VERIFY_URL.to_string()),
        };

        let geocoding = GeocodingConfig {
            api_key: non_empty_var("GEOCODE_API_KEY"),
            base_url: env::var("GEOCODE_BASE_URL")
                .unwrap_or_else(|_| GEOCODE_BASE_URL.to_string()),
        };

        let config = Config {
            server,
            rate_limit,
            intake,
            helpdesk,
            bot_verification,
            geocoding,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.server.allowed_origins.iter().any(|o| o == "*") {
            return Err(anyhow::anyhow!(
                "ALLOWED_ORIGINS cannot contain '*'. Please specify explicit origins."
            ));
        }

        if self.is_production() && self.server.allowed_origins.is_empty() {
            return Err(anyhow::anyhow!(
                "ALLOWED_ORIGINS must be set in production; every request would be refused"
            ));
        }

        if self.intake.allowed_form_types.is_empty() {
            return Err(anyhow::anyhow!("ALLOWED_FORM_TYPES must not be empty"));
        }

        if self.intake.max_files == 0 || self.intake.max_file_size_bytes == 0 {
            return Err(anyhow::anyhow!(
                "MAX_FILES and MAX_FILE_SIZE must be greater than zero"
            ));
        }

        if self.rate_limit.window_secs == 0 {
            return Err(anyhow::anyhow!("RATE_LIMIT_WINDOW_SECS must be greater than zero"));
        }

        Ok(())
    }

    /// Upper bound for a whole request body: every file at full size plus room for fields.
    pub fn max_body_bytes(&self) -> usize {
        self.intake
            .max_files
            .saturating_mul(self.intake.max_file_size_bytes)
            .saturating_add(1024 * 1024)
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Split a comma-separated list, trimming entries and dropping empty ones.
pub fn parse_list(raw: &str, lowercase: bool) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| {
            if lowercase {
                s.to_lowercase()
            } else {
                s.to_string()
            }
        })
        .collect()
}

/// Parse `formType:integrationId` pairs. Malformed pairs are skipped with a warning.
pub fn parse_routing(raw: &str) -> HashMap<String, u64> {
    let mut routing = HashMap::new();
    for pair in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        match pair.split_once(':') {
            Some((form_type, id)) => match id.trim().parse::<u64>() {
                Ok(id) => {
                    routing.insert(form_type.trim().to_string(), id);
                }
                Err(_) => tracing::warn!(pair = %pair, "Ignoring routing entry with non-numeric id"),
            },
            None => tracing::warn!(pair = %pair, "Ignoring malformed routing entry"),
        }
    }
    routing
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_list_trims_and_drops_empty() {
        assert_eq!(
            parse_list(" https://a.example , ,https://b.example", false),
            vec!["https://a.example", "https://b.example"]
        );
        assert_eq!(parse_list("Image/PNG", true), vec!["image/png"]);
        assert!(parse_list("", false).is_empty());
    }

    #[test]
    fn parse_routing_skips_bad_pairs() {
        let routing = parse_routing("contact-form:12, business-lead : 34,broken,feedback:abc");
        assert_eq!(routing.len(), 2);
        assert_eq!(routing.get("contact-form"), Some(&12));
        assert_eq!(routing.get("business-lead"), Some(&34));
    }

    #[test]
    fn wildcard_origin_is_rejected() {
        let mut config = Config::default();
        config.server.allowed_origins = vec!["*".to_string()];
        assert!(config.validate().is_err());
    }

    #[test]
    fn production_requires_origins() {
        let mut config = Config::default();
        config.server.environment = "Production".to_string();
        assert!(config.is_production());
        assert!(config.validate().is_err());

        config.server.allowed_origins = vec!["https://shop.example.com".to_string()];
        assert!(config.validate().is_ok());
    }

    #[test]
    fn defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.intake.max_file_size_bytes, 5 * 1024 * 1024);
        assert_eq!(config.rate_limit.ticket_limit_per_window, 5);
        assert!(config
            .intake
            .allowed_form_types
            .contains(&"contact-form".to_string()));
        assert!(config
            .intake
            .allowed_file_types
            .contains(&"application/pdf".to_string()));
    }

    #[test]
    fn body_limit_covers_all_files() {
        let config = Config::default();
        assert!(config.max_body_bytes() > 20 * 5 * 1024 * 1024);
    }
}
