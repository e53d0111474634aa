use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub triage: TriageConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        let format = match env::var("APP_LOG_FORMAT") {
            Ok(raw) => LogFormat::parse(&raw).ok_or(ConfigError::InvalidLogFormat(raw))?,
            Err(_) => LogFormat::Compact,
        };

        let typing_delay_ms = env::var("APP_TYPING_DELAY_MS")
            .unwrap_or_else(|_| "1500".to_string())
            .parse::<u64>()
            .map_err(|_| ConfigError::InvalidTypingDelay)?;
        let questionnaire = match env::var("APP_QUESTIONNAIRE") {
            Ok(raw) => {
                QuestionnaireChoice::parse(&raw).ok_or(ConfigError::InvalidQuestionnaire(raw))?
            }
            Err(_) => QuestionnaireChoice::Screener,
        };
        let profile_path = env::var("APP_TRIAGE_PROFILE")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level, format },
            triage: TriageConfig {
                typing_delay_ms,
                questionnaire,
                profile_path,
            },
        })
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Output layout for the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Json,
}

impl LogFormat {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" | "text" => Some(Self::Compact),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub format: LogFormat,
}

/// Which questionnaire the assessment surface steps through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionnaireChoice {
    /// Three-item PHQ-9 excerpt shown by the assessment page.
    Screener,
    /// Full nine-item PHQ-9.
    Phq9,
}

impl QuestionnaireChoice {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "screener" | "phq9-screener" => Some(Self::Screener),
            "phq9" | "phq-9" | "full" => Some(Self::Phq9),
            _ => None,
        }
    }
}

/// Chat and assessment surface settings.
#[derive(Debug, Clone)]
pub struct TriageConfig {
    pub typing_delay_ms: u64,
    pub questionnaire: QuestionnaireChoice,
    /// Optional JSON profile overriding keyword rules, bands or the questionnaire.
    pub profile_path: Option<PathBuf>,
}

impl TriageConfig {
    pub fn typing_delay(&self) -> Duration {
        Duration::from_millis(self.typing_delay_ms)
    }
}

impl Default for TriageConfig {
    fn default() -> Self {
        Self {
            typing_delay_ms: 1500,
            questionnaire: QuestionnaireChoice::Screener,
            profile_path: None,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidLogFormat(String),
    InvalidTypingDelay,
    InvalidQuestionnaire(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidLogFormat(value) => {
                write!(f, "APP_LOG_FORMAT must be 'compact' or 'json' (found '{value}')")
            }
            ConfigError::InvalidTypingDelay => {
                write!(f, "APP_TYPING_DELAY_MS must be a whole number of milliseconds")
            }
            ConfigError::InvalidQuestionnaire(value) => write!(
                f,
                "APP_QUESTIONNAIRE must be 'screener' or 'phq9' (found '{value}')"
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidLogFormat(_)
            | ConfigError::InvalidTypingDelay
            | ConfigError::InvalidQuestionnaire(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        env::remove_var("APP_ENV");
        env::remove_var("APP_HOST");
        env::remove_var("APP_PORT");
        env::remove_var("APP_LOG_LEVEL");
        env::remove_var("APP_LOG_FORMAT");
        env::remove_var("APP_TYPING_DELAY_MS");
        env::remove_var("APP_QUESTIONNAIRE");
        env::remove_var("APP_TRIAGE_PROFILE");
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(config.telemetry.format, LogFormat::Compact);
        assert_eq!(config.triage.typing_delay(), Duration::from_millis(1500));
        assert_eq!(config.triage.questionnaire, QuestionnaireChoice::Screener);
        assert!(config.triage.profile_path.is_none());
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
        reset_env();
    }

    #[test]
    fn reads_triage_overrides() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_TYPING_DELAY_MS", "0");
        env::set_var("APP_QUESTIONNAIRE", "PHQ9");
        env::set_var("APP_LOG_FORMAT", "json");
        env::set_var("APP_TRIAGE_PROFILE", "/etc/mindcare/profile.json");

        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.triage.typing_delay(), Duration::ZERO);
        assert_eq!(config.triage.questionnaire, QuestionnaireChoice::Phq9);
        assert_eq!(config.telemetry.format, LogFormat::Json);
        assert_eq!(
            config.triage.profile_path,
            Some(PathBuf::from("/etc/mindcare/profile.json"))
        );
        reset_env();
    }

    #[test]
    fn rejects_unknown_questionnaire() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_QUESTIONNAIRE", "gad7");

        match AppConfig::load() {
            Err(ConfigError::InvalidQuestionnaire(value)) => assert_eq!(value, "gad7"),
            other => panic!("expected questionnaire error, got {other:?}"),
        }
        reset_env();
    }

    #[test]
    fn rejects_non_numeric_typing_delay() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_TYPING_DELAY_MS", "soon");

        assert!(matches!(
            AppConfig::load(),
            Err(ConfigError::InvalidTypingDelay)
        ));
        reset_env();
    }
}
