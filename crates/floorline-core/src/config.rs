use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the
/// process. Does NOT load `.env` files — useful when the caller manages env
/// setup.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Shape check for Gemini API keys: Google-issued keys start with `"AI"`.
/// A key that fails this check is treated as absent so the extraction
/// pipeline falls back to regex instead of burning doomed requests.
#[must_use]
pub fn is_plausible_gemini_key(key: &str) -> bool {
    key.starts_with("AI") && key.len() > 20
}

/// Build application configuration using the provided env-var lookup
/// function. Decoupled from the real environment so it can be tested with a
/// plain `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default =
        |var: &str, default: &str| -> String { lookup(var).unwrap_or_else(|_| default.to_string()) };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let database_url = require("DATABASE_URL")?;
    let env = parse_environment(&or_default("FLOORLINE_ENV", "development"));
    let log_level = or_default("FLOORLINE_LOG_LEVEL", "info");

    let gemini_api_key = lookup("GEMINI_API_KEY")
        .ok()
        .filter(|key| is_plausible_gemini_key(key));
    let gemini_model = or_default("FLOORLINE_GEMINI_MODEL", "gemini-2.0-flash-lite");
    let gemini_max_retries = parse_u32("FLOORLINE_GEMINI_MAX_RETRIES", "3")?;
    let gemini_backoff_base_ms = parse_u64("FLOORLINE_GEMINI_BACKOFF_BASE_MS", "1000")?;

    let gmail_access_token = lookup("GMAIL_ACCESS_TOKEN").ok();
    let mail_max_results = parse_usize("FLOORLINE_MAIL_MAX_RESULTS", "20")?;

    let http_timeout_secs = parse_u64("FLOORLINE_HTTP_TIMEOUT_SECS", "30")?;

    let db_max_connections = parse_u32("FLOORLINE_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("FLOORLINE_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("FLOORLINE_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    Ok(AppConfig {
        database_url,
        env,
        log_level,
        gemini_api_key,
        gemini_model,
        gemini_max_retries,
        gemini_backoff_base_ms,
        gmail_access_token,
        mail_max_results,
        http_timeout_secs,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
    })
}

/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::env::VarError;

    fn lookup_from<'a>(
        map: &'a HashMap<&str, &str>,
    ) -> impl Fn(&str) -> Result<String, VarError> + 'a {
        move |key| map.get(key).map(ToString::to_string).ok_or(VarError::NotPresent)
    }

    fn minimal_env() -> HashMap<&'static str, &'static str> {
        HashMap::from([("DATABASE_URL", "postgres://localhost/floorline_test")])
    }

    #[test]
    fn minimal_env_uses_defaults() {
        let env = minimal_env();
        let config = build_app_config(lookup_from(&env)).unwrap();
        assert_eq!(config.env, Environment::Development);
        assert_eq!(config.gemini_model, "gemini-2.0-flash-lite");
        assert_eq!(config.gemini_max_retries, 3);
        assert_eq!(config.mail_max_results, 20);
        assert_eq!(config.db_max_connections, 10);
        assert!(config.gemini_api_key.is_none());
        assert!(config.gmail_access_token.is_none());
    }

    #[test]
    fn missing_database_url_is_an_error() {
        let env = HashMap::new();
        let err = build_app_config(lookup_from(&env)).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(var) if var == "DATABASE_URL"));
    }

    #[test]
    fn invalid_numeric_var_is_an_error() {
        let mut env = minimal_env();
        env.insert("FLOORLINE_DB_MAX_CONNECTIONS", "lots");
        let err = build_app_config(lookup_from(&env)).unwrap_err();
        assert!(
            matches!(err, ConfigError::InvalidEnvVar { var, .. } if var == "FLOORLINE_DB_MAX_CONNECTIONS")
        );
    }

    #[test]
    fn implausible_gemini_key_is_dropped() {
        let mut env = minimal_env();
        env.insert("GEMINI_API_KEY", "not-a-google-key");
        let config = build_app_config(lookup_from(&env)).unwrap();
        assert!(config.gemini_api_key.is_none());
    }

    #[test]
    fn plausible_gemini_key_is_kept() {
        let mut env = minimal_env();
        env.insert("GEMINI_API_KEY", "AIzaSyExampleExampleExample");
        let config = build_app_config(lookup_from(&env)).unwrap();
        assert_eq!(
            config.gemini_api_key.as_deref(),
            Some("AIzaSyExampleExampleExample")
        );
    }

    #[test]
    fn environment_parses_known_values() {
        let mut env = minimal_env();
        env.insert("FLOORLINE_ENV", "production");
        let config = build_app_config(lookup_from(&env)).unwrap();
        assert_eq!(config.env, Environment::Production);
    }

    #[test]
    fn unknown_environment_defaults_to_development() {
        let mut env = minimal_env();
        env.insert("FLOORLINE_ENV", "staging");
        let config = build_app_config(lookup_from(&env)).unwrap();
        assert_eq!(config.env, Environment::Development);
    }

    #[test]
    fn key_plausibility_rules() {
        assert!(is_plausible_gemini_key("AIzaSyExampleExampleExample"));
        assert!(!is_plausible_gemini_key("AIshort"));
        assert!(!is_plausible_gemini_key("sk-abcdefghijklmnopqrstuv"));
        assert!(!is_plausible_gemini_key(""));
    }
}
