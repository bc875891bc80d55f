use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_path: String,
    pub default_profile: String,
    pub ai_mode: AiMode,
    pub ai_api_url: String,
    pub ai_api_key: String,
    pub ai_model: String,
}

/// Which AI collaborator backs the OCR/market/analysis endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiMode {
    Chat,
    Mock,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnv(String),
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_map(std::env::vars().collect())
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn from_env_map(env_map: HashMap<String, String>) -> Result<Self, ConfigError> {
        let port = env_map
            .get("PORT")
            .map(|s| s.as_str())
            .unwrap_or("8080")
            .parse::<u16>()
            .map_err(|_| {
                ConfigError::InvalidValue("PORT".to_string(), "must be a valid u16".to_string())
            })?;

        let database_path = env_map
            .get("DATABASE_PATH")
            .cloned()
            .ok_or_else(|| ConfigError::MissingEnv("DATABASE_PATH".to_string()))?;

        let default_profile = env_map
            .get("DEFAULT_PROFILE")
            .cloned()
            .unwrap_or_else(|| "default".to_string());

        let ai_mode = match env_map.get("AI_MODE").map(|s| s.as_str()).unwrap_or("mock") {
            "chat" => AiMode::Chat,
            "mock" => AiMode::Mock,
            other => {
                return Err(ConfigError::InvalidValue(
                    "AI_MODE".to_string(),
                    format!("must be chat or mock, got {}", other),
                ))
            }
        };

        // The chat backend needs an endpoint and key; the mock needs nothing.
        let (ai_api_url, ai_api_key) = if ai_mode == AiMode::Chat {
            (
                env_map
                    .get("AI_API_URL")
                    .cloned()
                    .ok_or_else(|| ConfigError::MissingEnv("AI_API_URL".to_string()))?,
                env_map
                    .get("AI_API_KEY")
                    .cloned()
                    .ok_or_else(|| ConfigError::MissingEnv("AI_API_KEY".to_string()))?,
            )
        } else {
            (
                env_map.get("AI_API_URL").cloned().unwrap_or_default(),
                env_map.get("AI_API_KEY").cloned().unwrap_or_default(),
            )
        };

        let ai_model = env_map
            .get("AI_MODEL")
            .cloned()
            .unwrap_or_else(|| "gpt-4o-mini".to_string());

        Ok(Config {
            port,
            database_path,
            default_profile,
            ai_mode,
            ai_api_url,
            ai_api_key,
            ai_model,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_required_env() -> HashMap<String, String> {
        let mut map = HashMap::new();
        map.insert("DATABASE_PATH".to_string(), "/tmp/test.db".to_string());
        map
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_env_map(setup_required_env()).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.default_profile, "default");
        assert_eq!(config.ai_mode, AiMode::Mock);
    }

    #[test]
    fn test_missing_database_path() {
        let result = Config::from_env_map(HashMap::new());
        match result {
            Err(ConfigError::MissingEnv(s)) => assert_eq!(s, "DATABASE_PATH"),
            _ => panic!("Expected MissingEnv error"),
        }
    }

    #[test]
    fn test_invalid_port() {
        let mut env_map = setup_required_env();
        env_map.insert("PORT".to_string(), "not_a_number".to_string());
        let result = Config::from_env_map(env_map);
        match result {
            Err(ConfigError::InvalidValue(k, _)) => assert_eq!(k, "PORT"),
            _ => panic!("Expected InvalidValue error"),
        }
    }

    #[test]
    fn test_invalid_ai_mode() {
        let mut env_map = setup_required_env();
        env_map.insert("AI_MODE".to_string(), "psychic".to_string());
        let result = Config::from_env_map(env_map);
        match result {
            Err(ConfigError::InvalidValue(k, _)) => assert_eq!(k, "AI_MODE"),
            _ => panic!("Expected InvalidValue error"),
        }
    }

    #[test]
    fn test_chat_mode_requires_endpoint() {
        let mut env_map = setup_required_env();
        env_map.insert("AI_MODE".to_string(), "chat".to_string());
        let result = Config::from_env_map(env_map);
        match result {
            Err(ConfigError::MissingEnv(s)) => assert_eq!(s, "AI_API_URL"),
            _ => panic!("Expected MissingEnv error"),
        }
    }

    #[test]
    fn test_chat_mode_fully_configured() {
        let mut env_map = setup_required_env();
        env_map.insert("AI_MODE".to_string(), "chat".to_string());
        env_map.insert("AI_API_URL".to_string(), "https://api.example.com/v1".to_string());
        env_map.insert("AI_API_KEY".to_string(), "sk-test".to_string());
        env_map.insert("AI_MODEL".to_string(), "gpt-4o".to_string());
        let config = Config::from_env_map(env_map).unwrap();
        assert_eq!(config.ai_mode, AiMode::Chat);
        assert_eq!(config.ai_model, "gpt-4o");
    }
}
