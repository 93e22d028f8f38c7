use crate::utils::sqlite_path_from_url;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::info;

pub const DB_URL_ENV: &str = "DB_URL";

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub database_path: String,
    /// Product keywords compared by `compare`.
    pub products: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_path: "basket.db".to_string(),
            products: vec![
                "Toilet Paper".to_string(),
                "Protein Bar".to_string(),
                "Paper Towel".to_string(),
                "Chicken Breast".to_string(),
            ],
        }
    }
}

impl AppConfig {
    /// Applies a `DB_URL` override (`sqlite:///path` or a bare path).
    pub fn with_db_url(mut self, db_url: Option<&str>) -> Self {
        if let Some(url) = db_url.map(str::trim).filter(|u| !u.is_empty()) {
            self.database_path = sqlite_path_from_url(url).to_string();
        }
        self
    }
}

pub fn load_config(path: &str) -> Result<AppConfig, Box<dyn std::error::Error>> {
    let content = fs::read_to_string(path)?;
    let config: AppConfig = serde_json::from_str(&content)?;
    Ok(config)
}

/// Loads `path` if it exists, otherwise falls back to defaults; then applies
/// the environment override.
pub fn resolve_config(path: &str) -> Result<AppConfig, Box<dyn std::error::Error>> {
    let config = if Path::new(path).exists() {
        load_config(path)?
    } else {
        info!("No config file at {}, using defaults", path);
        AppConfig::default()
    };
    let db_url = std::env::var(DB_URL_ENV).ok();
    Ok(config.with_db_url(db_url.as_deref()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn partial_config_keeps_defaults() {
        let config: AppConfig = serde_json::from_str(r#"{"database_path": "prices.db"}"#).unwrap();
        assert_eq!(config.database_path, "prices.db");
        assert_eq!(config.products.len(), 4);
    }

    #[test]
    fn loads_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"products": ["Water"]}}"#).unwrap();
        let config = load_config(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.products, vec!["Water".to_string()]);
        assert_eq!(config.database_path, "basket.db");
    }

    #[test]
    fn db_url_overrides_path() {
        let config = AppConfig::default().with_db_url(Some("sqlite:///./data/basket.db"));
        assert_eq!(config.database_path, "./data/basket.db");

        let config = AppConfig::default().with_db_url(Some("  "));
        assert_eq!(config.database_path, "basket.db");
    }

    #[test]
    fn malformed_config_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(load_config(file.path().to_str().unwrap()).is_err());
    }
}
