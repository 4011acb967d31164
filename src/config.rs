use std::path::PathBuf;

use serde::Deserialize;

/// Application keys read from the Rocket figment (`Rocket.toml`, `ROCKET_*`).
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_database")]
    pub database: PathBuf,
    #[serde(default = "default_seed_sample_data")]
    pub seed_sample_data: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: default_database(),
            seed_sample_data: default_seed_sample_data(),
        }
    }
}

fn default_database() -> PathBuf {
    let mut path = PathBuf::from("data");
    path.push("expenses.sqlite");
    path
}

fn default_seed_sample_data() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use rocket::figment::Figment;

    #[test]
    fn defaults_apply_when_keys_are_absent() {
        let config: AppConfig = Figment::new().extract().unwrap();
        assert_eq!(config.database, PathBuf::from("data/expenses.sqlite"));
        assert!(config.seed_sample_data);
    }

    #[test]
    fn keys_override_defaults() {
        let config: AppConfig = Figment::new()
            .merge(("database", "/tmp/other.sqlite"))
            .merge(("seed_sample_data", false))
            .extract()
            .unwrap();
        assert_eq!(config.database, PathBuf::from("/tmp/other.sqlite"));
        assert!(!config.seed_sample_data);
    }
}
