//! Configuration for Products API

use core_config::{AppInfo, FromEnv, app_info, env_flag, server::ServerConfig};
use database::postgres::PostgresConfig;

pub use core_config::Environment;

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub database: PostgresConfig,
    pub server: ServerConfig,
    pub environment: Environment,
    /// Apply pending migrations (and the category seed) before serving
    pub run_migrations: bool,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        let database = PostgresConfig::from_env()?;
        let server = ServerConfig::from_env()?;
        let run_migrations = env_flag("RUN_MIGRATIONS", !environment.is_production());

        Ok(Self {
            app: app_info!(),
            database,
            server,
            environment,
            run_migrations,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_requires_database_url() {
        temp_env::with_var_unset("DATABASE_URL", || {
            let err = Config::from_env().unwrap_err();
            assert!(err.to_string().contains("DATABASE_URL"));
        });
    }

    #[test]
    fn test_config_migrations_default_on_in_development() {
        temp_env::with_vars(
            [
                ("DATABASE_URL", Some("postgresql://localhost/products")),
                ("APP_ENV", None),
                ("RUN_MIGRATIONS", None),
            ],
            || {
                let config = Config::from_env().unwrap();
                assert!(config.run_migrations);
                assert_eq!(config.app.name, "products_api");
            },
        );
    }

    #[test]
    fn test_config_migrations_default_off_in_production() {
        temp_env::with_vars(
            [
                ("DATABASE_URL", Some("postgresql://localhost/products")),
                ("APP_ENV", Some("production")),
                ("RUN_MIGRATIONS", None),
            ],
            || {
                let config = Config::from_env().unwrap();
                assert!(!config.run_migrations);
            },
        );

        temp_env::with_vars(
            [
                ("DATABASE_URL", Some("postgresql://localhost/products")),
                ("APP_ENV", Some("production")),
                ("RUN_MIGRATIONS", Some("true")),
            ],
            || {
                let config = Config::from_env().unwrap();
                assert!(config.run_migrations);
            },
        );
    }
}
