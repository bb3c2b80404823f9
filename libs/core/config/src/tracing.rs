use crate::Environment;
use tracing::{debug, info};
use tracing_subscriber::{prelude::*, EnvFilter};

/// Filter used when `RUST_LOG` is unset.
///
/// SQL statement logging from `sea_orm`/`sqlx` stays one level quieter than
/// the application in both environments.
pub fn default_filter(environment: &Environment) -> &'static str {
    if environment.is_production() {
        "info,sea_orm=warn,sqlx=warn,tower_http=info"
    } else {
        "debug,sea_orm=info,sqlx=info,tower_http=debug"
    }
}

/// Install color-eyre for the binary's error reports.
///
/// Shows the location section, hides the environment section. A second call
/// is a no-op.
pub fn install_color_eyre() {
    let _ = color_eyre::config::HookBuilder::default()
        .display_location_section(true)
        .display_env_section(false)
        .install();
}

/// Install the global subscriber with `tracing_error::ErrorLayer`.
///
/// Production (`APP_ENV=production`) logs flattened JSON without targets;
/// development logs pretty, multi-line events with targets. `RUST_LOG`
/// overrides [`default_filter`].
///
/// Returns quietly when a subscriber is already installed, so tests may call
/// it freely.
///
/// ```ignore
/// install_color_eyre();
/// let config = Config::from_env()?;
/// init_tracing(&config.environment);
/// ```
pub fn init_tracing(environment: &Environment) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(environment)));

    let registry = tracing_subscriber::registry()
        .with(tracing_error::ErrorLayer::default())
        .with(filter);

    let result = if environment.is_production() {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(false)
                    .flatten_event(true),
            )
            .try_init()
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_file(false)
                    .with_line_number(false)
                    .pretty(),
            )
            .try_init()
    };

    match result {
        Ok(()) => info!(?environment, "Tracing initialized"),
        Err(_) => debug!("Tracing already initialized"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_quieter_in_production() {
        assert!(default_filter(&Environment::Production).starts_with("info"));
        assert!(default_filter(&Environment::Development).starts_with("debug"));
        assert!(default_filter(&Environment::Production).contains("sqlx=warn"));
    }

    #[test]
    fn test_default_filters_parse() {
        for env in [Environment::Development, Environment::Production] {
            assert!(EnvFilter::try_new(default_filter(&env)).is_ok());
        }
    }

    #[test]
    fn test_init_tracing_is_repeatable() {
        init_tracing(&Environment::Development);
        init_tracing(&Environment::Production);
        init_tracing(&Environment::Development);
    }

    #[test]
    fn test_init_tracing_honours_rust_log() {
        temp_env::with_var("RUST_LOG", Some("domain_products=trace"), || {
            init_tracing(&Environment::Development);
        });
    }

    #[test]
    fn test_install_color_eyre_twice() {
        install_color_eyre();
        install_color_eyre();
    }
}
