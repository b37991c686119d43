use crate::config::Config;
use log::LevelFilter;
use simplelog::{self, ConfigBuilder};

// Database and HTTP stack internals log on every poll and publish
const FILTERED_MODULES: &[&str] = &[
    "sqlx",
    "sea_orm",
    "sea_orm_migration",
    "tower",
    "hyper",
    "h2",
    "axum",
];

pub struct Logger {}

impl Logger {
    /// Install the terminal logger. Dependency noise is only shown at Trace.
    pub fn init_logger(config: &Config) {
        let level = config.log_level_filter;

        simplelog::TermLogger::init(
            Self::to_simplelog(level),
            Self::build_log_config(level != LevelFilter::Trace),
            simplelog::TerminalMode::Mixed,
            simplelog::ColorChoice::Auto,
        )
        .expect("Failed to start simplelog");
    }

    fn to_simplelog(level: LevelFilter) -> simplelog::LevelFilter {
        match level {
            LevelFilter::Off => simplelog::LevelFilter::Off,
            LevelFilter::Error => simplelog::LevelFilter::Error,
            LevelFilter::Warn => simplelog::LevelFilter::Warn,
            LevelFilter::Info => simplelog::LevelFilter::Info,
            LevelFilter::Debug => simplelog::LevelFilter::Debug,
            LevelFilter::Trace => simplelog::LevelFilter::Trace,
        }
    }

    fn build_log_config(filter_dependencies: bool) -> simplelog::Config {
        let mut builder = ConfigBuilder::new();
        builder.set_time_format_rfc3339();

        if filter_dependencies {
            for module in FILTERED_MODULES {
                builder.add_filter_ignore_str(module);
            }
        }

        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relay_crates_are_never_filtered() {
        for module in ["bro", "relay", "web", "service", "events", "domain"] {
            assert!(
                !FILTERED_MODULES.iter().any(|filtered| module.starts_with(filtered)),
                "{module} logs must stay visible"
            );
        }
    }

    #[test]
    fn database_and_http_internals_are_filtered() {
        for module in ["sqlx::query", "sea_orm::driver", "hyper::proto", "axum::serve"] {
            assert!(
                FILTERED_MODULES.iter().any(|filtered| module.starts_with(filtered)),
                "{module} should be filtered"
            );
        }
    }

    #[test]
    fn level_conversion_keeps_the_threshold() {
        let levels = [
            (LevelFilter::Off, simplelog::LevelFilter::Off),
            (LevelFilter::Error, simplelog::LevelFilter::Error),
            (LevelFilter::Warn, simplelog::LevelFilter::Warn),
            (LevelFilter::Info, simplelog::LevelFilter::Info),
            (LevelFilter::Debug, simplelog::LevelFilter::Debug),
            (LevelFilter::Trace, simplelog::LevelFilter::Trace),
        ];

        for (level, expected) in levels {
            assert_eq!(Logger::to_simplelog(level), expected);
        }
    }

    #[test]
    fn log_config_builds_with_and_without_filters() {
        let _filtered = Logger::build_log_config(true);
        let _unfiltered = Logger::build_log_config(false);
    }
}
