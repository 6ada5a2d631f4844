use std::sync::Once;

use log::LevelFilter;

/// Logger settings applied by [`init_logging`].
///
/// Precedence for the base filter: `env_filter`, then `RUST_LOG`, then
/// `default_level`. `module_levels` are applied on top of whichever wins, so
/// a chatty module (the dialog loop logs every nested loop at debug) can be
/// tuned without rewriting the whole filter string.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub env_filter: Option<String>,
    pub default_level: LevelFilter,
    pub module_levels: Vec<(String, LevelFilter)>,
    /// Prefix records with a timestamp.
    pub timestamps: bool,
    pub write_style: env_logger::WriteStyle,
}

impl LoggingConfig {
    /// Overrides the level of one module path (e.g. `"veil_ui::ui"`).
    pub fn module(mut self, path: impl Into<String>, level: LevelFilter) -> Self {
        self.module_levels.push((path.into(), level));
        self
    }

    fn builder(self, rust_log: Option<String>) -> env_logger::Builder {
        let mut builder = env_logger::Builder::new();
        match self.env_filter.or(rust_log) {
            Some(filter) => builder.parse_filters(&filter),
            None => builder.filter_level(self.default_level),
        };
        for (path, level) in self.module_levels {
            builder.filter_module(&path, level);
        }
        if !self.timestamps {
            builder.format_timestamp(None);
        }
        builder.write_style(self.write_style);
        builder
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            default_level: LevelFilter::Info,
            module_levels: Vec::new(),
            timestamps: true,
            write_style: env_logger::WriteStyle::Auto,
        }
    }
}

static INIT: Once = Once::new();

/// Installs the global logger. Only the first call has any effect.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let rust_log = std::env::var("RUST_LOG").ok();
        // A test harness may already own the global logger.
        if config.builder(rust_log).try_init().is_ok() {
            log::debug!("logging initialized");
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_level_applies_without_filters() {
        let logger = LoggingConfig::default().builder(None).build();
        assert_eq!(logger.filter(), LevelFilter::Info);
    }

    #[test]
    fn explicit_filter_beats_rust_log() {
        let config = LoggingConfig { env_filter: Some("warn".into()), ..LoggingConfig::default() };
        let logger = config.builder(Some("trace".into())).build();
        assert_eq!(logger.filter(), LevelFilter::Warn);
    }

    #[test]
    fn module_levels_raise_the_maximum() {
        let config = LoggingConfig { default_level: LevelFilter::Warn, ..LoggingConfig::default() }
            .module("veil_ui::ui", LevelFilter::Debug);
        let logger = config.builder(None).build();
        assert_eq!(logger.filter(), LevelFilter::Debug);
    }
}
