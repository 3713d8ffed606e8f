use std::io::Write;

use env_logger::{Builder, Env};
use log::{Level, LevelFilter};

use crate::verbosity::Verbosity;

/// Initialize the logging system with the given verbosity level.
pub(crate) fn init_logging(verbose: &Verbosity) {
    // Set a base level for all modules to `warn`, which is a reasonable
    // default. It will be overridden by RUST_LOG if it's set.
    let env = Env::default().filter_or("RUST_LOG", "warn");

    let mut builder = Builder::from_env(env);
    builder
        .format_timestamp(None)
        .format_module_path(false)
        .format_target(false);

    if std::env::var("RUST_LOG").is_err() {
        // Adjust the base log level filter based on the verbosity from the
        // CLI. This applies to all modules not explicitly named in RUST_LOG.
        let level_filter = verbose.log_level_filter();

        builder.filter_level(LevelFilter::Warn);
        builder
            .filter_module("netblock", level_filter)
            .filter_module("netblock_lib", level_filter);
    }

    builder.format(|buf, record| {
        let level = record.level();
        let color = color_for_level(level);
        writeln!(
            buf,
            "{} {}",
            color.apply_to(format!("[{level}]")),
            record.args()
        )
    });

    builder.init();
}

/// The color a log level is rendered in
fn color_for_level(level: Level) -> console::Style {
    match level {
        Level::Error => console::Style::new().red().bold(),
        Level::Warn => console::Style::new().yellow(),
        Level::Info => console::Style::new().green(),
        Level::Debug => console::Style::new().cyan(),
        Level::Trace => console::Style::new().dim(),
    }
}
