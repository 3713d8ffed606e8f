use log::LevelFilter;
use serde::Deserialize;

/// Counted `-v`/`-q` flags controlling the amount of log output.
///
/// By default the run is narrated at info level, like the summary a cron
/// mail would show. `-v` adds debug output, `-vv` trace; `-q` drops to
/// warnings, `-qq` to errors, `-qqq` silences logging entirely.
#[derive(clap::Args, Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub(crate) struct Verbosity {
    /// Pass many times for more log output
    #[arg(
        long,
        short = 'v',
        action = clap::ArgAction::Count,
        global = true,
        conflicts_with = "quiet",
    )]
    #[serde(skip)]
    verbose: u8,

    /// Pass many times for less log output
    #[arg(
        long,
        short = 'q',
        action = clap::ArgAction::Count,
        global = true,
        conflicts_with = "verbose",
    )]
    #[serde(skip)]
    quiet: u8,
}

impl Verbosity {
    /// The log level filter implied by the given flags.
    pub(crate) fn log_level_filter(&self) -> LevelFilter {
        match i16::from(self.verbose) - i16::from(self.quiet) {
            i16::MIN..=-3 => LevelFilter::Off,
            -2 => LevelFilter::Error,
            -1 => LevelFilter::Warn,
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            2..=i16::MAX => LevelFilter::Trace,
        }
    }
}
