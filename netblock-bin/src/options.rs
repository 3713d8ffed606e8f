use std::path::{Path, PathBuf};
use std::time::Duration;
use std::fs;

use anyhow::{Context, Result};
use clap::Parser;
use const_format::{concatcp, formatcp};
use netblock_lib::{
    DEFAULT_BACKOFF_BASE_SECS, DEFAULT_MAX_ATTEMPTS, DEFAULT_MAX_CONCURRENCY,
    DEFAULT_PACING_DELAY_SECS, DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT,
};
use serde::Deserialize;

use crate::verbosity::Verbosity;

pub(crate) const NETBLOCK_CONFIG_FILE: &str = "netblock.toml";

const DEFAULT_SOURCES_FILE: &str = "sources.txt";
const DEFAULT_OUTPUT_FILE: &str = "ipv4_unique.txt";
const DEFAULT_FAILED_LINKS_FILE: &str = "failed_links.txt";
const DEFAULT_SUMMARY_FILE: &str = "summary.txt";

// this exists because clap requires `&str` type values for defaults
// whereas serde expects owned `String` types
// (we can't use e.g. `TIMEOUT` or `timeout()` which gets created for serde)
const MAX_CONCURRENCY_STR: &str = concatcp!(DEFAULT_MAX_CONCURRENCY);
const MAX_ATTEMPTS_STR: &str = concatcp!(DEFAULT_MAX_ATTEMPTS);
const TIMEOUT_STR: &str = concatcp!(DEFAULT_TIMEOUT_SECS, "s");
const BACKOFF_BASE_STR: &str = concatcp!(DEFAULT_BACKOFF_BASE_SECS, "s");
const PACING_DELAY_STR: &str = concatcp!(DEFAULT_PACING_DELAY_SECS, "s");

// We use a custom help message here because we want to show the default
// value of the config file, but also be able to check if the user has
// provided a custom value. If they didn't, we won't throw an error if
// the file doesn't exist.
const HELP_MSG_CONFIG_FILE: &str = formatcp!(
    "Configuration file to use\n\n[default: {}]",
    NETBLOCK_CONFIG_FILE,
);

// Macro for generating the functions for serde defaults
macro_rules! default_function {
    ( $( $name:ident : $T:ty = $e:expr; )* ) => {
        $(
            #[allow(clippy::missing_const_for_fn)]
            fn $name() -> $T {
                $e
            }
        )*
    };
}

// Generate the functions for serde defaults
default_function! {
    max_concurrency: usize = DEFAULT_MAX_CONCURRENCY;
    max_attempts: u64 = DEFAULT_MAX_ATTEMPTS;
    timeout: Duration = Duration::from_secs(DEFAULT_TIMEOUT_SECS);
    backoff_base: Duration = Duration::from_secs(DEFAULT_BACKOFF_BASE_SECS);
    pacing_delay: Duration = Duration::from_secs(DEFAULT_PACING_DELAY_SECS);
    user_agent: String = DEFAULT_USER_AGENT.to_string();
    output: PathBuf = PathBuf::from(DEFAULT_OUTPUT_FILE);
    failed_links: PathBuf = PathBuf::from(DEFAULT_FAILED_LINKS_FILE);
    summary: PathBuf = PathBuf::from(DEFAULT_SUMMARY_FILE);
}

// Macro for merging configuration values
macro_rules! fold_in {
    ($cli:ident , $toml:ident ; $ty:ident { $(..$ignore:ident,)* $( $key:ident : $default:expr, )* } ) => {
        if (false) {
            #[allow(dead_code, unused, clippy::diverging_sub_expression)]
            let _check_fold_in_exhaustivity = $ty {
                $($key: unreachable!(), )*
                $($ignore: unreachable!(), )*
            };
        };
        $(
            if $cli.$key == $default && $toml.$key != $default {
                $cli.$key = $toml.$key;
            }
        )*
    };
}

#[derive(Parser, Debug)]
#[command(
    name = "netblock",
    version,
    about = "netblock downloads IP blocklists and folds them into one canonical IPv4 list"
)]
pub(crate) struct NetblockOptions {
    /// File with one blocklist URL per non-blank line
    #[arg(default_value = DEFAULT_SOURCES_FILE, value_name = "SOURCES")]
    pub(crate) sources: PathBuf,

    #[arg(short, long = "config", help = HELP_MSG_CONFIG_FILE)]
    pub(crate) config_file: Option<PathBuf>,

    #[command(flatten)]
    pub(crate) config: Config,
}

#[derive(clap::Args, Debug, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub(crate) struct Config {
    /// Maximum number of sources fetched at the same time
    #[arg(long, default_value = MAX_CONCURRENCY_STR)]
    #[serde(default = "max_concurrency")]
    pub(crate) max_concurrency: usize,

    /// Maximum number of attempts per source before giving up on it
    #[arg(long, default_value = MAX_ATTEMPTS_STR)]
    #[serde(default = "max_attempts")]
    pub(crate) max_attempts: u64,

    /// Timeout for a single request
    #[arg(long, value_parser = humantime::parse_duration, default_value = TIMEOUT_STR)]
    #[serde(default = "timeout", with = "humantime_serde")]
    pub(crate) timeout: Duration,

    /// Base wait time for the exponential backoff after a rate limit
    ///
    /// The n-th rate-limited attempt for a source waits base * 2^(n-1)
    /// before the next attempt.
    #[arg(long, value_parser = humantime::parse_duration, default_value = BACKOFF_BASE_STR)]
    #[serde(default = "backoff_base", with = "humantime_serde")]
    pub(crate) backoff_base: Duration,

    /// Pause after each completed source before the next fetch may start
    #[arg(long, value_parser = humantime::parse_duration, default_value = PACING_DELAY_STR)]
    #[serde(default = "pacing_delay", with = "humantime_serde")]
    pub(crate) pacing_delay: Duration,

    /// User agent sent to the blocklist mirrors
    #[arg(long, default_value = DEFAULT_USER_AGENT)]
    #[serde(default = "user_agent")]
    pub(crate) user_agent: String,

    /// Where to write the canonical network list
    #[arg(short, long, default_value = DEFAULT_OUTPUT_FILE)]
    #[serde(default = "output")]
    pub(crate) output: PathBuf,

    /// Where to write permanently failed source URLs
    ///
    /// The file is only written when at least one source failed.
    #[arg(long, default_value = DEFAULT_FAILED_LINKS_FILE)]
    #[serde(default = "failed_links")]
    pub(crate) failed_links: PathBuf,

    /// Where to write the plain-text run summary
    #[arg(long, default_value = DEFAULT_SUMMARY_FILE)]
    #[serde(default = "summary")]
    pub(crate) summary: PathBuf,

    /// Copy the canonical list to this path after it has been written,
    /// e.g. the blocklist directory of a reverse proxy
    #[arg(long)]
    #[serde(default)]
    pub(crate) publish: Option<PathBuf>,

    /// Command to run after the run finished, e.g. `nginx -s reload`
    ///
    /// A failing reload is logged but does not fail the run.
    #[arg(long)]
    #[serde(default)]
    pub(crate) reload_command: Option<String>,

    /// Do not show a progress bar while fetching
    #[arg(long)]
    #[serde(default)]
    pub(crate) no_progress: bool,

    #[command(flatten)]
    #[serde(default)]
    pub(crate) verbosity: Verbosity,
}

impl Config {
    /// Load configuration from a file
    pub(crate) fn load_from_file(path: &Path) -> Result<Config> {
        let contents = fs::read_to_string(path)?;
        toml::from_str(&contents).with_context(|| "Failed to parse configuration file")
    }

    /// Merge the configuration from TOML into the CLI configuration
    ///
    /// CLI flags always win; a TOML value is only folded in when the CLI
    /// still carries the default.
    pub(crate) fn merge(&mut self, toml: Config) {
        // NOTE: if you see an error within this macro call, check to make
        // sure that the fields provided to fold_in! match all the fields of
        // the Config struct.
        fold_in! {
            // Destination and source configs
            self, toml;

            Config {
                // Verbosity is a CLI-only concern
                ..verbosity,

                // Keys with defaults to assign
                max_concurrency: max_concurrency(),
                max_attempts: max_attempts(),
                timeout: timeout(),
                backoff_base: backoff_base(),
                pacing_delay: pacing_delay(),
                user_agent: user_agent(),
                output: output(),
                failed_links: failed_links(),
                summary: summary(),
                publish: None,
                reload_command: None,
                no_progress: false,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::time::Duration;

    use clap::Parser;
    use pretty_assertions::assert_eq;

    use super::{Config, NetblockOptions};

    #[test]
    fn test_default_options() {
        let opts = NetblockOptions::parse_from(["netblock"]);
        assert_eq!(opts.sources, std::path::PathBuf::from("sources.txt"));
        assert_eq!(opts.config.max_concurrency, 3);
        assert_eq!(opts.config.max_attempts, 5);
        assert_eq!(opts.config.timeout, Duration::from_secs(30));
        assert_eq!(opts.config.backoff_base, Duration::from_secs(5));
        assert_eq!(opts.config.pacing_delay, Duration::from_secs(1));
        assert_eq!(opts.config.user_agent, "MyBlocklistFetcher/1.0");
    }

    #[test]
    fn test_parse_human_durations() {
        let opts = NetblockOptions::parse_from([
            "netblock",
            "--timeout",
            "10s",
            "--backoff-base",
            "250ms",
            "--pacing-delay",
            "0s",
        ]);
        assert_eq!(opts.config.timeout, Duration::from_secs(10));
        assert_eq!(opts.config.backoff_base, Duration::from_millis(250));
        assert_eq!(opts.config.pacing_delay, Duration::ZERO);
    }

    #[test]
    fn test_toml_is_folded_under_cli() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "max-concurrency = 8\ntimeout = \"10s\"\nuser-agent = \"probe/2.0\""
        )
        .unwrap();

        // hyphenated keys are not accepted; the config file uses the
        // field names as-is
        assert!(Config::load_from_file(file.path()).is_err());

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "max_concurrency = 8\ntimeout = \"10s\"\nuser_agent = \"probe/2.0\""
        )
        .unwrap();
        let toml = Config::load_from_file(file.path()).unwrap();

        // CLI set a custom timeout; TOML must not override it
        let mut opts =
            NetblockOptions::parse_from(["netblock", "--timeout", "7s"]);
        opts.config.merge(toml);

        assert_eq!(opts.config.timeout, Duration::from_secs(7));
        assert_eq!(opts.config.max_concurrency, 8);
        assert_eq!(opts.config.user_agent, "probe/2.0");
    }
}
