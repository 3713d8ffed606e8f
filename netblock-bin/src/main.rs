//! `netblock` is a fast, asynchronous, resource-friendly IP blocklist
//! aggregator. It downloads a configured set of blocklists, validates the
//! entries as IPv4 networks and folds them into a single canonical,
//! overlap-free list, ready for consumption by a packet filter or WAF.
//!
//! Run it against a source list (one URL per line):
//! ```sh
//! netblock sources.txt
//! ```
//!
//! Tune the fetch behavior:
//! ```sh
//! netblock --max-concurrency 5 --timeout 10s sources.txt
//! ```
//!
//! Hand the finished list over to a reverse proxy and reload it:
//! ```sh
//! netblock --publish /etc/nginx/ngx_waf/ipv4 --reload-command "nginx -s reload" sources.txt
//! ```
#![warn(clippy::all, clippy::pedantic)]
#![warn(
    absolute_paths_not_starting_with_crate,
    rustdoc::invalid_html_tags,
    missing_copy_implementations,
    missing_debug_implementations,
    semicolon_in_expressions_from_macros,
    unreachable_pub,
    unused_extern_crates,
    variant_size_differences,
    clippy::missing_const_for_fn
)]
#![deny(anonymous_parameters, macro_use_extern_crate)]
#![deny(missing_docs)]

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use futures::StreamExt;
use log::{error, info};
use url::Url;

use netblock_lib::collapse::collapse;
use netblock_lib::{ClientBuilder, Collector, Harvest};

mod logging;
mod options;
mod progress;
mod publish;
mod stats;
mod verbosity;
mod writer;

use crate::options::{Config, NetblockOptions, NETBLOCK_CONFIG_FILE};
use crate::stats::RunStats;

/// A C-like enum that can be cast to `i32` and used as process exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExitCode {
    Success = 0,
    // NOTE: exit code 1 is used for any `Result::Err` bubbled up to `main()`
    // using the `?` operator.
    #[allow(unused)]
    UnexpectedFailure = 1,
    UnusableSourceList = 2,
    ConfigFile = 3,
}

fn main() -> Result<()> {
    // std::process::exit doesn't guarantee that all destructors will be run,
    // therefore we wrap the main code in another function to ensure that.
    // See: https://doc.rust-lang.org/stable/std/process/fn.exit.html
    let exit_code = run_main()?;
    std::process::exit(exit_code);
}

/// Set up the runtime and call the netblock entrypoint
fn run_main() -> Result<i32> {
    use std::process::exit;

    let opts = match load_config() {
        Ok(opts) => opts,
        Err(e) => {
            error!("Error while loading config: {e:?}");
            exit(ExitCode::ConfigFile as i32);
        }
    };

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(run(&opts))
}

/// Merge all provided config options into one.
/// This includes a potential config file and command-line arguments.
fn load_config() -> Result<NetblockOptions> {
    let mut opts = NetblockOptions::parse();

    logging::init_logging(&opts.config.verbosity);

    // Load a potentially existing config file and merge it into the config
    // from the CLI
    if let Some(config_file) = &opts.config_file {
        match Config::load_from_file(config_file) {
            Ok(c) => opts.config.merge(c),
            Err(e) => {
                bail!(
                    "Cannot load configuration file `{}`: {e:?}",
                    config_file.display()
                );
            }
        }
    } else {
        // If no config file was explicitly provided, we try to load the
        // default config file from the current directory if the file exists.
        let default_config = PathBuf::from(NETBLOCK_CONFIG_FILE);
        if default_config.is_file() {
            match Config::load_from_file(&default_config) {
                Ok(c) => opts.config.merge(c),
                Err(e) => {
                    bail!(
                        "Cannot load default configuration file `{}`: {e:?}",
                        default_config.display()
                    );
                }
            }
        }
    }

    Ok(opts)
}

/// Read the source list; one URL per non-blank line.
///
/// The list is operator-maintained and tiny, so an unparseable URL is
/// reported right away instead of being dragged through the whole run.
fn read_sources(path: &Path) -> Result<Vec<Url>> {
    let file = File::open(path)
        .with_context(|| format!("Cannot open source list `{}`", path.display()))?;
    let lines: Vec<String> = BufReader::new(file)
        .lines()
        .collect::<Result<_, _>>()
        .with_context(|| format!("Cannot read source list `{}`", path.display()))?;

    lines
        .iter()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty())
        .map(|line| Url::parse(line).with_context(|| format!("Invalid source URL `{line}`")))
        .collect()
}

/// Run netblock on the given source list
async fn run(opts: &NetblockOptions) -> Result<i32> {
    let cfg = &opts.config;

    let sources = match read_sources(&opts.sources) {
        Ok(sources) => sources,
        Err(e) => {
            error!("{e:#}");
            return Ok(ExitCode::UnusableSourceList as i32);
        }
    };
    if sources.is_empty() {
        error!("No source URLs found in `{}`", opts.sources.display());
        return Ok(ExitCode::UnusableSourceList as i32);
    }

    let client = ClientBuilder::builder()
        .user_agent(cfg.user_agent.clone())
        .timeout(cfg.timeout)
        .max_attempts(cfg.max_attempts)
        .backoff_base(cfg.backoff_base)
        .max_concurrency(cfg.max_concurrency)
        .build()
        .client()?;
    let collector = Collector::new(client, cfg.max_concurrency, cfg.pacing_delay);

    let total_sources = sources.len();
    let pb = progress::init_progress(cfg.no_progress, total_sources);

    let stream = collector.collect(sources);
    futures::pin_mut!(stream);

    let mut harvest = Harvest::default();
    while let Some(report) = stream.next().await {
        progress::update_progress(&pb, &report);
        harvest.add(report);
    }

    // Note that print statements may interfere with the progress bar, so this
    // must go before printing the stats
    if let Some(pb) = &pb {
        pb.finish_and_clear();
    }

    info!("Total lines fetched (before filtering): {}", harvest.total_lines);

    let raw_count = harvest.networks.len();
    let networks = collapse(std::mem::take(&mut harvest.networks));
    let overlaps_removed = raw_count - networks.len();
    info!("Overlaps/redundancies removed: {overlaps_removed}");

    let stats = RunStats::new(total_sources, &networks, overlaps_removed, &harvest);

    writer::write_networks(&cfg.output, &networks)?;
    writer::write_failed_links(&cfg.failed_links, &harvest.failed)?;
    writer::write_summary(&cfg.summary, &stats)?;

    println!("{stats}");

    if let Some(destination) = &cfg.publish {
        publish::publish(&cfg.output, destination)?;
    }
    if let Some(command) = &cfg.reload_command {
        publish::reload(command);
    }

    Ok(ExitCode::Success as i32)
}
