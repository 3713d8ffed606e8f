//! Writing the run artifacts.
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use ipnet::Ipv4Net;
use log::{info, warn};
use url::Url;

use crate::stats::RunStats;

/// Write the canonical network list, one CIDR per line.
pub(crate) fn write_networks(path: &Path, networks: &[Ipv4Net]) -> Result<()> {
    fs::write(path, joined_lines(networks))
        .with_context(|| format!("Cannot write network list to `{}`", path.display()))?;
    info!("{} networks saved to {}", networks.len(), path.display());
    Ok(())
}

/// Write the permanently failed source URLs, one per line.
///
/// Written only when at least one source failed; consumers treat a missing
/// file as a clean run.
pub(crate) fn write_failed_links(path: &Path, failed: &[Url]) -> Result<()> {
    if failed.is_empty() {
        info!("No failed links!");
        return Ok(());
    }
    fs::write(path, joined_lines(failed))
        .with_context(|| format!("Cannot write failed links to `{}`", path.display()))?;
    warn!(
        "{} links permanently failed, saved to {}",
        failed.len(),
        path.display()
    );
    Ok(())
}

/// Write the plain-text run summary.
pub(crate) fn write_summary(path: &Path, stats: &RunStats) -> Result<()> {
    fs::write(path, stats.summary())
        .with_context(|| format!("Cannot write summary to `{}`", path.display()))?;
    info!("Summary written to {}", path.display());
    Ok(())
}

/// One item per line, with a trailing newline for non-empty content.
fn joined_lines<T: ToString>(items: &[T]) -> String {
    let mut out = items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n");
    if !out.is_empty() {
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use ipnet::Ipv4Net;
    use pretty_assertions::assert_eq;
    use url::Url;

    use super::{write_failed_links, write_networks};

    #[test]
    fn test_write_networks() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ipv4_unique.txt");

        let networks: Vec<Ipv4Net> = vec![
            "10.0.0.0/8".parse().unwrap(),
            "192.0.2.0/24".parse().unwrap(),
        ];
        write_networks(&path, &networks).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "10.0.0.0/8\n192.0.2.0/24\n");
    }

    #[test]
    fn test_failed_links_file_absent_for_clean_run() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("failed_links.txt");

        write_failed_links(&path, &[]).unwrap();
        assert!(!path.exists());

        let failed = vec![Url::parse("https://example.com/list.txt").unwrap()];
        write_failed_links(&path, &failed).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "https://example.com/list.txt\n");
    }
}
