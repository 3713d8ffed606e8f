//! Handing the finished artifact over to the consuming component.
use std::path::Path;
use std::process::Command;

use anyhow::{Context, Result};
use log::{error, info};

/// Copy the canonical list to the location the filtering component reads.
///
/// The artifact is fully written before this runs, so the consumer never
/// sees a half-finished list.
pub(crate) fn publish(artifact: &Path, destination: &Path) -> Result<()> {
    std::fs::copy(artifact, destination).with_context(|| {
        format!(
            "Cannot copy `{}` to `{}`",
            artifact.display(),
            destination.display()
        )
    })?;
    info!(
        "Published {} to {}",
        artifact.display(),
        destination.display()
    );
    Ok(())
}

/// Run the configured reload command, e.g. `nginx -s reload`.
///
/// A failing reload is logged but does not fail the run; the artifact is
/// already in place and the next reload will pick it up.
pub(crate) fn reload(command: &str) {
    let mut parts = command.split_whitespace();
    let Some(program) = parts.next() else {
        return;
    };
    match Command::new(program).args(parts).status() {
        Ok(status) if status.success() => info!("Reload command succeeded"),
        Ok(status) => error!("Reload command exited with {status}"),
        Err(e) => error!("Cannot run reload command `{command}`: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::publish;

    #[test]
    fn test_publish_copies_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = dir.path().join("ipv4_unique.txt");
        let destination = dir.path().join("ipv4");

        std::fs::write(&artifact, "10.0.0.0/8\n").unwrap();
        publish(&artifact, &destination).unwrap();

        assert_eq!(
            std::fs::read_to_string(&destination).unwrap(),
            "10.0.0.0/8\n"
        );
    }

    #[test]
    fn test_publish_missing_artifact_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = dir.path().join("does-not-exist.txt");
        let destination = dir.path().join("ipv4");

        assert!(publish(&artifact, &destination).is_err());
    }
}
