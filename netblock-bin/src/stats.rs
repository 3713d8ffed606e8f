use std::fmt::{self, Display};
use std::time::SystemTime;

use ipnet::Ipv4Net;
use netblock_lib::Harvest;
use pad::{Alignment, PadStr};
use url::Url;

// Maximum padding for each entry in the final statistics output
const MAX_PADDING: usize = 24;

/// All counts of a finished run, derived once after collapsing.
pub(crate) struct RunStats {
    pub(crate) total_sources: usize,
    pub(crate) successful_sources: usize,
    pub(crate) total_lines: usize,
    pub(crate) overlaps_removed: usize,
    pub(crate) final_networks: usize,
    pub(crate) failed_links: Vec<Url>,
}

impl RunStats {
    pub(crate) fn new(
        total_sources: usize,
        networks: &[Ipv4Net],
        overlaps_removed: usize,
        harvest: &Harvest,
    ) -> Self {
        Self {
            total_sources,
            successful_sources: total_sources - harvest.failed.len(),
            total_lines: harvest.total_lines,
            overlaps_removed,
            final_networks: networks.len(),
            failed_links: harvest.failed.clone(),
        }
    }

    /// Render the body of the plain-text summary artifact.
    pub(crate) fn summary(&self) -> String {
        let timestamp = humantime::format_rfc3339_seconds(SystemTime::now());
        format!(
            "Run completed: {timestamp}\n\
             \n\
             Total lines fetched: {}\n\
             Overlaps/redundancies removed: {}\n\
             \n\
             Networks written: {}\n\
             \n\
             Failed links: {}\n",
            self.total_lines, self.overlaps_removed, self.final_networks, self.failed_links.len(),
        )
    }
}

fn write_stat(f: &mut fmt::Formatter, title: &str, stat: usize, newline: bool) -> fmt::Result {
    let fill = title.chars().count();
    f.write_str(title)?;
    f.write_str(
        &stat
            .to_string()
            .pad(MAX_PADDING - fill, '.', Alignment::Right, false),
    )?;

    if newline {
        f.write_str("\n")?;
    }

    Ok(())
}

impl Display for RunStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let separator = "-".repeat(MAX_PADDING + 1);

        writeln!(f, "\u{1f4dd} Summary")?; // 📝
        writeln!(f, "{separator}")?;
        write_stat(f, "\u{1f50d} Sources", self.total_sources, true)?; // 🔍
        write_stat(f, "\u{2705} Successful", self.successful_sources, true)?; // ✅
        write_stat(f, "\u{2b07} Lines fetched", self.total_lines, true)?; // ⬇️
        write_stat(f, "\u{1f9f9} Overlaps removed", self.overlaps_removed, true)?; // 🧹
        write_stat(f, "\u{1f4be} Final networks", self.final_networks, true)?; // 💾
        write_stat(f, "\u{1f6ab} Failed links", self.failed_links.len(), false)?; // 🚫

        for url in &self.failed_links {
            // Using leading newlines over trailing ones (e.g. `writeln!`)
            // lets us avoid extra newlines without any additional logic.
            write!(f, "\n  {url}")?;
        }

        Ok(())
    }
}
