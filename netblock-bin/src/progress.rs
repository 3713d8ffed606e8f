use std::time::Duration;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use netblock_lib::SourceReport;

/// Initialize the interactive progress-bar unless disabled
pub(crate) fn init_progress(no_progress: bool, total_sources: usize) -> Option<ProgressBar> {
    if no_progress {
        return None;
    }
    let bar = ProgressBar::new(total_sources as u64).with_style(
        ProgressStyle::default_bar()
            .template("{spinner:.red.bright} {pos}/{len:.dim} [{elapsed_precise}] {bar:25} {wide_msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    bar.set_message("Fetching sources");
    bar.enable_steady_tick(Duration::from_millis(100));
    Some(bar)
}

/// Update the progress on every completed source
pub(crate) fn update_progress(progress_bar: &Option<ProgressBar>, report: &SourceReport) {
    if let Some(pb) = progress_bar {
        pb.inc(1);
        pb.set_message(color_report(report));
    }
}

fn color_report(report: &SourceReport) -> String {
    let line = format!("{} {}", report.status.icon(), report.url);
    if report.status.is_success() {
        style(line).green().bright().to_string()
    } else {
        style(line).red().bright().to_string()
    }
}
