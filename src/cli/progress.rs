use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use truename_lib::model::OperationProgressEvent;

/// Progress bar fed by the batch's per-file progress events.
pub struct CliProgress {
    bar: ProgressBar,
}

impl CliProgress {
    pub fn new(label: &str, total: usize) -> Self {
        let bar = ProgressBar::new(total as u64);
        let style = ProgressStyle::with_template(
            "  {prefix:>9} [{bar:30.cyan/dim}] {pos}/{len} {wide_msg}",
        )
        .map(|style| style.progress_chars("━╸─"))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
        bar.set_style(style);
        bar.set_prefix(label.to_string());
        Self { bar }
    }

    pub fn update(&self, event: &OperationProgressEvent) {
        if self.bar.length() != Some(event.total as u64) {
            self.bar.set_length(event.total as u64);
        }
        self.bar.set_position(event.processed as u64);
        if let Some(current) = &event.current_path {
            let name = Path::new(current)
                .file_name()
                .map(|name| name.to_string_lossy().to_string())
                .unwrap_or_else(|| current.clone());
            self.bar.set_message(name);
        }
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}
