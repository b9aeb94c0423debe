//! Terminal progress bar for `tomd convert`.

use indicatif::{ProgressBar, ProgressStyle};
use tomd_core::progress::ProgressReporter;

const BAR_TEMPLATE: &str =
    "[{elapsed_precise}] {prefix:.bold}▕{bar:40.blue}▏{pos}/{len} ({percent}%) eta {eta}";

/// Progress bar over the files dispatched in this run.
pub struct BarReporter {
    bar: ProgressBar,
}

impl BarReporter {
    pub fn new() -> Self {
        let bar = ProgressBar::new(0);
        let style = ProgressStyle::with_template(BAR_TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓▒░  ");
        bar.set_style(style);
        bar.set_prefix("converting");
        Self { bar }
    }
}

impl ProgressReporter for BarReporter {
    fn set_total(&self, total: usize) {
        self.bar.set_length(total as u64);
        self.bar.set_position(0);
    }

    fn increment(&self, n: usize) {
        self.bar.inc(n as u64);
    }

    fn close(&self) {
        self.bar.finish();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bar_tracks_reported_counts() {
        let r = BarReporter::new();
        r.set_total(5);
        r.increment(2);
        r.increment(1);
        assert_eq!(r.bar.length(), Some(5));
        assert_eq!(r.bar.position(), 3);
        r.close();
        assert!(r.bar.is_finished());
    }
}
