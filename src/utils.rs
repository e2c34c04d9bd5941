use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::io::{self, Write};

/// Status line shown after `converted` of `total` images were written
pub fn progress_message(converted: u64, total: u64) -> String {
    format!(
        "Converted {} / {} images&labels to tfrecord",
        converted, total
    )
}

/// Create a single-line progress bar on stdout for `len` images
pub fn create_progress_bar(len: u64) -> ProgressBar {
    let pb = ProgressBar::with_draw_target(Some(len), ProgressDrawTarget::stdout());
    pb.set_style(
        ProgressStyle::with_template("{msg}").unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    pb
}

/// Overwrite the current line of `out` with the status line and flush it
pub fn write_progress<W: Write>(out: &mut W, converted: u64, total: u64) -> io::Result<()> {
    write!(out, "\r{}", progress_message(converted, total))?;
    out.flush()
}

/// Reports "Converted i / N" after every written image.
///
/// On a terminal the line is drawn by an indicatif bar. indicatif hides the
/// bar when stdout is not a terminal, so in that case the line is written
/// to stdout directly.
pub struct ProgressReporter {
    bar: Option<ProgressBar>,
    converted: u64,
    total: u64,
}

impl ProgressReporter {
    pub fn new(total: u64) -> Self {
        let bar = Some(create_progress_bar(total)).filter(|pb| !pb.is_hidden());
        Self {
            bar,
            converted: 0,
            total,
        }
    }

    /// Count one more converted image and refresh the status line
    pub fn report(&mut self) -> io::Result<()> {
        self.converted += 1;
        match &self.bar {
            Some(pb) => {
                pb.set_message(progress_message(self.converted, self.total));
                pb.set_position(self.converted);
                Ok(())
            }
            None => write_progress(&mut io::stdout().lock(), self.converted, self.total),
        }
    }

    pub fn finish(&self) {
        if let Some(pb) = &self.bar {
            pb.finish();
        }
    }
}
