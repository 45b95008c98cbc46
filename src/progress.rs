use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

pub struct SpinnerHelper;

impl SpinnerHelper {
  pub fn create(message: String) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.enable_steady_tick(Duration::from_millis(120));
    spinner.set_style(
      ProgressStyle::with_template("{spinner:.blue} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        // For more spinners check out the cli-spinners project:
        // https://github.com/sindresorhus/cli-spinners/blob/master/spinners.json
        .tick_strings(&[
          "□ □ □ □ □",
          "■ □ □ □ □",
          "□ ■ □ □ □",
          "□ □ ■ □ □",
          "□ □ □ ■ □",
          "□ □ □ □ ■",
          "■ ■ ■ ■ ■",
        ]),
    );
    spinner.set_message(message);
    spinner
  }
}

pub struct DownloadBarHelper;

impl DownloadBarHelper {
  /// A byte progress bar when the total size is known up front, a byte
  /// spinner otherwise.
  pub fn create(total_bytes: Option<u64>) -> ProgressBar {
    match total_bytes {
      Some(total) => {
        let bar = ProgressBar::new(total);
        bar.set_style(
          ProgressStyle::with_template("{bar:40.blue} {bytes}/{total_bytes} ({eta}) {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("■□ "),
        );
        bar
      }
      None => {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
          ProgressStyle::with_template("{spinner:.blue} {bytes} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner
      }
    }
  }
}
