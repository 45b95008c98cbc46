use std::path::PathBuf;

use clap::Parser;

/// Exports a block (a page and everything below it) from a Notion workspace
/// as a bundled HTML archive and downloads it to local storage.
#[derive(Parser)]
pub(crate) struct Cli {
  /// The `token_v2` value from the cookies of a logged-in Notion browser
  /// session.
  #[clap(long, short, env = "NOTION_TOKEN_V2", hide_env_values = true)]
  pub(crate) token: String,
  /// Directory the downloaded archive is written to.
  #[clap(long, short, default_value = ".")]
  pub(crate) output: PathBuf,
  /// Give up with a timeout error when the export has not finished after this
  /// many seconds.
  #[clap(long, default_value = "1800")]
  pub(crate) timeout: u64,
  /// Seconds to wait between two status polls.
  #[clap(long, default_value = "5")]
  pub(crate) poll_interval: u64,
  /// IANA timezone passed along with the export request (e.g. `Europe/Prague`).
  #[clap(long, default_value = "UTC")]
  pub(crate) time_zone: String,
  /// Locale passed along with the export request.
  #[clap(long, default_value = "en")]
  pub(crate) locale: String,
  /// Id of the block to export. Hyphens are optional, so both the id from the
  /// page URL and the canonical dashed form work.
  pub(crate) block_id: String,
}
