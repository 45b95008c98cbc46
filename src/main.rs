mod cli;

use std::time::Duration;

use clap::Parser;
use notion_exporter::error::Error;
use notion_exporter::model::ExportOptions;
use notion_exporter::service::{ExportConfig, NotionExporter};

use cli::Cli;

#[tokio::main]
async fn main() -> Result<(), Error> {
  let Cli {
    token,
    output,
    timeout,
    poll_interval,
    time_zone,
    locale,
    block_id,
  } = Cli::parse();

  let mut config = ExportConfig::new(Duration::from_secs(timeout));
  config.poll_interval = Duration::from_secs(poll_interval);

  let cancel = config.cancel.clone();
  tokio::spawn(async move {
    if tokio::signal::ctrl_c().await.is_ok() {
      cancel.cancel();
    }
  });

  let exporter = NotionExporter::new(&token, ExportOptions { time_zone, locale }, config);

  exporter
    .export_and_download(&block_id, &output, None)
    .await
    .map(|result| println!("Downloaded to: `{path}`", path = result.path.display()))
}
