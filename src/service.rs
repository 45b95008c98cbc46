use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header;
use reqwest::{Client, StatusCode};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::block::normalize_block_id;
use crate::download::{download, DownloadResult};
use crate::error::Error;
use crate::model::{EnqueueTask, ExportOptions, ExportTask, TaskId, TaskIds, TaskResults, TaskState};
use crate::progress::SpinnerHelper;

/// Completion callback, invoked at most once per export with the resolved
/// download URL, after the task succeeded and before any download starts.
pub type OnReady<'a> = &'a (dyn Fn(&str) + Send + Sync);

/// One export task submission plus status polling. Expressed as a trait so
/// the poll loop can be driven by fakes in tests.
#[async_trait]
pub trait TaskClient {
    /// Asks the service to begin a recursive export of the given block.
    async fn submit(&self, block_id: &str) -> Result<ExportTask, Error>;

    /// Fetches the latest status of the task and updates its state.
    async fn poll(&self, task: &mut ExportTask) -> Result<(), Error>;
}

/// Task client backed by the service's private HTTP API, authenticated with
/// the `token_v2` session cookie. Safe to share across concurrent exports;
/// every request is stateless.
pub struct NotionTaskClient {
    pub client: Client,
    pub token_v2: String,
    pub options: ExportOptions,
}

impl NotionTaskClient {
    fn cookie(&self) -> String {
        format!("token_v2={token}", token = self.token_v2)
    }
}

#[async_trait]
impl TaskClient for NotionTaskClient {
    async fn submit(&self, block_id: &str) -> Result<ExportTask, Error> {
        let enqueue = self
            .client
            .post(format!("{url}/enqueueTask", url = url()))
            .header(header::COOKIE, self.cookie())
            .json(&EnqueueTask::export_block(block_id, &self.options))
            .send()
            .await?;

        match enqueue.status() {
            StatusCode::OK => {
                let response_body = enqueue.text().await?;
                let task_id = serde_json::from_str::<TaskId>(&response_body)
                    .map(|id: TaskId| id.task_id)
                    .ok()
                    .filter(|id| !id.is_empty())
                    .ok_or_else(|| {
                        Error::SubmissionError(format!(
                            "Response to enqueueTask carries no task id: {response_body}"
                        ))
                    })?;

                Ok(ExportTask::queued(task_id))
            }
            _ => Err(Error::SubmissionError(format!(
                "Something went wrong enqueueing the export task: {error}",
                error = enqueue.text().await?
            ))),
        }
    }

    async fn poll(&self, task: &mut ExportTask) -> Result<(), Error> {
        let status = self
            .client
            .post(format!("{url}/getTasks", url = url()))
            .header(header::COOKIE, self.cookie())
            .json(&TaskIds { task_ids: vec![&task.task_id] })
            .send()
            .await?;

        match status.status() {
            StatusCode::OK => {
                let response_body = status.text().await?;
                let results = serde_json::from_str::<TaskResults>(&response_body)?;
                let result = results
                    .results
                    .iter()
                    .find(|result| result.id == task.task_id)
                    .ok_or_else(|| {
                        Error::TaskNotFound(format!(
                            "Task {id} is missing from the getTasks response.",
                            id = task.task_id
                        ))
                    })?;

                task.apply(result)
            }
            _ => Err(Error::TaskStatusError(format!(
                "Something went wrong checking the task status. Try again later. Error message: {error}",
                error = status.text().await?
            ))),
        }
    }
}

/// Poll loop parameters. The deadline is mandatory; the service gives no
/// guarantee that a task ever leaves the in-progress state.
pub struct ExportConfig {
    pub poll_interval: Duration,
    pub deadline: Duration,
    /// Consecutive `TaskNotFound` polls treated like in-progress before the
    /// miss escalates to a hard failure.
    pub task_not_found_tolerance: u32,
    pub cancel: CancellationToken,
}

impl ExportConfig {
    pub fn new(deadline: Duration) -> ExportConfig {
        ExportConfig {
            poll_interval: Duration::from_secs(5),
            deadline,
            task_not_found_tolerance: 3,
            cancel: CancellationToken::new(),
        }
    }
}

/// Drives one export from submission over polling to the download URL, and
/// optionally streams the archive to disk. Each export runs as one strictly
/// sequential flow; run several exporters for concurrent exports.
pub struct NotionExporter<T = NotionTaskClient> {
    pub tasks: T,
    pub client: Client,
    pub config: ExportConfig,
}

impl NotionExporter {
    pub fn new(token_v2: &str, options: ExportOptions, config: ExportConfig) -> NotionExporter {
        let client = Client::new();

        NotionExporter {
            tasks: NotionTaskClient {
                client: client.clone(),
                token_v2: token_v2.to_string(),
                options,
            },
            client,
            config,
        }
    }
}

impl<T: TaskClient> NotionExporter<T> {
    /// Exports the block and resolves the download URL of the archive.
    pub async fn export(&self, block_id: &str, on_ready: Option<OnReady<'_>>) -> Result<String, Error> {
        let block_id = normalize_block_id(block_id)?;
        let mut task = self.tasks.submit(&block_id).await?;

        let spinner = SpinnerHelper::create(format!("Task queued as `{id}`.", id = task.task_id));
        let deadline = Instant::now() + self.config.deadline;
        let mut consecutive_misses = 0u32;

        loop {
            match self.tasks.poll(&mut task).await {
                Ok(()) => consecutive_misses = 0,
                Err(Error::TaskNotFound(message)) => {
                    // A single missing entry may be a transient service
                    // hiccup rather than a lost task.
                    consecutive_misses += 1;
                    if consecutive_misses > self.config.task_not_found_tolerance {
                        spinner.abandon_with_message(format!(
                            "FAILURE – task with id {id} went missing.",
                            id = task.task_id
                        ));
                        return Err(Error::TaskNotFound(message));
                    }

                    self.next_poll_in(deadline, &spinner, &task).await?;
                    continue;
                }
                Err(error) => {
                    spinner.abandon_with_message(format!(
                        "FAILURE – polling task with id {id} failed.",
                        id = task.task_id
                    ));
                    return Err(error);
                }
            }

            match &task.state {
                TaskState::InProgress => {
                    let message = match task.pages_exported {
                        Some(pages) => format!(
                            "IN_PROGRESS – task id: {id}, pages exported: {pages}",
                            id = task.task_id
                        ),
                        None => format!("IN_PROGRESS – task id: {id}", id = task.task_id),
                    };
                    spinner.set_message(message);

                    self.next_poll_in(deadline, &spinner, &task).await?;
                }
                TaskState::Success { export_url } => {
                    spinner.finish_with_message(format!(
                        "SUCCESS – export for task with id {id} is ready.",
                        id = task.task_id
                    ));

                    if let Some(callback) = on_ready {
                        callback(export_url);
                    }

                    return Ok(export_url.clone());
                }
                TaskState::Failed { raw } => {
                    spinner.abandon_with_message(format!(
                        "FAILURE – export task with id {id} did not complete.",
                        id = task.task_id
                    ));

                    return Err(Error::ExportFailed(raw.clone()));
                }
            }
        }
    }

    /// Exports the block and streams the archive into `directory`, named
    /// `Export-<normalized block id>.zip`. Overwrites an existing file.
    pub async fn export_and_download(
        &self,
        block_id: &str,
        directory: &Path,
        on_ready: Option<OnReady<'_>>,
    ) -> Result<DownloadResult, Error> {
        let block_id = normalize_block_id(block_id)?;
        let export_url = self.export(&block_id, on_ready).await?;
        let path = directory.join(format!("Export-{block_id}.zip"));

        download(&self.client, &export_url, &path).await
    }

    /// Suspends until the next poll is due. Cancellation interrupts the wait
    /// promptly instead of sitting out the full interval.
    async fn next_poll_in(
        &self,
        deadline: Instant,
        spinner: &indicatif::ProgressBar,
        task: &ExportTask,
    ) -> Result<(), Error> {
        if Instant::now() >= deadline {
            spinner.abandon_with_message(format!(
                "TIMEOUT – task with id {id} is still not finished.",
                id = task.task_id
            ));
            return Err(Error::ExportTimeout(format!(
                "Export exceeded the configured deadline of {deadline:?}.",
                deadline = self.config.deadline
            )));
        }

        tokio::select! {
            _ = tokio::time::sleep(self.config.poll_interval) => Ok(()),
            _ = self.config.cancel.cancelled() => {
                spinner.abandon_with_message(format!(
                    "CANCELLED – task with id {id} was abandoned.",
                    id = task.task_id
                ));
                Err(Error::Cancelled)
            }
        }
    }
}

#[cfg(test)]
use mockito::server_url;

#[cfg(not(test))]
const NOTION_URL: &str = "https://www.notion.so/api/v3";

fn url() -> String {
    #[cfg(not(test))]
    let url = String::from(NOTION_URL);
    #[cfg(test)]
    let url = server_url();
    url
}
