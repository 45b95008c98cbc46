use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Request body for `enqueueTask`, asking the service to recursively export
/// one block as a bundled HTML archive. Request bodies are only ever
/// serialized, so they borrow their strings.
#[derive(Debug, Serialize)]
pub struct EnqueueTask<'a> {
    task: ExportBlockTask<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ExportBlockTask<'a> {
    event_name: &'a str,
    request: ExportBlockRequest<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ExportBlockRequest<'a> {
    block_id: &'a str,
    recursive: bool,
    export_options: ExportRequestOptions<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ExportRequestOptions<'a> {
    export_type: &'a str,
    time_zone: &'a str,
    locale: &'a str,
}

impl EnqueueTask<'_> {
    pub(crate) fn export_block<'a>(block_id: &'a str, options: &'a ExportOptions) -> EnqueueTask<'a> {
        EnqueueTask {
            task: ExportBlockTask {
                event_name: "exportBlock",
                request: ExportBlockRequest {
                    block_id,
                    recursive: true,
                    export_options: ExportRequestOptions {
                        export_type: "html",
                        time_zone: &options.time_zone,
                        locale: &options.locale,
                    },
                },
            },
        }
    }
}

/// Timezone and locale passed along with every export request.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub time_zone: String,
    pub locale: String,
}

impl Default for ExportOptions {
    fn default() -> Self {
        ExportOptions { time_zone: String::from("UTC"), locale: String::from("en") }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TaskId {
    pub(crate) task_id: String,
}

/// Request body for `getTasks`. The service accepts a batch of task ids but
/// this client always queries for exactly one.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskIds<'a> {
    pub(crate) task_ids: Vec<&'a str>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TaskResults {
    pub results: Vec<TaskResult>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TaskResult {
    pub(crate) id: String,
    pub(crate) state: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) status: Option<TaskProgress>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskProgress {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) pages_exported: Option<u64>,
    #[serde(default, rename = "exportURL", skip_serializing_if = "Option::is_none")]
    pub(crate) export_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TaskState {
    InProgress,
    Success { export_url: String },
    Failed { raw: String },
}

impl TaskState {
    /// Derives the task state from one `getTasks` result entry. The state
    /// string is case-normalized; a `success` entry must carry a populated
    /// export URL, otherwise the response counts as malformed. Any state
    /// other than `in_progress` and `success` is terminal failure and keeps
    /// the raw entry for diagnostics.
    pub(crate) fn from_result(result: &TaskResult) -> Result<TaskState, Error> {
        match result.state.to_lowercase().as_str() {
            "in_progress" => Ok(TaskState::InProgress),
            "success" => match result.status.as_ref().and_then(|s| s.export_url.as_deref()) {
                Some(export_url) if !export_url.is_empty() => {
                    Ok(TaskState::Success { export_url: export_url.to_string() })
                }
                _ => Err(Error::MalformedResponse(format!(
                    "Task {id} reported success but carries no export URL.",
                    id = result.id
                ))),
            },
            _ => Ok(TaskState::Failed { raw: serde_json::to_string(result)? }),
        }
    }
}

/// One server-side export job. Created in progress at submission and updated
/// on every poll until it reaches a terminal state.
#[derive(Debug)]
pub struct ExportTask {
    pub task_id: String,
    pub state: TaskState,
    pub pages_exported: Option<u64>,
}

impl ExportTask {
    pub(crate) fn queued(task_id: String) -> ExportTask {
        ExportTask { task_id, state: TaskState::InProgress, pages_exported: None }
    }

    pub(crate) fn apply(&mut self, result: &TaskResult) -> Result<(), Error> {
        self.state = TaskState::from_result(result)?;
        if let Some(pages) = result.status.as_ref().and_then(|s| s.pages_exported) {
            self.pages_exported = Some(pages);
        }
        Ok(())
    }
}
