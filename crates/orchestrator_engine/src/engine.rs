use std::collections::HashMap;
use std::future::Future;
use std::path::PathBuf;
use std::sync::{mpsc, Arc, Mutex};
use std::thread;

use orchestrator_logging::{orch_error, orch_info, orch_warn};
use serde_json::{Map, Value};
use tokio_util::sync::CancellationToken;

use crate::client::{ChannelProgressSink, ClientSettings, OrchestratorApi, ProgressSink, ReqwestClient};
use crate::persist::FormStore;
use crate::{ClientError, DownloadedForm, EngineEvent, FailureKind, RequestId};

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub client: ClientSettings,
    /// Where downloaded forms are written.
    pub download_dir: PathBuf,
}

enum EngineCommand {
    SubmitTask {
        request_id: RequestId,
        domain: String,
        task: String,
    },
    SubmitExtractedData {
        request_id: RequestId,
        data: Map<String, Value>,
    },
    Upload {
        request_id: RequestId,
        file_name: String,
        path: PathBuf,
    },
    DownloadForm {
        request_id: RequestId,
        url: String,
    },
    CheckHealth,
    Cancel {
        request_id: RequestId,
    },
}

impl EngineCommand {
    fn request_id(&self) -> Option<RequestId> {
        match self {
            EngineCommand::SubmitTask { request_id, .. }
            | EngineCommand::SubmitExtractedData { request_id, .. }
            | EngineCommand::Upload { request_id, .. }
            | EngineCommand::DownloadForm { request_id, .. }
            | EngineCommand::Cancel { request_id } => Some(*request_id),
            EngineCommand::CheckHealth => None,
        }
    }
}

type InFlight = Arc<Mutex<HashMap<RequestId, CancellationToken>>>;

/// Runs requests on a background tokio runtime and reports back over a channel.
#[derive(Clone)]
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: Arc<Mutex<mpsc::Receiver<EngineEvent>>>,
}

impl EngineHandle {
    pub fn new(config: EngineConfig) -> Result<Self, ClientError> {
        let api = Arc::new(ReqwestClient::new(config.client)?);
        Ok(Self::with_api(api, config.download_dir))
    }

    pub fn with_api(api: Arc<dyn OrchestratorApi>, download_dir: PathBuf) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        thread::spawn(move || {
            let runtime = match tokio::runtime::Runtime::new() {
                Ok(runtime) => runtime,
                Err(err) => {
                    orch_error!("Could not start request runtime: {}", err);
                    return;
                }
            };
            let in_flight: InFlight = Arc::new(Mutex::new(HashMap::new()));
            while let Ok(command) = cmd_rx.recv() {
                if let EngineCommand::Cancel { request_id } = command {
                    cancel(&in_flight, request_id);
                    continue;
                }
                let token = CancellationToken::new();
                if let Some(request_id) = command.request_id() {
                    if let Ok(mut map) = in_flight.lock() {
                        map.insert(request_id, token.clone());
                    }
                }
                let api = api.clone();
                let event_tx = event_tx.clone();
                let download_dir = download_dir.clone();
                let in_flight = in_flight.clone();
                runtime.spawn(async move {
                    let request_id = command.request_id();
                    handle_command(api, command, token, event_tx, download_dir).await;
                    if let (Some(request_id), Ok(mut map)) = (request_id, in_flight.lock()) {
                        map.remove(&request_id);
                    }
                });
            }
        });

        Self {
            cmd_tx,
            event_rx: Arc::new(Mutex::new(event_rx)),
        }
    }

    pub fn submit_task(&self, request_id: RequestId, domain: String, task: String) {
        self.send(EngineCommand::SubmitTask {
            request_id,
            domain,
            task,
        });
    }

    pub fn submit_extracted_data(&self, request_id: RequestId, data: Map<String, Value>) {
        self.send(EngineCommand::SubmitExtractedData { request_id, data });
    }

    pub fn upload(&self, request_id: RequestId, file_name: String, path: PathBuf) {
        self.send(EngineCommand::Upload {
            request_id,
            file_name,
            path,
        });
    }

    pub fn download_form(&self, request_id: RequestId, url: String) {
        self.send(EngineCommand::DownloadForm { request_id, url });
    }

    pub fn check_health(&self) {
        self.send(EngineCommand::CheckHealth);
    }

    pub fn cancel(&self, request_id: RequestId) {
        self.send(EngineCommand::Cancel { request_id });
    }

    pub fn recv_timeout(&self, timeout: std::time::Duration) -> Option<EngineEvent> {
        self.event_rx.lock().ok()?.recv_timeout(timeout).ok()
    }

    fn send(&self, command: EngineCommand) {
        if self.cmd_tx.send(command).is_err() {
            orch_warn!("Request engine has stopped; command dropped");
        }
    }
}

fn cancel(in_flight: &InFlight, request_id: RequestId) {
    let token = in_flight
        .lock()
        .ok()
        .and_then(|mut map| map.remove(&request_id));
    match token {
        Some(token) => {
            orch_info!("Cancelling request {}", request_id);
            token.cancel();
        }
        None => orch_info!("Request {} already finished; nothing to cancel", request_id),
    }
}

async fn cancellable<T>(
    token: &CancellationToken,
    request: impl Future<Output = Result<T, ClientError>>,
) -> Result<T, ClientError> {
    tokio::select! {
        result = request => result,
        _ = token.cancelled() => Err(ClientError::new(FailureKind::Cancelled, "request superseded")),
    }
}

async fn handle_command(
    api: Arc<dyn OrchestratorApi>,
    command: EngineCommand,
    token: CancellationToken,
    event_tx: mpsc::Sender<EngineEvent>,
    download_dir: PathBuf,
) {
    let event = match command {
        EngineCommand::SubmitTask {
            request_id,
            domain,
            task,
        } => EngineEvent::TaskCompleted {
            request_id,
            result: cancellable(&token, api.submit_task(&domain, &task)).await,
        },
        EngineCommand::SubmitExtractedData { request_id, data } => {
            EngineEvent::SubmissionCompleted {
                request_id,
                result: cancellable(&token, api.submit_extracted_data(&data)).await,
            }
        }
        EngineCommand::Upload {
            request_id,
            file_name,
            path,
        } => {
            let sink: Arc<dyn ProgressSink> = Arc::new(ChannelProgressSink::new(event_tx.clone()));
            let upload = async {
                let bytes = tokio::fs::read(&path).await.map_err(|err| {
                    ClientError::new(FailureKind::Io, format!("{}: {err}", path.display()))
                })?;
                api.upload_document(request_id, &file_name, bytes, sink).await
            };
            EngineEvent::UploadCompleted {
                request_id,
                result: cancellable(&token, upload).await,
            }
        }
        EngineCommand::DownloadForm { request_id, url } => {
            let result = match cancellable(&token, api.download_form(&url)).await {
                Ok(form) => save_form(download_dir, form).await,
                Err(err) => Err(err),
            };
            EngineEvent::DownloadCompleted { request_id, result }
        }
        EngineCommand::CheckHealth => EngineEvent::HealthChecked {
            result: api.health().await,
        },
        EngineCommand::Cancel { .. } => return,
    };
    let _ = event_tx.send(event);
}

/// File writes and fsync block, so they run off the async workers.
async fn save_form(download_dir: PathBuf, form: DownloadedForm) -> Result<PathBuf, ClientError> {
    let saved = tokio::task::spawn_blocking(move || FormStore::new(download_dir).save(&form))
        .await
        .map_err(|err| ClientError::new(FailureKind::Io, err.to_string()))?;
    saved.map_err(|err| ClientError::new(FailureKind::Io, err.to_string()))
}
