use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use anyhow::Context;
use orchestrator_core::{AgentResponse, Effect, Msg, RequestFailure};
use orchestrator_engine::{ClientError, EngineConfig, EngineEvent, EngineHandle, FailureKind, WorkflowReply};
use orchestrator_logging::{orch_debug, orch_info, orch_warn, preview};

pub struct EffectRunner {
    engine: EngineHandle,
    msg_tx: mpsc::Sender<Msg>,
}

impl EffectRunner {
    pub fn new(config: EngineConfig, msg_tx: mpsc::Sender<Msg>) -> anyhow::Result<Self> {
        let engine = EngineHandle::new(config).context("could not build the HTTP client")?;
        let runner = Self { engine, msg_tx };
        runner.spawn_event_loop();
        Ok(runner)
    }

    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::SubmitTask {
                    request_id,
                    domain,
                    task,
                } => {
                    orch_info!(
                        "SubmitTask request_id={} domain={} task={}",
                        request_id,
                        domain,
                        preview(&task, 60)
                    );
                    self.engine.submit_task(request_id, domain, task);
                }
                Effect::CancelRequest { request_id } => self.engine.cancel(request_id),
                Effect::SubmitExtractedData { request_id, data } => {
                    orch_info!("SubmitExtractedData request_id={} fields={}", request_id, data.len());
                    self.engine.submit_extracted_data(request_id, data);
                }
                Effect::DownloadForm { request_id, url } => {
                    orch_info!("DownloadForm request_id={} url={}", request_id, url);
                    self.engine.download_form(request_id, url);
                }
                Effect::UploadFile {
                    request_id,
                    file_name,
                    path,
                } => {
                    orch_info!("UploadFile request_id={} file={}", request_id, file_name);
                    self.engine.upload(request_id, file_name, path);
                }
                Effect::CheckHealth => self.engine.check_health(),
                Effect::ScrollToBottom { delay } => {
                    let msg_tx = self.msg_tx.clone();
                    thread::spawn(move || {
                        thread::sleep(delay);
                        let _ = msg_tx.send(Msg::ChatScrolled);
                    });
                }
            }
        }
    }

    fn spawn_event_loop(&self) {
        let engine = self.engine.clone();
        let msg_tx = self.msg_tx.clone();
        thread::spawn(move || loop {
            if let Some(event) = engine.recv_timeout(Duration::from_millis(50)) {
                orch_debug!("Engine event: {:?}", event);
                if msg_tx.send(map_event(event)).is_err() {
                    break;
                }
            }
        });
    }
}

pub fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::TaskCompleted { request_id, result } => match result {
            Ok(reply) => Msg::TaskResponded {
                request_id,
                response: agent_response(reply),
            },
            Err(err) => Msg::TaskFailed {
                request_id,
                failure: request_failure(err),
            },
        },
        EngineEvent::SubmissionCompleted { request_id, result } => match result {
            Ok(reply) => Msg::SubmissionResponded {
                request_id,
                status_code: reply.sap_status_code,
                detail: reply.response_json(),
            },
            Err(err) => Msg::SubmissionFailed {
                request_id,
                reason: err.message,
            },
        },
        EngineEvent::UploadProgress {
            request_id,
            percent,
        } => Msg::UploadProgressed {
            request_id,
            percent,
        },
        EngineEvent::UploadCompleted { request_id, result } => match result {
            Ok(reply) => Msg::UploadResponded {
                request_id,
                response: agent_response(reply),
            },
            Err(err) => Msg::UploadFailed {
                request_id,
                failure: request_failure(err),
            },
        },
        EngineEvent::DownloadCompleted { request_id, result } => match result {
            Ok(path) => Msg::FormDownloaded {
                request_id,
                location: path.display().to_string(),
            },
            Err(err) => Msg::FormDownloadFailed {
                request_id,
                reason: err.message,
            },
        },
        EngineEvent::HealthChecked { result } => {
            Msg::HealthChecked(result.map_err(|err| err.message))
        }
    }
}

fn agent_response(reply: WorkflowReply) -> AgentResponse {
    AgentResponse {
        result: reply.result,
        extracted_data: reply.extracted_data,
        source_document: reply.source_document,
    }
}

fn request_failure(err: ClientError) -> RequestFailure {
    match err.kind {
        FailureKind::HttpStatus(code) => RequestFailure::Status {
            code,
            text: err.message,
        },
        kind => {
            orch_warn!("Request failed ({}): {}", kind, err.message);
            RequestFailure::Transport(err.message)
        }
    }
}
