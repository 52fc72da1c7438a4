//! Request/response boundary of the engine.
//!
//! Messages are `{"type": ..., "payload": ...}` objects. Every request gets
//! exactly one response; failures come back as `error` responses carrying the
//! user-facing message.

use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use xoso_db::models::{validate_prediction, CheckResult, Xien3};

use crate::analysis::{analyze, AnalyzeResponse};
use crate::check::check_raw;
use crate::config::EngineConfig;

const UNEXPECTED_ERROR: &str = "Đã xảy ra lỗi không mong muốn khi xử lý yêu cầu.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    pub raw_data: String,
    pub draw_date: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckRequest {
    pub actual_raw_data: String,
    pub predicted_core_numbers: Vec<u8>,
    pub predicted_xien3_sets: Vec<Xien3>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum Request {
    #[serde(rename = "analyzeData")]
    AnalyzeData(AnalyzeRequest),
    #[serde(rename = "checkResults")]
    CheckResults(CheckRequest),
}

impl Request {
    pub fn kind(&self) -> &'static str {
        match self {
            Request::AnalyzeData(_) => "analyzeData",
            Request::CheckResults(_) => "checkResults",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum Response {
    #[serde(rename = "analysisComplete")]
    AnalysisComplete(AnalyzeResponse),
    #[serde(rename = "checkResultsComplete")]
    CheckResultsComplete(CheckResult),
    #[serde(rename = "error")]
    Error(String),
}

fn process(config: &EngineConfig, request: Request) -> Result<Response> {
    match request {
        Request::AnalyzeData(req) => {
            let response = analyze(config, &req.raw_data, &req.draw_date)?;
            Ok(Response::AnalysisComplete(response))
        }
        Request::CheckResults(req) => {
            validate_prediction(&req.predicted_core_numbers, &req.predicted_xien3_sets)?;
            let result = check_raw(
                config,
                &req.actual_raw_data,
                &req.predicted_core_numbers,
                &req.predicted_xien3_sets,
            )?;
            Ok(Response::CheckResultsComplete(result))
        }
    }
}

/// Runs one request to completion. Errors and panics both become
/// [`Response::Error`].
///
/// Check requests are validated first: predicted numbers must be 0-99 with
/// no duplicates in the core list or inside a set. This check lives here,
/// not in [`check_raw`], which accepts any prediction.
pub fn handle_request(config: &EngineConfig, request: Request) -> Response {
    let kind = request.kind();
    log::debug!("handling {kind}");
    match panic::catch_unwind(AssertUnwindSafe(|| process(config, request))) {
        Ok(Ok(response)) => response,
        Ok(Err(e)) => {
            log::warn!("{kind} failed: {e}");
            Response::Error(e.to_string())
        }
        Err(_) => {
            log::warn!("{kind} panicked");
            Response::Error(UNEXPECTED_ERROR.to_string())
        }
    }
}

/// Decodes one JSON message. A message that cannot be decoded is answered
/// with the returned error response.
pub fn decode_message(message: &str) -> Result<Request, Response> {
    let value: serde_json::Value = serde_json::from_str(message)
        .map_err(|e| Response::Error(format!("Thông điệp JSON không hợp lệ: {e}")))?;

    let kind = value.get("type").and_then(|t| t.as_str()).unwrap_or_default();
    if kind != "analyzeData" && kind != "checkResults" {
        log::warn!("unknown message type received by worker: {kind:?}");
        return Err(Response::Error(format!("Loại thông điệp không xác định: {kind}")));
    }

    serde_json::from_value::<Request>(value)
        .map_err(|e| Response::Error(format!("Yêu cầu không hợp lệ: {e}")))
}

pub fn handle_message(config: &EngineConfig, message: &str) -> Response {
    match decode_message(message) {
        Ok(request) => handle_request(config, request),
        Err(response) => response,
    }
}

type Job = (Request, Sender<Response>);

/// Background thread processing requests one at a time, in arrival order.
pub struct Worker {
    sender: Option<Sender<Job>>,
    thread: Option<JoinHandle<()>>,
}

impl Worker {
    pub fn spawn(config: EngineConfig) -> Result<Self> {
        let (sender, receiver) = mpsc::channel::<Job>();
        let thread = thread::Builder::new()
            .name("xoso-worker".to_string())
            .spawn(move || {
                for (request, reply) in receiver {
                    let response = handle_request(&config, request);
                    if reply.send(response).is_err() {
                        log::debug!("requester went away before the response");
                    }
                }
            })
            .context("Không thể khởi động worker")?;

        Ok(Self {
            sender: Some(sender),
            thread: Some(thread),
        })
    }

    /// Queues a request; the receiver yields exactly one response.
    pub fn submit(&self, request: Request) -> Result<Receiver<Response>> {
        let (reply, response) = mpsc::channel();
        self.sender
            .as_ref()
            .ok_or_else(|| anyhow!("Worker đã dừng"))?
            .send((request, reply))
            .map_err(|_| anyhow!("Worker đã dừng"))?;
        Ok(response)
    }

    pub fn request(&self, request: Request) -> Result<Response> {
        let response = self.submit(request)?.recv().context("Worker không phản hồi")?;
        Ok(response)
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        self.sender.take();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}
