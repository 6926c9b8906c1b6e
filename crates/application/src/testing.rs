use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use pimg_core::{AppError, AppResult};

use crate::ports::{ApiRequest, ApiResponse, PimTransport};

/// Transport double that replays queued responses and records every request.
#[derive(Default)]
pub(crate) struct RecordingTransport {
    responses: Mutex<VecDeque<AppResult<ApiResponse>>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl RecordingTransport {
    pub(crate) fn push_json(&self, status: u16, body: serde_json::Value) {
        self.push_raw(status, body.to_string().as_str());
    }

    pub(crate) fn push_raw(&self, status: u16, body: &str) {
        let reason = match status {
            200 => "OK",
            201 => "Created",
            _ => "",
        };
        self.push(Ok(ApiResponse {
            status,
            status_line: format!("{status} {reason}").trim_end().to_owned(),
            body: body.to_owned(),
        }));
    }

    pub(crate) fn push_error(&self, error: AppError) {
        self.push(Err(error));
    }

    pub(crate) fn requests(&self) -> Vec<ApiRequest> {
        self.requests
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    pub(crate) fn call_count(&self) -> usize {
        self.requests.lock().map(|guard| guard.len()).unwrap_or(0)
    }

    fn push(&self, response: AppResult<ApiResponse>) {
        if let Ok(mut guard) = self.responses.lock() {
            guard.push_back(response);
        }
    }
}

#[async_trait]
impl PimTransport for RecordingTransport {
    async fn execute(
        &self,
        request: ApiRequest,
        cancel: &CancellationToken,
    ) -> AppResult<ApiResponse> {
        self.requests
            .lock()
            .map_err(|error| AppError::Internal(format!("failed to lock transport state: {error}")))?
            .push(request);

        if cancel.is_cancelled() {
            return Err(AppError::Cancelled);
        }

        self.responses
            .lock()
            .map_err(|error| AppError::Internal(format!("failed to lock transport state: {error}")))?
            .pop_front()
            .unwrap_or_else(|| Err(AppError::Internal("no response queued".to_owned())))
    }
}
