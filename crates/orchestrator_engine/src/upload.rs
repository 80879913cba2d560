use std::sync::Arc;

use bytes::Bytes;
use futures_util::stream::{self, StreamExt};

use crate::{EngineEvent, ProgressSink, RequestId};

const CHUNK_SIZE: usize = 16 * 1024;

/// Percentage of `total` covered by `loaded`, rounded. `None` when the total
/// is unknown (zero).
pub fn progress_percent(loaded: u64, total: u64) -> Option<u8> {
    if total == 0 {
        return None;
    }
    let percent = (loaded as f64 / total as f64 * 100.0).round();
    Some(percent.clamp(0.0, 100.0) as u8)
}

/// Request body that reports upload progress as the HTTP layer pulls chunks.
pub(crate) fn progress_body(
    request_id: RequestId,
    bytes: Vec<u8>,
    sink: Arc<dyn ProgressSink>,
) -> reqwest::Body {
    let total = bytes.len() as u64;
    let data = Bytes::from(bytes);
    let chunks: Vec<Bytes> = (0..data.len())
        .step_by(CHUNK_SIZE)
        .map(|start| data.slice(start..(start + CHUNK_SIZE).min(data.len())))
        .collect();

    let mut sent = 0u64;
    let mut last_percent = None;
    let body = stream::iter(chunks).map(move |chunk| {
        sent += chunk.len() as u64;
        let percent = progress_percent(sent, total);
        if percent != last_percent {
            last_percent = percent;
            if let Some(percent) = percent {
                sink.emit(EngineEvent::UploadProgress {
                    request_id,
                    percent,
                });
            }
        }
        Ok::<Bytes, std::io::Error>(chunk)
    });
    reqwest::Body::wrap_stream(body)
}
