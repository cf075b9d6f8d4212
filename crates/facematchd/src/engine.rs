use facematch_core::{extract_embedding, ExtractError, Extraction, FaceEmbedder};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};

/// Pending extract requests allowed before callers wait for a slot.
const ENGINE_QUEUE_DEPTH: usize = 16;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error(transparent)]
    Extract(#[from] ExtractError),
    #[error("failed to spawn engine thread: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("engine thread exited")]
    ChannelClosed,
    #[error("engine panicked: {0}")]
    Panicked(String),
}

/// Messages sent from HTTP handlers to the engine thread.
enum EngineRequest {
    Extract {
        image: String,
        reply: oneshot::Sender<Result<Extraction, EngineError>>,
    },
}

/// Clone-safe handle to the engine thread.
#[derive(Clone)]
pub struct EngineHandle {
    tx: mpsc::Sender<EngineRequest>,
}

impl EngineHandle {
    /// Decode the base64 image, require a single face and embed it.
    pub async fn extract(&self, image: String) -> Result<Extraction, EngineError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(EngineRequest::Extract { image, reply: reply_tx })
            .await
            .map_err(|_| EngineError::ChannelClosed)?;
        reply_rx.await.map_err(|_| EngineError::ChannelClosed)?
    }
}

/// Spawn the engine on a dedicated OS thread that owns `embedder`.
///
/// Decoding and inference both run there, so the async runtime never blocks
/// on CPU-bound work. A panic while serving one request is reported to that
/// caller and the thread keeps serving. The thread exits once every handle
/// is dropped.
pub fn spawn_engine<E>(mut embedder: E) -> Result<EngineHandle, EngineError>
where
    E: FaceEmbedder + Send + 'static,
{
    let (tx, mut rx) = mpsc::channel::<EngineRequest>(ENGINE_QUEUE_DEPTH);

    std::thread::Builder::new()
        .name("facematch-engine".into())
        .spawn(move || {
            tracing::info!("engine thread started");
            while let Some(req) = rx.blocking_recv() {
                match req {
                    EngineRequest::Extract { image, reply } => {
                        let result = panic::catch_unwind(AssertUnwindSafe(|| {
                            extract_embedding(&mut embedder, &image)
                        }));
                        let result = match result {
                            Ok(Ok(extraction)) => Ok(extraction),
                            Ok(Err(err)) => {
                                tracing::debug!(error = %err, "extract rejected");
                                Err(EngineError::Extract(err))
                            }
                            Err(payload) => {
                                let message = panic_message(payload.as_ref());
                                tracing::error!(panic = %message, "extract panicked");
                                Err(EngineError::Panicked(message))
                            }
                        };
                        let _ = reply.send(result);
                    }
                }
            }
            tracing::info!("engine thread exiting");
        })?;

    Ok(EngineHandle { tx })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
