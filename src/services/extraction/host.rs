//! Processing host: a tokio task that owns the pipeline and its engine.
//!
//! Callers talk to it only through a request queue; each request carries a
//! oneshot for the reply. Requests are handled one at a time in arrival
//! order. Progress travels separately on the sender inside the options.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::error::ExtractionError;
use super::pipeline::ExtractionPipeline;
use crate::config::ExtractorConfig;
use crate::models::{DocumentKind, DocumentTypeInfo, ExtractionOptions, ExtractionResult};
use crate::ocr::RecognitionEngine;

/// Depth of the request queue.
const QUEUE_DEPTH: usize = 32;

type Reply<T> = oneshot::Sender<Result<T, ExtractionError>>;

enum Request {
    Extract {
        bytes: Arc<[u8]>,
        options: ExtractionOptions,
        expected: Option<DocumentKind>,
        reply: Reply<ExtractionResult>,
    },
    Detect {
        bytes: Arc<[u8]>,
        reply: Reply<DocumentTypeInfo>,
    },
    Shutdown {
        reply: oneshot::Sender<()>,
    },
}

/// Cloneable handle for submitting work to a running host.
#[derive(Clone)]
pub struct HostHandle {
    tx: mpsc::Sender<Request>,
}

impl HostHandle {
    async fn call<T>(
        &self,
        build: impl FnOnce(Reply<T>) -> Request,
    ) -> Result<T, ExtractionError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(build(reply))
            .await
            .map_err(|_| ExtractionError::HostUnavailable("host has shut down".to_string()))?;
        rx.await.map_err(|_| {
            ExtractionError::HostUnavailable("host dropped the request".to_string())
        })?
    }

    pub async fn extract(
        &self,
        bytes: Arc<[u8]>,
        options: ExtractionOptions,
        expected: Option<DocumentKind>,
    ) -> Result<ExtractionResult, ExtractionError> {
        self.call(|reply| Request::Extract {
            bytes,
            options,
            expected,
            reply,
        })
        .await
    }

    pub async fn detect(&self, bytes: Arc<[u8]>) -> Result<DocumentTypeInfo, ExtractionError> {
        self.call(|reply| Request::Detect { bytes, reply }).await
    }

    pub fn is_running(&self) -> bool {
        !self.tx.is_closed()
    }
}

/// A running processing host.
pub struct ProcessingHost {
    handle: HostHandle,
    task: JoinHandle<()>,
}

impl ProcessingHost {
    /// Spawn the host task. Must be called within a tokio runtime.
    pub fn spawn(config: Arc<ExtractorConfig>, engine: RecognitionEngine) -> Self {
        let (tx, rx) = mpsc::channel(QUEUE_DEPTH);
        let pipeline = ExtractionPipeline::new(config, engine);
        let task = tokio::spawn(serve(pipeline, rx));
        info!("Processing host started");

        Self {
            handle: HostHandle { tx },
            task,
        }
    }

    pub fn handle(&self) -> HostHandle {
        self.handle.clone()
    }

    /// Stop the host once earlier requests are answered and release the engine.
    /// Requests queued behind the shutdown fail with `HostUnavailable`.
    pub async fn terminate(self) {
        let (reply, done) = oneshot::channel();
        if self.handle.tx.send(Request::Shutdown { reply }).await.is_ok() {
            let _ = done.await;
        }
        if let Err(e) = self.task.await {
            debug!("Processing host task ended abnormally: {}", e);
        }
        info!("Processing host stopped");
    }
}

async fn serve(mut pipeline: ExtractionPipeline, mut rx: mpsc::Receiver<Request>) {
    while let Some(request) = rx.recv().await {
        match request {
            Request::Extract {
                bytes,
                options,
                expected,
                reply,
            } => {
                let result = pipeline.run(bytes, options, expected).await;
                if reply.send(result).is_err() {
                    debug!("Extraction caller went away before the result was ready");
                }
            }
            Request::Detect { bytes, reply } => {
                let _ = reply.send(pipeline.detect(bytes).await);
            }
            Request::Shutdown { reply } => {
                rx.close();
                pipeline.engine_mut().terminate();
                let _ = reply.send(());
                return;
            }
        }
    }
    pipeline.engine_mut().terminate();
}
