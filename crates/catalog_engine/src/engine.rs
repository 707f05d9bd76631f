use std::collections::HashMap;
use std::sync::{mpsc, Arc, Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

use catalog_core::{IndexRequest, OpId, ScanRequest};
use catalog_logging::{catalog_debug, catalog_info};
use tokio::sync::mpsc as async_mpsc;
use tokio_util::sync::CancellationToken;

use crate::{CatalogClient, EngineEvent, FilterValueIndex, FilteredPageScanner};

enum EngineCommand {
    Scan {
        scan_id: OpId,
        request: ScanRequest,
        token: CancellationToken,
    },
    BuildIndex {
        build_id: OpId,
        request: IndexRequest,
        token: CancellationToken,
    },
}

type TokenMap = Arc<Mutex<HashMap<OpId, CancellationToken>>>;

/// Runs scans and index builds on a single-threaded event loop in a
/// background thread.
///
/// Each operation owns a cancellation token. Cancelling never aborts a
/// request already on the wire; it stops further page fetches and suppresses
/// the completion event.
pub struct EngineHandle {
    cmd_tx: async_mpsc::UnboundedSender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
    tokens: TokenMap,
}

impl EngineHandle {
    pub fn new(client: Arc<dyn CatalogClient>) -> std::io::Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        let (cmd_tx, mut cmd_rx) = async_mpsc::unbounded_channel::<EngineCommand>();
        let (event_tx, event_rx) = mpsc::channel();
        let tokens: TokenMap = Arc::new(Mutex::new(HashMap::new()));
        let task_tokens = tokens.clone();

        thread::spawn(move || {
            runtime.block_on(async move {
                while let Some(command) = cmd_rx.recv().await {
                    let client = client.clone();
                    let event_tx = event_tx.clone();
                    let tokens = task_tokens.clone();
                    tokio::spawn(async move {
                        handle_command(client.as_ref(), command, event_tx, tokens).await;
                    });
                }
            });
        });

        Ok(Self {
            cmd_tx,
            event_rx,
            tokens,
        })
    }

    pub fn start_scan(&self, scan_id: OpId, request: ScanRequest) {
        let token = self.register(scan_id);
        let _ = self.cmd_tx.send(EngineCommand::Scan {
            scan_id,
            request,
            token,
        });
    }

    pub fn start_index_build(&self, build_id: OpId, request: IndexRequest) {
        let token = self.register(build_id);
        let _ = self.cmd_tx.send(EngineCommand::BuildIndex {
            build_id,
            request,
            token,
        });
    }

    /// Marks an operation superseded. Unknown or finished ids are ignored.
    pub fn cancel(&self, op_id: OpId) {
        if let Some(token) = lock_tokens(&self.tokens).remove(&op_id) {
            catalog_debug!("cancelling operation {}", op_id);
            token.cancel();
        }
    }

    pub fn cancel_all(&self) {
        let mut guard = lock_tokens(&self.tokens);
        for (op_id, token) in guard.drain() {
            catalog_debug!("cancelling operation {}", op_id);
            token.cancel();
        }
    }

    pub fn in_flight(&self) -> usize {
        lock_tokens(&self.tokens).len()
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }

    fn register(&self, op_id: OpId) -> CancellationToken {
        let token = CancellationToken::new();
        lock_tokens(&self.tokens).insert(op_id, token.clone());
        token
    }
}

impl Drop for EngineHandle {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

fn lock_tokens(tokens: &TokenMap) -> MutexGuard<'_, HashMap<OpId, CancellationToken>> {
    match tokens.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

async fn handle_command(
    client: &dyn CatalogClient,
    command: EngineCommand,
    event_tx: mpsc::Sender<EngineEvent>,
    tokens: TokenMap,
) {
    match command {
        EngineCommand::Scan {
            scan_id,
            request,
            token,
        } => {
            let result = FilteredPageScanner::new(client).scan(&request, &token).await;
            if finish(scan_id, &token, &tokens) {
                let _ = event_tx.send(EngineEvent::ScanFinished { scan_id, result });
            }
        }
        EngineCommand::BuildIndex {
            build_id,
            request,
            token,
        } => {
            let result = FilterValueIndex::new(client).build(&request, &token).await;
            if finish(build_id, &token, &tokens) {
                let _ = event_tx.send(EngineEvent::IndexFinished { build_id, result });
            }
        }
    }
}

/// Releases the operation's token; returns whether its result may be
/// reported.
fn finish(op_id: OpId, token: &CancellationToken, tokens: &TokenMap) -> bool {
    let mut guard = lock_tokens(tokens);
    if token.is_cancelled() {
        catalog_info!("operation {} was superseded, dropping its result", op_id);
        return false;
    }
    guard.remove(&op_id);
    true
}
