use std::sync::Arc;

use catalog_core::{Effect, Msg};
use catalog_engine::{CatalogClient, EngineEvent, EngineHandle};
use catalog_logging::{catalog_info, catalog_warn};

/// Executes controller effects on the engine and turns engine events back
/// into controller messages.
pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub fn new(client: Arc<dyn CatalogClient>) -> std::io::Result<Self> {
        Ok(Self {
            engine: EngineHandle::new(client)?,
        })
    }

    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::StartScan { scan_id, request } => {
                    catalog_info!(
                        "StartScan scan_id={} mode={:?} filter={:?} target={} cap={}",
                        scan_id,
                        request.mode,
                        request.filter,
                        request.target,
                        request.scan_cap
                    );
                    self.engine.start_scan(scan_id, request);
                }
                Effect::CancelScan { scan_id } => self.engine.cancel(scan_id),
                Effect::BuildIndex { build_id, request } => {
                    catalog_info!(
                        "BuildIndex build_id={} cap={} page_size={}",
                        build_id,
                        request.scan_cap,
                        request.page_size
                    );
                    self.engine.start_index_build(build_id, request);
                }
                Effect::CancelIndexBuild { build_id } => self.engine.cancel(build_id),
            }
        }
    }

    /// Messages for every engine event received since the last call.
    pub fn drain_messages(&self) -> Vec<Msg> {
        let mut inbox = Vec::new();
        while let Some(event) = self.engine.try_recv() {
            inbox.push(map_event(event));
        }
        inbox
    }

    pub fn shutdown(&self) {
        self.engine.cancel_all();
    }
}

fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::ScanFinished { scan_id, result } => Msg::ScanCompleted {
            scan_id,
            result: result.map_err(|err| {
                catalog_warn!("Scan {} failed: {}", scan_id, err);
                err.to_string()
            }),
        },
        EngineEvent::IndexFinished { build_id, result } => Msg::IndexBuilt {
            build_id,
            result: match result {
                Ok(outcome) => {
                    if !outcome.complete {
                        catalog_info!(
                            "Index build {} stopped after {} page(s); class list may be incomplete",
                            build_id,
                            outcome.pages_scanned
                        );
                    }
                    Ok(outcome.values)
                }
                Err(err) => Err(err.to_string()),
            },
        },
    }
}
