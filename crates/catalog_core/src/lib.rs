//! Catalog core: pure browsing state machine and view-model helpers.
mod effect;
mod gate;
mod model;
mod msg;
mod selection;
mod settings;
mod state;
mod update;
mod view_model;

pub use effect::Effect;
pub use gate::{quiesce, QuiescenceGate};
pub use model::{
    matches_primary_class, normalize_filter, CatalogItem, Continuation, DifficultyBand,
    IndexRequest, OpId, ScanBatch, ScanMode, ScanRequest, ScanStop,
};
pub use msg::Msg;
pub use selection::SelectionTracker;
pub use settings::BrowserSettings;
pub use state::{BrowserState, FilterIndexState, LoadKind, Phase};
pub use update::update;
pub use view_model::{BrowserViewModel, ItemRowView};
