pub mod autosave;
pub mod draft_store;
pub mod field_coercion;
pub mod preview;
pub mod validation;

pub use autosave::{AutosaveGateway, AutosaveSettings, RecoveryPrompt, SaveReport, SaveTrigger};
pub use draft_store::DraftStore;
pub use field_coercion::{DraftField, ScoringRule};
pub use validation::{validate, ValidationMode};
