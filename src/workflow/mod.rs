pub mod editor;
pub mod notifier;
pub mod selection;

pub use editor::{DraftEditor, PublishReceipt, RecoveryOutcome};
pub use notifier::RenderNotifier;
pub use selection::{Selection, SelectionState};
