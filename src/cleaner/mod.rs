pub mod engine;
pub mod purger;
pub mod savings;
pub mod trash;

pub use engine::{clean_targets, trash_contents, CleanReport};
pub use purger::empty_trash;
pub use savings::RecoveredBanner;
pub use trash::{HomeTrash, SystemTrash, TrashBin};
