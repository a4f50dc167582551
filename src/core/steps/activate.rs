use super::{RewriteStep, StepOutcome};
use crate::core::document::{attrs, tags, Element};
use crate::core::environment::Environment;
use crate::core::error::AppError;

const SYSTEM_ORDER_METHOD: &str = "SYSTEM";

/// Forces `FOLDER_ORDER_METHOD="SYSTEM"` on every top-level folder.
pub struct FolderActivation;

impl RewriteStep for FolderActivation {
    fn name(&self) -> &'static str {
        "activate"
    }

    fn requires_target(&self) -> bool {
        false
    }

    fn apply(&self, root: &mut Element, _target: Environment) -> Result<StepOutcome, AppError> {
        tracing::info!("ensuring all folders are active (FOLDER_ORDER_METHOD='SYSTEM')");
        let changes = activate_folders(root);
        tracing::info!("folders set to SYSTEM: {}", changes);
        Ok(StepOutcome::Applied { changes })
    }
}

/// Sets the ordering method of each direct-child folder to `SYSTEM`.
/// Folders already at `SYSTEM` are left untouched. Returns how many changed.
pub fn activate_folders(root: &mut Element) -> usize {
    let mut activated = 0;
    for folder in root.child_elements_mut(tags::FOLDER) {
        if folder.attr(attrs::FOLDER_ORDER_METHOD) == Some(SYSTEM_ORDER_METHOD) {
            continue;
        }
        tracing::debug!(
            "activating folder {} (was {:?})",
            folder.attr(attrs::FOLDER_NAME).unwrap_or("UNKNOWN_FOLDER"),
            folder.attr(attrs::FOLDER_ORDER_METHOD)
        );
        folder.set_attr(attrs::FOLDER_ORDER_METHOD, SYSTEM_ORDER_METHOD);
        activated += 1;
    }
    activated
}
