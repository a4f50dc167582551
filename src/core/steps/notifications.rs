use super::{RewriteStep, StepOutcome};
use crate::core::document::{attrs, tags, Element};
use crate::core::environment::Environment;
use crate::core::error::AppError;
use crate::core::templates::NotificationTemplates;
use std::sync::Arc;

/// Replaces every job's `ON` blocks with the target environment's canonical set.
pub struct NotificationStandardizer {
    templates: Arc<NotificationTemplates>,
}

impl NotificationStandardizer {
    pub fn new(templates: Arc<NotificationTemplates>) -> Self {
        Self { templates }
    }
}

impl RewriteStep for NotificationStandardizer {
    fn name(&self) -> &'static str {
        "notifications"
    }

    fn apply(&self, root: &mut Element, target: Environment) -> Result<StepOutcome, AppError> {
        tracing::info!("standardizing notifications for target: {}", target);
        if target == Environment::Dev {
            tracing::info!("skipping notification standardization for 'dev' environment");
            return Ok(StepOutcome::Skipped {
                reason: "dev jobs keep their existing reaction blocks".to_string(),
            });
        }
        let Some(blocks) = self.templates.blocks(target) else {
            tracing::error!(
                "notification templates not available for target env '{}'; skipping step",
                target
            );
            return Ok(StepOutcome::Skipped {
                reason: format!("no notification template for '{}'", target),
            });
        };

        let jobs = replace_reaction_blocks(root, blocks);
        tracing::info!("notification standardization complete; processed {} jobs", jobs);
        Ok(StepOutcome::Applied { changes: jobs })
    }
}

/// Strip all `ON` children from every job and append deep copies of `blocks`.
fn replace_reaction_blocks(root: &mut Element, blocks: &[Element]) -> usize {
    let mut jobs = 0;
    root.visit_mut(&mut |element| {
        if !element.is(tags::JOB) {
            return;
        }
        let removed = element.retain_children(|child| !child.is(tags::ON));
        for block in blocks {
            element.push_child(block.clone());
        }
        tracing::debug!(
            "replaced {} reaction blocks on job {:?}",
            removed,
            element.attr(attrs::JOBNAME)
        );
        jobs += 1;
    });
    jobs
}

/// Standalone form using the built-in templates. Returns jobs processed.
pub fn standardize_notifications(root: &mut Element, target: Environment) -> Result<usize, AppError> {
    let profiles = super::builtin_profiles()?;
    let templates = Arc::new(NotificationTemplates::build(&profiles));
    NotificationStandardizer::new(templates)
        .apply(root, target)
        .map(|outcome| outcome.changes())
}
