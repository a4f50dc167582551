#![allow(clippy::result_large_err)]

use crate::core::document::Element;
use crate::core::environment::Environment;
use crate::core::error::AppError;
use crate::core::steps::{StepOutcome, StepRegistry};
use crate::core::types::{ErrorCategory, StepStatus};
use serde::Serialize;
use std::fmt::Write as _;

/// Runs an ordered list of named steps over a private copy of a document.
pub struct PipelineRunner {
    registry: StepRegistry,
}

impl PipelineRunner {
    pub fn new(registry: StepRegistry) -> Self {
        Self { registry }
    }

    /// Apply `steps` in order to a deep copy of `input`. The caller's tree is never touched.
    pub fn run<S: AsRef<str>>(
        &self,
        input: &Element,
        steps: &[S],
        target: Environment,
    ) -> PipelineRun {
        tracing::info!(
            "running {} steps for target '{}': {}",
            steps.len(),
            target,
            steps.iter().map(AsRef::as_ref).collect::<Vec<_>>().join(", ")
        );
        let mut working = input.clone();
        let mut records: Vec<StepRecord> = Vec::with_capacity(steps.len());
        let mut aborted = false;

        for name in steps.iter().map(AsRef::as_ref) {
            if aborted {
                records.push(StepRecord::not_attempted(name));
                continue;
            }
            let Some(step) = self.registry.get(name) else {
                tracing::error!("unknown step '{}'", name);
                records.push(StepRecord::failed(
                    name,
                    format!(
                        "[STEP-UNKNOWN-001] unknown step; expected one of: {}",
                        self.registry.names().join(", ")
                    ),
                ));
                continue;
            };

            tracing::info!("--- running step: {} ---", name);
            match step.apply(&mut working, target) {
                Ok(StepOutcome::Applied { changes }) => {
                    tracing::info!("step '{}' applied ({} changes)", name, changes);
                    records.push(StepRecord {
                        step: name.to_string(),
                        status: StepStatus::Applied,
                        changes,
                        detail: None,
                    });
                }
                Ok(StepOutcome::Skipped { reason }) => {
                    tracing::info!("step '{}' skipped: {}", name, reason);
                    records.push(StepRecord {
                        step: name.to_string(),
                        status: StepStatus::Skipped,
                        changes: 0,
                        detail: Some(reason),
                    });
                }
                Err(err) => {
                    tracing::error!("step '{}' failed: {}", name, err);
                    records.push(StepRecord::failed(name, err.to_string()));
                    aborted = true;
                }
            }
        }

        let report = PipelineReport { target, records };
        let document = report.succeeded().then_some(working);
        if document.is_none() {
            tracing::error!(
                "pipeline did not complete; applied: [{}] failed: [{}]",
                report.step_names(|status| status.is_success()).join(", "),
                report
                    .step_names(|status| *status == StepStatus::Failed)
                    .join(", ")
            );
        }
        PipelineRun { report, document }
    }
}

/// Result of one pipeline run: the report plus the working copy when it is writable.
#[derive(Debug, Clone)]
pub struct PipelineRun {
    pub report: PipelineReport,
    document: Option<Element>,
}

impl PipelineRun {
    /// The mutated tree, only when every requested step succeeded.
    pub fn document(&self) -> Option<&Element> {
        self.document.as_ref()
    }

    pub fn into_document(self) -> Result<Element, AppError> {
        if let Some(document) = self.document {
            return Ok(document);
        }
        let failed = self
            .report
            .step_names(|status| *status == StepStatus::Failed);
        let error = if failed.is_empty() {
            AppError::new(
                ErrorCategory::PipelineError,
                "no steps were applied; output suppressed",
            )
            .with_code("PIPELINE-002")
        } else {
            AppError::new(
                ErrorCategory::PipelineError,
                format!("steps failed: {}; output suppressed", failed.join(", ")),
            )
            .with_code("PIPELINE-001")
        };
        Err(error.with_context("target", self.report.target.as_str()))
    }
}

/// Per-step outcome, in requested order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepRecord {
    pub step: String,
    pub status: StepStatus,
    pub changes: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl StepRecord {
    fn failed(step: &str, detail: String) -> Self {
        StepRecord {
            step: step.to_string(),
            status: StepStatus::Failed,
            changes: 0,
            detail: Some(detail),
        }
    }

    fn not_attempted(step: &str) -> Self {
        StepRecord {
            step: step.to_string(),
            status: StepStatus::NotAttempted,
            changes: 0,
            detail: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipelineReport {
    pub target: Environment,
    pub records: Vec<StepRecord>,
}

impl PipelineReport {
    /// At least one step ran and none failed or was cut short.
    pub fn succeeded(&self) -> bool {
        !self.records.is_empty() && self.records.iter().all(|r| r.status.is_success())
    }

    pub fn step_names<F>(&self, mut predicate: F) -> Vec<&str>
    where
        F: FnMut(&StepStatus) -> bool,
    {
        self.records
            .iter()
            .filter(|record| predicate(&record.status))
            .map(|record| record.step.as_str())
            .collect()
    }

    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Target environment: {}", self.target);
        for record in &self.records {
            let _ = write!(out, "  {:<14} {:<12}", record.step, record.status);
            if record.status == StepStatus::Applied {
                let _ = write!(out, " changes={}", record.changes);
            }
            if let Some(detail) = &record.detail {
                let _ = write!(out, " {}", detail);
            }
            out.push('\n');
        }
        let applied = self.step_names(|status| status.is_success());
        let failed = self.step_names(|status| *status == StepStatus::Failed);
        let _ = writeln!(
            out,
            "Applied: {}",
            if applied.is_empty() { "none".to_string() } else { applied.join(", ") }
        );
        if !failed.is_empty() {
            let _ = writeln!(out, "Failed: {}", failed.join(", "));
        }
        let _ = writeln!(
            out,
            "Result: {}",
            if self.succeeded() { "success" } else { "output suppressed" }
        );
        out
    }
}
