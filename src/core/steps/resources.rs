use super::{RewriteStep, StepOutcome};
use crate::core::document::{attrs, tags, Element};
use crate::core::environment::{Environment, ProfileTable, ResourceAliases};
use crate::core::error::AppError;
use std::collections::HashSet;
use std::sync::Arc;

/// Resource every standardized job must hold.
pub const BASELINE_RESOURCE: &str = "CONTROLM-RESOURCE";

/// Resource declarations go before the first of these children.
const RESOURCE_SECTION_END: [&str; 4] = [tags::OUTCOND, tags::ON, tags::SHOUT, tags::VARIABLE];

/// Counters reported by one resource standardization pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResourceStats {
    pub jobs: usize,
    pub added: usize,
    pub renamed: usize,
    /// Stale family resources dropped because the job already held the target alias.
    pub removed: usize,
}

impl ResourceStats {
    pub fn changes(&self) -> usize {
        self.added + self.renamed + self.removed
    }
}

/// Aligns each job's `QUANTITATIVE` resources with the target environment.
pub struct ResourceStandardizer {
    profiles: Arc<ProfileTable>,
}

impl ResourceStandardizer {
    pub fn new(profiles: Arc<ProfileTable>) -> Self {
        Self { profiles }
    }
}

impl RewriteStep for ResourceStandardizer {
    fn name(&self) -> &'static str {
        "resources"
    }

    fn apply(&self, root: &mut Element, target: Environment) -> Result<StepOutcome, AppError> {
        tracing::info!("standardizing QUANTITATIVE resources for target: {}", target);
        if target == Environment::Dev {
            tracing::info!("skipping resource standardization for 'dev' environment");
            return Ok(StepOutcome::Skipped {
                reason: "dev jobs keep their existing resources".to_string(),
            });
        }
        let Some(profile) = self.profiles.get(target) else {
            tracing::error!(
                "environment config not found for '{}'; skipping step",
                target
            );
            return Ok(StepOutcome::Skipped {
                reason: format!("no environment profile for '{}'", target),
            });
        };

        let stats = standardize_all_jobs(root, &profile.resources);
        tracing::info!(
            "resource standardization complete; processed {} jobs (added: {}, renamed: {}, removed: {})",
            stats.jobs,
            stats.added,
            stats.renamed,
            stats.removed
        );
        Ok(StepOutcome::Applied {
            changes: stats.changes(),
        })
    }
}

/// Standalone form using the built-in profiles. Dev returns zeroed stats.
pub fn standardize_resources(
    root: &mut Element,
    target: Environment,
) -> Result<ResourceStats, AppError> {
    if target == Environment::Dev {
        return Ok(ResourceStats::default());
    }
    let profiles = super::builtin_profiles()?;
    match profiles.get(target) {
        Some(profile) => Ok(standardize_all_jobs(root, &profile.resources)),
        None => Ok(ResourceStats::default()),
    }
}

fn standardize_all_jobs(root: &mut Element, aliases: &ResourceAliases) -> ResourceStats {
    let mut stats = ResourceStats::default();
    root.visit_mut(&mut |element| {
        if element.is(tags::JOB) {
            standardize_job(element, aliases, &mut stats);
            stats.jobs += 1;
        }
    });
    stats
}

fn standardize_job(job: &mut Element, aliases: &ResourceAliases, stats: &mut ResourceStats) {
    let job_name = job.attr(attrs::JOBNAME).unwrap_or_default().to_string();

    relabel_family_resources(job, aliases, stats);

    let insert_at = job
        .position_of_first(&RESOURCE_SECTION_END)
        .unwrap_or(job.children().len());
    let held = job
        .child_elements(tags::QUANTITATIVE)
        .filter_map(|quant| quant.attr(attrs::NAME))
        .map(str::to_string)
        .collect();
    let mut slot = InsertionSlot {
        index: insert_at,
        held,
    };
    slot.ensure(job, BASELINE_RESOURCE, stats);

    if job_name.contains("-ADB-") {
        for name in [BASELINE_RESOURCE, aliases.dw.as_str(), aliases.adb.as_str()] {
            slot.ensure(job, name, stats);
        }
    } else if job_name.contains("-ADF-") || job_name.contains("-DW-") {
        let target = if job_name.contains("-ADF-") {
            aliases.adf.as_str()
        } else {
            aliases.dw.as_str()
        };
        let mut found_target = false;
        let mut rename_candidate = None;
        for (index, child) in job.children().iter().enumerate() {
            if !child.is(tags::QUANTITATIVE) {
                continue;
            }
            let name = child.attr(attrs::NAME);
            if name == Some(target) {
                found_target = true;
                break;
            }
            if name != Some(BASELINE_RESOURCE) {
                // Later candidates overwrite earlier ones: the last stray resource wins.
                rename_candidate = Some(index);
            }
        }
        if !found_target {
            match rename_candidate {
                Some(index) => {
                    let resource = &mut job.children_mut()[index];
                    tracing::debug!(
                        "job {}: renaming resource {:?} to {}",
                        job_name,
                        resource.attr(attrs::NAME),
                        target
                    );
                    resource.set_attr(attrs::NAME, target);
                    stats.renamed += 1;
                }
                None => slot.ensure(job, target, stats),
            }
        }
    }
}

/// Where new resources go; advances by one per insertion so they keep their order.
struct InsertionSlot {
    index: usize,
    held: HashSet<String>,
}

impl InsertionSlot {
    fn ensure(&mut self, job: &mut Element, name: &str, stats: &mut ResourceStats) {
        if self.held.insert(name.to_string()) {
            job.insert_child(self.index, new_resource(name));
            self.index += 1;
            stats.added += 1;
        }
    }
}

/// Rename resources whose name mentions a family (ADF, DW, ADB) to the target alias.
/// A resource whose alias is already held by a sibling is dropped instead.
fn relabel_family_resources(job: &mut Element, aliases: &ResourceAliases, stats: &mut ResourceStats) {
    let positions: Vec<usize> = job
        .children()
        .iter()
        .enumerate()
        .filter(|(_, child)| child.is(tags::QUANTITATIVE))
        .map(|(index, _)| index)
        .collect();

    let mut redundant = Vec::new();
    for &position in &positions {
        let name = job.children()[position]
            .attr(attrs::NAME)
            .unwrap_or_default()
            .to_string();
        let Some(alias) = family_alias(&name, aliases) else {
            continue;
        };
        let already_held = positions.iter().any(|&other| {
            other != position
                && !redundant.contains(&other)
                && job.children()[other].attr(attrs::NAME) == Some(alias)
        });
        if already_held {
            tracing::debug!("dropping resource {} (job already holds {})", name, alias);
            redundant.push(position);
            stats.removed += 1;
        } else {
            tracing::debug!("renaming resource {} to {}", name, alias);
            job.children_mut()[position].set_attr(attrs::NAME, alias);
            stats.renamed += 1;
        }
    }

    for position in redundant.into_iter().rev() {
        job.children_mut().remove(position);
    }
}

fn family_alias<'a>(name: &str, aliases: &'a ResourceAliases) -> Option<&'a str> {
    if name.contains("ADF") && name != aliases.adf {
        Some(&aliases.adf)
    } else if name.contains("DW") && name != aliases.dw {
        Some(&aliases.dw)
    } else if name.contains("ADB") && name != aliases.adb {
        Some(&aliases.adb)
    } else {
        None
    }
}

fn new_resource(name: &str) -> Element {
    Element::new(tags::QUANTITATIVE)
        .with_attr(attrs::NAME, name)
        .with_attr(attrs::QUANT, "1")
        .with_attr(attrs::ONFAIL, "R")
        .with_attr(attrs::ONOK, "R")
}
