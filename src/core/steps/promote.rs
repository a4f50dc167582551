#![allow(clippy::result_large_err)]

use super::{RewriteStep, StepOutcome};
use crate::core::document::{attrs, tags, Element};
use crate::core::environment::{Environment, ProfileTable};
use crate::core::error::AppError;
use crate::core::types::ErrorCategory;
use regex::{NoExpand, Regex, RegexBuilder};
use std::borrow::Cow;
use std::sync::Arc;

/// Attributes carrying the environment name tag.
const NAME_ATTRIBUTES: [&str; 5] = [
    attrs::FOLDER_NAME,
    attrs::APPLICATION,
    attrs::SUB_APPLICATION,
    attrs::PARENT_FOLDER,
    attrs::JOBNAME,
];

const USER_VARIABLE: &str = "%%user";

/// Rewrites environment-specific identifiers for a single-step promotion.
pub struct EnvironmentPromoter {
    profiles: Arc<ProfileTable>,
}

impl EnvironmentPromoter {
    pub fn new(profiles: Arc<ProfileTable>) -> Self {
        Self { profiles }
    }
}

impl RewriteStep for EnvironmentPromoter {
    fn name(&self) -> &'static str {
        "promote"
    }

    fn apply(&self, root: &mut Element, target: Environment) -> Result<StepOutcome, AppError> {
        tracing::info!("applying environment promotion for target: {}", target);
        let rules = PromotionRules::between(&self.profiles, target)?;
        tracing::info!(
            "promoting from '{}' to '{}' configuration",
            rules.source,
            rules.target
        );
        let mut changes = 0;
        root.visit_mut(&mut |element| changes += rules.apply_to(element));
        tracing::info!("environment promotion applied; {} attributes changed", changes);
        Ok(StepOutcome::Applied { changes })
    }
}

/// Standalone form using the built-in profiles. Returns attributes changed.
pub fn apply_environment_promotion(
    root: &mut Element,
    target: Environment,
) -> Result<usize, AppError> {
    let profiles = super::builtin_profiles()?;
    EnvironmentPromoter::new(profiles)
        .apply(root, target)
        .map(|outcome| outcome.changes())
}

/// The six per-node rewrite rules derived from a source and target profile.
#[derive(Debug, Clone)]
pub struct PromotionRules {
    pub source: Environment,
    pub target: Environment,
    tag_pattern: Option<Regex>,
    tag_replacement: String,
    datacenter_pattern: Option<Regex>,
    datacenter_replacement: String,
    user_pattern: Option<Regex>,
    user_replacement: String,
    node_pattern: Option<Regex>,
    node_replacement: String,
    job_suffix_to_remove: String,
    job_suffix_to_add: String,
}

impl PromotionRules {
    /// Build the rules for promoting into `target` from its fixed predecessor.
    pub fn between(profiles: &ProfileTable, target: Environment) -> Result<Self, AppError> {
        let Some(source) = target.promotion_source() else {
            tracing::error!("invalid target env '{}' for promotion", target);
            return Err(AppError::new(
                ErrorCategory::ValidationError,
                format!(
                    "invalid target env '{}' for promotion; expected preprod or prod",
                    target
                ),
            )
            .with_code("PROMOTE-001")
            .with_context("target", target.as_str()));
        };

        let (Some(source_profile), Some(target_profile)) =
            (profiles.get(source), profiles.get(target))
        else {
            return Err(AppError::new(
                ErrorCategory::ConfigurationError,
                format!("missing config for '{}' or '{}'", source, target),
            )
            .with_code("PROMOTE-002")
            .with_context("source", source.as_str())
            .with_context("target", target.as_str()));
        };

        let user_pattern = if source_profile.user_suffix.is_empty() {
            None
        } else {
            Some(literal_pattern(
                &format!("{}$", regex::escape(&source_profile.user_suffix)),
                "user_suffix",
            )?)
        };
        let node_pattern = if source_profile.node_env_id.is_empty() {
            None
        } else {
            Some(literal_pattern(
                &regex::escape(&source_profile.node_env_id),
                "node_env_id",
            )?)
        };

        Ok(PromotionRules {
            source,
            target,
            tag_pattern: source_profile.env_tag_pattern.clone(),
            tag_replacement: target_profile.env_tag_replacement.clone().unwrap_or_default(),
            datacenter_pattern: source_profile.datacenter_pattern.clone(),
            datacenter_replacement: target_profile
                .datacenter_replacement
                .clone()
                .unwrap_or_default(),
            user_pattern,
            user_replacement: target_profile.user_suffix.clone(),
            node_pattern,
            node_replacement: target_profile.node_env_id.clone(),
            job_suffix_to_remove: target_profile.job_suffix_to_remove.clone(),
            job_suffix_to_add: target_profile.job_suffix_to_add.clone(),
        })
    }

    /// Apply every applicable rule to one node. Returns attributes changed.
    pub fn apply_to(&self, element: &mut Element) -> usize {
        self.rewrite_names(element)
            + self.rewrite_datacenter(element)
            + self.rewrite_run_as(element)
            + self.rewrite_node_id(element)
            + self.rewrite_user_variable(element)
            + self.rewrite_condition_name(element)
    }

    /// Name tag in name attributes, plus the job-name suffix policy.
    pub fn rewrite_names(&self, element: &mut Element) -> usize {
        let is_job = element.is(tags::JOB);
        let mut changed = 0;
        for attr in NAME_ATTRIBUTES {
            let suffix_policy = is_job && attr == attrs::JOBNAME;
            changed += rewrite_attr(element, attr, |value| {
                let mut renamed = self.replace_tag(value).into_owned();
                if suffix_policy {
                    self.apply_job_suffix(&mut renamed);
                }
                renamed
            });
        }
        changed
    }

    pub fn rewrite_datacenter(&self, element: &mut Element) -> usize {
        let Some(pattern) = &self.datacenter_pattern else {
            return 0;
        };
        rewrite_attr(element, attrs::DATACENTER, |value| {
            pattern
                .replace_all(value, NoExpand(&self.datacenter_replacement))
                .into_owned()
        })
    }

    pub fn rewrite_run_as(&self, element: &mut Element) -> usize {
        if self.user_pattern.is_none() {
            return 0;
        }
        rewrite_attr(element, attrs::RUN_AS, |value| {
            self.replace_user_suffix(value)
        })
    }

    /// Replace the first occurrence of the source node fragment, keeping
    /// whatever surrounds it.
    pub fn rewrite_node_id(&self, element: &mut Element) -> usize {
        let Some(pattern) = &self.node_pattern else {
            return 0;
        };
        rewrite_attr(element, attrs::NODEID, |value| {
            pattern
                .replacen(value, 1, NoExpand(&self.node_replacement))
                .into_owned()
        })
    }

    pub fn rewrite_user_variable(&self, element: &mut Element) -> usize {
        if !element.is(tags::VARIABLE) || element.attr(attrs::NAME) != Some(USER_VARIABLE) {
            return 0;
        }
        if self.user_pattern.is_none() {
            return 0;
        }
        rewrite_attr(element, attrs::VALUE, |value| self.replace_user_suffix(value))
    }

    pub fn rewrite_condition_name(&self, element: &mut Element) -> usize {
        if !element.is(tags::OUTCOND) && !element.is(tags::INCOND) {
            return 0;
        }
        rewrite_attr(element, attrs::NAME, |value| {
            self.replace_tag(value).into_owned()
        })
    }

    fn replace_tag<'a>(&self, value: &'a str) -> Cow<'a, str> {
        match &self.tag_pattern {
            Some(pattern) => pattern.replace_all(value, NoExpand(&self.tag_replacement)),
            None => Cow::Borrowed(value),
        }
    }

    fn replace_user_suffix(&self, value: &str) -> String {
        match &self.user_pattern {
            Some(pattern) => pattern
                .replace_all(value, NoExpand(&self.user_replacement))
                .into_owned(),
            None => value.to_string(),
        }
    }

    fn apply_job_suffix(&self, name: &mut String) {
        if !self.job_suffix_to_remove.is_empty() && name.ends_with(&self.job_suffix_to_remove) {
            name.truncate(name.len() - self.job_suffix_to_remove.len());
        }
        if !self.job_suffix_to_add.is_empty() && !name.ends_with(&self.job_suffix_to_add) {
            name.push_str(&self.job_suffix_to_add);
        }
    }
}

fn literal_pattern(pattern: &str, field: &str) -> Result<Regex, AppError> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|err| {
            AppError::new(
                ErrorCategory::ConfigurationError,
                format!("cannot build {} pattern: {}", field, err),
            )
            .with_code("PROMOTE-002")
        })
}

/// Replace `key` in full with `rewrite(current)` when present and different.
fn rewrite_attr<F>(element: &mut Element, key: &str, rewrite: F) -> usize
where
    F: FnOnce(&str) -> String,
{
    let Some(current) = element.attr(key) else {
        return 0;
    };
    let updated = rewrite(current);
    if updated == current {
        return 0;
    }
    tracing::debug!(
        "<{}> {}: '{}' -> '{}'",
        element.tag(),
        key,
        current,
        updated
    );
    element.set_attr(key, updated);
    1
}
