//! Canonical `ON` reaction blocks per environment.
//!
//! Jobs do not get their reaction blocks patched field by field. The blocks
//! differ structurally between environments (prod raises a ticket and pages,
//! preprod does neither), so the notification step throws the old blocks away
//! and appends fresh copies of these.

use crate::core::document::{xml, Element};
use crate::core::environment::{Environment, ProfileTable};
use quick_xml::escape::escape;
use std::collections::BTreeMap;

const PREPROD_TEMPLATE: &str = r#"
<ON STMT="*" CODE="NOTOK">
    <DOACTION ACTION="NOTOK"/>
    <DOMAIL URGENCY="R" DEST="{dest}" SUBJECT="PREPROD FAILED Job: %%JOBNAME" MESSAGE="Job %%JOBNAME failed on %%NODEID. Check logs." ATTACH_SYSOUT="Y"/>
    <DOSHOUT URGENCY="R" MESSAGE="PREPROD Job %%JOBNAME Failed" DEST="PreprodSupportTeam"/>
</ON>
<ON STMT="*" CODE="ENDEDOK">
    <DOMAIL URGENCY="S" DEST="{dest}" SUBJECT="PREPROD OK Job: %%JOBNAME" MESSAGE="Job %%JOBNAME OK." ATTACH_SYSOUT="N"/>
</ON>
"#;

const PROD_TEMPLATE: &str = r#"
<ON STMT="*" CODE="NOTOK">
    <DOACTION ACTION="NOTOK"/>
    <DOREMEDY URGENCY="{urgency}" DESCRIPTION="PROD FAILURE: Control-M job %%JOBNAME run %%RUNCOUNT failed on node %%NODEID RC=%%COMPSTAT App=%%APPLIC Group=%%APPLGROUP" SUMMARY="PROD FAILURE: %%JOBNAME on %%NODEID RC=%%COMPSTAT"/>
    <DOMAIL URGENCY="C" DEST="{dest}" SUBJECT="CRITICAL PROD FAILED Job: %%JOBNAME" MESSAGE="PROD Job %%JOBNAME failed on %%NODEID. Remedy Ticket Created. Check logs." ATTACH_SYSOUT="Y"/>
    <DOSHOUT URGENCY="C" MESSAGE="CRITICAL PROD Job %%JOBNAME Failed - PagerDuty" DEST="ProdOnCallPager"/>
</ON>
"#;

const WRAPPER_TAG: &str = "TEMPLATE";

/// Pre-built reaction blocks, keyed by environment. Dev has none.
#[derive(Debug, Clone, Default)]
pub struct NotificationTemplates {
    blocks: BTreeMap<Environment, Vec<Element>>,
}

impl NotificationTemplates {
    /// Render and parse the template for every non-dev environment in `profiles`.
    ///
    /// A template that fails to build is logged and left out; the notification
    /// step then skips that environment instead of failing.
    pub fn build(profiles: &ProfileTable) -> Self {
        let mut blocks = BTreeMap::new();
        for (environment, template) in [
            (Environment::Preprod, PREPROD_TEMPLATE),
            (Environment::Prod, PROD_TEMPLATE),
        ] {
            let Some(profile) = profiles.get(environment) else {
                tracing::error!(
                    "no profile for '{}'; notification template not built",
                    environment
                );
                continue;
            };
            match render(template, &profile.notification_dest, &profile.remedy_urgency) {
                Ok(parsed) => {
                    blocks.insert(environment, parsed);
                }
                Err(err) => {
                    tracing::error!(
                        "failed to build notification template for '{}': {}",
                        environment,
                        err
                    );
                }
            }
        }
        NotificationTemplates { blocks }
    }

    /// A set with no templates at all.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Template blocks for `environment`, in authoring order.
    pub fn blocks(&self, environment: Environment) -> Option<&[Element]> {
        self.blocks.get(&environment).map(Vec::as_slice)
    }

    pub fn has(&self, environment: Environment) -> bool {
        self.blocks.contains_key(&environment)
    }
}

fn render(
    template: &str,
    dest: &str,
    urgency: &str,
) -> Result<Vec<Element>, crate::core::document::DocumentError> {
    let formatted = template
        .replace("{dest}", &escape(dest))
        .replace("{urgency}", &escape(urgency));
    let wrapper = xml::parse_str(&format!(
        "<{tag}>{body}</{tag}>",
        tag = WRAPPER_TAG,
        body = formatted.trim()
    ))?;
    Ok(wrapper.children().to_vec())
}
