//! Project-level attributes.

use std::collections::BTreeSet;

use anyhow::Result;

use crate::core::project::Project;
use crate::project_file::{AttributeValue, Attributes};

/// Discovers the on-demand resource tags used by a project.
pub trait KnownAssetTagsFetching: Sync {
    fn fetch(&self, project: &Project) -> Result<BTreeSet<String>>;
}

/// Collects tags declared on target resources and on-demand tag orderings.
#[derive(Debug, Clone, Copy, Default)]
pub struct KnownAssetTagsFetcher;

impl KnownAssetTagsFetching for KnownAssetTagsFetcher {
    fn fetch(&self, project: &Project) -> Result<BTreeSet<String>> {
        Ok(project
            .targets
            .iter()
            .flat_map(|target| target.on_demand_tags())
            .collect())
    }
}

/// Builds the attributes dictionary of the root project object.
pub struct ProjectAttributeBuilder<'a> {
    fetcher: &'a dyn KnownAssetTagsFetching,
}

impl<'a> ProjectAttributeBuilder<'a> {
    pub fn new(fetcher: &'a dyn KnownAssetTagsFetching) -> Self {
        ProjectAttributeBuilder { fetcher }
    }

    pub fn build(&self, project: &Project) -> Attributes {
        let mut attributes = Attributes::new();

        match self.fetcher.fetch(project) {
            Ok(tags) if !tags.is_empty() => {
                attributes.insert(
                    "KnownAssetTags".to_string(),
                    AttributeValue::Array(tags.into_iter().collect()),
                );
            }
            Ok(_) => {}
            Err(e) => {
                tracing::debug!("ignoring asset tag lookup failure for `{}`: {:#}", project.name, e);
            }
        }

        attributes.insert("BuildIndependentTargetsInParallel".to_string(), "YES".into());

        if let Some(organization) = &project.organization_name {
            attributes.insert("ORGANIZATIONNAME".to_string(), organization.as_str().into());
        }
        if let Some(prefix) = &project.class_prefix {
            attributes.insert("CLASSPREFIX".to_string(), prefix.as_str().into());
        }
        if let Some(check) = &project.last_upgrade_check {
            attributes.insert("LastUpgradeCheck".to_string(), check.as_str().into());
        }

        attributes
    }
}
