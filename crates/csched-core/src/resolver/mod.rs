//! Project scope resolution.
//!
//! When no project is configured, the scheduler finds its own unit id through an ordered list of
//! [`IdentityProbe`]s (first success wins) and reads the project label off that unit.

mod probe;
pub use probe::{CgroupProbe, CpusetProbe, HostnameProbe, IdentityProbe, MountinfoProbe, ProbeError};

use tracing::{debug, info};

use csched_model::{LABEL_PROJECT, Project, UnitId};

use crate::{CoreError, Runtime};

pub fn default_probes() -> Vec<Box<dyn IdentityProbe>> {
    vec![
        Box::new(CpusetProbe::default()),
        Box::new(MountinfoProbe::default()),
        Box::new(CgroupProbe::default()),
        Box::new(HostnameProbe),
    ]
}

/// Id of the unit hosting this process.
pub fn self_identify(probes: &[Box<dyn IdentityProbe>]) -> Result<UnitId, CoreError> {
    for probe in probes {
        match probe.probe() {
            Ok(id) => {
                debug!(probe = probe.name(), id = %id, "self id detected");
                return Ok(id);
            }
            Err(e) => debug!(probe = probe.name(), error = %e, "self id probe failed"),
        }
    }
    Err(CoreError::SelfIdentity)
}

pub async fn resolve_project(
    runtime: &dyn Runtime,
    probes: &[Box<dyn IdentityProbe>],
) -> Result<Project, CoreError> {
    let id = self_identify(probes)?;
    let labels = runtime
        .inspect_labels(&id)
        .await
        .map_err(|source| CoreError::InspectSelf {
            id: id.clone(),
            source,
        })?;

    match labels.get(LABEL_PROJECT) {
        Some(project) if !project.is_empty() => {
            info!(project = %project, container = %id, "project detected");
            Ok(project.clone())
        }
        _ => Err(CoreError::NotInProject(id)),
    }
}
