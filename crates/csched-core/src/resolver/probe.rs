use std::{
    fs,
    path::{Path, PathBuf},
};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("no container id in {0}")]
    NoMatch(String),
}

/// One strategy for finding the id of the unit this process runs in.
pub trait IdentityProbe: Send + Sync {
    fn name(&self) -> &'static str;

    fn probe(&self) -> Result<String, ProbeError>;
}

fn read(path: &Path) -> Result<String, ProbeError> {
    fs::read_to_string(path).map_err(|source| ProbeError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn no_match(path: &Path) -> ProbeError {
    ProbeError::NoMatch(path.display().to_string())
}

/// Basename of the cpuset of PID 1.
#[derive(Debug, Clone)]
pub struct CpusetProbe {
    path: PathBuf,
}

impl CpusetProbe {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Default for CpusetProbe {
    fn default() -> Self {
        Self::new("/proc/1/cpuset")
    }
}

impl IdentityProbe for CpusetProbe {
    fn name(&self) -> &'static str {
        "cpuset"
    }

    fn probe(&self) -> Result<String, ProbeError> {
        parse_cpuset(&read(&self.path)?).ok_or_else(|| no_match(&self.path))
    }
}

fn parse_cpuset(content: &str) -> Option<String> {
    let base = content.trim().rsplit('/').next()?;
    match base {
        "" | "." | ".." => None,
        id => Some(id.to_string()),
    }
}

/// First `containers/<64 alphanumerics>/` segment of the mount table.
#[derive(Debug, Clone)]
pub struct MountinfoProbe {
    path: PathBuf,
}

impl MountinfoProbe {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Default for MountinfoProbe {
    fn default() -> Self {
        Self::new("/proc/self/mountinfo")
    }
}

impl IdentityProbe for MountinfoProbe {
    fn name(&self) -> &'static str {
        "mountinfo"
    }

    fn probe(&self) -> Result<String, ProbeError> {
        parse_mountinfo(&read(&self.path)?).ok_or_else(|| no_match(&self.path))
    }
}

const ID_LEN: usize = 64;

fn parse_mountinfo(content: &str) -> Option<String> {
    const MARKER: &str = "containers/";
    content.match_indices(MARKER).find_map(|(at, _)| {
        let rest = content[at + MARKER.len()..].as_bytes();
        let id = rest.get(..ID_LEN)?;
        let closed = rest.get(ID_LEN) == Some(&b'/');
        (closed && id.iter().all(u8::is_ascii_alphanumeric))
            .then(|| String::from_utf8_lossy(id).into_owned())
    })
}

/// Docker scope of the process cgroup (`docker-<id>.scope` or `/docker/<id>`).
#[derive(Debug, Clone)]
pub struct CgroupProbe {
    path: PathBuf,
}

impl CgroupProbe {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Default for CgroupProbe {
    fn default() -> Self {
        Self::new("/proc/self/cgroup")
    }
}

impl IdentityProbe for CgroupProbe {
    fn name(&self) -> &'static str {
        "cgroup"
    }

    fn probe(&self) -> Result<String, ProbeError> {
        parse_cgroup(&read(&self.path)?).ok_or_else(|| no_match(&self.path))
    }
}

fn parse_cgroup(content: &str) -> Option<String> {
    for line in content.lines() {
        if let Some(scope) = line.split('/').find(|s| s.starts_with("docker-")) {
            let id = scope
                .trim_start_matches("docker-")
                .trim_end_matches(".scope");
            if !id.is_empty() {
                return Some(id.to_string());
            }
        }
        if let Some(id) = line
            .split("/docker/")
            .nth(1)
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            return Some(id.to_string());
        }
    }
    None
}

/// Container runtimes default the hostname to the short container id.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostnameProbe;

impl IdentityProbe for HostnameProbe {
    fn name(&self) -> &'static str {
        "hostname"
    }

    fn probe(&self) -> Result<String, ProbeError> {
        let name = hostname::get().map_err(|source| ProbeError::Io {
            path: PathBuf::from("hostname"),
            source,
        })?;
        name.to_str()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .ok_or_else(|| ProbeError::NoMatch("hostname".into()))
    }
}
