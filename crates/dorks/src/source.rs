use std::path::{Path, PathBuf};

use tracing::info;

use dorkhunter_core::ConfigError;

use crate::BUILTIN_DORKS;

/// Where a run's templates came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DorkSource {
    File(PathBuf),
    Single,
    Builtin,
}

/// Templates in the order they were found, before any domain handling.
#[derive(Debug, Clone)]
pub struct DorkSet {
    pub source: DorkSource,
    pub templates: Vec<String>,
}

impl DorkSet {
    /// Why these templates produce no queries for a run without a domain, or
    /// with an empty source.
    pub fn empty_plan_reason(&self) -> String {
        match &self.source {
            DorkSource::File(path) if self.templates.is_empty() => {
                format!("dork file {} has no dorks", path.display())
            }
            _ => "every template needs a target domain and none was given".to_string(),
        }
    }
}

/// Pick templates: dork file first, then a single dork, then the built-in list.
pub fn resolve_dorks(dork_file: Option<&Path>, dork: Option<&str>) -> Result<DorkSet, ConfigError> {
    if let Some(path) = dork_file {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::DorkFile {
            path: path.to_path_buf(),
            source,
        })?;
        let templates: Vec<String> = content
            .lines()
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .collect();
        info!(count = templates.len(), path = %path.display(), "loaded dorks from file");
        return Ok(DorkSet {
            source: DorkSource::File(path.to_path_buf()),
            templates,
        });
    }

    if let Some(d) = dork.map(str::trim).filter(|d| !d.is_empty()) {
        info!(dork = d, "using custom dork");
        return Ok(DorkSet {
            source: DorkSource::Single,
            templates: vec![d.to_string()],
        });
    }

    info!(count = BUILTIN_DORKS.len(), "using built-in dorks");
    Ok(DorkSet {
        source: DorkSource::Builtin,
        templates: BUILTIN_DORKS.iter().map(|s| s.to_string()).collect(),
    })
}
