use crate::error::{Result, StepperError};
use std::fmt;

/// Go import path split into its repository coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackagePath {
    pub host: String,
    pub owner: String,
    pub name: String,
    pub is_v2: bool,
}

impl PackagePath {
    pub fn parse(pkg: &str) -> Result<Self> {
        let split: Vec<&str> = pkg.split('/').collect();
        if split.len() < 3 {
            return Err(StepperError::InvalidPackage(pkg.to_string()));
        }

        Ok(Self {
            host: split[0].to_string(),
            owner: split[1].to_string(),
            name: split[2].to_string(),
            is_v2: split.len() > 3 && split[3] == "v2",
        })
    }

    /// `host/owner/name`, plus `/v2` for major version 2 modules.
    pub fn root(&self) -> String {
        if self.is_v2 {
            format!("{}/{}/{}/v2", self.host, self.owner, self.name)
        } else {
            format!("{}/{}/{}", self.host, self.owner, self.name)
        }
    }
}

impl fmt::Display for PackagePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.root())
    }
}

/// Collapses an import path to its root package.
pub fn root_package(pkg: &str) -> Result<String> {
    PackagePath::parse(pkg).map(|p| p.root())
}
