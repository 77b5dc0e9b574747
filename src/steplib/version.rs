use crate::error::{Result, StepperError};

/// Parses a step version leniently: `v` prefixes and one or two segment
/// versions (`1`, `1.2`) are accepted and padded to three segments.
pub fn parse_version(version: &str) -> Option<semver::Version> {
    let trimmed = version.trim();
    let trimmed = trimmed.strip_prefix('v').unwrap_or(trimmed);

    if let Ok(v) = semver::Version::parse(trimmed) {
        return Some(v);
    }

    let parts: Vec<&str> = trimmed.split('.').collect();
    if parts.is_empty() || parts.len() > 3 {
        return None;
    }
    let mut numbers = [0u64; 3];
    for (slot, part) in numbers.iter_mut().zip(&parts) {
        *slot = part.parse().ok()?;
    }
    Some(semver::Version::new(numbers[0], numbers[1], numbers[2]))
}

pub struct VersionComparator;

impl VersionComparator {
    /// Highest of `versions` by semantic version ordering; any unparseable
    /// version, or an empty input, is an error.
    pub fn latest<S: AsRef<str>>(versions: &[S]) -> Result<String> {
        let mut latest: Option<(semver::Version, &str)> = None;

        for version in versions {
            let version = version.as_ref();
            let parsed = parse_version(version).ok_or_else(|| {
                StepperError::VersionResolution(format!("malformed version: {version}"))
            })?;

            let newer = latest.as_ref().is_none_or(|(current, _)| *current < parsed);
            if newer {
                latest = Some((parsed, version));
            }
        }

        latest
            .map(|(_, original)| original.to_string())
            .ok_or_else(|| StepperError::VersionResolution("failed to find latest version".into()))
    }

    /// Sorts versions ascending; unparseable versions go first, in string order.
    pub fn sort(versions: &mut [String]) {
        versions.sort_by(|a, b| match (parse_version(a), parse_version(b)) {
            (Some(va), Some(vb)) => va.cmp(&vb),
            (None, Some(_)) => std::cmp::Ordering::Less,
            (Some(_), None) => std::cmp::Ordering::Greater,
            (None, None) => a.cmp(b),
        });
    }
}
