//! Release versioning: next patch version, image tag aliases and build metadata.
//!
//! The release pipeline runs three jobs in order:
//!
//! ```text
//! version  latest tag -> next_patch() -> app_version, release_tag()
//! docker   app_version -> image_references() over every registry
//!          build_date() -> BUILD_DATE
//! merge    fast-forward + push release_tag()
//! ```
//!
//! Only the string computation lives here; the CI host does checkout, image
//! build/push and the merge itself.

use chrono::{DateTime, SecondsFormat, Utc};
use semver::Version;

use crate::error::{ExporterError, Result};

/// Parse a version or tag, accepting a leading `v`.
pub fn parse_version(input: &str) -> Result<Version> {
    let trimmed = input.trim();
    let raw = trimmed
        .strip_prefix('v')
        .or_else(|| trimmed.strip_prefix('V'))
        .unwrap_or(trimmed);
    Version::parse(raw).map_err(|e| ExporterError::InvalidVersion {
        input: input.to_string(),
        reason: e.to_string(),
    })
}

/// Next patch release after `latest`.
///
/// With no previous tag the first release is `0.0.1`. A pre-release is
/// promoted to its release version rather than skipped past.
pub fn next_patch(latest: Option<&str>) -> Result<Version> {
    let Some(tag) = latest.map(str::trim).filter(|t| !t.is_empty()) else {
        return Ok(Version::new(0, 0, 1));
    };

    let current = parse_version(tag)?;
    if current.pre.is_empty() {
        let patch = current
            .patch
            .checked_add(1)
            .ok_or_else(|| ExporterError::InvalidVersion {
                input: tag.to_string(),
                reason: "patch overflow".into(),
            })?;
        Ok(Version::new(current.major, current.minor, patch))
    } else {
        Ok(Version::new(current.major, current.minor, current.patch))
    }
}

/// Git tag for a release.
#[must_use]
pub fn release_tag(version: &Version) -> String {
    format!("v{}.{}.{}", version.major, version.minor, version.patch)
}

/// The four image tag aliases for a release: `latest`, `MAJOR`, `MAJOR.MINOR`
/// and the full version.
#[must_use]
pub fn tag_aliases(version: &Version) -> Vec<String> {
    vec![
        "latest".to_string(),
        version.major.to_string(),
        format!("{}.{}", version.major, version.minor),
        format!("{}.{}.{}", version.major, version.minor, version.patch),
    ]
}

/// Every `<registry>/<project>:<alias>` reference, grouped by registry.
///
/// Repository names must be lowercase, so the project is lowercased.
/// Pre-release versions are rejected: they must not move `latest` or the
/// release aliases.
pub fn image_references<S: AsRef<str>>(
    registries: &[S],
    project: &str,
    version: &Version,
) -> Result<Vec<String>> {
    if !version.pre.is_empty() {
        return Err(ExporterError::InvalidVersion {
            input: version.to_string(),
            reason: "pre-release versions are not published under release tags".into(),
        });
    }
    let project = project.trim().to_lowercase();
    if project.is_empty() {
        return Err(ExporterError::Config("project name must not be empty".into()));
    }

    let aliases = tag_aliases(version);
    let mut references = Vec::with_capacity(registries.len() * aliases.len());
    for registry in registries {
        let registry = registry.as_ref().trim().trim_end_matches('/');
        if registry.is_empty() {
            return Err(ExporterError::Config("registry must not be empty".into()));
        }
        for alias in &aliases {
            references.push(format!("{registry}/{project}:{alias}"));
        }
    }
    Ok(references)
}

/// `BUILD_DATE` value: RFC 3339 UTC with seconds precision.
#[must_use]
pub fn build_date(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_first_release() {
        assert_eq!(next_patch(None).unwrap(), Version::new(0, 0, 1));
        assert_eq!(next_patch(Some("  ")).unwrap(), Version::new(0, 0, 1));
    }

    #[test]
    fn test_next_patch() {
        assert_eq!(next_patch(Some("v1.2.3")).unwrap(), Version::new(1, 2, 4));
        assert_eq!(next_patch(Some("0.9.0")).unwrap(), Version::new(0, 9, 1));
        assert_eq!(
            next_patch(Some("1.2.3+build.5")).unwrap(),
            Version::new(1, 2, 4)
        );
    }

    #[test]
    fn test_prerelease_is_promoted() {
        assert_eq!(
            next_patch(Some("v1.2.3-rc.1")).unwrap(),
            Version::new(1, 2, 3)
        );
    }

    #[test]
    fn test_invalid_tag() {
        assert!(matches!(
            next_patch(Some("release-7")),
            Err(ExporterError::InvalidVersion { .. })
        ));
        assert!(parse_version("1.2").is_err());
    }

    #[test]
    fn test_patch_overflow_is_an_error() {
        assert!(matches!(
            next_patch(Some("1.2.18446744073709551615")),
            Err(ExporterError::InvalidVersion { .. })
        ));
        assert_eq!(
            next_patch(Some("1.2.18446744073709551614")).unwrap(),
            Version::new(1, 2, u64::MAX)
        );
    }

    #[test]
    fn test_release_tag() {
        assert_eq!(release_tag(&Version::new(2, 0, 11)), "v2.0.11");
    }

    #[test]
    fn test_image_references() {
        let refs = image_references(
            &["docker.io/camalot/", "ghcr.io/camalot"],
            "Host-X509-Exporter",
            &Version::new(1, 4, 2),
        )
        .unwrap();
        assert_eq!(
            refs,
            vec![
                "docker.io/camalot/host-x509-exporter:latest",
                "docker.io/camalot/host-x509-exporter:1",
                "docker.io/camalot/host-x509-exporter:1.4",
                "docker.io/camalot/host-x509-exporter:1.4.2",
                "ghcr.io/camalot/host-x509-exporter:latest",
                "ghcr.io/camalot/host-x509-exporter:1",
                "ghcr.io/camalot/host-x509-exporter:1.4",
                "ghcr.io/camalot/host-x509-exporter:1.4.2",
            ]
        );
    }

    #[test]
    fn test_image_references_rejects_empty() {
        let version = Version::new(1, 0, 0);
        assert!(image_references(&["ghcr.io/x"], " ", &version).is_err());
        assert!(image_references(&[""], "proj", &version).is_err());
    }

    #[test]
    fn test_image_references_rejects_prerelease() {
        let version = parse_version("1.2.3-rc.1").unwrap();
        assert!(matches!(
            image_references(&["ghcr.io/x"], "proj", &version),
            Err(ExporterError::InvalidVersion { .. })
        ));
    }

    #[test]
    fn test_build_date() {
        let now = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
        assert_eq!(build_date(now), "2024-03-09T14:05:07Z");
    }
}
