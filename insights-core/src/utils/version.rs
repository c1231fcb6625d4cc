use semver::BuildMetadata;
use std::fmt;
use std::str::FromStr;

/// A node or CFE release version, ordered by semver precedence.
///
/// Parsing is lenient with what the explorer and the node report: a leading
/// `v` is dropped, anything after the first whitespace is ignored and missing
/// minor or patch components count as zero (`v1.4` reads as `1.4.0`).
/// Pre-release tags take part in the ordering, so `1.3.2-rc1 < 1.3.2`. Build
/// metadata is discarded, and so is the commit hash a node appends to its
/// release (`1.3.2-9b2b1f1ea4`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version(semver::Version);

impl Version {
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self(semver::Version::new(major, minor, patch))
    }
}

impl Default for Version {
    fn default() -> Self {
        Self::new(0, 0, 0)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for Version {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.split_whitespace().next().unwrap_or_default();
        let text = text.strip_prefix('v').unwrap_or(text);
        let (release, suffix) = text.split_at(text.find(['-', '+']).unwrap_or(text.len()));
        let suffix = match suffix.strip_prefix('-') {
            Some(tag) => {
                let (pre, build) = tag.split_at(tag.find('+').unwrap_or(tag.len()));
                if is_commit_hash(pre) { build } else { suffix }
            }
            None => suffix,
        };

        let components = release.split('.').count();
        if release.is_empty() || components > 3 {
            return Err(format!("invalid version {s:?}: expected major[.minor[.patch]]"));
        }
        let padding = ".0".repeat(3 - components);

        let mut version = semver::Version::parse(&format!("{release}{padding}{suffix}"))
            .map_err(|e| format!("invalid version {s:?}: {e}"))?;
        version.build = BuildMetadata::EMPTY;
        Ok(Self(version))
    }
}

fn is_commit_hash(tag: &str) -> bool {
    tag.len() >= 7 && tag.chars().all(|c| c.is_ascii_hexdigit())
}
