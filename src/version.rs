//! Server versions, as advertised by the `version` field of `INFO`.

use std::error::Error as StdError;
use std::fmt;
use std::str::FromStr;

/// A server semantic version.
///
/// The wire form is `M[.m[.p]][-dev]`; omitted components are zero. The
/// ordering is lexicographic over `(major, minor, patch, dev)`, so
/// `1.2.3 < 1.2.4` and `1.0.0-preview.1 < 1.0.0-preview.2`.
#[derive(Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct Version {
    /// Major version number.
    pub major: u32,
    /// Minor version number.
    pub minor: u32,
    /// Patch version number.
    pub patch: u32,
    /// Pre-release component, empty when absent.
    pub dev: String,
}

impl Version {
    /// Parses a version string.
    ///
    /// The empty string is what servers without a version advertise and
    /// yields `0.0.0-unknown`. Anything after the first `-` is the `dev`
    /// component; the remainder must be one to three dot-separated decimal
    /// numbers.
    ///
    /// # Example
    ///
    /// ```
    /// use nats_proto::Version;
    ///
    /// let version = Version::parse("2.10.1-beta")?;
    /// assert_eq!(version.major, 2);
    /// assert_eq!(version.dev, "beta");
    /// # Ok::<(), nats_proto::InvalidVersion>(())
    /// ```
    pub fn parse(src: &str) -> Result<Version, InvalidVersion> {
        if src.is_empty() {
            return Ok(Version {
                major: 0,
                minor: 0,
                patch: 0,
                dev: "unknown".to_owned(),
            });
        }
        let (numbers, dev) = match src.find('-') {
            Some(at) => (&src[..at], &src[at + 1..]),
            None => (src, ""),
        };
        let mut components = [0u32; 3];
        let mut count = 0;
        for token in numbers.split('.') {
            if count == components.len() {
                return Err(InvalidVersion::new(src));
            }
            components[count] = token.parse().map_err(|_| InvalidVersion::new(src))?;
            count += 1;
        }
        Ok(Version {
            major: components[0],
            minor: components[1],
            patch: components[2],
            dev: dev.to_owned(),
        })
    }
}

impl FromStr for Version {
    type Err = InvalidVersion;

    fn from_str(src: &str) -> Result<Version, InvalidVersion> {
        Version::parse(src)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.dev.is_empty() {
            write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
        } else {
            write!(f, "{}.{}.{}-{}", self.major, self.minor, self.patch, self.dev)
        }
    }
}

/// The error returned when parsing a malformed version string.
pub struct InvalidVersion {
    version: Box<str>,
}

impl InvalidVersion {
    fn new(src: &str) -> InvalidVersion {
        InvalidVersion {
            version: src.into(),
        }
    }
}

impl fmt::Debug for InvalidVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("InvalidVersion").field(&self.version).finish()
    }
}

impl fmt::Display for InvalidVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid version: {}", self.version)
    }
}

impl StdError for InvalidVersion {}
