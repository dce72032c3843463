//! Inclusive protocol-version ranges

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{CoreError, Result};
use crate::ProtocolVersion;

/// Inclusive range of protocol versions `[min, max]`
///
/// Fields are public because ranges arrive from peers and may be malformed;
/// use [`VersionRange::new`] or [`VersionRange::validate`] before trusting one.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct VersionRange {
    pub min: ProtocolVersion,
    pub max: ProtocolVersion,
}

impl VersionRange {
    /// Create a validated range
    pub fn new(min: ProtocolVersion, max: ProtocolVersion) -> Result<Self> {
        let range = Self { min, max };
        range.validate()?;
        Ok(range)
    }

    /// Range containing a single version
    pub fn exactly(version: ProtocolVersion) -> Result<Self> {
        Self::new(version, version)
    }

    /// Check `1 <= min <= max`
    pub fn validate(&self) -> Result<()> {
        if self.min == 0 || self.min > self.max {
            return Err(CoreError::InvalidRange {
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }

    /// Whether `version` lies inside the range
    #[inline]
    pub fn contains(&self, version: ProtocolVersion) -> bool {
        self.min <= version && version <= self.max
    }

    /// Overlap of two ranges, or `None` when disjoint
    pub fn intersect(&self, other: &VersionRange) -> Option<VersionRange> {
        let min = self.min.max(other.min);
        let max = self.max.min(other.max);
        (min <= max).then_some(VersionRange { min, max })
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.min, self.max)
    }
}
