// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Audio volume type.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValueError;

/// Audio output volume (0-100).
///
/// ```
/// use novastar_h::types::Volume;
///
/// assert_eq!(Volume::clamped(130).value(), 100);
/// assert!(Volume::new(100).is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Volume(u8);

impl Volume {
    /// Muted level.
    pub const MIN: Self = Self(0);

    /// Full level.
    pub const MAX: Self = Self(100);

    /// Creates a new volume.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::OutOfRange` if value exceeds 100.
    pub fn new(value: u8) -> Result<Self, ValueError> {
        if value > 100 {
            return Err(ValueError::OutOfRange {
                min: 0,
                max: 100,
                actual: u16::from(value),
            });
        }
        Ok(Self(value))
    }

    /// Creates a volume, clamping to the valid range.
    #[must_use]
    pub fn clamped(value: i64) -> Self {
        Self(u8::try_from(value.clamp(0, 100)).unwrap_or(100))
    }

    /// Returns the volume level.
    #[must_use]
    pub const fn value(&self) -> u8 {
        self.0
    }
}

impl fmt::Display for Volume {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn volume_clamps_both_ends() {
        assert_eq!(Volume::clamped(-1), Volume::MIN);
        assert_eq!(Volume::clamped(250), Volume::MAX);
        assert_eq!(Volume::clamped(42).value(), 42);
    }

    #[test]
    fn volume_rejects_out_of_range() {
        assert!(Volume::new(101).is_err());
    }
}
