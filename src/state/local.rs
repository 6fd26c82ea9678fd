// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Client-side flags the device does not report.

use super::DeviceState;

/// Background selection set by a successful `screen/writeBKG`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackgroundSelection {
    /// Whether the background layer is shown.
    pub enabled: bool,
    /// Selected background id.
    pub bkg_id: i64,
}

/// State known only from this client's own successful writes.
///
/// The device exposes no read for fade-to-black, freeze or the background
/// selection, so the last written value is overlaid on every snapshot.
///
/// # Examples
///
/// ```
/// use novastar_h::state::{DeviceState, LocalState};
///
/// let local = LocalState { ftb_active: true, ..LocalState::default() };
/// let mut state = DeviceState::new(0, 0);
/// local.apply_to(&mut state);
/// assert!(state.ftb_active);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LocalState {
    /// Fade-to-black engaged.
    pub ftb_active: bool,
    /// Output frozen.
    pub freeze_active: bool,
    /// Last background selection, if any was written.
    pub background: Option<BackgroundSelection>,
}

impl LocalState {
    /// Overlays the local flags onto a snapshot.
    pub fn apply_to(&self, state: &mut DeviceState) {
        state.ftb_active = self.ftb_active;
        state.freeze_active = self.freeze_active;
        if let Some(background) = self.background {
            state.background_enabled = background.enabled;
            state.background_id = Some(background.bkg_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_overlay_clears_flags() {
        let mut state = DeviceState::new(0, 0);
        state.ftb_active = true;
        state.freeze_active = true;

        LocalState::default().apply_to(&mut state);

        assert!(!state.ftb_active);
        assert!(!state.freeze_active);
        assert!(!state.background_enabled);
        assert_eq!(state.background_id, None);
    }

    #[test]
    fn overlay_applies_background() {
        let local = LocalState {
            freeze_active: true,
            background: Some(BackgroundSelection {
                enabled: true,
                bkg_id: 3,
            }),
            ..LocalState::default()
        };
        let mut state = DeviceState::new(0, 0);
        local.apply_to(&mut state);

        assert!(state.freeze_active);
        assert!(!state.ftb_active);
        assert!(state.background_enabled);
        assert_eq!(state.background_id, Some(3));
    }
}
