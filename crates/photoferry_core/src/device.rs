//! Device identity reported at commit time.

use crate::QualityTier;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// The device a commit claims to originate from.
///
/// The service derives storage accounting from the device model, so the
/// model varies with the requested quality tier and quota flag.
///
/// # Examples
///
/// ```
/// use photoferry_core::{DeviceProfile, QualityTier};
///
/// assert_eq!(DeviceProfile::for_upload(QualityTier::Original, false).model(), "Pixel XL");
/// assert_eq!(DeviceProfile::for_upload(QualityTier::Saver, false).model(), "Pixel 2");
/// assert_eq!(DeviceProfile::for_upload(QualityTier::Saver, true).model(), "Pixel 8");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct DeviceProfile {
    model: String,
    make: String,
    android_api_version: u64,
}

impl Default for DeviceProfile {
    fn default() -> Self {
        Self {
            model: "Pixel XL".to_string(),
            make: "Google".to_string(),
            android_api_version: 28,
        }
    }
}

impl DeviceProfile {
    /// Profile matching the requested commit flags.
    pub fn for_upload(quality: QualityTier, use_quota: bool) -> Self {
        let model = if use_quota {
            "Pixel 8"
        } else if quality == QualityTier::Saver {
            "Pixel 2"
        } else {
            "Pixel XL"
        };
        Self {
            model: model.to_string(),
            ..Self::default()
        }
    }
}
