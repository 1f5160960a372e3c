/// Device class selection, made once at startup
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceProfile {
    Mobile,
    Desktop,
}

/// User-agent fragments that identify phones and tablets
const MOBILE_MARKERS: &[&str] = &[
    "android",
    "iphone",
    "ipad",
    "ipod",
    "blackberry",
    "bb10",
    "iemobile",
    "opera mini",
    "mobile",
    "silk",
    "kindle",
    "webos",
    "windows phone",
    "tablet",
];

impl DeviceProfile {
    /// Classify a browser user-agent string
    pub fn from_user_agent(user_agent: &str) -> Self {
        let ua = user_agent.to_ascii_lowercase();
        if MOBILE_MARKERS.iter().any(|marker| ua.contains(marker)) {
            DeviceProfile::Mobile
        } else {
            DeviceProfile::Desktop
        }
    }
}

/// A value with separate mobile and desktop variants
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DeviceValue<T> {
    Shared(T),
    PerDevice { mobile: T, desktop: T },
}

impl<T: Copy> DeviceValue<T> {
    pub fn resolve(&self, profile: DeviceProfile) -> T {
        match (self, profile) {
            (DeviceValue::Shared(value), _) => *value,
            (DeviceValue::PerDevice { mobile, .. }, DeviceProfile::Mobile) => *mobile,
            (DeviceValue::PerDevice { desktop, .. }, DeviceProfile::Desktop) => *desktop,
        }
    }
}
