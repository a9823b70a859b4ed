//! Viewer device classification.
//!
//! The edge sends four independent boolean flags. They are not mutually
//! exclusive, so the device type is picked by a fixed priority:
//! Mobile, Desktop, Tablet, SmartTV.

use axum::http::HeaderMap;
use serde::Serialize;
use std::fmt;

use super::headers;

/// Single device classification derived from the edge flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DeviceType {
    Mobile,
    Desktop,
    Tablet,
    #[serde(rename = "Smart TV")]
    SmartTV,
    Unknown,
}

impl DeviceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceType::Mobile => "Mobile",
            DeviceType::Desktop => "Desktop",
            DeviceType::Tablet => "Tablet",
            DeviceType::SmartTV => "Smart TV",
            DeviceType::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw device flags as sent by the edge. Diagnostic only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DeviceFlags {
    pub is_mobile: bool,
    pub is_desktop: bool,
    pub is_tablet: bool,
    pub is_smart_tv: bool,
}

impl DeviceFlags {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self {
            is_mobile: headers::flag(headers, headers::IS_MOBILE_VIEWER),
            is_desktop: headers::flag(headers, headers::IS_DESKTOP_VIEWER),
            is_tablet: headers::flag(headers, headers::IS_TABLET_VIEWER),
            is_smart_tv: headers::flag(headers, headers::IS_SMARTTV_VIEWER),
        }
    }

    /// First set flag in priority order wins.
    pub fn device_type(&self) -> DeviceType {
        if self.is_mobile {
            DeviceType::Mobile
        } else if self.is_desktop {
            DeviceType::Desktop
        } else if self.is_tablet {
            DeviceType::Tablet
        } else if self.is_smart_tv {
            DeviceType::SmartTV
        } else {
            DeviceType::Unknown
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flags(bits: u8) -> DeviceFlags {
        DeviceFlags {
            is_mobile: bits & 0b0001 != 0,
            is_desktop: bits & 0b0010 != 0,
            is_tablet: bits & 0b0100 != 0,
            is_smart_tv: bits & 0b1000 != 0,
        }
    }

    #[test]
    fn test_priority_over_all_combinations() {
        use DeviceType::*;
        // index bits: 1 mobile, 2 desktop, 4 tablet, 8 smart tv
        let expected = [
            Unknown, Mobile, Desktop, Mobile, Tablet, Mobile, Desktop, Mobile,
            SmartTV, Mobile, Desktop, Mobile, Tablet, Mobile, Desktop, Mobile,
        ];
        for (bits, want) in expected.iter().enumerate() {
            assert_eq!(flags(bits as u8).device_type(), *want, "bits {:04b}", bits);
        }
    }

    #[test]
    fn test_mobile_beats_desktop() {
        let f = DeviceFlags { is_mobile: true, is_desktop: true, ..Default::default() };
        assert_eq!(f.device_type(), DeviceType::Mobile);
        // raw flags stay as reported
        assert!(f.is_desktop);
    }

    #[test]
    fn test_from_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(headers::IS_SMARTTV_VIEWER, "true".parse().unwrap());
        headers.insert(headers::IS_MOBILE_VIEWER, "false".parse().unwrap());
        let f = DeviceFlags::from_headers(&headers);
        assert_eq!(f.device_type(), DeviceType::SmartTV);
        assert_eq!(f.device_type().to_string(), "Smart TV");
    }
}
