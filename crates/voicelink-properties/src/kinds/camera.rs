//! Camera stream endpoint.

use serde_json::{json, Value};

use voicelink_core::convert::ParameterValue;
use voicelink_core::item::{STATE_NULL, STATE_UNDEF};
use voicelink_core::ParameterType;

use crate::behavior::{PropertyBehavior, PropertyContext};
use crate::kind::PropertyKind;
use crate::param;
use crate::property::Property;

const PARAMETERS: &[(&str, ParameterType)] = &[
    (param::PROXY_BASE_URL, ParameterType::String),
    (param::RESOLUTION, ParameterType::String),
    (param::PROTOCOL, ParameterType::String),
];

/// Stream resolutions accepted in configuration, with pixel dimensions.
const RESOLUTIONS: &[(&str, u32, u32)] = &[
    ("480p", 640, 480),
    ("720p", 1280, 720),
    ("1080p", 1920, 1080),
];

const DEFAULT_RESOLUTION: &str = "1080p";
const DEFAULT_PROTOCOL: &str = "HLS";

/// Camera stream source. The bound string item carries the stream path; an
/// optional proxy base rewrites it to a publicly reachable HTTPS URL.
pub struct CameraStream;

pub static CAMERA_STREAM: CameraStream = CameraStream;

impl CameraStream {
    fn resolution(property: &Property) -> (&'static str, u32, u32) {
        let configured = property
            .parameter(param::RESOLUTION)
            .and_then(ParameterValue::as_str)
            .unwrap_or(DEFAULT_RESOLUTION);
        RESOLUTIONS
            .iter()
            .find(|(name, _, _)| name.eq_ignore_ascii_case(configured))
            .copied()
            .unwrap_or(("1080p", 1920, 1080))
    }

    /// Publicly reachable stream URL for the current item state.
    pub fn stream_url(property: &Property) -> Option<String> {
        let path = property.item().state.as_deref()?.trim();
        if path.is_empty() {
            return None;
        }
        match property
            .parameter(param::PROXY_BASE_URL)
            .and_then(ParameterValue::as_str)
        {
            Some(base) => Some(format!(
                "{}/{}",
                base.trim_end_matches('/'),
                path.trim_start_matches('/')
            )),
            None => Some(path.to_string()),
        }
    }
}

impl PropertyBehavior for CameraStream {
    fn kind(&self) -> PropertyKind {
        PropertyKind::CameraStream
    }

    fn supported_item_types(&self) -> &'static [&'static str] {
        &["String"]
    }

    fn supported_parameters(&self) -> &'static [(&'static str, ParameterType)] {
        PARAMETERS
    }

    fn command_for(&self, _property: &Property, _value: &Value) -> Option<String> {
        None
    }

    fn state_for(&self, property: &Property, raw: &str) -> Option<Value> {
        let url = raw.trim();
        // Unlike mapped or numeric kinds, the passthrough would otherwise
        // report the undefined-state sentinels as a stream path.
        if url.is_empty() || url == STATE_NULL || url == STATE_UNDEF {
            return None;
        }
        match property
            .parameter(param::PROXY_BASE_URL)
            .and_then(ParameterValue::as_str)
        {
            Some(base) => Some(Value::String(format!(
                "{}/{}",
                base.trim_end_matches('/'),
                url.trim_start_matches('/')
            ))),
            None => Some(Value::String(url.to_string())),
        }
    }

    fn configuration(&self, property: &Property, _ctx: &PropertyContext<'_>) -> Option<Value> {
        let protocol = property
            .parameter(param::PROTOCOL)
            .and_then(ParameterValue::as_str)
            .unwrap_or(DEFAULT_PROTOCOL)
            .to_uppercase();
        let (_, width, height) = Self::resolution(property);
        Some(json!({
            "protocols": [protocol],
            "resolutions": [{"width": width, "height": height}],
        }))
    }
}
