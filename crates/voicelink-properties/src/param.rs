//! Well-known parameter names.
//!
//! Parameter names appear verbatim in user metadata configuration and in
//! serialized capability records, so they are wire-stable.

pub const ACTION_MAPPINGS: &str = "actionMappings";
pub const BINDING: &str = "binding";
pub const CAPABILITY_NAMES: &str = "capabilityNames";
pub const COLOR_COMPANION: &str = "colorCompanion";
pub const EXIT_DELAY: &str = "exitDelay";
pub const INCREMENT: &str = "increment";
pub const INVERTED: &str = "inverted";
pub const LANGUAGE: &str = "language";
pub const NON_CONTROLLABLE: &str = "nonControllable";
pub const ORDERED: &str = "ordered";
pub const PRESETS: &str = "presets";
pub const PROACTIVELY_REPORTED: &str = "proactivelyReported";
pub const PROTOCOL: &str = "protocol";
pub const PROXY_BASE_URL: &str = "proxyBaseUrl";
pub const RESOLUTION: &str = "resolution";
pub const RETRIEVABLE: &str = "retrievable";
pub const SCALE: &str = "scale";
pub const SETPOINT_RANGE: &str = "setpointRange";
pub const STATE_MAPPINGS: &str = "stateMappings";
pub const SUPPORTED_COMMANDS: &str = "supportedCommands";
pub const SUPPORTED_INPUTS: &str = "supportedInputs";
pub const SUPPORTED_MODES: &str = "supportedModes";
pub const SUPPORTED_OPERATIONS: &str = "supportedOperations";
pub const SUPPORTED_RANGE: &str = "supportedRange";
pub const SUPPORTS_DEACTIVATION: &str = "supportsDeactivation";
pub const UNIT_OF_MEASURE: &str = "unitOfMeasure";
