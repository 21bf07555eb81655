//! Parameter conversion.
//!
//! Free-form metadata configuration arrives as raw JSON values. This module
//! converts those values into a fixed set of semantic parameter types and
//! extracts structured identifiers from label strings.
//!
//! The converter is total: it never panics and never errors. A value that
//! cannot be converted to the requested type either becomes `None` ("not
//! configured") for numeric targets, or passes through unchanged for
//! unsupported (type, value) pairs. Callers depend on this tolerance to
//! survive arbitrary user-authored configuration.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;

/// Semantic types a parameter can be converted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterType {
    Boolean,
    Integer,
    Float,
    String,
    List,
    Map,
    Range,
}

/// A numeric range parameter: `[minimum, maximum, precision]`.
///
/// The string form `"min:max:precision"` carries up to three fields; the
/// object form `{minimum, maximum}` carries two.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RangeParam {
    pub minimum: f64,
    pub maximum: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub precision: Option<f64>,
}

impl RangeParam {
    pub fn new(minimum: f64, maximum: f64) -> Self {
        Self {
            minimum,
            maximum,
            precision: None,
        }
    }

    pub fn with_precision(mut self, precision: f64) -> Self {
        self.precision = Some(precision);
        self
    }

    /// A range is usable only if it is ascending and wider than its step.
    pub fn is_valid(&self) -> bool {
        self.minimum < self.maximum
            && self.maximum - self.minimum > self.precision.unwrap_or(0.0).abs()
    }

    pub fn span(&self) -> f64 {
        self.maximum - self.minimum
    }

    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.minimum, self.maximum)
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.minimum && value <= self.maximum
    }
}

/// An order-preserving key/value dictionary parsed from `"k1=v1,k2=v2,k3"`.
///
/// Keys without `=` carry no value. Ordering is behaviorally significant for
/// serialized output, so this is a pair list, not a hash map; it serializes
/// as a JSON object in entry order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderedMap(Vec<(String, Option<String>)>);

impl Serialize for OrderedMap {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, value) in &self.0 {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl OrderedMap {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Insert an entry unless the key is already present (first wins).
    pub fn insert(&mut self, key: String, value: Option<String>) -> bool {
        if self.contains_key(&key) {
            return false;
        }
        self.0.push((key, value));
        true
    }

    pub fn get(&self, key: &str) -> Option<Option<&str>> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_deref())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.iter().any(|(k, _)| k == key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_deref()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, Option<String>)> for OrderedMap {
    fn from_iter<T: IntoIterator<Item = (String, Option<String>)>>(iter: T) -> Self {
        let mut map = OrderedMap::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

/// A converted, typed parameter value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ParameterValue {
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
    List(Vec<String>),
    Map(OrderedMap),
    Range(RangeParam),
    /// Pass-through for (type, value) pairs the converter has no rule for.
    Raw(Value),
}

impl ParameterValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            Self::Float(f) if f.is_finite() => Some(*f as i64),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(f) if f.is_finite() => Some(*f),
            Self::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Self::List(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&OrderedMap> {
        match self {
            Self::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_range(&self) -> Option<&RangeParam> {
        match self {
            Self::Range(r) => Some(r),
            _ => None,
        }
    }

    /// Wrap a raw JSON value without conversion.
    pub fn from_json(value: &Value) -> Self {
        Self::Raw(value.clone())
    }
}

impl fmt::Display for ParameterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean(b) => write!(f, "{}", b),
            Self::Integer(i) => write!(f, "{}", i),
            Self::Float(v) => write!(f, "{}", v),
            Self::String(s) => write!(f, "{}", s),
            Self::List(l) => write!(f, "{}", l.join(",")),
            Self::Map(m) => {
                let entries: Vec<String> = m
                    .iter()
                    .map(|(k, v)| match v {
                        Some(v) => format!("{}={}", k, v),
                        None => k.to_string(),
                    })
                    .collect();
                write!(f, "{}", entries.join(","))
            }
            Self::Range(r) => match r.precision {
                Some(p) => write!(f, "{}:{}:{}", r.minimum, r.maximum, p),
                None => write!(f, "{}:{}", r.minimum, r.maximum),
            },
            Self::Raw(v) => write!(f, "{}", v),
        }
    }
}

/// Render a raw JSON scalar the way the hub would render it as text.
fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn to_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Convert a raw configuration value into the requested parameter type.
///
/// Returns `None` when the value cannot represent the type at all (failed
/// numeric parses, empty lists, malformed ranges); this is the "not
/// configured" outcome and is never an error.
pub fn convert(raw: &Value, target: ParameterType) -> Option<ParameterValue> {
    match target {
        ParameterType::List => convert_list(raw),
        ParameterType::Map => convert_map(raw),
        ParameterType::Range => convert_range(raw),
        ParameterType::Boolean => convert_boolean(raw),
        ParameterType::Integer => match raw {
            Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().map(|f| f as i64))
                .map(ParameterValue::Integer),
            Value::String(s) => s
                .trim()
                .parse::<i64>()
                .ok()
                .or_else(|| s.trim().parse::<f64>().ok().map(|f| f as i64))
                .map(ParameterValue::Integer),
            other => Some(ParameterValue::from_json(other)),
        },
        ParameterType::Float => match raw {
            Value::Number(_) | Value::String(_) => to_f64(raw).map(ParameterValue::Float),
            other => Some(ParameterValue::from_json(other)),
        },
        ParameterType::String => match raw {
            Value::String(s) => Some(ParameterValue::String(s.clone())),
            Value::Number(n) => Some(ParameterValue::String(n.to_string())),
            other => Some(ParameterValue::from_json(other)),
        },
    }
}

fn convert_list(raw: &Value) -> Option<ParameterValue> {
    let entries: Vec<String> = match raw {
        Value::String(s) => s.split(',').map(|part| part.trim().to_string()).collect(),
        Value::Array(values) => values.iter().filter_map(scalar_to_string).collect(),
        other => return Some(ParameterValue::from_json(other)),
    };
    let mut list = Vec::new();
    for entry in entries {
        if !entry.is_empty() && !list.contains(&entry) {
            list.push(entry);
        }
    }
    if list.is_empty() {
        None
    } else {
        Some(ParameterValue::List(list))
    }
}

fn convert_map(raw: &Value) -> Option<ParameterValue> {
    let map: OrderedMap = match raw {
        Value::String(s) => s
            .split(',')
            .filter_map(|entry| {
                let (key, value) = match entry.split_once('=') {
                    Some((k, v)) => (k.trim(), Some(v.trim().to_string())),
                    None => (entry.trim(), None),
                };
                if key.is_empty() {
                    None
                } else {
                    Some((key.to_string(), value))
                }
            })
            .collect(),
        Value::Object(obj) => obj
            .iter()
            .map(|(k, v)| (k.clone(), scalar_to_string(v)))
            .collect(),
        other => return Some(ParameterValue::from_json(other)),
    };
    if map.is_empty() {
        None
    } else {
        Some(ParameterValue::Map(map))
    }
}

fn convert_range(raw: &Value) -> Option<ParameterValue> {
    match raw {
        Value::String(s) => {
            let mut fields = s.splitn(3, ':');
            let minimum: f64 = fields.next()?.trim().parse().ok()?;
            let maximum: f64 = fields.next()?.trim().parse().ok()?;
            let precision = fields.next().and_then(|p| p.trim().parse().ok());
            Some(ParameterValue::Range(RangeParam {
                minimum,
                maximum,
                precision,
            }))
        }
        Value::Object(obj) => {
            let minimum = obj.get("minimum").and_then(to_f64)?;
            let maximum = obj.get("maximum").and_then(to_f64)?;
            let precision = obj.get("precision").and_then(to_f64);
            Some(ParameterValue::Range(RangeParam {
                minimum,
                maximum,
                precision,
            }))
        }
        other => Some(ParameterValue::from_json(other)),
    }
}

fn convert_boolean(raw: &Value) -> Option<ParameterValue> {
    match raw {
        Value::Bool(b) => Some(ParameterValue::Boolean(*b)),
        Value::Number(n) => Some(ParameterValue::Boolean(
            n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        )),
        Value::String(s) => {
            let lowered = s.trim().to_ascii_lowercase();
            Some(ParameterValue::Boolean(
                !matches!(lowered.as_str(), "0" | "false" | "no"),
            ))
        }
        other => Some(ParameterValue::from_json(other)),
    }
}

/// Structured identifier extracted from a capability-namespace label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapabilityName {
    /// Capability interface name, e.g. `PowerController`.
    pub name: String,
    /// Instance qualifier for multi-instance capabilities.
    pub instance: Option<String>,
    /// Property name, e.g. `powerState`.
    pub property: String,
    /// Sub-component qualifier for multi-valued capabilities.
    pub component: Option<String>,
    /// Tag distinguishing decoupled sensor/target pairs.
    pub tag: Option<String>,
}

static CAPABILITY_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?P<name>[A-Z]\w*)(?::(?P<instance>\w+))?\.(?P<property>[a-z]\w*)(?::(?P<component>\w+))?(?:#(?P<tag>\w+))?$",
    )
    .expect("capability pattern is valid")
});

static GROUP_ENDPOINT_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^Endpoint\.(?P<type>\w+)$").expect("endpoint pattern is valid"));

/// Decompose a capability label such as `PowerController.powerState`,
/// `RangeController:Position.rangeValue` or `LockController.lockState:door#sensor`.
///
/// Returns `None` on non-match.
pub fn parse_capability_name(label: &str) -> Option<CapabilityName> {
    let captures = CAPABILITY_PATTERN.captures(label.trim())?;
    Some(CapabilityName {
        name: captures["name"].to_string(),
        instance: captures.name("instance").map(|m| m.as_str().to_string()),
        property: captures["property"].to_string(),
        component: captures.name("component").map(|m| m.as_str().to_string()),
        tag: captures.name("tag").map(|m| m.as_str().to_string()),
    })
}

/// Extract the endpoint type name from an `Endpoint.<Name>` label.
pub fn parse_group_endpoint(label: &str) -> Option<String> {
    GROUP_ENDPOINT_PATTERN
        .captures(label.trim())
        .map(|captures| captures["type"].to_string())
}
