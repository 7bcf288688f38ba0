//! Internal types for iwd object data
//!
//! Raw D-Bus property bags are converted into [`PropertyValue`]s at the bus
//! boundary so the tree and projection code never touch `zvariant` directly.
//! The snapshot records at the bottom of this module are what gets printed.

use std::collections::HashMap;

use serde::Serialize;

/// Interface marking an object as a wireless adapter (radio)
pub const ADAPTER_INTERFACE: &str = "net.connman.iwd.Adapter";

/// Interface marking an object as a network device
pub const DEVICE_INTERFACE: &str = "net.connman.iwd.Device";

/// Last dotted segment of the station interface name
pub const STATION_SUFFIX: &str = "Station";

/// Interface carried by visible network objects
pub const NETWORK_INTERFACE: &str = "net.connman.iwd.Network";

/// Interface carried by saved network profiles
pub const KNOWN_NETWORK_INTERFACE: &str = "net.connman.iwd.KnownNetwork";

/// A single D-Bus property value, reduced to the shapes iwd actually uses
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Bool(bool),
    Int(i64),
    Str(String),
    ObjectPath(String),
    /// Arrays, dicts, structures and anything else we never read
    Other,
}

impl PropertyValue {
    /// String contents of a string or object-path value
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) | Self::ObjectPath(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<&zbus::zvariant::Value<'_>> for PropertyValue {
    fn from(value: &zbus::zvariant::Value<'_>) -> Self {
        use zbus::zvariant::Value;

        match value {
            Value::Bool(b) => Self::Bool(*b),
            Value::U8(n) => Self::Int(i64::from(*n)),
            Value::I16(n) => Self::Int(i64::from(*n)),
            Value::U16(n) => Self::Int(i64::from(*n)),
            Value::I32(n) => Self::Int(i64::from(*n)),
            Value::U32(n) => Self::Int(i64::from(*n)),
            Value::I64(n) => Self::Int(*n),
            Value::U64(n) => i64::try_from(*n).map(Self::Int).unwrap_or(Self::Other),
            Value::Str(s) => Self::Str(s.to_string()),
            Value::ObjectPath(p) => Self::ObjectPath(p.to_string()),
            Value::Value(inner) => Self::from(&**inner),
            _ => Self::Other,
        }
    }
}

/// Property name -> value for one interface
pub type PropertyMap = HashMap<String, PropertyValue>;

/// Interface name -> properties for one object
pub type InterfaceBag = HashMap<String, PropertyMap>;

/// Object path -> interfaces, as returned by `GetManagedObjects`
pub type ObjectMap = HashMap<String, InterfaceBag>;

/// One entry of a station's ranked network list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedNetwork {
    /// Object path of the network
    pub path: String,
    /// Signal score in hundredths of a dBm
    pub score: i32,
}

impl RankedNetwork {
    pub fn new(path: impl Into<String>, score: i32) -> Self {
        Self {
            path: path.into(),
            score,
        }
    }
}

/// A visible network as printed in the snapshot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Network {
    pub path: String,
    pub name: String,
    /// Object path of the device that sees this network
    pub device: String,
    /// iwd network type (`open`, `psk`, `8021x`, ...)
    pub variant: String,
    /// Ranking score divided by 100; comparable, not a percentage
    pub strength: f64,
}

/// Convert a raw ranking score into the stored strength
pub fn strength_from_score(score: i32) -> f64 {
    f64::from(score) / 100.0
}

/// A saved network profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KnownNetwork {
    pub path: String,
    pub name: String,
    pub variant: String,
    pub hidden: bool,
    pub auto_connect: bool,
    /// Opaque timestamp string, absent if the network was never joined
    pub last_connected_time: Option<String>,
}

/// Snapshot of one network device
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct State {
    pub device: String,
    pub connected: Option<Network>,
    pub networks: Vec<Network>,
    pub known_networks: Vec<KnownNetwork>,
}

impl State {
    /// A device with nothing to report yet
    pub fn empty(device: impl Into<String>) -> Self {
        Self {
            device: device.into(),
            connected: None,
            networks: Vec::new(),
            known_networks: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zbus::zvariant::{ObjectPath, Value};

    #[test]
    fn test_strength_conversion() {
        assert_eq!(strength_from_score(6120), 61.2);
        assert_eq!(strength_from_score(-4500), -45.0);
        assert_eq!(strength_from_score(0), 0.0);
    }

    #[test]
    fn test_property_value_from_variant() {
        assert_eq!(PropertyValue::from(&Value::Bool(true)), PropertyValue::Bool(true));
        assert_eq!(PropertyValue::from(&Value::I16(-7200)), PropertyValue::Int(-7200));
        assert_eq!(
            PropertyValue::from(&Value::from("psk")),
            PropertyValue::Str("psk".to_string())
        );

        let path = ObjectPath::try_from("/net/connman/iwd/0/4").unwrap();
        assert_eq!(
            PropertyValue::from(&Value::ObjectPath(path)),
            PropertyValue::ObjectPath("/net/connman/iwd/0/4".to_string())
        );
    }

    #[test]
    fn test_property_value_unwraps_nested_variant() {
        let nested = Value::Value(Box::new(Value::Bool(false)));
        assert_eq!(PropertyValue::from(&nested), PropertyValue::Bool(false));
    }

    #[test]
    fn test_property_value_accessors() {
        assert_eq!(PropertyValue::ObjectPath("/a".into()).as_str(), Some("/a"));
        assert_eq!(PropertyValue::Str("b".into()).as_str(), Some("b"));
        assert_eq!(PropertyValue::Int(1).as_str(), None);
        assert_eq!(PropertyValue::Bool(true).as_bool(), Some(true));
        assert_eq!(PropertyValue::Other.as_bool(), None);
    }

    #[test]
    fn test_state_serializes_with_null_connected() {
        let state = State::empty("/net/connman/iwd/0/4");
        let json = serde_json::to_string(&state).unwrap();
        assert_eq!(
            json,
            r#"{"device":"/net/connman/iwd/0/4","connected":null,"networks":[],"known_networks":[]}"#
        );
    }

    #[test]
    fn test_network_serialized_field_names() {
        let network = Network {
            path: "/net/connman/iwd/0/4/6e6574_psk".to_string(),
            name: "net".to_string(),
            device: "/net/connman/iwd/0/4".to_string(),
            variant: "psk".to_string(),
            strength: -45.0,
        };

        let value = serde_json::to_value(&network).unwrap();
        assert_eq!(value["name"], "net");
        assert_eq!(value["variant"], "psk");
        assert_eq!(value["strength"], -45.0);
        assert_eq!(value["device"], "/net/connman/iwd/0/4");
    }
}
