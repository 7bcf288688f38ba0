//! Test fixtures: a scripted iwd backend and realistic object maps

use std::collections::{HashMap, VecDeque};
use std::io;
use std::sync::{Arc, Mutex};

use super::error::IwdError;
use super::source::IwdBackend;
use super::types::{InterfaceBag, PropertyMap, PropertyValue, RankedNetwork};

pub use super::types::ObjectMap;

pub const NAMESPACE: &str = "/net/connman/iwd";
pub const ADAPTER: &str = "/net/connman/iwd/0";
pub const DEVICE: &str = "/net/connman/iwd/0/4";

fn path(value: &str) -> PropertyValue {
    PropertyValue::ObjectPath(value.to_string())
}

fn props(entries: Vec<(&str, PropertyValue)>) -> PropertyMap {
    entries
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect()
}

/// Network object as iwd publishes it
pub fn network(name: &str, device: &str, variant: &str) -> InterfaceBag {
    InterfaceBag::from([(
        "net.connman.iwd.Network".to_string(),
        props(vec![
            ("Name", PropertyValue::from(name)),
            ("Connected", PropertyValue::Bool(false)),
            ("Device", path(device)),
            ("Type", PropertyValue::from(variant)),
        ]),
    )])
}

/// KnownNetwork object as iwd publishes it
pub fn known_network(name: &str, variant: &str, last_connected: Option<&str>) -> InterfaceBag {
    let mut properties = props(vec![
        ("Name", PropertyValue::from(name)),
        ("Type", PropertyValue::from(variant)),
        ("Hidden", PropertyValue::Bool(false)),
        ("AutoConnect", PropertyValue::Bool(true)),
    ]);
    if let Some(time) = last_connected {
        properties.insert("LastConnectedTime".to_string(), PropertyValue::from(time));
    }

    InterfaceBag::from([("net.connman.iwd.KnownNetwork".to_string(), properties)])
}

/// One adapter with one station device that sees three networks
pub fn fixture_objects(connected: Option<&str>, scanning: bool) -> ObjectMap {
    let mut station = props(vec![
        ("Scanning", PropertyValue::Bool(scanning)),
        (
            "State",
            PropertyValue::from(if connected.is_some() { "connected" } else { "disconnected" }),
        ),
    ]);
    if let Some(network) = connected {
        station.insert("ConnectedNetwork".to_string(), path(network));
    }

    let mut objects = ObjectMap::new();
    objects.insert(
        "/".to_string(),
        InterfaceBag::from([(
            "org.freedesktop.DBus.ObjectManager".to_string(),
            PropertyMap::new(),
        )]),
    );
    objects.insert(
        NAMESPACE.to_string(),
        InterfaceBag::from([("net.connman.iwd.Daemon".to_string(), PropertyMap::new())]),
    );
    objects.insert(
        ADAPTER.to_string(),
        InterfaceBag::from([(
            "net.connman.iwd.Adapter".to_string(),
            props(vec![
                ("Powered", PropertyValue::Bool(true)),
                ("Name", PropertyValue::from("phy0")),
            ]),
        )]),
    );
    objects.insert(
        DEVICE.to_string(),
        InterfaceBag::from([
            (
                "net.connman.iwd.Device".to_string(),
                props(vec![
                    ("Name", PropertyValue::from("wlan0")),
                    ("Mode", PropertyValue::from("station")),
                    ("Adapter", path(ADAPTER)),
                ]),
            ),
            ("net.connman.iwd.Station".to_string(), station),
        ]),
    );
    objects.insert(
        "/net/connman/iwd/0/4/686f6d65_psk".to_string(),
        network("home", DEVICE, "psk"),
    );
    objects.insert(
        "/net/connman/iwd/0/4/636166c3a9_open".to_string(),
        network("café", DEVICE, "open"),
    );
    objects.insert(
        "/net/connman/iwd/0/4/6f6666696365_8021x".to_string(),
        network("office", DEVICE, "8021x"),
    );

    objects
}

/// Backend that replays canned answers and records scan requests
#[derive(Debug, Default)]
pub struct FakeBackend {
    objects: ObjectMap,
    /// Answers handed out before falling back to `objects`
    queued: Mutex<VecDeque<Result<ObjectMap, IwdError>>>,
    rankings: HashMap<String, Vec<RankedNetwork>>,
    scans: Mutex<Vec<String>>,
    fail_scans: bool,
    fail_ranking: bool,
}

impl FakeBackend {
    pub fn new(objects: ObjectMap) -> Self {
        Self {
            objects,
            ..Self::default()
        }
    }

    pub fn with_ranking(mut self, device: &str, ranking: &[(&str, i32)]) -> Self {
        self.rankings.insert(
            device.to_string(),
            ranking
                .iter()
                .map(|(path, score)| RankedNetwork::new(*path, *score))
                .collect(),
        );
        self
    }

    /// Answer the next `managed_objects` call with `answer`
    pub fn then_objects(self, answer: Result<ObjectMap, IwdError>) -> Self {
        self.queued.lock().unwrap().push_back(answer);
        self
    }

    pub fn failing_scans(mut self) -> Self {
        self.fail_scans = true;
        self
    }

    pub fn failing_ranking(mut self) -> Self {
        self.fail_ranking = true;
        self
    }

    /// Devices a scan was requested for, in call order
    pub fn scans(&self) -> Vec<String> {
        self.scans.lock().unwrap().clone()
    }
}

/// Error iwd reports for a rejected method call
pub fn call_failure(method: &'static str, device: &str) -> IwdError {
    IwdError::Call {
        method,
        device: device.to_string(),
        source: zbus::Error::Failure("Operation already in progress".to_string()),
    }
}

/// Error zbus reports once the bus socket is gone
pub fn broken_bus() -> IwdError {
    IwdError::ObjectManager(zbus::fdo::Error::ZBus(zbus::Error::InputOutput(Arc::new(
        io::Error::new(io::ErrorKind::BrokenPipe, "bus socket closed"),
    ))))
}

impl IwdBackend for FakeBackend {
    async fn managed_objects(&self) -> Result<ObjectMap, IwdError> {
        match self.queued.lock().unwrap().pop_front() {
            Some(answer) => answer,
            None => Ok(self.objects.clone()),
        }
    }

    async fn scan(&self, device: &str) -> Result<(), IwdError> {
        self.scans.lock().unwrap().push(device.to_string());
        if self.fail_scans {
            return Err(call_failure("Scan", device));
        }
        Ok(())
    }

    async fn ordered_networks(&self, device: &str) -> Result<Vec<RankedNetwork>, IwdError> {
        if self.fail_ranking {
            return Err(call_failure("GetOrderedNetworks", device));
        }
        Ok(self.rankings.get(device).cloned().unwrap_or_default())
    }
}
