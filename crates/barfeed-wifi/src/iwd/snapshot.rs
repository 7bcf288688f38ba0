//! Snapshot projection
//!
//! Walks the object path tree below the iwd namespace and turns every
//! adapter's devices into a [`State`]. Station devices are filled in from
//! the backend's ranked network list; other devices are reported empty.

use tracing::{debug, trace};

use super::error::SnapshotError;
use super::source::IwdBackend;
use super::tree::TreeNode;
use super::types::{
    strength_from_score, KnownNetwork, Network, ObjectMap, PropertyMap, State,
    ADAPTER_INTERFACE, DEVICE_INTERFACE, KNOWN_NETWORK_INTERFACE, NETWORK_INTERFACE,
    STATION_SUFFIX,
};

/// Projection switches
#[derive(Debug, Clone, Copy, Default)]
pub struct ProjectOptions {
    /// Fill `known_networks` from the KnownNetwork objects in the namespace
    pub include_known_networks: bool,
}

/// Typed access to one interface's properties on one object
struct Properties<'a> {
    path: &'a str,
    interface: &'a str,
    map: &'a PropertyMap,
}

impl<'a> Properties<'a> {
    fn new(path: &'a str, interface: &'a str, map: &'a PropertyMap) -> Self {
        Self {
            path,
            interface,
            map,
        }
    }

    fn missing(&self, property: &'static str) -> SnapshotError {
        SnapshotError::MissingProperty {
            path: self.path.to_string(),
            interface: self.interface.to_string(),
            property,
        }
    }

    fn wrong_type(&self, property: &'static str, expected: &'static str) -> SnapshotError {
        SnapshotError::PropertyType {
            path: self.path.to_string(),
            interface: self.interface.to_string(),
            property,
            expected,
        }
    }

    fn string(&self, property: &'static str) -> Result<String, SnapshotError> {
        self.optional_string(property)?
            .ok_or_else(|| self.missing(property))
    }

    fn optional_string(&self, property: &'static str) -> Result<Option<String>, SnapshotError> {
        match self.map.get(property) {
            None => Ok(None),
            Some(value) => value
                .as_str()
                .map(|s| Some(s.to_string()))
                .ok_or_else(|| self.wrong_type(property, "string")),
        }
    }

    fn boolean(&self, property: &'static str) -> Result<bool, SnapshotError> {
        self.map
            .get(property)
            .ok_or_else(|| self.missing(property))?
            .as_bool()
            .ok_or_else(|| self.wrong_type(property, "boolean"))
    }
}

/// Project the tree into one `State` per device
///
/// `namespace` is the object path under which iwd publishes adapters
/// (normally `/net/connman/iwd`). `objects` is the flat map the tree was
/// built from; ranked network paths are resolved against it.
///
/// States come out in lexical object path order, adapter first and then
/// device, so `/net/connman/iwd/10` sorts before `/net/connman/iwd/2`.
///
/// # Errors
///
/// Returns `SnapshotError::Tree` if the namespace is absent,
/// `MissingProperty`/`PropertyType`/`MissingObject` for incomplete objects,
/// and `Source` if the ranking call fails. Scan failures are not errors.
pub async fn project<B: IwdBackend>(
    tree: &TreeNode,
    namespace: &str,
    backend: &B,
    objects: &ObjectMap,
    options: ProjectOptions,
) -> Result<Vec<State>, SnapshotError> {
    let root = tree.descend(namespace)?;

    let known_networks = if options.include_known_networks {
        known_networks(root)?
    } else {
        Vec::new()
    };

    let mut states = Vec::new();

    for (adapter_path, adapter) in root.children_with(ADAPTER_INTERFACE) {
        trace!(adapter = adapter_path, "Visiting adapter");

        for (device_path, device) in adapter.children_with(DEVICE_INTERFACE) {
            let mut state = State::empty(device_path);

            for (interface, properties) in station_interfaces(device) {
                let station = Properties::new(device_path, interface, properties);
                fill_station(&mut state, &station, backend, objects).await?;
            }

            state.known_networks = known_networks.clone();
            states.push(state);
        }
    }

    Ok(states)
}

/// Interfaces on `device` whose last dotted segment is `Station`
fn station_interfaces(device: &TreeNode) -> impl Iterator<Item = (&str, &PropertyMap)> + '_ {
    device
        .interfaces
        .iter()
        .filter(|(name, _)| name.rsplit('.').next() == Some(STATION_SUFFIX))
        .map(|(name, properties)| (name.as_str(), properties))
}

async fn fill_station<B: IwdBackend>(
    state: &mut State,
    station: &Properties<'_>,
    backend: &B,
    objects: &ObjectMap,
) -> Result<(), SnapshotError> {
    if !station.boolean("Scanning")? {
        // Fire and forget; iwd refuses while busy and the next poll will retry
        if let Err(e) = backend.scan(&state.device).await {
            debug!(device = %state.device, error = %e, "Scan request ignored");
        }
    }

    // iwd only publishes ConnectedNetwork while associated
    let connected_path = station.optional_string("ConnectedNetwork")?;

    let ranking = backend.ordered_networks(&state.device).await?;

    for ranked in ranking {
        let properties = objects
            .get(&ranked.path)
            .and_then(|bag| bag.get(NETWORK_INTERFACE))
            .ok_or_else(|| SnapshotError::MissingObject {
                path: ranked.path.clone(),
                interface: NETWORK_INTERFACE,
            })?;
        let props = Properties::new(&ranked.path, NETWORK_INTERFACE, properties);

        let network = Network {
            path: ranked.path.clone(),
            name: props.string("Name")?,
            device: props.string("Device")?,
            variant: props.string("Type")?,
            strength: strength_from_score(ranked.score),
        };

        if connected_path.as_deref() == Some(network.path.as_str()) {
            state.connected = Some(network);
        } else {
            state.networks.push(network);
        }
    }

    Ok(())
}

fn known_networks(root: &TreeNode) -> Result<Vec<KnownNetwork>, SnapshotError> {
    root.children
        .iter()
        .filter_map(|(path, node)| Some((path, node.interface(KNOWN_NETWORK_INTERFACE)?)))
        .map(|(path, map)| -> Result<KnownNetwork, SnapshotError> {
            let props = Properties::new(path, KNOWN_NETWORK_INTERFACE, map);

            Ok(KnownNetwork {
                path: path.clone(),
                name: props.string("Name")?,
                variant: props.string("Type")?,
                hidden: props.boolean("Hidden")?,
                auto_connect: props.boolean("AutoConnect")?,
                last_connected_time: props.optional_string("LastConnectedTime")?,
            })
        })
        .collect()
}
