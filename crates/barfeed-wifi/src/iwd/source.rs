//! iwd D-Bus backend
//!
//! The projection needs three calls from iwd: the full object list, a scan
//! trigger, and the per-station ranked network list. [`IwdBackend`] is that
//! seam; [`IwdClient`] implements it over the system bus.

use tracing::debug;
use zbus::fdo::ObjectManagerProxy;
use zbus::zvariant::OwnedObjectPath;
use zbus::{proxy, Connection};

use super::error::IwdError;
use super::types::{InterfaceBag, ObjectMap, PropertyMap, PropertyValue, RankedNetwork};

/// Station interface of an iwd device.
#[proxy(interface = "net.connman.iwd.Station", default_service = "net.connman.iwd")]
trait Station {
    /// Start a scan; iwd updates the network list when it completes.
    fn scan(&self) -> zbus::Result<()>;

    /// Visible networks, best first, with signal strength in 100 * dBm.
    fn get_ordered_networks(&self) -> zbus::Result<Vec<(OwnedObjectPath, i16)>>;
}

/// Calls the snapshot projection makes against the network service
pub trait IwdBackend {
    /// Flat list of every object the service publishes
    async fn managed_objects(&self) -> Result<ObjectMap, IwdError>;

    /// Ask a station device to start scanning
    async fn scan(&self, device: &str) -> Result<(), IwdError>;

    /// The station's visible networks in preference order
    async fn ordered_networks(&self, device: &str) -> Result<Vec<RankedNetwork>, IwdError>;
}

/// iwd client over the D-Bus system bus
#[derive(Debug, Clone)]
pub struct IwdClient {
    connection: Connection,
    service: String,
}

impl IwdClient {
    /// Connect to the system bus and target the iwd service named `service`
    ///
    /// # Errors
    ///
    /// Returns `IwdError::ConnectionFailed` if the system bus is unreachable.
    pub async fn connect(service: &str) -> Result<Self, IwdError> {
        let connection = Connection::system()
            .await
            .map_err(IwdError::ConnectionFailed)?;

        debug!(service, "Connected to system bus");

        Ok(Self {
            connection,
            service: service.to_string(),
        })
    }

    async fn station(&self, device: &str, method: &'static str) -> Result<StationProxy<'_>, IwdError> {
        let call_error = |source| IwdError::Call {
            method,
            device: device.to_string(),
            source,
        };

        StationProxy::builder(&self.connection)
            .destination(self.service.as_str())
            .map_err(call_error)?
            .path(device.to_string())
            .map_err(call_error)?
            .build()
            .await
            .map_err(call_error)
    }
}

impl IwdBackend for IwdClient {
    async fn managed_objects(&self) -> Result<ObjectMap, IwdError> {
        let manager = ObjectManagerProxy::builder(&self.connection)
            .destination(self.service.as_str())
            .and_then(|builder| builder.path("/"))
            .map_err(|e| IwdError::ObjectManager(e.into()))?
            .build()
            .await
            .map_err(|e| IwdError::ObjectManager(e.into()))?;

        let objects = manager.get_managed_objects().await?;

        Ok(objects
            .into_iter()
            .map(|(path, interfaces)| {
                let bag: InterfaceBag = interfaces
                    .into_iter()
                    .map(|(name, properties)| {
                        let properties: PropertyMap = properties
                            .iter()
                            .map(|(key, value)| (key.clone(), PropertyValue::from(&**value)))
                            .collect();
                        (name.to_string(), properties)
                    })
                    .collect();
                (path.to_string(), bag)
            })
            .collect())
    }

    async fn scan(&self, device: &str) -> Result<(), IwdError> {
        self.station(device, "Scan")
            .await?
            .scan()
            .await
            .map_err(|source| IwdError::Call {
                method: "Scan",
                device: device.to_string(),
                source,
            })
    }

    async fn ordered_networks(&self, device: &str) -> Result<Vec<RankedNetwork>, IwdError> {
        let networks = self
            .station(device, "GetOrderedNetworks")
            .await?
            .get_ordered_networks()
            .await
            .map_err(|source| IwdError::Call {
                method: "GetOrderedNetworks",
                device: device.to_string(),
                source,
            })?;

        Ok(networks
            .into_iter()
            .map(|(path, score)| RankedNetwork::new(path.to_string(), i32::from(score)))
            .collect())
    }
}
