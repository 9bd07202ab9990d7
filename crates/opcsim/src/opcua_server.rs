//! OPC UA side of the simulation: server construction, the [`NodeSpace`]
//! implementation backed by the server's address space, and the scoped stop
//! guard for the running server.

use opcua::server::prelude::*;
use sim_core::{NodeSpace, SpaceError, TagName, WritableHandle};
use std::sync::Arc;
use std::thread;
use thiserror::Error;
use tracing::{info, warn};

type SharedAddressSpace = Arc<opcua::sync::RwLock<AddressSpace>>;

#[derive(Clone, Debug)]
pub struct OpcuaConfig {
    pub endpoint: String,
    pub namespace_uri: String,
    pub container_name: String,
}

impl Default for OpcuaConfig {
    fn default() -> Self {
        Self {
            endpoint: "opc.tcp://127.0.0.1:4841/freeopcua/server/".to_string(),
            namespace_uri: "http://examples.freeopcua.github.io".to_string(),
            container_name: "SimulatedData".to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to register namespace {uri:?}")]
    NamespaceRegistration { uri: String },

    #[error("failed to create container node {name:?}")]
    ContainerCreate { name: String },
}

/// Builds the server and the simulation container, returning the server
/// (not yet accepting connections) and the node-space adapter the registry
/// builder populates.
pub fn build_server(config: &OpcuaConfig) -> Result<(Server, OpcuaSpace), ServerError> {
    let (host, port) = parse_endpoint(&config.endpoint);

    let mut server_config = ServerBuilder::new_anonymous("opcsim OPC UA")
        .application_uri("urn:opcsim:opcua")
        .product_uri("urn:opcsim:opcua")
        .config();

    server_config.create_sample_keypair = true;
    server_config.tcp_config.host = host;
    server_config.tcp_config.port = port;

    let server = Server::new(server_config);
    let address_space = server.address_space();

    let (ns, container_id) = {
        let mut space = address_space.write();
        let ns = space
            .register_namespace(&config.namespace_uri)
            .map_err(|_| ServerError::NamespaceRegistration {
                uri: config.namespace_uri.clone(),
            })?;
        let objects = NodeId::objects_folder_id();
        let container_id = space
            .add_folder(&config.container_name, &config.container_name, &objects)
            .map_err(|_| ServerError::ContainerCreate {
                name: config.container_name.clone(),
            })?;
        (ns, container_id)
    };

    info!(
        namespace = ns,
        container = %config.container_name,
        "simulation namespace registered"
    );

    Ok((
        server,
        OpcuaSpace {
            address_space,
            ns,
            container_id,
        },
    ))
}

/// Equipment object node created under the simulation container.
pub struct EquipmentNode {
    id: NodeId,
    name: String,
}

/// [`NodeSpace`] over the server's address space.
pub struct OpcuaSpace {
    address_space: SharedAddressSpace,
    ns: u16,
    container_id: NodeId,
}

impl NodeSpace for OpcuaSpace {
    type Object = EquipmentNode;
    type Handle = OpcuaHandle;

    fn add_object(&mut self, name: &str) -> Result<EquipmentNode, SpaceError> {
        let mut space = self.address_space.write();
        let id = space
            .add_folder(name, name, &self.container_id)
            .map_err(|_| SpaceError::ObjectCreate {
                name: name.to_string(),
            })?;
        Ok(EquipmentNode {
            id,
            name: name.to_string(),
        })
    }

    fn add_variable(
        &mut self,
        parent: &EquipmentNode,
        tag: TagName,
        initial: f64,
    ) -> Result<OpcuaHandle, SpaceError> {
        let node_id = NodeId::new(self.ns, format!("{}.{}", parent.name, tag));
        let variable = VariableBuilder::new(&node_id, tag.as_str(), tag.as_str())
            .data_type(DataTypeId::Double)
            .value(initial)
            .build();

        let mut space = self.address_space.write();
        let added = space.add_variables(vec![variable], &parent.id);
        if added.into_iter().all(|ok| ok) {
            Ok(OpcuaHandle {
                node_id,
                address_space: Arc::clone(&self.address_space),
            })
        } else {
            Err(SpaceError::VariableCreate {
                object: parent.name.clone(),
                tag,
            })
        }
    }
}

/// Writable handle for one variable node. Each handle is owned exclusively by
/// the update loop; the lock is the address space's own.
pub struct OpcuaHandle {
    node_id: NodeId,
    address_space: SharedAddressSpace,
}

impl WritableHandle for OpcuaHandle {
    fn set_value(&mut self, value: f64) -> Result<(), SpaceError> {
        let now = DateTime::now();
        let mut space = self.address_space.write();
        if space.set_variable_value(&self.node_id, value, &now, &now) {
            Ok(())
        } else {
            Err(SpaceError::WriteRejected {
                node: self.node_id.to_string(),
            })
        }
    }
}

/// Running server with a guaranteed, single `abort()` on every exit path.
///
/// Constructed only after the registry build succeeds, so a build failure
/// never reaches the stop call.
pub struct ServerGuard {
    server: Arc<opcua::sync::RwLock<Server>>,
    stopped: bool,
}

impl ServerGuard {
    /// Starts accepting connections on a background thread.
    pub fn start(server: Server) -> Self {
        let server = Arc::new(opcua::sync::RwLock::new(server));
        let server_for_run = Arc::clone(&server);
        thread::spawn(move || {
            Server::run_server(server_for_run);
        });
        Self {
            server,
            stopped: false,
        }
    }

    pub fn stop(&mut self) {
        if !self.stopped {
            self.stopped = true;
            warn!("OPC UA server stopping");
            self.server.write().abort();
        }
    }
}

impl Drop for ServerGuard {
    fn drop(&mut self) {
        self.stop();
    }
}

fn parse_endpoint(endpoint: &str) -> (String, u16) {
    let trimmed = endpoint.trim();
    let without_scheme = trimmed.strip_prefix("opc.tcp://").unwrap_or(trimmed);
    let mut parts = without_scheme.split('/').next().unwrap_or("").split(':');
    let host = parts.next().unwrap_or("127.0.0.1").to_string();
    let port = parts
        .next()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(4841);
    (host, port)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_host_and_port_from_the_default_endpoint() {
        let (host, port) = parse_endpoint("opc.tcp://127.0.0.1:4841/freeopcua/server/");
        assert_eq!(host, "127.0.0.1");
        assert_eq!(port, 4841);
    }

    #[test]
    fn missing_pieces_fall_back_to_defaults() {
        let (host, port) = parse_endpoint("opc.tcp://0.0.0.0");
        assert_eq!(host, "0.0.0.0");
        assert_eq!(port, 4841);

        let (host, port) = parse_endpoint("example.com:4840");
        assert_eq!(host, "example.com");
        assert_eq!(port, 4840);
    }
}
