//! Minimal OPC UA client check: connects anonymously, resolves the simulation
//! namespace, and reads Equipment_1's Temperature tag.

use opcua::client::prelude::*;
use opcua::types::{
    AttributeId, DataValue, NodeId, QualifiedName, ReadValueId, StatusCode, TimestampsToReturn,
    UAString, UserTokenPolicy, Variant,
};
use sim_core::TagName;
use std::env;

const TARGET_NAMESPACE: &str = "http://examples.freeopcua.github.io";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let endpoint = env::args()
        .nth(1)
        .or_else(|| env::var("OPCSIM_ENDPOINT").ok())
        .unwrap_or_else(|| "opc.tcp://127.0.0.1:4841".to_string());

    let client_config = ClientBuilder::new()
        .application_name("opcsim smoke")
        .application_uri("urn:opcsim:smoke")
        .create_sample_keypair(true)
        .trust_server_certs(true)
        .session_retry_limit(1)
        .config();
    let mut client = Client::new(client_config);

    let endpoint_desc: EndpointDescription = (
        endpoint.as_str(),
        "None",
        MessageSecurityMode::None,
        UserTokenPolicy::anonymous(),
    )
        .into();

    eprintln!("opcua_smoke: connecting to {endpoint}");
    let session = client
        .connect_to_endpoint(endpoint_desc, IdentityToken::Anonymous)
        .map_err(std::io::Error::other)?;
    let mut session = session.write();

    let ns = read_namespace_array(&mut session)?
        .iter()
        .position(|ns| ns == TARGET_NAMESPACE)
        .map(|idx| idx as u16)
        .ok_or("simulation namespace not advertised by server")?;

    let tag = TagName::Temperature;
    let node = NodeId::new(ns, format!("Equipment_1.{tag}"));
    let value = read_value(&mut session, node)?;
    let variant = value.value.ok_or("missing value")?;
    match variant {
        Variant::Double(v) => {
            println!("OPC UA smoke ok: Equipment_1 {tag} = {v}");
            Ok(())
        }
        other => Err(format!("unexpected value type: {other:?}").into()),
    }
}

fn read_namespace_array(session: &mut Session) -> Result<Vec<String>, StatusCode> {
    // ns=0;i=2255 is the server's NamespaceArray
    let value = read_value(session, NodeId::new(0u16, 2255u32))?;
    let variant = value.value.ok_or(StatusCode::BadUnexpectedError)?;
    match variant {
        Variant::Array(arr) => Ok(arr
            .values
            .into_iter()
            .filter_map(|value| match value {
                Variant::String(s) => Some(s.to_string()),
                _ => None,
            })
            .collect()),
        Variant::String(s) => Ok(vec![s.to_string()]),
        _ => Err(StatusCode::BadUnexpectedError),
    }
}

fn read_value(session: &mut Session, node_id: NodeId) -> Result<DataValue, StatusCode> {
    let read_value = ReadValueId {
        node_id,
        attribute_id: AttributeId::Value as u32,
        index_range: UAString::null(),
        data_encoding: QualifiedName::null(),
    };
    let mut values = session.read(&[read_value], TimestampsToReturn::Both, 0.0)?;
    values.pop().ok_or(StatusCode::BadUnexpectedError)
}
