//! The local end of the distribution layer.
//!
//! The [`RemoteBindingGateway`] turns incoming "this remote variable is bound" messages into
//! local bindings and reports local bindings of exported or imported variables through a
//! [`GatewaySink`]. Values cross the gateway as [`ExportedValue`]s; how those are encoded and
//! where they are sent is up to the transport behind the sink.
mod exported_value;
mod remote_binding_gateway;
mod remote_id;
mod sink;

pub use exported_value::ExportedValue;
pub use remote_binding_gateway::RemoteBindingGateway;
pub use remote_id::RemoteId;
pub use sink::ChannelSink;
pub use sink::GatewayEvent;
pub use sink::GatewaySink;
