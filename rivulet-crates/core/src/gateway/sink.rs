use crossbeam_channel::Receiver;
use crossbeam_channel::Sender;
use log::warn;

use super::ExportedValue;
use super::RemoteId;

/// A message for the peer behind the gateway.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GatewayEvent {
    /// The variable known to the peer as `remote` is bound to `value`.
    BindRemote {
        remote: RemoteId,
        value: ExportedValue,
    },
    /// Ask the owner of `remote` to send its binding once there is one.
    FetchValue { remote: RemoteId },
    /// The variable known as `remote` failed.
    Failed { remote: RemoteId, reason: String },
}

/// Where the gateway sends its events.
///
/// Events are sent from whichever thread determines a variable, so implementations must not
/// block for long and must not call back into the gateway.
pub trait GatewaySink: Send + Sync + 'static {
    fn send(&self, event: GatewayEvent);
}

/// A [`GatewaySink`] which puts events on an unbounded channel.
#[derive(Clone, Debug)]
pub struct ChannelSink {
    sender: Sender<GatewayEvent>,
}

impl ChannelSink {
    pub fn new() -> (ChannelSink, Receiver<GatewayEvent>) {
        let (sender, receiver) = crossbeam_channel::unbounded();
        (ChannelSink { sender }, receiver)
    }
}

impl GatewaySink for ChannelSink {
    fn send(&self, event: GatewayEvent) {
        if let Err(error) = self.sender.send(event) {
            warn!("Dropped gateway event {:?}: the receiver is gone", error.into_inner());
        }
    }
}
