use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;
use std::sync::Weak;

use log::debug;
use log::trace;

use super::ExportedValue;
use super::GatewayEvent;
use super::GatewaySink;
use super::RemoteId;
use crate::basic_types::RuntimeError;
use crate::containers::HashMap;
use crate::containers::HashSet;
use crate::store::Atom;
use crate::store::Determination;
use crate::store::Value;
use crate::store::VariableRef;
use crate::store::VariableStatus;
use crate::store::VariableStore;

/// Variables are keyed by their representative at the time they crossed the gateway.
#[derive(Debug, Default)]
struct GatewayTables {
    /// Local proxies of variables owned by the peer.
    imports: HashMap<RemoteId, VariableRef>,
    proxies: HashMap<VariableRef, RemoteId>,
    /// Local variables the peer knows about.
    exports: HashMap<RemoteId, VariableRef>,
    exported: HashMap<VariableRef, RemoteId>,
    /// Variables determined by a message from the peer, which must not be echoed back.
    delivered: HashSet<VariableRef>,
    next_export: u64,
}

#[derive(Debug)]
struct GatewayShared<Sink> {
    store: Arc<VariableStore>,
    sink: Sink,
    tables: Mutex<GatewayTables>,
}

/// Translates between local variables and the references a peer uses for them.
///
/// A variable crosses the gateway in one of two directions. [`RemoteBindingGateway::import_remote`]
/// creates a local proxy for a variable of the peer; [`RemoteBindingGateway::export`] hands a local
/// variable to the peer. In both cases the gateway watches the variable and sends a
/// [`GatewayEvent`] once it is determined locally. Bindings which arrive from the peer are applied
/// with [`RemoteBindingGateway::deliver_binding`].
#[derive(Debug)]
pub struct RemoteBindingGateway<Sink> {
    shared: Arc<GatewayShared<Sink>>,
}

impl<Sink: GatewaySink> RemoteBindingGateway<Sink> {
    pub fn new(store: Arc<VariableStore>, sink: Sink) -> Self {
        RemoteBindingGateway {
            shared: Arc::new(GatewayShared {
                store,
                sink,
                tables: Mutex::default(),
            }),
        }
    }

    /// The local proxy of `remote`, created on first use.
    pub fn import_remote(&self, remote: RemoteId) -> Result<VariableRef, RuntimeError> {
        self.shared.import(remote)
    }

    /// The value of `variable` as the peer sees it. Unbound parts are exported as references,
    /// and their bindings are sent to the peer once they happen.
    pub fn export(&self, variable: VariableRef) -> Result<ExportedValue, RuntimeError> {
        self.shared
            .export_variable(variable, &mut HashSet::default())
    }

    /// The binding of `variable`, which must be determined: a failed variable gives its error.
    pub fn export_binding(&self, variable: VariableRef) -> Result<ExportedValue, RuntimeError> {
        match self.shared.store.status(variable) {
            VariableStatus::Bound(value) => self
                .shared
                .export_value(&value, &mut self.shared.export_path(variable)),
            VariableStatus::Failed(error) => Err(error),
            VariableStatus::Unbound => Err(RuntimeError::Raised(format!(
                "{variable} is not bound and cannot be exported as a binding"
            ))),
        }
    }

    /// Applies a binding sent by the peer for one of the variables known to both sides.
    ///
    /// References in `value` name variables of the peer and are imported.
    pub fn deliver_binding(
        &self,
        remote: RemoteId,
        value: ExportedValue,
    ) -> Result<(), RuntimeError> {
        let target = self.shared.target_of(remote)?;
        let value = self.shared.import_value(value)?;
        trace!("Peer bound {remote} ({target}) to {value}");

        let representative = self.shared.store.resolve(target);
        let _ = self.shared.lock().delivered.insert(representative);

        let result = self.shared.store.bind(target, value);
        if result.is_err() {
            let _ = self.shared.lock().delivered.remove(&representative);
        }
        result
    }

    /// Fails the variable known as `remote` because the peer reported it as lost or invalid.
    ///
    /// Returns whether the variable was still unbound.
    pub fn deliver_failure(
        &self,
        remote: RemoteId,
        reason: impl Into<String>,
    ) -> Result<bool, RuntimeError> {
        let target = self.shared.target_of(remote)?;
        let representative = self.shared.store.resolve(target);
        let _ = self.shared.lock().delivered.insert(representative);

        let error = RuntimeError::RemoteFailure {
            remote,
            reason: reason.into(),
        };
        debug!("{error}");

        let failed = self.shared.store.fail(target, error);
        if !failed {
            let _ = self.shared.lock().delivered.remove(&representative);
        }
        Ok(failed)
    }

    /// Asks the peer for the binding of the imported `variable`. Nothing is sent when the variable
    /// is determined already.
    pub fn request_fetch(&self, variable: VariableRef) -> Result<(), RuntimeError> {
        let representative = self.shared.store.resolve(variable);
        let remote = self
            .shared
            .lock()
            .proxies
            .get(&representative)
            .copied()
            .ok_or_else(|| RuntimeError::Raised(format!("{variable} is not a remote proxy")))?;

        if !self.shared.store.status(variable).is_determined() {
            self.shared.sink.send(GatewayEvent::FetchValue { remote });
        }
        Ok(())
    }

    /// Handles a fetch request of the peer for an exported variable: a determined variable is
    /// sent again, an unbound one is sent once it is bound.
    pub fn answer_fetch(&self, remote: RemoteId) -> Result<(), RuntimeError> {
        let variable = self.shared.target_of(remote)?;
        match self.shared.store.status(variable) {
            VariableStatus::Unbound => {}
            VariableStatus::Bound(value) => {
                let event = match self
                    .shared
                    .export_value(&value, &mut self.shared.export_path(variable))
                {
                    Ok(value) => GatewayEvent::BindRemote { remote, value },
                    Err(error) => failed_event(remote, &error),
                };
                self.shared.sink.send(event);
            }
            VariableStatus::Failed(error) => self.shared.sink.send(failed_event(remote, &error)),
        }
        Ok(())
    }

    pub fn sink(&self) -> &Sink {
        &self.shared.sink
    }
}

impl<Sink: GatewaySink> GatewayShared<Sink> {
    fn lock(&self) -> MutexGuard<'_, GatewayTables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn target_of(&self, remote: RemoteId) -> Result<VariableRef, RuntimeError> {
        let tables = self.lock();
        tables
            .imports
            .get(&remote)
            .or_else(|| tables.exports.get(&remote))
            .copied()
            .ok_or_else(|| RuntimeError::RemoteFailure {
                remote,
                reason: "unknown remote reference".to_owned(),
            })
    }

    fn import(self: &Arc<Self>, remote: RemoteId) -> Result<VariableRef, RuntimeError> {
        if let Some(&variable) = self.lock().imports.get(&remote) {
            return Ok(variable);
        }

        let variable = self.store.new_variable()?;
        {
            let mut tables = self.lock();
            if let Some(&existing) = tables.imports.get(&remote) {
                return Ok(existing);
            }
            let _ = tables.imports.insert(remote, variable);
            let _ = tables.proxies.insert(variable, remote);
        }
        debug!("Imported {remote} as {variable}");

        self.watch(variable, remote);
        Ok(variable)
    }

    /// Reports the determination of `variable` to the peer, unless the peer caused it.
    fn watch(self: &Arc<Self>, variable: VariableRef, remote: RemoteId) {
        let gateway: Weak<Self> = Arc::downgrade(self);
        self.store
            .when_determined(variable, move |determined, determination| {
                if let Some(gateway) = gateway.upgrade() {
                    gateway.forward(determined, remote, determination);
                }
            });
    }

    fn forward(self: &Arc<Self>, variable: VariableRef, remote: RemoteId, determination: &Determination) {
        let representative = self.store.resolve(variable);
        if self.lock().delivered.remove(&representative) {
            return;
        }

        let event = match determination {
            Determination::Bound(value) => {
                match self.export_value(value, &mut self.export_path(variable)) {
                    Ok(value) => GatewayEvent::BindRemote { remote, value },
                    Err(error) => failed_event(remote, &error),
                }
            }
            Determination::Failed(error) => failed_event(remote, error),
        };
        trace!("Sending {event:?}");
        self.sink.send(event);
    }

    /// The representatives on the way from an exported root down to the value being exported.
    fn export_path(&self, root: VariableRef) -> HashSet<VariableRef> {
        std::iter::once(self.store.resolve(root)).collect()
    }

    /// Exports `variable`. A variable which is already on `path` is part of a cycle and is sent
    /// as a reference, its binding follows as a separate event.
    fn export_variable(
        self: &Arc<Self>,
        variable: VariableRef,
        path: &mut HashSet<VariableRef>,
    ) -> Result<ExportedValue, RuntimeError> {
        let representative = self.store.resolve(variable);
        if path.contains(&representative) {
            return Ok(ExportedValue::Remote(self.export_id(representative)));
        }

        match self.store.status(representative) {
            VariableStatus::Bound(value) => {
                let _ = path.insert(representative);
                let exported = self.export_value(&value, path);
                let _ = path.remove(&representative);
                exported
            }
            VariableStatus::Failed(error) => Err(error),
            VariableStatus::Unbound => Ok(ExportedValue::Remote(self.export_id(representative))),
        }
    }

    fn export_value(
        self: &Arc<Self>,
        value: &Value,
        path: &mut HashSet<VariableRef>,
    ) -> Result<ExportedValue, RuntimeError> {
        match value {
            Value::Unit => Ok(ExportedValue::Unit),
            Value::Int(value) => Ok(ExportedValue::Int(*value)),
            Value::Atom(atom) => Ok(ExportedValue::Atom(atom.as_str().to_owned())),
            Value::Record(record) => Ok(ExportedValue::Record {
                label: record.label().as_str().to_owned(),
                fields: record
                    .fields()
                    .iter()
                    .map(|&field| self.export_variable(field, path))
                    .collect::<Result<_, _>>()?,
            }),
            Value::Var(variable) => self.export_variable(*variable, path),
        }
    }

    /// The reference under which the peer knows the unbound `variable`.
    fn export_id(self: &Arc<Self>, variable: VariableRef) -> RemoteId {
        let representative = self.store.resolve(variable);
        let remote = {
            let mut tables = self.lock();
            if let Some(&remote) = tables
                .proxies
                .get(&representative)
                .or_else(|| tables.exported.get(&representative))
            {
                return remote;
            }

            let remote = RemoteId(tables.next_export);
            tables.next_export += 1;
            let _ = tables.exports.insert(remote, representative);
            let _ = tables.exported.insert(representative, remote);
            remote
        };
        debug!("Exported {variable} as {remote}");

        self.watch(representative, remote);
        remote
    }

    fn import_value(self: &Arc<Self>, value: ExportedValue) -> Result<Value, RuntimeError> {
        match value {
            ExportedValue::Unit => Ok(Value::Unit),
            ExportedValue::Int(value) => Ok(Value::Int(value)),
            ExportedValue::Atom(name) => Ok(Value::Atom(Atom::new(&name))),
            ExportedValue::Record { label, fields } => {
                let fields = fields
                    .into_iter()
                    .map(|field| self.import_value(field))
                    .collect::<Result<Vec<_>, _>>()?;
                self.store.new_record(label.as_str(), fields)
            }
            ExportedValue::Remote(remote) => self.import(remote).map(Value::Var),
        }
    }
}

fn failed_event(remote: RemoteId, error: &RuntimeError) -> GatewayEvent {
    GatewayEvent::Failed {
        remote,
        reason: error.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use crossbeam_channel::Receiver;

    use super::*;
    use crate::gateway::ChannelSink;
    use crate::store::Record;

    fn gateway() -> (
        Arc<VariableStore>,
        RemoteBindingGateway<ChannelSink>,
        Receiver<GatewayEvent>,
    ) {
        let store = Arc::new(VariableStore::new(1024));
        let (sink, events) = ChannelSink::new();
        let gateway = RemoteBindingGateway::new(Arc::clone(&store), sink);
        (store, gateway, events)
    }

    #[test]
    fn importing_twice_gives_the_same_proxy() {
        let (_, gateway, _) = gateway();

        let first = gateway.import_remote(RemoteId(7)).unwrap();
        let second = gateway.import_remote(RemoteId(7)).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn local_binding_of_a_proxy_is_sent_to_the_peer() {
        let (store, gateway, events) = gateway();
        let proxy = gateway.import_remote(RemoteId(3)).unwrap();

        store.bind(proxy, Value::Int(5)).unwrap();

        assert_eq!(
            vec![GatewayEvent::BindRemote {
                remote: RemoteId(3),
                value: ExportedValue::Int(5),
            }],
            events.try_iter().collect::<Vec<_>>()
        );
    }

    #[test]
    fn delivered_binding_is_applied_and_not_echoed() {
        let (store, gateway, events) = gateway();
        let proxy = gateway.import_remote(RemoteId(3)).unwrap();

        gateway
            .deliver_binding(RemoteId(3), ExportedValue::Atom("ok".to_owned()))
            .unwrap();

        assert_eq!(Some(Value::atom("ok")), store.value(proxy));
        assert!(events.try_recv().is_err());
    }

    #[test]
    fn conflicting_delivery_is_reported() {
        let (store, gateway, _) = gateway();
        let proxy = gateway.import_remote(RemoteId(1)).unwrap();
        store.bind(proxy, Value::Int(1)).unwrap();

        let result = gateway.deliver_binding(RemoteId(1), ExportedValue::Int(2));

        assert!(matches!(result, Err(RuntimeError::Conflict { .. })));
        assert_eq!(Some(Value::Int(1)), store.value(proxy));
    }

    #[test]
    fn record_with_an_unbound_field_is_exported_with_a_reference() {
        let (store, gateway, events) = gateway();
        let hole = store.new_variable().unwrap();
        let record = store
            .new_record("pair", [Value::Int(1), Value::Var(hole)])
            .unwrap();
        let variable = store.new_bound(record).unwrap();

        let exported = gateway.export(variable).unwrap();

        assert_eq!(
            ExportedValue::Record {
                label: "pair".to_owned(),
                fields: vec![ExportedValue::Int(1), ExportedValue::Remote(RemoteId(0))],
            },
            exported
        );

        store.bind(hole, Value::Int(2)).unwrap();

        assert_eq!(
            vec![GatewayEvent::BindRemote {
                remote: RemoteId(0),
                value: ExportedValue::Int(2),
            }],
            events.try_iter().collect::<Vec<_>>()
        );
    }

    #[test]
    fn cyclic_record_is_exported_through_a_reference() {
        let (store, gateway, events) = gateway();
        let x = store.new_variable().unwrap();
        store.bind(x, Value::Record(Record::new("f", [x]))).unwrap();

        let exported = gateway.export(x).unwrap();

        let cycle = ExportedValue::Record {
            label: "f".to_owned(),
            fields: vec![ExportedValue::Remote(RemoteId(0))],
        };
        assert_eq!(cycle, exported);
        assert_eq!(
            vec![GatewayEvent::BindRemote {
                remote: RemoteId(0),
                value: cycle,
            }],
            events.try_iter().collect::<Vec<_>>()
        );
    }

    #[test]
    fn exported_variable_bound_to_a_cycle_is_forwarded_once() {
        let (store, gateway, events) = gateway();
        let x = store.new_variable().unwrap();
        let y = store.new_variable().unwrap();
        assert_eq!(ExportedValue::Remote(RemoteId(0)), gateway.export(x).unwrap());

        store.bind(y, Value::Record(Record::new("g", [x]))).unwrap();
        store.bind(x, Value::Record(Record::new("f", [y]))).unwrap();

        let sent = events.try_iter().collect::<Vec<_>>();
        assert_eq!(
            vec![GatewayEvent::BindRemote {
                remote: RemoteId(0),
                value: ExportedValue::Record {
                    label: "f".to_owned(),
                    fields: vec![ExportedValue::Record {
                        label: "g".to_owned(),
                        fields: vec![ExportedValue::Remote(RemoteId(0))],
                    }],
                },
            }],
            sent
        );
    }

    #[test]
    fn imported_record_fields_become_proxies() {
        let (store, gateway, _) = gateway();
        let proxy = gateway.import_remote(RemoteId(10)).unwrap();

        gateway
            .deliver_binding(
                RemoteId(10),
                ExportedValue::Record {
                    label: "cons".to_owned(),
                    fields: vec![ExportedValue::Int(1), ExportedValue::Remote(RemoteId(11))],
                },
            )
            .unwrap();
        gateway
            .deliver_binding(RemoteId(11), ExportedValue::Atom("nil".to_owned()))
            .unwrap();

        let record = store.value(proxy).unwrap();
        let tail = record.as_record().unwrap().field(1).unwrap();
        assert_eq!(Some(Value::atom("nil")), store.value(tail));
    }

    #[test]
    fn delivered_failure_fails_the_proxy() {
        let (store, gateway, events) = gateway();
        let proxy = gateway.import_remote(RemoteId(4)).unwrap();

        assert!(gateway.deliver_failure(RemoteId(4), "peer lost").unwrap());

        assert_eq!(
            VariableStatus::Failed(RuntimeError::RemoteFailure {
                remote: RemoteId(4),
                reason: "peer lost".to_owned(),
            }),
            store.status(proxy)
        );
        assert!(events.try_recv().is_err());
    }

    #[test]
    fn unknown_remote_is_a_remote_failure() {
        let (_, gateway, _) = gateway();

        assert!(matches!(
            gateway.deliver_binding(RemoteId(99), ExportedValue::Unit),
            Err(RuntimeError::RemoteFailure { .. })
        ));
    }

    #[test]
    fn fetch_is_requested_for_unbound_proxies_only() {
        let (store, gateway, events) = gateway();
        let proxy = gateway.import_remote(RemoteId(5)).unwrap();

        gateway.request_fetch(proxy).unwrap();
        assert_eq!(
            Ok(GatewayEvent::FetchValue {
                remote: RemoteId(5)
            }),
            events.try_recv()
        );

        store.bind(proxy, Value::Unit).unwrap();
        let _ = events.try_recv();
        gateway.request_fetch(proxy).unwrap();
        assert!(events.try_recv().is_err());

        let local = store.new_variable().unwrap();
        assert!(gateway.request_fetch(local).is_err());
    }

    #[test]
    fn export_binding_of_unbound_variable_is_an_error() {
        let (store, gateway, _) = gateway();
        let variable = store.new_variable().unwrap();

        assert!(gateway.export_binding(variable).is_err());

        store.bind(variable, Value::Int(9)).unwrap();
        assert_eq!(Ok(ExportedValue::Int(9)), gateway.export_binding(variable));
    }
}
