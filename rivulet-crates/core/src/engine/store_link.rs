use std::sync::Arc;

use super::variables::DomainId;
use crate::basic_types::RuntimeError;
use crate::store::Value;
use crate::store::VariableRef;
use crate::store::VariableStatus;
use crate::store::VariableStore;

/// Ties a finite-domain variable to a dataflow variable, so threads can wait for the constraint
/// space to determine it and the space can pick up values bound by threads.
#[derive(Debug)]
pub(crate) struct StoreLink {
    domain: DomainId,
    variable: VariableRef,
    store: Arc<VariableStore>,
}

/// What the dataflow side of a link currently says about the domain.
pub(crate) enum LinkedBinding {
    Unbound,
    Value(i32),
    /// Failed, or bound to something which is not a 32-bit integer.
    Incompatible,
}

impl StoreLink {
    pub(crate) fn new(store: Arc<VariableStore>, domain: DomainId, variable: VariableRef) -> Self {
        StoreLink {
            domain,
            variable,
            store,
        }
    }

    pub(crate) fn domain(&self) -> DomainId {
        self.domain
    }

    pub(crate) fn binding(&self) -> LinkedBinding {
        match self.store.status(self.variable) {
            VariableStatus::Unbound => LinkedBinding::Unbound,
            VariableStatus::Bound(Value::Int(value)) => {
                i32::try_from(value).map_or(LinkedBinding::Incompatible, LinkedBinding::Value)
            }
            VariableStatus::Bound(_) | VariableStatus::Failed(_) => LinkedBinding::Incompatible,
        }
    }

    /// Binds the dataflow variable to the value the domain was fixed to.
    pub(crate) fn bind(&self, value: i32) -> Result<(), RuntimeError> {
        self.store.bind(self.variable, Value::Int(i64::from(value)))
    }

    pub(crate) fn fail(&self, reason: &str) {
        let _ = self.store.fail(
            self.variable,
            RuntimeError::Inconsistency {
                reason: reason.to_owned(),
            },
        );
    }
}
