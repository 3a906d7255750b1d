use std::fmt::Display;
use std::fmt::Formatter;

use itertools::Itertools;

use super::RemoteId;

/// A value as it crosses the gateway. Unbound parts are replaced by references.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ExportedValue {
    Unit,
    Int(i64),
    Atom(String),
    Record {
        label: String,
        fields: Vec<ExportedValue>,
    },
    /// A variable which was not bound when the value was exported.
    Remote(RemoteId),
}

impl Display for ExportedValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportedValue::Unit => write!(f, "unit"),
            ExportedValue::Int(value) => write!(f, "{value}"),
            ExportedValue::Atom(name) => write!(f, "{name}"),
            ExportedValue::Record { label, fields } => {
                write!(f, "{label}({})", fields.iter().join(", "))
            }
            ExportedValue::Remote(remote) => write!(f, "{remote}"),
        }
    }
}
