use std::fmt::Display;
use std::fmt::Formatter;
use std::sync::Arc;

use itertools::Itertools;

use super::VariableRef;

/// The contents of a bound dataflow variable.
///
/// Records are partial structures: their fields are variables, so a record can be handed out
/// before all of its fields are known.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Value {
    Unit,
    Int(i64),
    Atom(Atom),
    Record(Record),
    /// A reference to another variable. Binding a variable to this aliases the two.
    Var(VariableRef),
}

impl Value {
    pub fn atom(name: &str) -> Value {
        Value::Atom(Atom::new(name))
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_atom(&self) -> Option<&Atom> {
        match self {
            Value::Atom(atom) => Some(atom),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Value::Record(record) => Some(record),
            _ => None,
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<VariableRef> for Value {
    fn from(variable: VariableRef) -> Self {
        Value::Var(variable)
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Unit => write!(f, "unit"),
            Value::Int(value) => write!(f, "{value}"),
            Value::Atom(atom) => write!(f, "{atom}"),
            Value::Record(record) => write!(f, "{record}"),
            Value::Var(variable) => write!(f, "{variable}"),
        }
    }
}

/// An interned-by-sharing symbolic constant.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Atom(Arc<str>);

impl Atom {
    pub fn new(name: &str) -> Atom {
        Atom(Arc::from(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Atom {
    fn from(name: &str) -> Self {
        Atom::new(name)
    }
}

impl Display for Atom {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A labelled tuple of variables.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Record {
    label: Atom,
    fields: Arc<[VariableRef]>,
}

impl Record {
    pub fn new(label: impl Into<Atom>, fields: impl IntoIterator<Item = VariableRef>) -> Record {
        Record {
            label: label.into(),
            fields: fields.into_iter().collect(),
        }
    }

    pub fn label(&self) -> &Atom {
        &self.label
    }

    pub fn fields(&self) -> &[VariableRef] {
        &self.fields
    }

    pub fn arity(&self) -> usize {
        self.fields.len()
    }

    pub fn field(&self, index: usize) -> Option<VariableRef> {
        self.fields.get(index).copied()
    }

    /// Whether both records have the same label and arity, which is what unification requires.
    pub(crate) fn has_shape_of(&self, other: &Record) -> bool {
        self.label == other.label && self.arity() == other.arity()
    }
}

impl Display for Record {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.label, self.fields.iter().join(", "))
    }
}
