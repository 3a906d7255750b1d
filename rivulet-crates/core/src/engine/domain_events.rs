use enumset::enum_set;
use enumset::EnumSet;
use enumset::EnumSetType;

/// A kind of change to an integer domain.
#[derive(Debug, EnumSetType, Hash)]
pub enum DomainEvent {
    /// The domain became a single value.
    Assign,
    LowerBound,
    UpperBound,
    /// At least one value left the domain. Every narrowing raises this.
    Removal,
}

impl DomainEvent {
    /// The event as seen through a view with a negative scale, which swaps the bounds.
    pub(crate) fn mirrored(self) -> DomainEvent {
        match self {
            DomainEvent::LowerBound => DomainEvent::UpperBound,
            DomainEvent::UpperBound => DomainEvent::LowerBound,
            event => event,
        }
    }
}

/// Sets of [`DomainEvent`]s a propagator can subscribe to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DomainEvents {
    events: EnumSet<DomainEvent>,
}

impl DomainEvents {
    pub const BOUNDS: DomainEvents =
        DomainEvents::new(enum_set!(DomainEvent::LowerBound | DomainEvent::UpperBound));
    pub const ANY_INT: DomainEvents = DomainEvents::new(enum_set!(
        DomainEvent::Assign | DomainEvent::LowerBound | DomainEvent::UpperBound | DomainEvent::Removal
    ));
    pub const LOWER_BOUND: DomainEvents = DomainEvents::new(enum_set!(DomainEvent::LowerBound));
    pub const UPPER_BOUND: DomainEvents = DomainEvents::new(enum_set!(DomainEvent::UpperBound));
    pub const ASSIGN: DomainEvents = DomainEvents::new(enum_set!(DomainEvent::Assign));
    pub const REMOVAL: DomainEvents = DomainEvents::new(enum_set!(DomainEvent::Removal));

    pub const fn new(events: EnumSet<DomainEvent>) -> DomainEvents {
        DomainEvents { events }
    }

    pub fn get_events(&self) -> EnumSet<DomainEvent> {
        self.events
    }
}
