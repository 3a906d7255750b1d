use enumset::EnumSet;

use super::domain::IntegerDomain;
use super::predicates::Predicate;
use super::variables::DomainId;
use super::DomainEvent;
use crate::basic_types::Trail;
use crate::containers::KeyedVec;
use crate::rivulet_assert_moderate;

/// Applying a predicate would have left a domain without values.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EmptyDomain;

/// The domains of all integer variables of a constraint space, together with the trail needed to
/// restore them on backtrack.
///
/// A domain is copied onto the trail the first time it changes after a checkpoint, so going back
/// to a checkpoint only touches the domains which changed since.
#[derive(Clone, Debug, Default)]
pub struct Assignments {
    domains: KeyedVec<DomainId, IntegerDomain>,
    /// The checkpoint at which the domain was last copied to the trail.
    saved_at: KeyedVec<DomainId, usize>,
    trail: Trail<TrailEntry>,
}

#[derive(Clone, Debug)]
struct TrailEntry {
    domain: DomainId,
    previous: IntegerDomain,
    previous_saved_at: usize,
}

impl Assignments {
    pub(crate) fn grow(&mut self, lower_bound: i32, upper_bound: i32) -> DomainId {
        self.grow_with_domain(IntegerDomain::new(lower_bound, upper_bound))
    }

    pub(crate) fn grow_with_domain(&mut self, domain: IntegerDomain) -> DomainId {
        let _ = self.saved_at.push(0);
        self.domains.push(domain)
    }

    pub fn num_domains(&self) -> usize {
        self.domains.len()
    }

    pub fn get_domains(&self) -> impl Iterator<Item = DomainId> {
        self.domains.keys()
    }

    pub fn get_lower_bound(&self, domain: DomainId) -> i32 {
        self.domains[domain].lower_bound()
    }

    pub fn get_upper_bound(&self, domain: DomainId) -> i32 {
        self.domains[domain].upper_bound()
    }

    pub fn is_value_in_domain(&self, domain: DomainId, value: i32) -> bool {
        self.domains[domain].contains(value)
    }

    pub fn is_domain_assigned(&self, domain: DomainId) -> bool {
        self.domains[domain].is_fixed()
    }

    pub fn get_assigned_value(&self, domain: DomainId) -> Option<i32> {
        self.is_domain_assigned(domain)
            .then(|| self.get_lower_bound(domain))
    }

    pub fn get_domain_size(&self, domain: DomainId) -> u64 {
        self.domains[domain].size()
    }

    pub fn get_domain_iterator(&self, domain: DomainId) -> impl Iterator<Item = i32> + '_ {
        self.domains[domain].iter()
    }

    /// Whether every domain is a single value.
    pub fn all_assigned(&self) -> bool {
        self.domains.iter().all(IntegerDomain::is_fixed)
    }

    pub fn is_predicate_satisfied(&self, predicate: Predicate) -> bool {
        let domain = &self.domains[predicate.get_domain()];
        match predicate {
            Predicate::LowerBound { lower_bound, .. } => domain.lower_bound() >= lower_bound,
            Predicate::UpperBound { upper_bound, .. } => domain.upper_bound() <= upper_bound,
            Predicate::NotEqual {
                not_equal_constant, ..
            } => !domain.contains(not_equal_constant),
            Predicate::Equal {
                equality_constant, ..
            } => domain.is_fixed() && domain.lower_bound() == equality_constant,
        }
    }

    pub fn is_predicate_falsified(&self, predicate: Predicate) -> bool {
        self.is_predicate_satisfied(predicate.negated())
    }

    pub fn get_checkpoint(&self) -> usize {
        self.trail.get_checkpoint()
    }

    pub(crate) fn new_checkpoint(&mut self) {
        self.trail.new_checkpoint()
    }

    /// Restore every domain to what it was when `checkpoint` was the current checkpoint.
    pub(crate) fn synchronise(&mut self, checkpoint: usize) {
        for entry in self.trail.synchronise(checkpoint) {
            self.domains[entry.domain] = entry.previous;
            self.saved_at[entry.domain] = entry.previous_saved_at;
        }
    }

    /// Narrow a domain so that `predicate` holds.
    ///
    /// Returns the events the narrowing raised, which is empty when the predicate already held.
    /// Nothing changes when the predicate is falsified.
    pub(crate) fn apply(&mut self, predicate: Predicate) -> Result<EnumSet<DomainEvent>, EmptyDomain> {
        if self.is_predicate_satisfied(predicate) {
            return Ok(EnumSet::empty());
        }
        if self.is_predicate_falsified(predicate) {
            return Err(EmptyDomain);
        }

        let domain_id = predicate.get_domain();
        self.save(domain_id);

        let domain = &mut self.domains[domain_id];
        let events = match predicate {
            Predicate::LowerBound { lower_bound, .. } => domain.set_lower_bound(lower_bound),
            Predicate::UpperBound { upper_bound, .. } => domain.set_upper_bound(upper_bound),
            Predicate::NotEqual {
                not_equal_constant, ..
            } => domain.remove(not_equal_constant),
            Predicate::Equal {
                equality_constant, ..
            } => domain.assign(equality_constant),
        };
        rivulet_assert_moderate!(!events.is_empty());

        Ok(events)
    }

    /// Root-level narrowing to the intersection with `values`. Nothing is trailed.
    pub(crate) fn restrict_to(
        &mut self,
        domain_id: DomainId,
        values: impl IntoIterator<Item = i32>,
    ) -> Result<EnumSet<DomainEvent>, EmptyDomain> {
        rivulet_assert_moderate!(self.get_checkpoint() == 0);

        let old = &self.domains[domain_id];
        let restricted = IntegerDomain::from_values(values.into_iter().filter(|&v| old.contains(v)))
            .ok_or(EmptyDomain)?;
        if restricted == *old {
            return Ok(EnumSet::empty());
        }

        let mut events = EnumSet::only(DomainEvent::Removal);
        if restricted.lower_bound() != old.lower_bound() {
            let _ = events.insert(DomainEvent::LowerBound);
        }
        if restricted.upper_bound() != old.upper_bound() {
            let _ = events.insert(DomainEvent::UpperBound);
        }
        if restricted.is_fixed() {
            let _ = events.insert(DomainEvent::Assign);
        }
        self.domains[domain_id] = restricted;

        Ok(events)
    }

    fn save(&mut self, domain: DomainId) {
        let checkpoint = self.trail.get_checkpoint();
        if checkpoint == 0 || self.saved_at[domain] == checkpoint {
            return;
        }

        self.trail.push(TrailEntry {
            domain,
            previous: self.domains[domain].clone(),
            previous_saved_at: self.saved_at[domain],
        });
        self.saved_at[domain] = checkpoint;
    }

    /// Number of domain copies currently on the trail.
    pub(crate) fn trail_len(&self) -> usize {
        self.trail.len()
    }
}
