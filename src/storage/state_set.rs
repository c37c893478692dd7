use bitvec::prelude::*;
use bitvec::slice::IterOnes;
use std::fmt::{Debug, Display, Formatter};

/// Index of a state in one concrete state space (the full model or a sub-model).
///
/// All per-state data (matrix rows, value vectors, priorities) are flat arrays indexed by
/// [`StateId`]. Indices of a sub-model are *not* comparable with indices of the model it
/// was extracted from; use [`StateSet::compress`] to translate sets between the two.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StateId(usize);

impl StateId {
    pub const fn new(index: usize) -> StateId {
        StateId(index)
    }

    pub const fn index(self) -> usize {
        self.0
    }
}

impl From<usize> for StateId {
    fn from(value: usize) -> Self {
        StateId(value)
    }
}

impl Debug for StateId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "s{}", self.0)
    }
}

impl Display for StateId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A fixed-length set of states backed by a [`BitVec`].
///
/// Unlike a growable bit set, the universe size is part of the value: two sets can only be
/// combined if they range over the same number of states, which is checked by assertions.
#[derive(Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StateSet {
    bits: BitVec<u64, Lsb0>,
}

impl StateSet {
    /// An empty set over `universe` states.
    pub fn empty(universe: usize) -> StateSet {
        StateSet {
            bits: bitvec![u64, Lsb0; 0; universe],
        }
    }

    /// The set of all `universe` states.
    pub fn full(universe: usize) -> StateSet {
        StateSet {
            bits: bitvec![u64, Lsb0; 1; universe],
        }
    }

    pub fn from_states<I: IntoIterator<Item = StateId>>(universe: usize, states: I) -> StateSet {
        let mut result = StateSet::empty(universe);
        for state in states {
            result.insert(state);
        }
        result
    }

    /// Shorthand for [`StateSet::from_states`] with raw indices (mostly useful in tests).
    pub fn from_indices(universe: usize, indices: &[usize]) -> StateSet {
        StateSet::from_states(universe, indices.iter().map(|it| StateId::new(*it)))
    }

    /// The number of states this set ranges over (not the number of members).
    pub fn universe(&self) -> usize {
        self.bits.len()
    }

    pub fn len(&self) -> usize {
        self.bits.count_ones()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.not_any()
    }

    pub fn contains(&self, state: StateId) -> bool {
        self.assert_in_range(state);
        self.bits[state.index()]
    }

    /// Add `state` to the set. Returns `true` if the state was not a member before.
    pub fn insert(&mut self, state: StateId) -> bool {
        self.assert_in_range(state);
        !self.bits.replace(state.index(), true)
    }

    /// Remove `state` from the set. Returns `true` if the state was a member.
    pub fn remove(&mut self, state: StateId) -> bool {
        self.assert_in_range(state);
        self.bits.replace(state.index(), false)
    }

    pub fn union(&self, other: &StateSet) -> StateSet {
        self.assert_same_universe(other);
        StateSet {
            bits: self.bits.clone() | other.bits.clone(),
        }
    }

    pub fn intersect(&self, other: &StateSet) -> StateSet {
        self.assert_same_universe(other);
        StateSet {
            bits: self.bits.clone() & other.bits.clone(),
        }
    }

    pub fn minus(&self, other: &StateSet) -> StateSet {
        self.assert_same_universe(other);
        StateSet {
            bits: self.bits.clone() & !other.bits.clone(),
        }
    }

    pub fn complement(&self) -> StateSet {
        StateSet {
            bits: !self.bits.clone(),
        }
    }

    pub fn is_subset(&self, other: &StateSet) -> bool {
        self.minus(other).is_empty()
    }

    pub fn is_disjoint(&self, other: &StateSet) -> bool {
        self.intersect(other).is_empty()
    }

    /// The smallest member of this set.
    pub fn first(&self) -> Option<StateId> {
        self.bits.first_one().map(StateId::new)
    }

    /// Iterate the members in increasing order.
    pub fn iter(&self) -> StateSetIterator<'_> {
        StateSetIterator {
            ones: self.bits.iter_ones(),
        }
    }

    /// Re-index this set into the sub-model that only consists of the states in `restriction`.
    ///
    /// The `i`-th member of `restriction` becomes state `i` of the result. Members of `self`
    /// outside of `restriction` are dropped.
    pub fn compress(&self, restriction: &StateSet) -> StateSet {
        self.assert_same_universe(restriction);
        StateSet {
            bits: restriction.bits.iter_ones().map(|i| self.bits[i]).collect(),
        }
    }

    fn assert_in_range(&self, state: StateId) {
        assert!(
            state.index() < self.bits.len(),
            "State {} out of range for a set over {} states.",
            state,
            self.bits.len()
        );
    }

    fn assert_same_universe(&self, other: &StateSet) {
        assert_eq!(
            self.bits.len(),
            other.bits.len(),
            "Correctness violation: Combining sets over different state spaces."
        );
    }
}

impl<'a> IntoIterator for &'a StateSet {
    type Item = StateId;
    type IntoIter = StateSetIterator<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

pub struct StateSetIterator<'a> {
    ones: IterOnes<'a, u64, Lsb0>,
}

impl Iterator for StateSetIterator<'_> {
    type Item = StateId;

    fn next(&mut self) -> Option<StateId> {
        self.ones.next().map(StateId::new)
    }
}

impl Debug for StateSet {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::{StateId, StateSet};

    #[test]
    fn full_set_has_no_padding_members() {
        let full = StateSet::full(70);
        assert_eq!(full.len(), 70);
        assert_eq!(full.complement().len(), 0);
        assert_eq!(full.iter().last(), Some(StateId::new(69)));
    }

    #[test]
    fn set_operations_follow_membership() {
        let a = StateSet::from_indices(10, &[0, 2, 4, 9]);
        let b = StateSet::from_indices(10, &[2, 3, 9]);

        assert_eq!(a.union(&b), StateSet::from_indices(10, &[0, 2, 3, 4, 9]));
        assert_eq!(a.intersect(&b), StateSet::from_indices(10, &[2, 9]));
        assert_eq!(a.minus(&b), StateSet::from_indices(10, &[0, 4]));
        assert!(a.intersect(&b).is_subset(&a));
        assert!(a.minus(&b).is_disjoint(&b));
        assert_eq!(a.first(), Some(StateId::new(0)));
    }

    #[test]
    fn compress_renumbers_members() {
        let restriction = StateSet::from_indices(8, &[1, 3, 5, 7]);
        let set = StateSet::from_indices(8, &[0, 3, 7]);
        // State 3 is the second member of the restriction, state 7 the fourth.
        assert_eq!(set.compress(&restriction), StateSet::from_indices(4, &[1, 3]));
    }

    #[test]
    fn insert_and_remove_report_membership_changes() {
        let mut set = StateSet::empty(130);
        assert!(set.insert(StateId::new(128)));
        assert!(!set.insert(StateId::new(128)));
        assert!(set.insert(StateId::new(3)));
        assert_eq!(set.len(), 2);
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![StateId::new(3), StateId::new(128)]);
        assert!(set.remove(StateId::new(3)));
        assert!(!set.remove(StateId::new(3)));
        assert_eq!(set.first(), Some(StateId::new(128)));
        assert!(!StateSet::empty(0).iter().any(|_| true));
    }

    #[test]
    #[should_panic]
    fn mixing_universes_is_rejected() {
        let _ = StateSet::empty(3).union(&StateSet::empty(4));
    }
}
