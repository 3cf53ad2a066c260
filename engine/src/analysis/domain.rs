use std::cmp::Ordering;
use std::fmt::Debug;

/// An abstract domain which forms a lattice
pub trait AbstractDomain: Clone + Eq + Debug {
    /// Least upper bound: keep only what both values agree on
    fn join(&self, other: &Self) -> Self;

    /// Greatest lower bound, `None` when the two values contradict each other
    fn meet(&self, other: &Self) -> Option<Self>;

    /// Information ordering: `Less` means `self` describes a superset of `other`
    fn partial_order(&self, other: &Self) -> Option<Ordering>;

    /// Check whether `self` is at most as precise as `other`
    fn subsumes(&self, other: &Self) -> bool {
        matches!(
            self.partial_order(other),
            Some(Ordering::Less) | Some(Ordering::Equal)
        )
    }
}

/// Fold a sequence of abstract values with `join`, `None` if there is none
pub fn join_all<D, I>(values: I) -> Option<D>
where
    D: AbstractDomain,
    I: IntoIterator<Item = D>,
{
    values
        .into_iter()
        .fold(None, |acc: Option<D>, item| match acc {
            None => Some(item),
            Some(prev) => Some(prev.join(&item)),
        })
}

/// Fold a sequence of abstract values with `meet`, `None` on contradiction
pub fn meet_all<D, I>(first: D, rest: I) -> Option<D>
where
    D: AbstractDomain,
    I: IntoIterator<Item = D>,
{
    rest.into_iter()
        .try_fold(first, |acc, item| acc.meet(&item))
}
