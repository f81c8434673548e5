//! Overlap counting between candidates that share daughter tracks.

use itertools::Itertools;

/// True when the two candidates have no daughter in common.
#[inline(always)]
pub fn are_independent<T: PartialEq>(a: &[T], b: &[T]) -> bool {
    !a.iter().any(|x| b.contains(x))
}

/// Number of independent candidates, coarsened for the double-charm triggers.
///
/// Fewer than two candidates returns the count itself. Otherwise the answer is
/// 0 when every candidate shares a daughter with every other one, and 2 as
/// soon as one disjoint pair exists. Callers only test `>= 2`.
pub fn compute_number_of_candidates<T: PartialEq>(indices: &[Vec<T>]) -> usize {
    if indices.len() < 2 {
        return indices.len();
    }

    let has_independent_pair = indices
        .iter()
        .tuple_combinations()
        .any(|(a, b)| are_independent(a, b));

    if has_independent_pair {
        2
    } else {
        0
    }
}
