use hftrigger::combinatorics::{are_independent, compute_number_of_candidates};
use proptest::prelude::*;
use rstest::rstest;

#[rstest]
#[case::empty(vec![], 0)]
#[case::single(vec![vec![1, 2]], 1)]
#[case::two_disjoint(vec![vec![0, 1], vec![2, 3]], 2)]
#[case::two_overlapping(vec![vec![0, 1], vec![1, 2]], 0)]
#[case::many_disjoint_still_two(vec![vec![0], vec![1], vec![2], vec![3]], 2)]
#[case::all_share_one(vec![vec![0, 1, 2], vec![0, 3, 4], vec![5, 0, 6]], 0)]
fn test_number_of_candidates(#[case] cands: Vec<Vec<usize>>, #[case] expected: usize) {
    assert_eq!(compute_number_of_candidates(&cands), expected);
}

#[test]
fn test_independence() {
    assert!(are_independent(&[1, 2], &[3, 4, 5]));
    assert!(!are_independent(&[1, 2], &[2]));
    assert!(are_independent::<u32>(&[], &[1]));
}

proptest! {
    #[test]
    fn test_result_is_zero_or_two_for_multiple(
        cands in prop::collection::vec(prop::collection::vec(0usize..10, 1..4), 2..8)
    ) {
        let n = compute_number_of_candidates(&cands);
        prop_assert!(n == 0 || n == 2);
    }
}
