//! OVO abstract voter (C6): reduces pairwise interval scores to a superset
//! of possible winners.

use crate::interval::Interval;
use crate::model::pair_index;

/// Per-class vote interval: `[votes_lower_bound, votes_upper_bound]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VoteInterval {
    pub l: u32,
    pub u: u32,
}

/// Builds vote intervals from pairwise scores: a decisive pair (`score.l
/// >= 0` or `score.u <= 0`) increments both bounds for the certain winner;
/// an undecided pair increments only the upper bound for both classes.
pub fn vote_intervals(n_classes: usize, scores: &[Interval]) -> Vec<VoteInterval> {
    let mut votes = vec![VoteInterval { l: 0, u: 0 }; n_classes];
    for i in 0..n_classes {
        for j in (i + 1)..n_classes {
            let s = scores[pair_index(i, j, n_classes)];
            if s.l >= 0.0 {
                votes[i].l += 1;
                votes[i].u += 1;
            } else if s.u <= 0.0 {
                votes[j].l += 1;
                votes[j].u += 1;
            } else {
                votes[i].u += 1;
                votes[j].u += 1;
            }
        }
    }
    votes
}

/// A class `k` is a possible winner iff for every other class `l`,
/// `votes[l].l <= votes[k].u`.
pub fn possible_winners(votes: &[VoteInterval]) -> Vec<usize> {
    let n = votes.len();
    (0..n)
        .filter(|&k| (0..n).all(|l| l == k || votes[l].l <= votes[k].u))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenario_1_singleton_winner() {
        let scores = vec![Interval::new(0.1, 0.5)];
        let votes = vote_intervals(2, &scores);
        assert_eq!(possible_winners(&votes), vec![0]);
    }

    #[test]
    fn scenario_2_both_possible() {
        let scores = vec![Interval::new(-0.2, 0.8)];
        let votes = vote_intervals(2, &scores);
        assert_eq!(possible_winners(&votes), vec![0, 1]);
    }

    #[test]
    fn vote_monotonicity_under_inclusion() {
        // A sub B componentwise: A's possible winners subset of B's.
        let a = vec![Interval::new(0.2, 0.3)];
        let b = vec![Interval::new(-0.1, 0.5)];
        let wa = possible_winners(&vote_intervals(2, &a));
        let wb = possible_winners(&vote_intervals(2, &b));
        assert!(wa.iter().all(|w| wb.contains(w)));
    }
}
