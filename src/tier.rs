//! Tier metadata: grouping of mutually-exclusive one-hot coordinates.

use crate::error::TierError;

/// Maps each input coordinate to `(tier_id, is_one_hot)`.
///
/// Tier ids are non-decreasing over index order; consecutive coordinates
/// sharing a tier id form a tier (a categorical feature's one-hot group).
#[derive(Clone, Debug)]
pub struct Tier {
    pub tiers: Vec<u32>,
    pub is_one_hot: Vec<bool>,
}

impl Tier {
    /// A trivial tiering: every coordinate is its own singleton, non-OH
    /// tier. Used when no tier file is supplied.
    pub fn trivial(space_size: usize) -> Self {
        Tier {
            tiers: (0..space_size as u32).collect(),
            is_one_hot: vec![false; space_size],
        }
    }

    pub fn space_size(&self) -> usize {
        self.tiers.len()
    }

    /// Parses the `2*space_size`-integer tier file format: tier ids first,
    /// then one-hot flags.
    pub fn parse(text: &str, space_size: usize) -> Result<Self, TierError> {
        let tokens: Vec<&str> = text.split_whitespace().collect();
        let expected = 2 * space_size;
        if tokens.len() < expected {
            return Err(TierError::ShortRead {
                expected,
                space_size,
                got: tokens.len(),
            });
        }
        let mut tiers = Vec::with_capacity(space_size);
        for (i, tok) in tokens[0..space_size].iter().enumerate() {
            let v: u32 = tok
                .parse()
                .map_err(|_| TierError::BadNumber { index: i, text: (*tok).to_string() })?;
            if let Some(&prev) = tiers.last() {
                if v < prev {
                    return Err(TierError::NotMonotone { index: i, prev, got: v });
                }
            }
            tiers.push(v);
        }
        let mut is_one_hot = Vec::with_capacity(space_size);
        for (i, tok) in tokens[space_size..expected].iter().enumerate() {
            let v: u32 = tok.parse().map_err(|_| TierError::BadNumber {
                index: space_size + i,
                text: (*tok).to_string(),
            })?;
            is_one_hot.push(v != 0);
        }
        Ok(Tier { tiers, is_one_hot })
    }

    /// Returns the coordinate index ranges of every tier with more than one
    /// member (the groups that actually need tier-aware enumeration).
    pub fn multi_coordinate_tiers(&self) -> Vec<(usize, usize)> {
        let mut groups = Vec::new();
        let mut start = 0;
        for i in 1..=self.tiers.len() {
            if i == self.tiers.len() || self.tiers[i] != self.tiers[start] {
                if i - start > 1 && self.is_one_hot[start] {
                    groups.push((start, i));
                }
                start = i;
            }
        }
        groups
    }
}

/// Classification of a one-hot coordinate's initial concrete value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Origin {
    Zero,
    One,
    Ambiguous,
}

/// Classifies `value` as `Zero`/`One`/`Ambiguous` within tolerance `eps`,
/// mirroring the original's sanity-check tolerance of `1e-7`.
pub fn classify_origin(value: f64, eps: f64) -> Option<Origin> {
    if (value - 0.0).abs() <= eps {
        Some(Origin::Zero)
    } else if (value - 1.0).abs() <= eps {
        Some(Origin::One)
    } else if (value - 0.5).abs() <= 0.5 + eps {
        Some(Origin::Ambiguous)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_monotone_tier_file() {
        let t = Tier::parse("0 0 1 1 1   0 0 1 1 1", 5).unwrap();
        assert_eq!(t.tiers, vec![0, 0, 1, 1, 1]);
        assert_eq!(t.is_one_hot, vec![false, false, true, true, true]);
    }

    #[test]
    fn rejects_non_monotone_ids() {
        let err = Tier::parse("1 0   0 0", 2).unwrap_err();
        assert!(matches!(err, TierError::NotMonotone { .. }));
    }

    #[test]
    fn multi_coordinate_tiers_skips_singletons_and_non_oh() {
        let t = Tier::parse("0 1 1 1   0 0 1 1", 4).unwrap();
        assert_eq!(t.multi_coordinate_tiers(), vec![(1, 4)]);
    }
}
