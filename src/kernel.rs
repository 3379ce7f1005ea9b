//! Kernel types and abstract kernel evaluation (C4).
//!
//! Separate interval/RAF evaluation functions mirror the original's split
//! between `interval_classifier.c` and `raf_classifier.c`: the same
//! mathematical kernel, lifted independently into each domain.

use crate::interval::Interval;
use crate::raf::Raf;
use crate::tier::{Origin, Tier};
use serde::{Deserialize, Serialize};

/// A concrete kernel's type and parameters.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub enum Kernel {
    Linear,
    Rbf { gamma: f64 },
    Polynomial { degree: u32, c: f64 },
}

impl Kernel {
    pub fn name(&self) -> &'static str {
        match self {
            Kernel::Linear => "linear",
            Kernel::Rbf { .. } => "rbf",
            Kernel::Polynomial { .. } => "polynomial",
        }
    }

    /// Concrete kernel evaluation `K(x, y)`.
    pub fn compute(&self, x: &[f64], y: &[f64]) -> f64 {
        match self {
            Kernel::Linear => x.iter().zip(y).map(|(a, b)| a * b).sum(),
            Kernel::Rbf { gamma } => {
                let sq: f64 = x.iter().zip(y).map(|(a, b)| (a - b) * (a - b)).sum();
                (-gamma * sq).exp()
            }
            Kernel::Polynomial { degree, c } => {
                let dot: f64 = x.iter().zip(y).map(|(a, b)| a * b).sum();
                (dot + c).powi(*degree as i32)
            }
        }
    }

    /// Abstract kernel evaluation against a concrete support vector `y`,
    /// over the Interval domain. `x` is the abstract input vector.
    pub fn compute_interval(&self, x: &[Interval], y: &[f64]) -> Interval {
        match self {
            Kernel::Linear => {
                let mut acc = Interval::singleton(0.0);
                for (xi, yi) in x.iter().zip(y) {
                    acc = xi.scale(*yi).add(&acc);
                }
                acc
            }
            Kernel::Rbf { gamma } => {
                let mut sq = Interval::singleton(0.0);
                for (xi, yi) in x.iter().zip(y) {
                    let diff = xi.translate(-*yi);
                    sq = diff.pow(2).add(&sq);
                }
                sq.scale(-*gamma).exp()
            }
            Kernel::Polynomial { degree, c } => {
                let mut dot = Interval::singleton(0.0);
                for (xi, yi) in x.iter().zip(y) {
                    dot = xi.scale(*yi).add(&dot);
                }
                dot.translate(*c).pow(*degree)
            }
        }
    }

    /// Abstract kernel evaluation over the RAF domain.
    pub fn compute_raf(&self, x: &[Raf], y: &[f64]) -> Raf {
        let n = x.first().map(|r| r.size()).unwrap_or(0);
        match self {
            Kernel::Linear => {
                let mut acc = Raf::create(n);
                for (xi, yi) in x.iter().zip(y) {
                    acc = xi.scale(*yi).add(&acc);
                }
                acc
            }
            Kernel::Rbf { gamma } => {
                let mut sq = Raf::create(n);
                for (xi, yi) in x.iter().zip(y) {
                    let diff = xi.translate(-*yi);
                    sq = diff.sqr().add(&sq);
                }
                sq.scale(-*gamma).exp()
            }
            Kernel::Polynomial { degree, c } => {
                let mut dot = Raf::create(n);
                for (xi, yi) in x.iter().zip(y) {
                    dot = xi.scale(*yi).add(&dot);
                }
                dot.translate(*c).pow(*degree)
            }
        }
    }

    /// Tier-aware Interval kernel evaluation: within a multi-coordinate
    /// one-hot tier, sums the *hull* of each eligible candidate's own term
    /// rather than the naive per-coordinate sum, since at most one
    /// coordinate in the tier is ever non-zero at a time. Singleton
    /// (non-tiered) coordinates fall back to the plain per-coordinate
    /// accumulation.
    pub fn compute_interval_oh(&self, x: &[Interval], y: &[f64], tier: &Tier, origins: &[Origin]) -> Interval {
        match self {
            Kernel::Linear => sum_interval_oh(x, y, tier, origins, |xi, yi| xi.scale(yi)),
            Kernel::Rbf { gamma } => {
                let sq = sum_interval_oh(x, y, tier, origins, |xi, yi| xi.translate(-yi).pow(2));
                sq.scale(-*gamma).exp()
            }
            Kernel::Polynomial { degree, c } => {
                let dot = sum_interval_oh(x, y, tier, origins, |xi, yi| xi.scale(yi));
                dot.translate(*c).pow(*degree)
            }
        }
    }

    /// RAF analogue of [`compute_interval_oh`].
    pub fn compute_raf_oh(&self, x: &[Raf], y: &[f64], tier: &Tier, origins: &[Origin]) -> Raf {
        match self {
            Kernel::Linear => sum_raf_oh(x, y, tier, origins, |xi, yi| xi.scale(yi)),
            Kernel::Rbf { gamma } => {
                let sq = sum_raf_oh(x, y, tier, origins, |xi, yi| xi.translate(-yi).sqr());
                sq.scale(-*gamma).exp()
            }
            Kernel::Polynomial { degree, c } => {
                let dot = sum_raf_oh(x, y, tier, origins, |xi, yi| xi.scale(yi));
                dot.translate(*c).pow(*degree)
            }
        }
    }
}

/// Shared tier-aware accumulation for [`Kernel::compute_interval_oh`]: for
/// each multi-coordinate tier, takes the interval hull of `term(x_j, y_j)`
/// over every eligible candidate `j` (a coordinate pinned to `Origin::One`
/// makes every other candidate in its tier ineligible); singleton
/// coordinates accumulate by plain addition as usual.
fn sum_interval_oh(
    x: &[Interval],
    y: &[f64],
    tier: &Tier,
    origins: &[Origin],
    term: impl Fn(&Interval, f64) -> Interval,
) -> Interval {
    let n = x.len();
    let mut acc = Interval::singleton(0.0);
    let mut covered = vec![false; n];
    for (start, end) in tier.multi_coordinate_tiers() {
        let pinned_one = origins[start..end].iter().position(|&o| o == Origin::One).map(|p| start + p);
        let mut min_v = f64::INFINITY;
        let mut max_v = f64::NEG_INFINITY;
        for j in start..end {
            if let Some(p) = pinned_one {
                if p != j {
                    continue;
                }
            }
            let t = term(&x[j], y[j]);
            min_v = min_v.min(t.l);
            max_v = max_v.max(t.u);
        }
        acc = Interval::new(min_v, max_v).add(&acc);
        for j in start..end {
            covered[j] = true;
        }
    }
    for (j, covered) in covered.iter().enumerate() {
        if !covered {
            acc = term(&x[j], y[j]).add(&acc);
        }
    }
    acc
}

/// RAF analogue of [`sum_interval_oh`]: each tier's combined contribution is
/// represented as a single fresh-noise RAF term (reusing the tier's first
/// coordinate index, mirroring [`crate::onehot::tierize_raf`]'s collapse
/// convention), added into the running sum alongside the untouched
/// singleton coordinates.
fn sum_raf_oh(x: &[Raf], y: &[f64], tier: &Tier, origins: &[Origin], term: impl Fn(&Raf, f64) -> Raf) -> Raf {
    let n = x.first().map(|r| r.size()).unwrap_or(0);
    let mut acc = Raf::create(n);
    let mut covered = vec![false; x.len()];
    for (start, end) in tier.multi_coordinate_tiers() {
        let pinned_one = origins[start..end].iter().position(|&o| o == Origin::One).map(|p| start + p);
        let mut min_v = f64::INFINITY;
        let mut max_v = f64::NEG_INFINITY;
        for j in start..end {
            if let Some(p) = pinned_one {
                if p != j {
                    continue;
                }
            }
            let b = term(&x[j], y[j]).to_interval();
            min_v = min_v.min(b.l);
            max_v = max_v.max(b.u);
        }
        let combined = Raf::from_coordinate(n, start, 0.5 * (min_v + max_v), 0.5 * (max_v - min_v));
        acc = combined.add(&acc);
        for j in start..end {
            covered[j] = true;
        }
    }
    for (j, covered) in covered.iter().enumerate() {
        if !covered {
            acc = term(&x[j], y[j]).add(&acc);
        }
    }
    acc
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenario_3_rbf_single_sv_is_robust() {
        // gamma=1, sv at (0,0), region (0.1,0.1) +/- 0.05 on L_inf.
        let k = Kernel::Rbf { gamma: 1.0 };
        let x = [
            Raf::from_coordinate(2, 0, 0.1, 0.05),
            Raf::from_coordinate(2, 1, 0.1, 0.05),
        ];
        let r = k.compute_raf(&x, &[0.0, 0.0]);
        let bound = r.to_interval();
        let expected_center = (-0.02f64).exp();
        assert!((bound.midpoint() - expected_center).abs() < 0.05);
        assert!(bound.l > 0.0);
    }

    #[test]
    fn compute_interval_oh_takes_tier_hull_not_naive_sum() {
        // One tier of 2 one-hot coordinates, weights (3.0, 5.0); both
        // coordinates' own bounds are [0,1] (unperturbed one-hot range).
        // Naively summing both independently would allow both at 1
        // simultaneously (giving an upper bound of 8); tier-aware hull
        // caps it at 5 since only one can be hot at a time.
        let k = Kernel::Linear;
        let x = [Interval::new(0.0, 1.0), Interval::new(0.0, 1.0)];
        let y = [3.0, 5.0];
        let tier = Tier { tiers: vec![0, 0], is_one_hot: vec![true, true] };
        let origins = vec![Origin::Ambiguous, Origin::Ambiguous];
        let bound = k.compute_interval_oh(&x, &y, &tier, &origins);
        assert_eq!(bound, Interval::new(0.0, 5.0));
    }

    #[test]
    fn compute_raf_oh_agrees_with_interval_bound() {
        let k = Kernel::Linear;
        let x = [Raf::from_coordinate(2, 0, 0.5, 0.5), Raf::from_coordinate(2, 1, 0.5, 0.5)];
        let y = [3.0, 5.0];
        let tier = Tier { tiers: vec![0, 0], is_one_hot: vec![true, true] };
        let origins = vec![Origin::Ambiguous, Origin::Ambiguous];
        let r = k.compute_raf_oh(&x, &y, &tier, &origins);
        assert_eq!(r.to_interval(), Interval::new(0.0, 5.0));
    }

    #[test]
    fn interval_and_concrete_agree_on_degenerate_input() {
        let k = Kernel::Polynomial { degree: 2, c: 1.0 };
        let concrete = k.compute(&[1.0, 2.0], &[3.0, 4.0]);
        let x = [Interval::singleton(1.0), Interval::singleton(2.0)];
        let abstracted = k.compute_interval(&x, &[3.0, 4.0]);
        assert!((abstracted.midpoint() - concrete).abs() < 1e-9);
    }
}
