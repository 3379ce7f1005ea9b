//! One-Hot-aware refinements of Interval and RAF (C3).
//!
//! For a tier `{i_1..i_k}`, each admissible "coordinate j is the one"
//! configuration contributes `f(j) = g(x_{i_j}|=1) + Σ_{l≠j} g(x_{i_l}|=0)`;
//! the tier-level value is the min/max of `f` over admissible `j`.
//! Configurations that pin a coordinate with `origin = One` to zero are
//! rejected (that coordinate must stay the "one" in every concretization).

use crate::error::OneHotConstraintError;
use crate::interval::Interval;
use crate::raf::Raf;
use crate::tier::{classify_origin, Origin, Tier};

const ORIGIN_EPS: f64 = 1e-7;

/// Per-coordinate origin classification for every coordinate of a tier.
pub fn tier_origins(
    tier_id_start: usize,
    tier_id_end: usize,
    values: &[f64],
) -> Result<Vec<Origin>, OneHotConstraintError> {
    let mut out = Vec::with_capacity(tier_id_end - tier_id_start);
    for i in tier_id_start..tier_id_end {
        match classify_origin(values[i], ORIGIN_EPS) {
            Some(o) => out.push(o),
            None => {
                return Err(OneHotConstraintError {
                    index: i,
                    tier_id: i as u32,
                    value: values[i],
                })
            }
        }
    }
    Ok(out)
}

/// Tier-aware intervalization: enumerates "coordinate j is the one" for
/// every admissible `j`, evaluating `g` (supplied per-coordinate for its
/// pinned-0 or pinned-1 value) and returning the min/max over configs.
///
/// `g(i, is_one)` must return the (already-lifted) contribution of
/// coordinate `i` when forced to `1` (`is_one = true`) or `0`.
pub fn ohint_intervalize<G>(origins: &[Origin], mut g: G) -> Interval
where
    G: FnMut(usize, bool) -> f64,
{
    let k = origins.len();
    let pinned_one = origins.iter().position(|&o| o == Origin::One);
    let mut min_val = f64::INFINITY;
    let mut max_val = f64::NEG_INFINITY;
    for j in 0..k {
        if let Some(p) = pinned_one {
            if p != j {
                continue; // another coordinate is pinned to 1; j can't be the one.
            }
        }
        let mut val = g(j, true);
        for l in 0..k {
            if l != j {
                val += g(l, false);
            }
        }
        min_val = min_val.min(val);
        max_val = max_val.max(val);
    }
    Interval::new(min_val, max_val)
}

/// Tier-aware RAF-ification: same enumeration as [`ohint_intervalize`] but
/// producing a single fresh-noise-symbol RAF for the tier (midpoint center,
/// half-width coefficient on one new symbol placed at `fresh_index`).
pub fn ohraf_rafize<G>(origins: &[Origin], fresh_index: usize, n: usize, g: G) -> Raf
where
    G: FnMut(usize, bool) -> f64,
{
    let bound = ohint_intervalize(origins, g);
    Raf::from_coordinate(n, fresh_index, bound.midpoint(), 0.5 * bound.width())
}

/// Result of [`tierize_raf`]: which endpoint (min or max) each coordinate's
/// configuration realizes in the score RAF — used directly to build
/// counterexample-candidate samples.
#[derive(Clone, Debug, Default)]
pub struct TierExtremes {
    pub min_example: Vec<bool>,
    pub max_example: Vec<bool>,
}

/// Splits a score RAF's noise coefficients by tier, collapses each
/// multi-coordinate tier to a single equivalent coefficient, and records
/// per-coordinate which extreme (min/max) its one-hot configuration
/// realizes.
///
/// `origins` gives each coordinate's classification (as from
/// [`tier_origins`]); a coordinate pinned to `Origin::One` must stay "the
/// one" in every enumerated configuration within its tier, rejecting every
/// other candidate `j`.
///
/// The original's `tierize_raf_helper` also computes a `range` accumulator
/// that is never read afterwards; that accumulator is intentionally not
/// reproduced here (dead code in the source).
pub fn tierize_raf(score: &Raf, tier: &Tier, origins: &[Origin]) -> (Raf, TierExtremes) {
    let n = score.size();
    let mut out = score.clone();
    let mut extremes = TierExtremes {
        min_example: vec![false; n],
        max_example: vec![false; n],
    };

    for (start, end) in tier.multi_coordinate_tiers() {
        let (min_id, max_id) = tierize_raf_helper(&mut out, start, end, &origins[start..end]);
        extremes.min_example[min_id] = true;
        extremes.max_example[max_id] = true;
    }

    // Singleton (non-tiered) coordinates: the sign of the noise coefficient
    // directly tells us which endpoint is the max vs the min.
    for i in 0..n {
        if extremes.min_example[i] || extremes.max_example[i] {
            continue;
        }
        if out.noise[i] >= 0.0 {
            extremes.max_example[i] = true;
        } else {
            extremes.min_example[i] = true;
        }
    }

    (out, extremes)
}

/// Collapses tier `[start, end)`'s noise coefficients into a single
/// coefficient at `start` (min/max over the "one-in-k" sign assignment),
/// zeroing the remaining coordinates in the tier. Returns `(min_id, max_id)`
/// — the coordinate whose configuration realizes the min (resp. max).
///
/// `tier_origins` is this tier's per-coordinate origin slice, aligned with
/// `r.noise[start..end]`.
fn tierize_raf_helper(r: &mut Raf, start: usize, end: usize, tier_origins: &[Origin]) -> (usize, usize) {
    let pinned_one = tier_origins.iter().position(|&o| o == Origin::One).map(|p| start + p);
    let total: f64 = (start..end).map(|l| r.noise[l]).sum();
    let mut min_val = f64::INFINITY;
    let mut max_val = f64::NEG_INFINITY;
    let mut min_id = start;
    let mut max_id = start;
    for j in start..end {
        if let Some(p) = pinned_one {
            if p != j {
                continue; // another coordinate is pinned to 1; j can't be the one.
            }
        }
        // `f(j) = g(j|=1) + Sum_{l!=j} g(l|=0)`: coordinate j's own
        // coefficient counts once, every other tier member's coefficient is
        // subtracted out (it drops from `1` to `0` in this configuration).
        let val = 2.0 * r.noise[j] - total;
        if val < min_val {
            min_val = val;
            min_id = j;
        }
        if val > max_val {
            max_val = val;
            max_id = j;
        }
    }
    let mid = 0.5 * (min_val + max_val);
    let half = 0.5 * (max_val - min_val);
    for j in start..end {
        r.noise[j] = 0.0;
    }
    r.noise[start] = half;
    r.c += mid;
    (min_id, max_id)
}

/// Corrected `exp` for one-hot tiers: applies `exp` to the two distinct
/// endpoints `c - noise` / `c + noise` of a sparse single-symbol RAF,
/// rather than duplicating `c` for both (the bug flagged in the source).
pub fn ohraf_exponent(x: &Raf) -> Raf {
    let idx = x.index.expect("ohraf_exponent expects a sparse OH-RAF");
    let half = x.noise[idx];
    let zero = x.c - half;
    let one = x.c + half;
    let (lo, hi) = (zero.exp(), one.exp());
    let mut noise = vec![0.0; x.size()];
    noise[idx] = 0.5 * (hi - lo);
    Raf {
        c: 0.5 * (hi + lo),
        noise,
        delta: 0.0,
        index: Some(idx),
    }
}

/// Corrected `pow` for one-hot tiers, mirroring [`ohraf_exponent`].
pub fn ohraf_pow(x: &Raf, d: u32) -> Raf {
    let idx = x.index.expect("ohraf_pow expects a sparse OH-RAF");
    let half = x.noise[idx];
    let zero = x.c - half;
    let one = x.c + half;
    let (lo, hi) = (zero.powi(d as i32), one.powi(d as i32));
    let (lo, hi) = (lo.min(hi), lo.max(hi));
    let mut noise = vec![0.0; x.size()];
    noise[idx] = 0.5 * (hi - lo);
    Raf {
        c: 0.5 * (hi + lo),
        noise,
        delta: 0.0,
        index: Some(idx),
    }
}
