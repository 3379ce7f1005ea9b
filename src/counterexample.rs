//! Counterexample engine (C8): vertex heuristic, OH-RAF vertex exhibition,
//! partition-and-rerun, and divide-et-impera.

use crate::model::{pair_index, Model};
use crate::onehot::TierExtremes;

/// An ordered pair of concrete input vectors the concrete classifier
/// assigns different labels.
#[derive(Clone, Debug)]
pub struct Counterexample {
    pub sample_l: Vec<f64>,
    pub sample_u: Vec<f64>,
}

/// Builds the two axis-extreme candidate samples for a target pair
/// `(i, j)`: for each coordinate, evaluate the pair score at that
/// coordinate's lower/upper region boundary (holding the rest at the
/// original sample) to get a "derivative sign", then steer `sample_l`
/// toward minimizing the pair score (favoring class `j`) and `sample_u`
/// toward maximizing it (favoring class `i`).
pub fn vertex_heuristic(
    model: &Model,
    sample: &[f64],
    bounds: &[(f64, f64)],
    target_i: usize,
    target_j: usize,
) -> (Vec<f64>, Vec<f64>) {
    let n_classes = model.n_classes();
    let idx = pair_index(target_i, target_j, n_classes);
    let mut sample_l = sample.to_vec();
    let mut sample_u = sample.to_vec();

    for k in 0..sample.len() {
        let (lo, hi) = bounds[k];
        let mut at_lo = sample.to_vec();
        at_lo[k] = lo;
        let mut at_hi = sample.to_vec();
        at_hi[k] = hi;
        let score_lo = model.score(&at_lo)[idx];
        let score_hi = model.score(&at_hi)[idx];
        let increasing = score_hi >= score_lo;
        if increasing {
            sample_l[k] = lo;
            sample_u[k] = hi;
        } else {
            sample_l[k] = hi;
            sample_u[k] = lo;
        }
    }
    (sample_l, sample_u)
}

/// Runs the vertex heuristic for `(target_i, target_j)` and reports a
/// counterexample if the two constructed samples classify differently.
pub fn vertex_heuristic_search(
    model: &Model,
    sample: &[f64],
    bounds: &[(f64, f64)],
    target_i: usize,
    target_j: usize,
) -> Option<Counterexample> {
    let (sample_l, sample_u) = vertex_heuristic(model, sample, bounds, target_i, target_j);
    let class_l = model.classify(&sample_l);
    let class_u = model.classify(&sample_u);
    if class_l != class_u {
        Some(Counterexample { sample_l, sample_u })
    } else {
        None
    }
}

/// Builds the two concrete samples implied by [`tierize_raf`]'s per-tier
/// extremes (`minExample`/`maxExample`), then reports a counterexample if
/// they classify differently. `tier_bounds` gives each coordinate's
/// concrete `(at_min, at_max)` realization.
///
/// [`tierize_raf`]: crate::onehot::tierize_raf
pub fn ohraf_vertex_search(
    model: &Model,
    extremes: &TierExtremes,
    tier_bounds: &[(f64, f64)],
) -> Option<Counterexample> {
    let n = tier_bounds.len();
    let mut sample_min = vec![0.0; n];
    let mut sample_max = vec![0.0; n];
    for i in 0..n {
        let (at_min, at_max) = tier_bounds[i];
        sample_min[i] = if extremes.min_example[i] { at_min } else { at_max };
        sample_max[i] = if extremes.max_example[i] { at_max } else { at_min };
    }
    let class_min = model.classify(&sample_min);
    let class_max = model.classify(&sample_max);
    if class_min != class_max {
        Some(Counterexample { sample_l: sample_min, sample_u: sample_max })
    } else {
        None
    }
}

/// Outcome label used by partition-and-rerun's tally.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Label {
    Neg,
    Pos,
}

/// Percentage of the original region falling into each bucket.
#[derive(Clone, Copy, Debug, Default)]
pub struct RegSize {
    pub neg: f64,
    pub pos: f64,
    pub unknown: f64,
}

/// Recursively refines a straddling pair-score interval by splitting the
/// coordinate with the largest live `|a_k|` (skipping one-hot-tagged
/// coordinates, whose tier has already been collapsed), re-scoring each
/// half, and recursing until a half resolves, a counterexample turns up,
/// or the remaining region fraction drops below `min_pct`.
///
/// `rescore` re-overapproximates the target pair's score (as an interval)
/// given updated per-coordinate bounds, also returning each coordinate's
/// live noise-coefficient magnitude `|a_k|` (used to pick the next split
/// axis) — callers thread through whichever domain/OH configuration is
/// active.
pub fn partition_and_rerun<F>(
    bounds: &[(f64, f64)],
    skip: &[bool],
    percent: f64,
    min_pct: f64,
    rescore: &F,
) -> (RegSize, bool)
where
    F: Fn(&[(f64, f64)]) -> (crate::interval::Interval, Vec<f64>, Option<Counterexample>),
{
    let (score, weights, maybe_ce) = rescore(bounds);
    if maybe_ce.is_some() {
        return (RegSize { neg: 0.0, pos: 0.0, unknown: percent }, true);
    }
    if score.l >= 0.0 {
        return (RegSize { neg: 0.0, pos: percent, unknown: 0.0 }, false);
    }
    if score.u <= 0.0 {
        return (RegSize { neg: percent, pos: 0.0, unknown: 0.0 }, false);
    }
    if percent < min_pct {
        return (RegSize { neg: 0.0, pos: 0.0, unknown: percent }, false);
    }

    // Pick the coordinate with the largest live |a_k| among non-skipped
    // (non-tier-pinned) coordinates; ties broken by lowest index.
    let mut pos = 0;
    let mut best_weight = -1.0;
    for (k, &w) in weights.iter().enumerate() {
        if skip[k] {
            continue;
        }
        if w.abs() > best_weight {
            best_weight = w.abs();
            pos = k;
        }
    }
    if best_weight <= 0.0 || bounds[pos].1 - bounds[pos].0 <= 0.0 {
        return (RegSize { neg: 0.0, pos: 0.0, unknown: percent }, false);
    }

    let (l, u) = bounds[pos];
    let mid = 0.5 * (l + u);
    let mut left = bounds.to_vec();
    left[pos] = (l, mid);
    let mut right = bounds.to_vec();
    right[pos] = (mid, u);

    let (reg_left, ce_left) = partition_and_rerun(&left, skip, percent / 2.0, min_pct, rescore);
    let (reg_right, ce_right) = partition_and_rerun(&right, skip, percent / 2.0, min_pct, rescore);

    let combined = RegSize {
        neg: reg_left.neg + reg_right.neg,
        pos: reg_left.pos + reg_right.pos,
        unknown: reg_left.unknown + reg_right.unknown,
    };
    let has_counter_region = ce_left || ce_right || (reg_left.neg > 0.0 && reg_right.pos > 0.0) || (reg_left.pos > 0.0 && reg_right.neg > 0.0);
    (combined, has_counter_region)
}

/// Verdict of a divide-et-impera (sub)region analysis.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    Robust,
    Counterexample,
    DontKnow,
}

/// Classifies `bounds` abstractly; returns the set of possible winners
/// (as class indices) that the caller uses to decide if the region is
/// robust (singleton) or not.
pub type AbstractClassifyFn<'a> = dyn Fn(&[(f64, f64)]) -> Vec<usize> + 'a;

/// Finds the largest concentric scaling `s in (0, 1]` of `bounds` around
/// `center` that the abstract classifier proves robust, by binary search
/// (rather than the source's naive repeated halving) between a
/// known-non-robust upper scale and a known-robust lower scale.
pub fn find_max_robust_scale(
    center: &[f64],
    bounds: &[(f64, f64)],
    classify: &AbstractClassifyFn<'_>,
) -> f64 {
    let scaled = |s: f64| -> Vec<(f64, f64)> {
        center
            .iter()
            .zip(bounds)
            .map(|(&c, &(l, u))| (c - s * (c - l), c + s * (u - c)))
            .collect()
    };

    if classify(&scaled(1.0)).len() <= 1 {
        return 1.0;
    }
    let mut lo = 0.0_f64;
    let mut hi = 1.0_f64;
    for _ in 0..20 {
        let mid = 0.5 * (lo + hi);
        if classify(&scaled(mid)).len() <= 1 {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    lo
}

/// Runs the `2*dim` outer-shell analysis around a shrunk robust core.
/// Both "upper" and "lower" shells are examined for every coordinate (the
/// source only implements the upper shell; the lower one is required by
/// the layered-strategy contract and is implemented here too).
pub fn divide_et_impera(
    model: &Model,
    sample: &[f64],
    bounds: &[(f64, f64)],
    classify_abstract: &AbstractClassifyFn<'_>,
) -> Verdict {
    let inner_classes = classify_abstract(bounds);
    if inner_classes.len() <= 1 {
        return Verdict::Robust;
    }

    let max_scale = find_max_robust_scale(sample, bounds, classify_abstract);
    if max_scale <= 0.0 {
        // No robust core at all; fall back to the vertex heuristic on the
        // whole region using the first two possible winners as a target.
        if inner_classes.len() >= 2 {
            if let Some(_ce) =
                vertex_heuristic_search(model, sample, bounds, inner_classes[0], inner_classes[1])
            {
                return Verdict::Counterexample;
            }
        }
        return Verdict::DontKnow;
    }

    let inner_bounds: Vec<(f64, f64)> = sample
        .iter()
        .zip(bounds)
        .map(|(&c, &(l, u))| (c - max_scale * (c - l), c + max_scale * (u - c)))
        .collect();
    let robust_label = classify_abstract(&inner_bounds);

    let mut any_dont_know = false;
    for k in 0..sample.len() {
        for shell_is_upper in [true, false] {
            let mut shell = inner_bounds.clone();
            if shell_is_upper {
                shell[k] = (inner_bounds[k].1, bounds[k].1);
            } else {
                shell[k] = (bounds[k].0, inner_bounds[k].0);
            }
            if shell[k].0 >= shell[k].1 {
                continue; // shell is empty on this side.
            }
            let shell_classes = classify_abstract(&shell);
            if shell_classes == robust_label {
                continue;
            }
            // Shell disagrees: probe a concrete vertex.
            let mut vertex = sample.to_vec();
            vertex[k] = if shell_is_upper { shell[k].1 } else { shell[k].0 };
            let vertex_label = model.classify(&vertex);
            if vertex_label != model.classify(sample) {
                return Verdict::Counterexample;
            }
            any_dont_know = true;
        }
    }

    if any_dont_know {
        Verdict::DontKnow
    } else {
        Verdict::Robust
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linear_2class_model() -> Model {
        let text = "ovo 2 2\nlinear\nclassA 1\nclassB 1\n1.0\n1.0 0.0\n0.0 0.0\n0.0\n";
        Model::parse(text).unwrap()
    }

    #[test]
    fn scenario_2_vertex_heuristic_finds_counterexample() {
        let m = linear_2class_model();
        let sample = [0.3, 0.5];
        let bounds = [(-0.2, 0.8), (0.0, 1.0)];
        let ce = vertex_heuristic_search(&m, &sample, &bounds, 0, 1).unwrap();
        assert_eq!(ce.sample_l, vec![-0.2, 0.5]);
        assert_eq!(ce.sample_u, vec![0.8, 0.5]);
    }

    #[test]
    fn scenario_5_partition_and_rerun_tally() {
        // linear score c=0, a0=0.7, a1=0.3 over [-1,1]^2.
        let rescore = |bounds: &[(f64, f64)]| {
            let (l0, u0) = bounds[0];
            let (l1, u1) = bounds[1];
            let c0 = 0.5 * (l0 + u0);
            let h0 = 0.5 * (u0 - l0);
            let c1 = 0.5 * (l1 + u1);
            let h1 = 0.5 * (u1 - l1);
            let center = 0.7 * c0 + 0.3 * c1;
            let radius = 0.7_f64.abs() * h0 + 0.3_f64.abs() * h1;
            (
                crate::interval::Interval::new(center - radius, center + radius),
                vec![0.7 * h0, 0.3 * h1],
                None,
            )
        };
        let bounds = [(-1.0, 1.0), (-1.0, 1.0)];
        let skip = [false, false];
        let (reg, has_counter_region) = partition_and_rerun(&bounds, &skip, 100.0, 6.0, &rescore);
        assert!((reg.neg - 50.0).abs() < 1e-9);
        assert!((reg.pos - 50.0).abs() < 1e-9);
        assert!(has_counter_region);
    }
}
