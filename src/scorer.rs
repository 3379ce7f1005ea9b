//! OVO abstract scorer (C5): pairwise abstract scores over all class pairs.

use crate::interval::Interval;
use crate::kernel::Kernel;
use crate::model::{n_pairs, pair_index, Model};
use crate::raf::Raf;
use crate::tier::{Origin, Tier};

/// Computes the `N*(N-1)/2` interval pair scores for abstract input vector
/// `x`. For the linear kernel, uses the precomputed primal coefficients
/// directly; otherwise evaluates the kernel against every support vector
/// once and reuses that vector across all pairs.
pub fn score_interval(model: &Model, x: &[Interval]) -> Vec<Interval> {
    let n_classes = model.n_classes();
    let mut out = vec![Interval::singleton(0.0); n_pairs(n_classes)];

    if let Some(primal) = &model.primal_coefficients {
        for i in 0..n_classes {
            for j in (i + 1)..n_classes {
                let dot_i = dot_interval(&primal[i], x);
                let dot_j = dot_interval(&primal[j], x);
                let idx = pair_index(i, j, n_classes);
                out[idx] = dot_i.sub(&dot_j).translate(model.bias[idx]);
            }
        }
        return out;
    }

    let total_sv = model.total_sv();
    let k_all: Vec<Interval> = (0..total_sv)
        .map(|t| model.kernel.compute_interval(x, model.sv_row_pub(t)))
        .collect();
    for i in 0..n_classes {
        for j in (i + 1)..n_classes {
            let off_i = model.sv_offset_pub(i);
            let off_j = model.sv_offset_pub(j);
            let idx = pair_index(i, j, n_classes);
            let mut s = Interval::singleton(0.0);
            // Alpha is column-major: `col*total_sv + sv_idx`.
            for t in 0..model.n_support_vectors[i] {
                let sv_idx = off_i + t;
                let a = model.alpha[(j - 1) * total_sv + sv_idx];
                s = k_all[sv_idx].scale(a).add(&s);
            }
            for t in 0..model.n_support_vectors[j] {
                let sv_idx = off_j + t;
                let a = model.alpha[i * total_sv + sv_idx];
                s = k_all[sv_idx].scale(a).add(&s);
            }
            out[idx] = s.translate(model.bias[idx]);
        }
    }
    out
}

/// RAF analogue of [`score_interval`].
pub fn score_raf(model: &Model, x: &[Raf]) -> Vec<Raf> {
    let n_classes = model.n_classes();
    let n = x.first().map(|r| r.size()).unwrap_or(0);
    let mut out = vec![Raf::create(n); n_pairs(n_classes)];

    if let Some(primal) = &model.primal_coefficients {
        for i in 0..n_classes {
            for j in (i + 1)..n_classes {
                let dot_i = dot_raf(&primal[i], x, n);
                let dot_j = dot_raf(&primal[j], x, n);
                let idx = pair_index(i, j, n_classes);
                out[idx] = dot_i.add(&dot_j.scale(-1.0)).translate(model.bias[idx]);
            }
        }
        return out;
    }

    let total_sv = model.total_sv();
    let k_all: Vec<Raf> = (0..total_sv)
        .map(|t| model.kernel.compute_raf(x, model.sv_row_pub(t)))
        .collect();
    for i in 0..n_classes {
        for j in (i + 1)..n_classes {
            let off_i = model.sv_offset_pub(i);
            let off_j = model.sv_offset_pub(j);
            let idx = pair_index(i, j, n_classes);
            let mut s = Raf::create(n);
            // Alpha is column-major: `col*total_sv + sv_idx`.
            for t in 0..model.n_support_vectors[i] {
                let sv_idx = off_i + t;
                let a = model.alpha[(j - 1) * total_sv + sv_idx];
                s = k_all[sv_idx].scale(a).add(&s);
            }
            for t in 0..model.n_support_vectors[j] {
                let sv_idx = off_j + t;
                let a = model.alpha[i * total_sv + sv_idx];
                s = k_all[sv_idx].scale(a).add(&s);
            }
            out[idx] = s.translate(model.bias[idx]);
        }
    }
    out
}

/// Tier-aware (one-hot) analogue of [`score_interval`]: every kernel/dot
/// evaluation routes through [`Kernel::compute_interval_oh`] so that
/// one-hot tiers contribute their interval hull rather than a naive
/// per-coordinate sum. `origins` classifies the query sample's own
/// coordinates (shared across every support vector, since the tiering is a
/// property of the query point, not the support vectors).
pub fn score_interval_oh(model: &Model, x: &[Interval], tier: &Tier, origins: &[Origin]) -> Vec<Interval> {
    let n_classes = model.n_classes();
    let mut out = vec![Interval::singleton(0.0); n_pairs(n_classes)];

    if let Some(primal) = &model.primal_coefficients {
        for i in 0..n_classes {
            for j in (i + 1)..n_classes {
                let dot_i = Kernel::Linear.compute_interval_oh(x, &primal[i], tier, origins);
                let dot_j = Kernel::Linear.compute_interval_oh(x, &primal[j], tier, origins);
                let idx = pair_index(i, j, n_classes);
                out[idx] = dot_i.sub(&dot_j).translate(model.bias[idx]);
            }
        }
        return out;
    }

    let total_sv = model.total_sv();
    let k_all: Vec<Interval> = (0..total_sv)
        .map(|t| model.kernel.compute_interval_oh(x, model.sv_row_pub(t), tier, origins))
        .collect();
    for i in 0..n_classes {
        for j in (i + 1)..n_classes {
            let off_i = model.sv_offset_pub(i);
            let off_j = model.sv_offset_pub(j);
            let idx = pair_index(i, j, n_classes);
            let mut s = Interval::singleton(0.0);
            for t in 0..model.n_support_vectors[i] {
                let sv_idx = off_i + t;
                let a = model.alpha[(j - 1) * total_sv + sv_idx];
                s = k_all[sv_idx].scale(a).add(&s);
            }
            for t in 0..model.n_support_vectors[j] {
                let sv_idx = off_j + t;
                let a = model.alpha[i * total_sv + sv_idx];
                s = k_all[sv_idx].scale(a).add(&s);
            }
            out[idx] = s.translate(model.bias[idx]);
        }
    }
    out
}

/// RAF analogue of [`score_interval_oh`].
pub fn score_raf_oh(model: &Model, x: &[Raf], tier: &Tier, origins: &[Origin]) -> Vec<Raf> {
    let n_classes = model.n_classes();
    let n = x.first().map(|r| r.size()).unwrap_or(0);
    let mut out = vec![Raf::create(n); n_pairs(n_classes)];

    if let Some(primal) = &model.primal_coefficients {
        for i in 0..n_classes {
            for j in (i + 1)..n_classes {
                let dot_i = Kernel::Linear.compute_raf_oh(x, &primal[i], tier, origins);
                let dot_j = Kernel::Linear.compute_raf_oh(x, &primal[j], tier, origins);
                let idx = pair_index(i, j, n_classes);
                out[idx] = dot_i.add(&dot_j.scale(-1.0)).translate(model.bias[idx]);
            }
        }
        return out;
    }

    let total_sv = model.total_sv();
    let k_all: Vec<Raf> = (0..total_sv)
        .map(|t| model.kernel.compute_raf_oh(x, model.sv_row_pub(t), tier, origins))
        .collect();
    for i in 0..n_classes {
        for j in (i + 1)..n_classes {
            let off_i = model.sv_offset_pub(i);
            let off_j = model.sv_offset_pub(j);
            let idx = pair_index(i, j, n_classes);
            let mut s = Raf::create(n);
            for t in 0..model.n_support_vectors[i] {
                let sv_idx = off_i + t;
                let a = model.alpha[(j - 1) * total_sv + sv_idx];
                s = k_all[sv_idx].scale(a).add(&s);
            }
            for t in 0..model.n_support_vectors[j] {
                let sv_idx = off_j + t;
                let a = model.alpha[i * total_sv + sv_idx];
                s = k_all[sv_idx].scale(a).add(&s);
            }
            out[idx] = s.translate(model.bias[idx]);
        }
    }
    out
}

fn dot_interval(w: &[f64], x: &[Interval]) -> Interval {
    let mut acc = Interval::singleton(0.0);
    for (wi, xi) in w.iter().zip(x) {
        acc = xi.scale(*wi).add(&acc);
    }
    acc
}

fn dot_raf(w: &[f64], x: &[Raf], n: usize) -> Raf {
    let mut acc = Raf::create(n);
    for (wi, xi) in w.iter().zip(x) {
        acc = xi.scale(*wi).add(&acc);
    }
    acc
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Model;

    fn linear_2class_model() -> Model {
        let text = "ovo 2 2\nlinear\nclassA 1\nclassB 1\n1.0\n1.0 0.0\n0.0 0.0\n0.0\n";
        Model::parse(text).unwrap()
    }

    #[test]
    fn scenario_1_robust() {
        let m = linear_2class_model();
        // L_inf region centered (0.3, 0.5), epsilon 0.2.
        let x = [
            Interval::new(0.1, 0.5),
            Interval::new(0.3, 0.7),
        ];
        let scores = score_interval(&m, &x);
        assert_eq!(scores[0], Interval::new(0.1, 0.5));
    }

    #[test]
    fn scenario_2_not_robust() {
        let m = linear_2class_model();
        let x = [
            Interval::new(-0.2, 0.8),
            Interval::new(0.0, 1.0),
        ];
        let scores = score_interval(&m, &x);
        assert_eq!(scores[0], Interval::new(-0.2, 0.8));
    }
}
