//! Adversarial regions and perturbation kinds (C9).

use crate::error::PerturbationError;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Tagged union of perturbation kinds.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum Perturbation {
    L1 { epsilon: f64 },
    LInf { epsilon: f64 },
    HyperRect { epsilon_l: Vec<f64>, epsilon_u: Vec<f64> },
    Frame { epsilon: f64, image_w: usize, image_h: usize, frame_w: usize, frame_h: usize },
    ClippedHyperRect { epsilon_l: Vec<f64>, epsilon_u: Vec<f64>, lo: f64, hi: f64 },
    FromFile { bounds_per_sample: Vec<Vec<(f64, f64)>> },
}

pub const DEFAULT_PERTURBATION: &str = "l_inf";
pub const DEFAULT_EPSILON: f64 = 0.01;

impl Perturbation {
    /// Parses `args[0]` as the perturbation kind and consumes whatever
    /// trailing arguments that kind needs.
    pub fn parse(args: &[&str], space_size: usize) -> Result<(Perturbation, usize), PerturbationError> {
        let kind = args.first().copied().unwrap_or(DEFAULT_PERTURBATION);
        match kind {
            "l_one" => {
                let eps = parse_arg(args, 1, "l_one")?;
                Ok((Perturbation::L1 { epsilon: eps }, 2))
            }
            "l_inf" => {
                let eps = parse_arg(args, 1, "l_inf")?;
                Ok((Perturbation::LInf { epsilon: eps }, 2))
            }
            "frame" => {
                if args.len() < 6 {
                    return Err(PerturbationError::MissingArgs { kind: "frame", expected: 5, got: args.len() - 1 });
                }
                let epsilon = parse_arg(args, 1, "frame")?;
                let image_w: usize = parse_arg(args, 2, "frame")?;
                let image_h: usize = parse_arg(args, 3, "frame")?;
                let frame_w: usize = parse_arg(args, 4, "frame")?;
                let frame_h: usize = parse_arg(args, 5, "frame")?;
                Ok((Perturbation::Frame { epsilon, image_w, image_h, frame_w, frame_h }, 6))
            }
            "clipped_hyperrectangle" => {
                let eps = parse_arg(args, 1, "clipped_hyperrectangle")?;
                Ok((
                    Perturbation::ClippedHyperRect {
                        epsilon_l: vec![eps; space_size],
                        epsilon_u: vec![eps; space_size],
                        lo: 0.0,
                        hi: 1.0,
                    },
                    2,
                ))
            }
            "from_file" => Err(PerturbationError::MissingArgs {
                kind: "from_file",
                expected: 1,
                got: 0,
            }),
            other => Err(PerturbationError::UnsupportedPerturbation(other.to_string())),
        }
    }

    /// The "spread" magnitude reported in the output summary line.
    pub fn magnitude(&self) -> f64 {
        match self {
            Perturbation::L1 { epsilon } | Perturbation::LInf { epsilon } | Perturbation::Frame { epsilon, .. } => {
                *epsilon
            }
            Perturbation::HyperRect { epsilon_u, .. } | Perturbation::ClippedHyperRect { epsilon_u, .. } => {
                epsilon_u.iter().cloned().fold(0.0, f64::max)
            }
            Perturbation::FromFile { .. } => f64::NAN,
        }
    }

    /// Per-coordinate `(l, u)` bounds around `sample` for row `row_index`
    /// (only meaningful for `FromFile`).
    ///
    /// `HYPER_RECT` (and `L1`/`L_INF`, which are degenerate hyperrectangles
    /// here) is *not* auto-clipped to `[0,1]`; only `ClippedHyperRect`
    /// clips explicitly, matching the source's two distinct code paths.
    pub fn bounds(&self, sample: &[f64], row_index: usize) -> Vec<(f64, f64)> {
        match self {
            Perturbation::L1 { epsilon } | Perturbation::LInf { epsilon } => sample
                .iter()
                .map(|&x| ((x - epsilon).max(0.0), (x + epsilon).min(1.0)))
                .collect(),
            Perturbation::HyperRect { epsilon_l, epsilon_u } => sample
                .iter()
                .zip(epsilon_l)
                .zip(epsilon_u)
                .map(|((&x, &el), &eu)| (x - el, x + eu))
                .collect(),
            Perturbation::Frame { epsilon, image_w, image_h, frame_w, frame_h } => sample
                .iter()
                .enumerate()
                .map(|(i, &x)| {
                    if in_frame(i, *image_w, *image_h, *frame_w, *frame_h) {
                        ((x - epsilon).max(0.0), (x + epsilon).min(1.0))
                    } else {
                        (x, x)
                    }
                })
                .collect(),
            Perturbation::ClippedHyperRect { epsilon_l, epsilon_u, lo, hi } => sample
                .iter()
                .zip(epsilon_l)
                .zip(epsilon_u)
                .map(|((&x, &el), &eu)| ((x - el).max(*lo), (x + eu).min(*hi)))
                .collect(),
            Perturbation::FromFile { bounds_per_sample } => bounds_per_sample[row_index].clone(),
        }
    }
}

fn in_frame(i: usize, image_w: usize, image_h: usize, frame_w: usize, frame_h: usize) -> bool {
    let (row, col) = (i / image_w, i % image_w);
    if image_h == 0 || image_w == 0 {
        return false;
    }
    row < frame_h || row >= image_h.saturating_sub(frame_h) || col < frame_w || col >= image_w.saturating_sub(frame_w)
}

fn parse_arg<T: std::str::FromStr>(args: &[&str], idx: usize, kind: &'static str) -> Result<T, PerturbationError> {
    args.get(idx)
        .ok_or(PerturbationError::MissingArgs { kind, expected: idx, got: args.len() })?
        .parse()
        .map_err(|_| PerturbationError::MissingArgs { kind, expected: idx, got: args.len() })
}

/// Parses the `FROM_FILE` bounds format: one line per sample, `space_size`
/// `[l;u]` tokens per line.
pub fn parse_from_file(text: &str, space_size: usize) -> Result<Perturbation, PerturbationError> {
    let mut rows = Vec::new();
    for (line_no, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() != space_size {
            return Err(PerturbationError::RowShape { line: line_no, expected: space_size, got: tokens.len() });
        }
        let mut bounds = Vec::with_capacity(space_size);
        for tok in tokens {
            let inner = tok.trim_start_matches('[').trim_end_matches(']');
            let (l_str, u_str) = inner
                .split_once(';')
                .ok_or_else(|| PerturbationError::BadBound(tok.to_string()))?;
            let l: f64 = l_str.parse().map_err(|_| PerturbationError::BadBound(tok.to_string()))?;
            let u: f64 = u_str.parse().map_err(|_| PerturbationError::BadBound(tok.to_string()))?;
            bounds.push((l, u));
        }
        rows.push(bounds);
    }
    Ok(Perturbation::FromFile { bounds_per_sample: rows })
}

/// `(sample, perturbation, tier)`, the unit the counterexample engine and
/// abstract scorer both operate on.
pub struct AdversarialRegion<'a> {
    pub sample: &'a [f64],
    pub perturbation: &'a Perturbation,
    pub row_index: usize,
}

impl<'a> AdversarialRegion<'a> {
    pub fn bounds(&self) -> Vec<(f64, f64)> {
        self.perturbation.bounds(self.sample, self.row_index)
    }

    /// Per-coordinate interval membership check.
    pub fn contains(&self, point: &[f64]) -> bool {
        self.bounds()
            .iter()
            .zip(point)
            .all(|(&(l, u), &p)| l <= p && p <= u)
    }

    /// Uniform sample within the per-coordinate bounds.
    pub fn sample_uniform<R: Rng>(&self, rng: &mut R) -> Vec<f64> {
        self.bounds()
            .iter()
            .map(|&(l, u)| if u > l { rng.gen_range(l..u) } else { l })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn l_inf_clips_to_unit_interval() {
        let p = Perturbation::LInf { epsilon: 0.2 };
        let bounds = p.bounds(&[0.05, 0.95], 0);
        assert_eq!(bounds[0], (0.0, 0.25));
        assert_eq!(bounds[1], (0.75, 1.0));
    }

    #[test]
    fn hyper_rect_is_not_auto_clipped() {
        let p = Perturbation::HyperRect { epsilon_l: vec![0.5], epsilon_u: vec![0.5] };
        let bounds = p.bounds(&[0.05], 0);
        assert_eq!(bounds[0], (-0.45, 0.55));
    }

    #[test]
    fn clipped_hyper_rect_clips_explicitly() {
        let p = Perturbation::ClippedHyperRect {
            epsilon_l: vec![0.5],
            epsilon_u: vec![0.5],
            lo: 0.0,
            hi: 1.0,
        };
        let bounds = p.bounds(&[0.05], 0);
        assert_eq!(bounds[0], (0.0, 0.55));
    }

    #[test]
    fn from_file_parses_bracketed_bounds() {
        let p = parse_from_file("[0;1] [0.2;0.8]\n", 2).unwrap();
        if let Perturbation::FromFile { bounds_per_sample } = p {
            assert_eq!(bounds_per_sample[0], vec![(0.0, 1.0), (0.2, 0.8)]);
        } else {
            panic!("expected FromFile");
        }
    }
}
