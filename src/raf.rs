//! Reduced Affine Forms (C2): `c + Σ a_i·ε_i + δ·ε_r`.
//!
//! Every RAF derived from the same abstract input sample shares the same
//! noise-symbol indices (`ε_i` for input coordinate `i`), which is what
//! lets multiplication and addition preserve first-order correlations
//! instead of collapsing immediately to plain intervals.

use crate::interval::{outward, Interval};

/// A reduced affine form over `size` shared noise symbols plus one private
/// residual `delta`.
///
/// `index` is `Some(k)` when exactly one noise coefficient (`k`) is
/// nonzero and every other `a_i` is zero — the "sparse" fast path used by
/// [`Raf::sqr`], [`Raf::fma`], [`Raf::translate`], and [`Raf::scale`].
#[derive(Clone, Debug, PartialEq)]
pub struct Raf {
    pub c: f64,
    pub noise: Vec<f64>,
    pub delta: f64,
    pub index: Option<usize>,
}

impl Raf {
    /// `raf_create(n)`: a zero RAF over `n` shared noise symbols.
    pub fn create(n: usize) -> Self {
        Raf {
            c: 0.0,
            noise: vec![0.0; n],
            delta: 0.0,
            index: None,
        }
    }

    /// Builds a RAF with a single live noise symbol at `index`, coefficient
    /// `coeff`, centered at `c` — the standard "lift input coordinate i"
    /// construction used when building the abstract input vector.
    pub fn from_coordinate(n: usize, index: usize, c: f64, coeff: f64) -> Self {
        let mut noise = vec![0.0; n];
        noise[index] = coeff;
        Raf {
            c,
            noise,
            delta: 0.0,
            index: Some(index),
        }
    }

    pub fn size(&self) -> usize {
        self.noise.len()
    }

    /// `radius(r) = |delta| + Σ|a_i|`.
    pub fn radius(&self) -> f64 {
        self.delta.abs() + self.noise.iter().map(|a| a.abs()).sum::<f64>()
    }

    /// `interval -> RAF`: midpoint in `c`, radius in `delta`, no noise.
    pub fn from_interval(i: &Interval, n: usize) -> Self {
        Raf {
            c: i.midpoint(),
            noise: vec![0.0; n],
            delta: 0.5 * i.width(),
            index: None,
        }
    }

    /// `RAF -> interval`: `[c - radius, c + radius]`, outward rounded.
    pub fn to_interval(&self) -> Interval {
        let r = self.radius();
        let (l, _) = outward(self.c - r);
        let (_, u) = outward(self.c + r);
        Interval::new(l, u)
    }

    fn recompute_sparse_index(noise: &[f64]) -> Option<usize> {
        let mut found = None;
        for (i, &a) in noise.iter().enumerate() {
            if a != 0.0 {
                if found.is_some() {
                    return None;
                }
                found = Some(i);
            }
        }
        found
    }

    /// Addition: centers add, noise coefficients add pointwise, residuals add.
    pub fn add(&self, other: &Raf) -> Raf {
        let n = self.size().max(other.size());
        let mut noise = vec![0.0; n];
        for i in 0..n {
            let a = self.noise.get(i).copied().unwrap_or(0.0);
            let b = other.noise.get(i).copied().unwrap_or(0.0);
            let (v, _) = outward(a + b);
            noise[i] = v;
        }
        let (c, _) = outward(self.c + other.c);
        let (delta, _) = outward(self.delta + other.delta);
        Raf {
            c,
            index: Self::recompute_sparse_index(&noise),
            noise,
            delta,
        }
    }

    /// Translation by a scalar: `x + k`. Sparse fast path updates only `c`.
    pub fn translate(&self, k: f64) -> Raf {
        let mut r = self.clone();
        r.c += k;
        r
    }

    /// Scaling by a scalar: `k * x`.
    pub fn scale(&self, k: f64) -> Raf {
        if let Some(idx) = self.index {
            let mut noise = vec![0.0; self.size()];
            noise[idx] = self.noise[idx] * k;
            return Raf {
                c: self.c * k,
                noise,
                delta: self.delta * k.abs(),
                index: Some(idx),
            };
        }
        Raf {
            c: self.c * k,
            noise: self.noise.iter().map(|a| a * k).collect(),
            delta: self.delta * k.abs(),
            index: None,
        }
    }

    /// Fused multiply-add `alpha * x + y`; short-circuits when `alpha == 0`.
    pub fn fma(&self, alpha: f64, y: &Raf) -> Raf {
        if alpha == 0.0 {
            return y.clone();
        }
        self.scale(alpha).add(y)
    }

    /// Square: sparse fast path `r = x*x` when `x` has one live noise
    /// symbol, else falls back to [`Raf::mul`].
    pub fn sqr(&self) -> Raf {
        if let Some(idx) = self.index {
            let a = self.noise[idx];
            let mut noise = vec![0.0; self.size()];
            noise[idx] = 2.0 * self.c * a;
            return Raf {
                c: self.c * self.c,
                noise,
                delta: self.delta * self.delta,
                index: Some(idx),
            };
        }
        self.mul(self)
    }

    /// Sound multiplication using the full slope-sorted sweep ("algo3").
    pub fn mul(&self, other: &Raf) -> Raf {
        self.mul_algo3(other)
    }

    /// Loosest fallback: bounds the bilinear remainder by the product of
    /// the two operands' L1 norms (plus deltas). Always sound, never tight.
    pub fn mul_algo1(&self, other: &Raf) -> Raf {
        let n = self.size().max(other.size());
        let x_l1: f64 = self.noise.iter().map(|a| a.abs()).sum();
        let y_l1: f64 = other.noise.iter().map(|a| a.abs()).sum();
        let mut noise = vec![0.0; n];
        for i in 0..n {
            let xa = self.noise.get(i).copied().unwrap_or(0.0);
            let ya = other.noise.get(i).copied().unwrap_or(0.0);
            noise[i] = other.c * xa + self.c * ya;
        }
        let delta = other.c.abs() * self.delta
            + self.c.abs() * other.delta
            + x_l1 * y_l1
            + self.delta * other.delta;
        Raf {
            c: self.c * other.c,
            index: Self::recompute_sparse_index(&noise),
            noise,
            delta,
        }
    }

    /// Intermediate fallback: bounds the remainder by summing
    /// per-coordinate `|x_i·y_i|` (diagonal term) plus the residual cross
    /// terms, tighter than `algo1` but looser than `algo3`.
    pub fn mul_algo2(&self, other: &Raf) -> Raf {
        let n = self.size().max(other.size());
        let mut noise = vec![0.0; n];
        let mut diag = 0.0;
        for i in 0..n {
            let xa = self.noise.get(i).copied().unwrap_or(0.0);
            let ya = other.noise.get(i).copied().unwrap_or(0.0);
            noise[i] = other.c * xa + self.c * ya;
            diag += (xa * ya).abs();
        }
        let x_l1: f64 = self.noise.iter().map(|a| a.abs()).sum();
        let y_l1: f64 = other.noise.iter().map(|a| a.abs()).sum();
        // Cross terms i != j bounded conservatively (looser than algo3's
        // exact sweep, tighter than algo1's full product).
        let cross = (x_l1 * y_l1 - diag).max(0.0);
        let delta = other.c.abs() * self.delta
            + self.c.abs() * other.delta
            + diag
            + 0.5 * cross
            + self.delta * other.delta;
        Raf {
            c: self.c * other.c,
            index: Self::recompute_sparse_index(&noise),
            noise,
            delta,
        }
    }

    /// Exact sweep over the slope-sorted `(|x_i|, sign(x_i)·y_i)` terms
    /// (plus the two residual pseudo-terms), tracking the running extremes
    /// of the bilinear form. This is the tightest of the three algorithms.
    fn mul_algo3(&self, other: &Raf) -> Raf {
        let n = self.size().max(other.size());
        let mut noise = vec![0.0; n];
        for i in 0..n {
            let xa = self.noise.get(i).copied().unwrap_or(0.0);
            let ya = other.noise.get(i).copied().unwrap_or(0.0);
            noise[i] = other.c * xa + self.c * ya;
        }

        // H: one (|x_i|, sign(x_i)*y_i) term per shared coordinate, plus
        // pseudo-terms for the two independent residual symbols.
        let mut h: Vec<(f64, f64)> = Vec::with_capacity(n + 2);
        for i in 0..n {
            let xa = self.noise.get(i).copied().unwrap_or(0.0);
            let ya = other.noise.get(i).copied().unwrap_or(0.0);
            if xa == 0.0 {
                continue;
            }
            h.push((xa.abs(), xa.signum() * ya));
        }
        h.push((self.delta, 0.0));
        h.push((0.0, other.delta.abs()));

        // Sort ascending by slope y/x (terms with x == 0 sort last; they
        // contribute nothing to the sweep's x-component anyway).
        h.sort_by(|a, b| {
            let sa = if a.0 != 0.0 { a.1 / a.0 } else { f64::INFINITY };
            let sb = if b.0 != 0.0 { b.1 / b.0 } else { f64::INFINITY };
            sa.partial_cmp(&sb).unwrap_or(std::cmp::Ordering::Equal)
        });

        let x_l1: f64 = self.noise.iter().map(|a| a.abs()).sum();
        let y_cross: f64 = (0..n)
            .map(|i| {
                let xa = self.noise.get(i).copied().unwrap_or(0.0);
                let ya = other.noise.get(i).copied().unwrap_or(0.0);
                xa.signum() * ya
            })
            .sum();

        // `w` walks the vertices of the zonotope traced by `(x(eps), y(eps))`
        // as each shared noise symbol flips from its `w`-matching sign to the
        // opposite one, processed in slope order. Along each edge `w -> next`
        // both coordinates are linear in the edge parameter, so the objective
        // `w.x * w.y` is a single quadratic piece per edge; its vertex (where
        // the line through the edge's two endpoints has slope `m` and
        // intercept `q`, located at `x = -q/(2m)`) can exceed both endpoint
        // values whenever it falls strictly inside the edge. Every edge gets
        // this check, not just edges bounding a detected global tie: a tie
        // only proves *some* point between two equal-valued samples differs,
        // it does not localize which edge contains the exceeding vertex.
        let mut w = (x_l1, y_cross);
        let mut r_max = w.0 * w.1;
        let mut r_min = r_max;
        for &hk in &h {
            let next = (w.0 - 2.0 * hk.0, w.1 - 2.0 * hk.1);
            let obj = next.0 * next.1;
            r_max = r_max.max(obj);
            r_min = r_min.min(obj);

            if next.0 != w.0 {
                let slope = (next.1 - w.1) / (next.0 - w.0);
                let intercept = w.1 - slope * w.0;
                if slope != 0.0 {
                    let vertex_x = -0.5 * intercept / slope;
                    let (lo, hi) = (w.0.min(next.0), w.0.max(next.0));
                    if lo < vertex_x && vertex_x < hi {
                        let vertex_obj = -0.25 * intercept * intercept / slope;
                        r_max = r_max.max(vertex_obj);
                        r_min = r_min.min(vertex_obj);
                    }
                }
            }
            w = next;
        }

        Raf {
            c: self.c * other.c + 0.5 * (r_min + r_max),
            index: Self::recompute_sparse_index(&noise),
            noise,
            delta: other.c.abs() * self.delta + self.c.abs() * other.delta + 0.5 * (r_max - r_min),
        }
    }

    /// Exponential via Chebyshev linearization: `alpha*x + zeta`, with a
    /// residual wide enough to cover the linearization error.
    pub fn exp(&self) -> Raf {
        let x = self.to_interval();
        if x.width() == 0.0 {
            return Raf {
                c: x.l.exp(),
                noise: vec![0.0; self.size()],
                delta: 0.0,
                index: None,
            };
        }
        let exp_l = x.l.exp();
        let exp_u = x.u.exp();
        let alpha = (exp_u - exp_l) / (x.u - x.l);

        // Point where the tangent has slope alpha: exp'(t) = exp(t) = alpha.
        let t = alpha.ln();
        let d_min;
        let d_max;
        if alpha <= 0.0 || !t.is_finite() || t < x.l {
            // alpha too small to reach a tangent inside the interval;
            // the chord's endpoints bound the error.
            d_min = exp_l - alpha * x.l;
            d_max = exp_u - alpha * x.u;
        } else if alpha >= exp_u {
            d_min = exp_l - alpha * x.l;
            d_max = exp_u - alpha * x.u;
        } else {
            let d_tangent = alpha * (1.0 - t);
            let d_chord = exp_l - alpha * x.l;
            d_min = d_tangent.min(d_chord);
            d_max = d_tangent.max(d_chord);
        }
        let zeta = 0.5 * (d_min + d_max);
        let delta_star = 0.5 * (d_max - d_min);

        self.fma(alpha, &Raf::from_interval(&Interval::singleton(zeta), self.size()))
            .with_extra_delta(delta_star)
    }

    fn with_extra_delta(mut self, extra: f64) -> Raf {
        self.delta += extra;
        self
    }

    /// Power `x^d` via repeated squaring, matching [`Interval::pow`]'s
    /// iterated-multiplication contract (binary split for `d > 2`).
    pub fn pow(&self, d: u32) -> Raf {
        match d {
            0 => Raf {
                c: 1.0,
                noise: vec![0.0; self.size()],
                delta: 0.0,
                index: None,
            },
            1 => self.clone(),
            2 => self.sqr(),
            _ => {
                let half = self.pow(d / 2);
                let sq = half.sqr();
                if d % 2 == 0 {
                    sq
                } else {
                    sq.mul(self)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_epsilons(n: usize) -> Vec<Vec<f64>> {
        // Vertices of the hypercube plus the center and a few interior points.
        let mut out = vec![vec![0.0; n]];
        for mask in 0..(1u32 << n.min(4)) {
            let mut v = vec![0.0; n];
            for i in 0..n.min(4) {
                v[i] = if (mask >> i) & 1 == 1 { 1.0 } else { -1.0 };
            }
            out.push(v);
        }
        out
    }

    fn concretize(r: &Raf, eps: &[f64], eps_r: f64) -> f64 {
        let mut v = r.c;
        for (a, e) in r.noise.iter().zip(eps) {
            v += a * e;
        }
        v + r.delta * eps_r
    }

    #[test]
    fn add_preserves_correlation() {
        let x = Raf::from_coordinate(2, 0, 1.0, 0.5);
        let y = Raf::from_coordinate(2, 0, 2.0, 0.3);
        let s = x.add(&y);
        for eps in sample_epsilons(2) {
            for &er in &[-1.0, 1.0] {
                let concrete = concretize(&x, &eps, er) + concretize(&y, &eps, er);
                let bound = s.to_interval();
                assert!(
                    bound.l - 1e-9 <= concrete && concrete <= bound.u + 1e-9,
                    "sum {} not in {:?}",
                    concrete,
                    bound
                );
            }
        }
    }

    #[test]
    fn mul_algo3_is_sound_and_tightest() {
        let x = Raf::from_coordinate(2, 0, 1.0, 0.4);
        let y = Raf::from_coordinate(2, 1, -0.5, 0.2);
        let r3 = x.mul_algo3(&y);
        let r2 = x.mul_algo2(&y);
        let r1 = x.mul_algo1(&y);
        for eps in sample_epsilons(2) {
            for &erx in &[-1.0, 1.0] {
                for &ery in &[-1.0, 1.0] {
                    let xv = concretize(&x, &eps, erx);
                    let yv = concretize(&y, &eps, ery);
                    let product = xv * yv;
                    let i3 = r3.to_interval();
                    assert!(i3.l - 1e-6 <= product && product <= i3.u + 1e-6);
                }
            }
        }
        assert!(r3.to_interval().width() <= r2.to_interval().width() + 1e-9);
        assert!(r2.to_interval().width() <= r1.to_interval().width() + 1e-9);
    }

    #[test]
    fn mul_algo3_sound_at_interior_vertex_not_just_hypercube_corners() {
        // x(eps) = 3*e0 + e1, y(eps) = -3*e0 - e1, both centered at 0, no
        // delta. x(eps)*y(eps) = -(3*e0+e1)^2, ranging over [-16, 0] on
        // [-1,1]^2, with the maximum 0 achieved at the interior point
        // eps=(0,0) rather than at any hypercube vertex.
        let x = Raf { c: 0.0, noise: vec![3.0, 1.0], delta: 0.0, index: None };
        let y = Raf { c: 0.0, noise: vec![-3.0, -1.0], delta: 0.0, index: None };
        let r3 = x.mul_algo3(&y);
        let bound = r3.to_interval();
        assert!(bound.l <= -16.0 + 1e-6, "lower bound {} must cover -16", bound.l);
        assert!(bound.u >= 0.0 - 1e-6, "upper bound {} must cover the interior max 0", bound.u);
        for eps in sample_epsilons(2) {
            let xv = concretize(&x, &eps, 1.0);
            let yv = concretize(&y, &eps, 1.0);
            let product = xv * yv;
            assert!(bound.l - 1e-6 <= product && product <= bound.u + 1e-6);
        }
    }

    #[test]
    fn sqr_sparse_fast_path_matches_mul() {
        let x = Raf::from_coordinate(3, 1, 2.0, 0.3);
        assert_eq!(x.sqr().to_interval(), x.mul(&x).to_interval());
    }

    #[test]
    fn fma_zero_alpha_returns_y_unchanged() {
        let x = Raf::from_coordinate(2, 0, 1.0, 1.0);
        let y = Raf::from_coordinate(2, 1, 3.0, 0.5);
        assert_eq!(x.fma(0.0, &y), y);
    }

    #[test]
    fn round_trip_interval_conversion() {
        let i = Interval::new(1.0, 3.0);
        let r = Raf::from_interval(&i, 2);
        let back = r.to_interval();
        assert!(back.l <= i.l + 1e-9 && back.u >= i.u - 1e-9);
    }
}
