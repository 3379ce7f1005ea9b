//! SVM model file parsing and concrete scoring.
//!
//! Parses the whitespace-separated model file format and exposes the
//! concrete OVO score/classify routines the abstract scorer mirrors.

use crate::error::ModelError;
use crate::kernel::Kernel;

/// Pairwise index `(i,j) -> i*(N-1) - i*(i+1)/2 + j-1` for `i<j`.
pub fn pair_index(i: usize, j: usize, n_classes: usize) -> usize {
    debug_assert!(i < j && j < n_classes);
    i * (n_classes - 1) - (i * (i + 1)) / 2 + j - 1
}

/// Tight OVO pair-score buffer size `N*(N-1)/2`.
///
/// The original's `classifier_buffer_size` allocates `N*(N+1)/2`, one more
/// than the actual number of pairs; that slack is not reproduced here.
pub fn n_pairs(n_classes: usize) -> usize {
    n_classes * (n_classes - 1) / 2
}

/// A parsed one-versus-one SVM classifier.
#[derive(Clone, Debug)]
pub struct Model {
    pub space_size: usize,
    pub kernel: Kernel,
    pub classes: Vec<String>,
    pub n_support_vectors: Vec<usize>,
    /// Flattened `total_sv * (n_classes - 1)`.
    pub alpha: Vec<f64>,
    /// Flattened `total_sv * space_size`.
    pub support_vectors: Vec<f64>,
    /// `n_classes * (n_classes - 1) / 2`.
    pub bias: Vec<f64>,
    /// Precomputed primal weight vector per class, linear kernel only.
    pub primal_coefficients: Option<Vec<Vec<f64>>>,
}

impl Model {
    pub fn n_classes(&self) -> usize {
        self.classes.len()
    }

    pub fn total_sv(&self) -> usize {
        self.n_support_vectors.iter().sum()
    }

    fn sv_offset(&self, class: usize) -> usize {
        self.n_support_vectors[..class].iter().sum()
    }

    fn sv_row(&self, sv_index: usize) -> &[f64] {
        &self.support_vectors[sv_index * self.space_size..(sv_index + 1) * self.space_size]
    }

    /// Offset of `class`'s first support vector in the flattened arrays.
    pub fn sv_offset_pub(&self, class: usize) -> usize {
        self.sv_offset(class)
    }

    /// Coordinates of support vector `sv_index`.
    pub fn sv_row_pub(&self, sv_index: usize) -> &[f64] {
        self.sv_row(sv_index)
    }

    /// Parses the model file per the whitespace-separated format:
    /// `<type> <space_size> <n_classes>`, kernel line, per-class
    /// `(name, n_support_vectors)`, alpha matrix, flattened support
    /// vectors, bias vector.
    pub fn parse(text: &str) -> Result<Self, ModelError> {
        let mut toks = text.split_whitespace();
        let ty = toks.next().ok_or_else(|| ModelError::Header(text.to_string()))?;
        if ty != "ovo" {
            return Err(ModelError::UnsupportedClassifier(ty.to_string()));
        }
        let space_size: usize = next_num(&mut toks, 0)?;
        let n_classes: usize = next_num(&mut toks, 1)?;

        let kernel_name = toks
            .next()
            .ok_or_else(|| ModelError::ShortRead { what: "kernel line", expected: 1, got: 0 })?;
        let kernel = match kernel_name {
            "linear" => Kernel::Linear,
            "rbf" => Kernel::Rbf { gamma: next_num(&mut toks, 0)? },
            "polynomial" => {
                let degree: f64 = next_num(&mut toks, 0)?;
                let c: f64 = next_num(&mut toks, 1)?;
                Kernel::Polynomial { degree: degree as u32, c }
            }
            other => return Err(ModelError::UnsupportedKernel(other.to_string())),
        };

        let mut classes = Vec::with_capacity(n_classes);
        let mut n_support_vectors = Vec::with_capacity(n_classes);
        for _ in 0..n_classes {
            let name = toks
                .next()
                .ok_or_else(|| ModelError::ShortRead { what: "class name", expected: n_classes, got: classes.len() })?;
            classes.push(name.to_string());
            n_support_vectors.push(next_num(&mut toks, n_support_vectors.len())?);
        }

        let total_sv: usize = n_support_vectors.iter().sum();
        let alpha_len = total_sv * (n_classes.saturating_sub(1));
        let mut alpha = Vec::with_capacity(alpha_len);
        for i in 0..alpha_len {
            alpha.push(next_num(&mut toks, i)?);
        }

        let sv_len = total_sv * space_size;
        let mut support_vectors = Vec::with_capacity(sv_len);
        for i in 0..sv_len {
            support_vectors.push(next_num(&mut toks, i)?);
        }

        let bias_len = n_pairs(n_classes);
        let mut bias = Vec::with_capacity(bias_len);
        for i in 0..bias_len {
            bias.push(next_num(&mut toks, i)?);
        }

        let mut model = Model {
            space_size,
            kernel,
            classes,
            n_support_vectors,
            alpha,
            support_vectors,
            bias,
            primal_coefficients: None,
        };
        if matches!(model.kernel, Kernel::Linear) {
            model.primal_coefficients = Some(model.compute_primal_coefficients());
        }
        Ok(model)
    }

    /// Precomputes each class's primal weight vector (linear kernel fast
    /// path): `w_class = Σ_t alpha_{class,t} * sv_t`.
    fn compute_primal_coefficients(&self) -> Vec<Vec<f64>> {
        let n_classes = self.n_classes();
        let total_sv = self.total_sv();
        let mut weights = vec![vec![0.0; self.space_size]; n_classes];
        for class in 0..n_classes {
            let offset = self.sv_offset(class);
            for t in 0..self.n_support_vectors[class] {
                let sv = self.sv_row(offset + t);
                // alpha is column-major: column `col` (the "other class" in
                // the OVO dual, skipping the class's own column) holds one
                // entry per global support vector, stride `total_sv`.
                for other in 0..n_classes {
                    if other == class {
                        continue;
                    }
                    let col = if other < class { other } else { other - 1 };
                    let a = self.alpha[col * total_sv + offset + t];
                    for k in 0..self.space_size {
                        weights[class][k] += a * sv[k];
                    }
                }
            }
        }
        weights
    }

    /// Concrete per-pair scores, `N*(N-1)/2` entries.
    pub fn score(&self, x: &[f64]) -> Vec<f64> {
        let n_classes = self.n_classes();
        let mut out = vec![0.0; n_pairs(n_classes)];
        if let Some(primal) = &self.primal_coefficients {
            for i in 0..n_classes {
                for j in (i + 1)..n_classes {
                    let dot_i: f64 = primal[i].iter().zip(x).map(|(w, xi)| w * xi).sum();
                    let dot_j: f64 = primal[j].iter().zip(x).map(|(w, xi)| w * xi).sum();
                    out[pair_index(i, j, n_classes)] =
                        dot_i - dot_j + self.bias[pair_index(i, j, n_classes)];
                }
            }
            return out;
        }

        // General kernel path: evaluate K(x, sv) once per support vector.
        let total_sv = self.total_sv();
        let k_all: Vec<f64> = (0..total_sv)
            .map(|t| self.kernel.compute(x, self.sv_row(t)))
            .collect();
        for i in 0..n_classes {
            for j in (i + 1)..n_classes {
                let off_i = self.sv_offset(i);
                let off_j = self.sv_offset(j);
                let mut s = 0.0;
                // Alpha is column-major: `col*total_sv + sv_idx`, mirroring
                // the original's `(j-1)*total_sv+offset+t` / `i*total_sv+offset+t`.
                for t in 0..self.n_support_vectors[i] {
                    let sv_idx = off_i + t;
                    let col = j - 1;
                    s += self.alpha[col * total_sv + sv_idx] * k_all[sv_idx];
                }
                for t in 0..self.n_support_vectors[j] {
                    let sv_idx = off_j + t;
                    let col = i;
                    s += self.alpha[col * total_sv + sv_idx] * k_all[sv_idx];
                }
                s += self.bias[pair_index(i, j, n_classes)];
                out[pair_index(i, j, n_classes)] = s;
            }
        }
        out
    }

    /// Concrete classification: tallies votes over all pairs (`score>=0`
    /// means `i` wins the pair), returns every class tied for the max.
    pub fn classify(&self, x: &[f64]) -> Vec<String> {
        let n_classes = self.n_classes();
        let scores = self.score(x);
        let mut votes = vec![0u32; n_classes];
        for i in 0..n_classes {
            for j in (i + 1)..n_classes {
                if scores[pair_index(i, j, n_classes)] >= 0.0 {
                    votes[i] += 1;
                } else {
                    votes[j] += 1;
                }
            }
        }
        let max_votes = *votes.iter().max().unwrap_or(&0);
        self.classes
            .iter()
            .zip(&votes)
            .filter(|(_, &v)| v == max_votes)
            .map(|(c, _)| c.clone())
            .collect()
    }
}

fn next_num<T: std::str::FromStr>(
    toks: &mut std::str::SplitWhitespace<'_>,
    index: usize,
) -> Result<T, ModelError> {
    let tok = toks
        .next()
        .ok_or_else(|| ModelError::ShortRead { what: "numeric field", expected: index + 1, got: index })?;
    tok.parse().map_err(|_| ModelError::BadNumber { index, text: tok.to_string() })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linear_2class_model() -> Model {
        // w = (1, 0), bias 0, encoded as a degenerate single-SV linear
        // classifier whose primal coefficients we set directly via parse.
        let text = "ovo 2 2\nlinear\nclassA 1\nclassB 1\n1.0\n1.0 0.0\n0.0 0.0\n0.0\n";
        Model::parse(text).unwrap()
    }

    #[test]
    fn pair_index_matches_triangular_formula() {
        assert_eq!(pair_index(0, 1, 3), 0);
        assert_eq!(pair_index(0, 2, 3), 1);
        assert_eq!(pair_index(1, 2, 3), 2);
    }

    #[test]
    fn scenario_1_linear_score_matches_expected() {
        let m = linear_2class_model();
        let score = m.score(&[0.3, 0.5]);
        assert!((score[0] - 0.3).abs() < 1e-9);
    }

    /// Three classes, one RBF support vector each, so every alpha column
    /// picks out a distinct entry of the flat column-major array. A
    /// row-major misreading of this layout attributes the wrong support
    /// vector's coefficient to the wrong class pair and silently breaks
    /// the scoring below.
    fn rbf_3class_model() -> Model {
        let text = "ovo 3 3\n\
                     rbf 1.0\n\
                     classA 1\nclassB 1\nclassC 1\n\
                     10.0 20.0\n\
                     30.0 40.0\n\
                     50.0 60.0\n\
                     -1.0 0.0 -2.0\n\
                     1.0 2.0 3.0\n\
                     0.0 0.0 0.0\n";
        Model::parse(text).unwrap()
    }

    #[test]
    fn alpha_column_major_layout_attributes_correct_coefficients() {
        let m = rbf_3class_model();
        let total_sv = m.total_sv();
        assert_eq!(total_sv, 3);

        // Column-major: column `col`'s entries are contiguous, stride
        // `total_sv`. Column 0 (classB vs classA's alpha, classC vs classA's
        // alpha) = [10,20,30]; column 1 = [40,50,60].
        let x = [0.0, 0.0];
        let k_a = m.kernel.compute(&x, m.sv_row_pub(0));
        let k_b = m.kernel.compute(&x, m.sv_row_pub(1));
        let k_c = m.kernel.compute(&x, m.sv_row_pub(2));

        // Column-major alpha: alpha[0..3] = [10,20,30] (column 0, one entry
        // per global sv), alpha[3..6] = [40,50,60] (column 1).
        // Pair (0,1): classA's column-0 entry (sv 0, =10) plus classB's
        // column-0 entry (sv 1, =20).
        let expected_01 = 10.0 * k_a + 20.0 * k_b;
        // Pair (0,2): classA's column-1 entry (sv 0, =40) plus classC's
        // column-0 entry (sv 2, =30).
        let expected_02 = 40.0 * k_a + 30.0 * k_c;
        // Pair (1,2): classB's column-1 entry (sv 1, =50) plus classC's
        // column-1 entry (sv 2, =60).
        let expected_12 = 50.0 * k_b + 60.0 * k_c;

        let scores = m.score(&x);
        assert!((scores[pair_index(0, 1, 3)] - expected_01).abs() < 1e-9);
        assert!((scores[pair_index(0, 2, 3)] - expected_02).abs() < 1e-9);
        assert!((scores[pair_index(1, 2, 3)] - expected_12).abs() < 1e-9);
    }
}
