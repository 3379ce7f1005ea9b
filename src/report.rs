//! Output formatting: the tab-separated per-sample line and the
//! `[SUMMARY]` line.

use std::io::Write;

/// One row of per-sample output.
pub struct SampleRow<'a> {
    pub classifier_path: &'a str,
    pub dataset_path: &'a str,
    pub id: usize,
    pub epsilon: f64,
    pub true_label: &'a str,
    pub concrete_labels: &'a [String],
    pub abstract_labels: &'a [String],
    pub counterexample_status: Option<&'a str>,
}

impl<'a> SampleRow<'a> {
    pub fn write_to<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        write!(
            out,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}",
            self.classifier_path,
            self.dataset_path,
            self.id,
            self.epsilon,
            self.true_label,
            self.concrete_labels.join(","),
            self.abstract_labels.join(","),
        )?;
        if let Some(status) = self.counterexample_status {
            write!(out, "\t{}", status)?;
        }
        writeln!(out)
    }
}

/// The final `[SUMMARY]` line.
pub struct Summary {
    pub size: usize,
    pub epsilon: f64,
    pub avg_ms_per_sample: f64,
    pub correct: usize,
    pub robust: usize,
    pub conditionally_robust: usize,
    pub balanced_accuracy: Option<f64>,
    pub counterexamples_found: usize,
}

impl Summary {
    pub fn write_to<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        write!(
            out,
            "[SUMMARY]\tsize={}\tepsilon={}\tavg_ms={:.4}\tcorrect={}\trobust={}\tconditionally_robust={}",
            self.size,
            self.epsilon,
            self.avg_ms_per_sample,
            self.correct,
            self.robust,
            self.conditionally_robust,
        )?;
        if let Some(acc) = self.balanced_accuracy {
            write!(out, "\tbalanced_accuracy={:.4}", acc)?;
        }
        writeln!(out, "\tcounterexamples_found={}", self.counterexamples_found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_row_is_tab_separated() {
        let mut buf = Vec::new();
        let row = SampleRow {
            classifier_path: "m.svm",
            dataset_path: "d.csv",
            id: 0,
            epsilon: 0.2,
            true_label: "A",
            concrete_labels: &["A".to_string()],
            abstract_labels: &["A".to_string(), "B".to_string()],
            counterexample_status: Some("none"),
        };
        row.write_to(&mut buf).unwrap();
        let s = String::from_utf8(buf).unwrap();
        assert_eq!(s, "m.svm\td.csv\t0\t0.2\tA\tA\tA,B\tnone\n");
    }
}
