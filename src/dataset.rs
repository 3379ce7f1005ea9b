//! CSV dataset loading: header `# <rows> <cols>`, rows `label,f1,...,f_n`.

use crate::error::DatasetError;

#[derive(Clone, Debug)]
pub struct Dataset {
    pub space_size: usize,
    pub labels: Vec<String>,
    pub rows: Vec<Vec<f64>>,
}

impl Dataset {
    pub fn size(&self) -> usize {
        self.rows.len()
    }

    pub fn row(&self, i: usize) -> &[f64] {
        &self.rows[i]
    }

    pub fn label(&self, i: usize) -> &str {
        &self.labels[i]
    }

    pub fn parse(text: &str) -> Result<Self, DatasetError> {
        let mut lines = text.lines();
        let header = lines.next().ok_or_else(|| DatasetError::Header(String::new()))?;
        let parts: Vec<&str> = header.trim_start_matches('#').split_whitespace().collect();
        if parts.len() != 2 {
            return Err(DatasetError::Header(header.to_string()));
        }
        let n_rows: usize = parts[0].parse().map_err(|_| DatasetError::Header(header.to_string()))?;
        let n_cols: usize = parts[1].parse().map_err(|_| DatasetError::Header(header.to_string()))?;

        let mut labels = Vec::with_capacity(n_rows);
        let mut rows = Vec::with_capacity(n_rows);
        for (row_idx, line) in lines.enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let fields: Vec<&str> = line.split(',').collect();
            if fields.len() != n_cols + 1 {
                return Err(DatasetError::RowShape { row: row_idx, expected: n_cols + 1, got: fields.len() });
            }
            labels.push(fields[0].to_string());
            let mut row = Vec::with_capacity(n_cols);
            for (col, tok) in fields[1..].iter().enumerate() {
                let v: f64 = tok
                    .trim()
                    .parse()
                    .map_err(|_| DatasetError::BadNumber { row: row_idx, col, text: tok.to_string() })?;
                row.push(v);
            }
            rows.push(row);
            if rows.len() == n_rows {
                break;
            }
        }
        Ok(Dataset { space_size: n_cols, labels, rows })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_header_and_rows() {
        let text = "# 2 2\nclassA,0.3,0.5\nclassB,0.1,0.9\n";
        let d = Dataset::parse(text).unwrap();
        assert_eq!(d.size(), 2);
        assert_eq!(d.space_size, 2);
        assert_eq!(d.row(0), &[0.3, 0.5]);
        assert_eq!(d.label(1), "classB");
    }

    #[test]
    fn rejects_ragged_row() {
        let text = "# 1 2\nclassA,0.3\n";
        let err = Dataset::parse(text).unwrap_err();
        assert!(matches!(err, DatasetError::RowShape { .. }));
    }
}
