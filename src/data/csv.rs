//! CSV format dataset implementation
//!
//! Supports loading dense datasets from CSV files where:
//! - In labelled mode the last column is the label and the rest are features
//! - In unlabelled mode (novelty detection) every column is a feature
//! - The first row can be headers (automatically detected)
//! - Blank lines and lines starting with `#` are skipped

use crate::core::{Dataset, Result, SVMError, Sample};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Dataset implementation for CSV format files
#[derive(Debug, Clone)]
pub struct CSVDataset {
    samples: Vec<Sample>,
    dimensions: usize,
    labeled: bool,
}

impl CSVDataset {
    /// Load a labelled dataset from a CSV file
    ///
    /// The last column is assumed to be the label.
    /// Headers are automatically detected if present.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path).map_err(SVMError::IoError)?;
        Self::from_reader(BufReader::new(file))
    }

    /// Load an unlabelled dataset from a CSV file
    pub fn from_file_unlabeled<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path).map_err(SVMError::IoError)?;
        Self::from_reader_unlabeled(BufReader::new(file))
    }

    /// Load a labelled dataset from a reader
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        Self::from_reader_with_options(reader, true, true)
    }

    /// Load an unlabelled dataset from a reader
    ///
    /// Samples carry a label of 0.
    pub fn from_reader_unlabeled<R: BufRead>(reader: R) -> Result<Self> {
        Self::from_reader_with_options(reader, true, false)
    }

    /// Load a dataset from a reader with explicit header and label options
    pub fn from_reader_with_options<R: BufRead>(
        reader: R,
        auto_detect_header: bool,
        labeled: bool,
    ) -> Result<Self> {
        let mut samples = Vec::new();
        let mut width: Option<usize> = None;
        let mut first_row = true;

        for (line_no, line) in reader.lines().enumerate() {
            let line = line.map_err(SVMError::IoError)?;
            let line = line.trim();

            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if first_row {
                first_row = false;
                if auto_detect_header && Self::is_header_line(line, labeled) {
                    continue;
                }
            }

            let fields: Vec<&str> = line.split(',').map(|f| f.trim()).collect();
            match width {
                None => width = Some(fields.len()),
                Some(expected) if expected != fields.len() => {
                    return Err(SVMError::ParseError(format!(
                        "Line {}: expected {} fields, found {}",
                        line_no + 1,
                        expected,
                        fields.len()
                    )));
                }
                Some(_) => {}
            }

            samples.push(Self::parse_data_line(&fields, labeled, line_no + 1)?);
        }

        if samples.is_empty() {
            return Err(SVMError::EmptyDataset);
        }

        let dimensions = samples[0].dim();
        Ok(CSVDataset {
            samples,
            dimensions,
            labeled,
        })
    }

    /// Whether the last column was read as a label
    pub fn is_labeled(&self) -> bool {
        self.labeled
    }

    /// Feature vectors without labels, in file order
    pub fn features(&self) -> Vec<Vec<f64>> {
        self.samples.iter().map(|s| s.features.clone()).collect()
    }

    /// Check if a line appears to be a header
    fn is_header_line(line: &str, labeled: bool) -> bool {
        let fields: Vec<&str> = line.split(',').collect();

        let feature_columns = if labeled {
            // Exclude last column (label)
            fields.len().saturating_sub(1)
        } else {
            fields.len()
        };
        if feature_columns == 0 {
            return false;
        }

        let non_numeric_count = fields
            .iter()
            .take(feature_columns)
            .filter(|field| field.trim().parse::<f64>().is_err())
            .count();

        non_numeric_count * 2 > feature_columns
    }

    /// Parse the fields of one CSV row into a Sample
    fn parse_data_line(fields: &[&str], labeled: bool, line_no: usize) -> Result<Sample> {
        let (feature_fields, label) = if labeled {
            let (label_str, features) = fields.split_last().ok_or_else(|| {
                SVMError::ParseError(format!("Line {line_no}: no fields"))
            })?;
            if features.is_empty() {
                return Err(SVMError::ParseError(format!(
                    "Line {line_no}: has too few fields"
                )));
            }
            let label = label_str.parse::<f64>().map_err(|_| {
                SVMError::ParseError(format!("Line {line_no}: invalid label: {label_str}"))
            })?;
            (features, label)
        } else {
            (fields, 0.0)
        };

        let features = feature_fields
            .iter()
            .enumerate()
            .map(|(idx, field)| {
                field.parse::<f64>().map_err(|_| {
                    SVMError::ParseError(format!(
                        "Line {line_no}: invalid feature value at column {}: {field}",
                        idx + 1
                    ))
                })
            })
            .collect::<Result<Vec<f64>>>()?;

        Ok(Sample::new(features, label))
    }
}

impl Dataset for CSVDataset {
    fn len(&self) -> usize {
        self.samples.len()
    }

    fn dim(&self) -> usize {
        self.dimensions
    }

    fn get_sample(&self, i: usize) -> Sample {
        self.samples[i].clone()
    }

    fn samples(&self) -> Vec<Sample> {
        self.samples.clone()
    }

    fn get_labels(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.label).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_csv_basic() {
        let data = "1.0,2.0,1\n3.0,4.0,-1\n";
        let dataset = CSVDataset::from_reader(Cursor::new(data)).unwrap();

        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.dim(), 2);
        assert!(dataset.is_labeled());

        let sample1 = dataset.get_sample(0);
        assert_eq!(sample1.label, 1.0);
        assert_eq!(sample1.features, vec![1.0, 2.0]);

        let sample2 = dataset.get_sample(1);
        assert_eq!(sample2.label, -1.0);
        assert_eq!(sample2.features, vec![3.0, 4.0]);
    }

    #[test]
    fn test_csv_keeps_real_valued_labels() {
        let data = "1.0,2.0,0.5\n3.0,4.0,-2.25\n5.0,6.0,0\n";
        let dataset = CSVDataset::from_reader(Cursor::new(data)).unwrap();

        assert_eq!(dataset.get_labels(), vec![0.5, -2.25, 0.0]);
    }

    #[test]
    fn test_csv_zeros_are_kept_dense() {
        let data = "0.0,3.0,0.0,1\n";
        let dataset = CSVDataset::from_reader(Cursor::new(data)).unwrap();
        assert_eq!(dataset.get_sample(0).features, vec![0.0, 3.0, 0.0]);
    }

    #[test]
    fn test_csv_with_headers() {
        let data = "feature1,feature2,label\n1.0,2.0,1\n3.0,4.0,-1\n";
        let dataset = CSVDataset::from_reader(Cursor::new(data)).unwrap();

        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.get_labels(), vec![1.0, -1.0]);
    }

    #[test]
    fn test_csv_header_after_comment() {
        let data = "# exported\nx,y,target\n1.0,2.0,1\n";
        let dataset = CSVDataset::from_reader(Cursor::new(data)).unwrap();
        assert_eq!(dataset.len(), 1);
    }

    #[test]
    fn test_csv_empty_lines_and_comments() {
        let data = "# Comment\n1.0,2.0,1\n\n3.0,4.0,-1\n# trailing\n";
        let dataset = CSVDataset::from_reader(Cursor::new(data)).unwrap();
        assert_eq!(dataset.len(), 2);
    }

    #[test]
    fn test_csv_unlabeled() {
        let data = "x,y\n0.5,0.5\n0.1,-0.2\n";
        let dataset = CSVDataset::from_reader_unlabeled(Cursor::new(data)).unwrap();

        assert!(!dataset.is_labeled());
        assert_eq!(dataset.dim(), 2);
        assert_eq!(dataset.features(), vec![vec![0.5, 0.5], vec![0.1, -0.2]]);
        assert_eq!(dataset.get_labels(), vec![0.0, 0.0]);
    }

    #[test]
    fn test_csv_single_column_unlabeled() {
        let data = "1.5\n2.5\n";
        let dataset = CSVDataset::from_reader_unlabeled(Cursor::new(data)).unwrap();
        assert_eq!(dataset.features(), vec![vec![1.5], vec![2.5]]);
    }

    #[test]
    fn test_csv_inconsistent_width() {
        let data = "1.0,2.0,1\n3.0,-1\n";
        let result = CSVDataset::from_reader(Cursor::new(data));
        assert!(matches!(result, Err(SVMError::ParseError(_))));
    }

    #[test]
    fn test_csv_invalid_format() {
        // Too few fields
        let result = CSVDataset::from_reader(Cursor::new("1.0\n"));
        assert!(matches!(result, Err(SVMError::ParseError(_))));

        // Invalid number
        let result = CSVDataset::from_reader(Cursor::new("1.0,2.0,1\n1.0,abc,-1\n"));
        assert!(matches!(result, Err(SVMError::ParseError(_))));
    }

    #[test]
    fn test_csv_empty() {
        let result = CSVDataset::from_reader(Cursor::new("# nothing here\n\n"));
        assert!(matches!(result, Err(SVMError::EmptyDataset)));
    }

    #[test]
    fn test_csv_manual_header_control() {
        let data = "a,b,c\n1.0,2.0,1\n";
        let result = CSVDataset::from_reader_with_options(Cursor::new(data), false, true);
        assert!(matches!(result, Err(SVMError::ParseError(_))));
    }

    #[test]
    fn test_is_header_line() {
        assert!(CSVDataset::is_header_line("feature1,feature2,label", true));
        assert!(CSVDataset::is_header_line("x1,x2,x3,y", true));
        assert!(!CSVDataset::is_header_line("1.0,2.0,3.0,1", true));
        assert!(!CSVDataset::is_header_line("1", true));
        assert!(CSVDataset::is_header_line("x", false));
        assert!(!CSVDataset::is_header_line("0.5", false));
    }
}
