//! Loader for MATLAB v5 `.mat` containers.
//!
//! Known datasets store their series under a handful of field names. The
//! lookup is an ordered table: the first rule whose fields are present wins.

use causal_compare_core::{LoadError, SourceKind, TimeSeriesPair};
use matfile::{MatFile, NumericData};
use std::path::Path;

/// A numeric array lifted out of the container, stored column-major.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedArray {
    pub name: String,
    pub dims: Vec<usize>,
    pub values: Vec<f64>,
}

/// How a recognised field is turned into X and Y.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRule {
    /// Two separate vectors.
    VectorPair { x: &'static str, y: &'static str },
    /// One 2xN matrix: row 1 is X, row 2 is Y.
    RowMatrix(&'static str),
}

/// Recognised fields in priority order.
pub const FIELD_RULES: &[FieldRule] = &[
    FieldRule::VectorPair { x: "x", y: "y" },
    FieldRule::RowMatrix("OldFFGeyser"),
    FieldRule::RowMatrix("gasfurnace"),
    FieldRule::RowMatrix("eeg"),
];

fn find<'a>(arrays: &'a [NamedArray], name: &str) -> Option<&'a NamedArray> {
    arrays.iter().find(|a| a.name == name)
}

/// Splits a two-row (or two-column) matrix into its X and Y series.
fn split_rows(array: &NamedArray) -> Result<(Vec<f64>, Vec<f64>), LoadError> {
    match array.dims.as_slice() {
        // column-major 2xN: elements alternate x, y
        [2, _] => Ok(array
            .values
            .chunks_exact(2)
            .map(|c| (c[0], c[1]))
            .unzip()),
        // Nx2: first column then second column
        [n, 2] => {
            let (x, y) = array.values.split_at(*n);
            Ok((x.to_vec(), y.to_vec()))
        }
        dims => Err(LoadError::UnparseableFormat(format!(
            "field '{}' has shape {:?}, expected a 2xN matrix",
            array.name, dims
        ))),
    }
}

/// Applies [`FIELD_RULES`] to the arrays of a container.
///
/// # Errors
/// `UnparseableFormat` listing the available field names when no rule
/// matches, or when a matching matrix has the wrong shape.
pub fn extract_pair(arrays: &[NamedArray]) -> Result<(Vec<f64>, Vec<f64>), LoadError> {
    for rule in FIELD_RULES {
        match *rule {
            FieldRule::VectorPair { x, y } => {
                if let (Some(xa), Some(ya)) = (find(arrays, x), find(arrays, y)) {
                    tracing::info!("Using fields '{}' and '{}'", x, y);
                    return Ok((xa.values.clone(), ya.values.clone()));
                }
            }
            FieldRule::RowMatrix(name) => {
                if let Some(array) = find(arrays, name) {
                    tracing::info!("Using rows of matrix '{}'", name);
                    return split_rows(array);
                }
            }
        }
    }

    let available: Vec<&str> = arrays.iter().map(|a| a.name.as_str()).collect();
    Err(LoadError::UnparseableFormat(format!(
        "no recognised field; available fields: [{}]",
        available.join(", ")
    )))
}

fn real_values(data: &NumericData) -> Option<Vec<f64>> {
    let values = match data {
        NumericData::Double { real, .. } => real.clone(),
        NumericData::Single { real, .. } => real.iter().map(|v| f64::from(*v)).collect(),
        NumericData::Int32 { real, .. } => real.iter().map(|v| f64::from(*v)).collect(),
        NumericData::Int16 { real, .. } => real.iter().map(|v| f64::from(*v)).collect(),
        NumericData::UInt16 { real, .. } => real.iter().map(|v| f64::from(*v)).collect(),
        NumericData::Int8 { real, .. } => real.iter().map(|v| f64::from(*v)).collect(),
        NumericData::UInt8 { real, .. } => real.iter().map(|v| f64::from(*v)).collect(),
        _ => return None,
    };
    Some(values)
}

/// Parses a `.mat` file into its numeric arrays. Unsupported element types are skipped.
///
/// # Errors
/// `Io` if the file cannot be opened, `UnparseableFormat` if it is not a
/// readable MAT v5 container.
pub fn read_arrays(path: &Path) -> Result<Vec<NamedArray>, LoadError> {
    let file = std::fs::File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mat = MatFile::parse(std::io::BufReader::new(file))
        .map_err(|e| LoadError::UnparseableFormat(format!("invalid MAT file: {e:?}")))?;

    let mut arrays = Vec::new();
    for array in mat.arrays() {
        match real_values(array.data()) {
            Some(values) => arrays.push(NamedArray {
                name: array.name().to_string(),
                dims: array.size().to_vec(),
                values,
            }),
            None => tracing::debug!("Skipping field '{}' with unsupported type", array.name()),
        }
    }
    Ok(arrays)
}

/// Loads a `.mat` container into a pair.
///
/// # Errors
/// Any [`LoadError`] from reading or field extraction.
pub fn load_binary(path: &Path, min_samples: usize) -> Result<TimeSeriesPair, LoadError> {
    let arrays = read_arrays(path)?;
    let (x, y) = extract_pair(&arrays)?;
    TimeSeriesPair::new(x, y, SourceKind::Binary, min_samples)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vector(name: &str, values: Vec<f64>) -> NamedArray {
        NamedArray {
            name: name.to_string(),
            dims: vec![values.len(), 1],
            values,
        }
    }

    #[test]
    fn vector_pair_wins_over_matrix() {
        let arrays = vec![
            NamedArray {
                name: "eeg".to_string(),
                dims: vec![2, 2],
                values: vec![9.0, 9.0, 9.0, 9.0],
            },
            vector("y", vec![4.0, 5.0]),
            vector("x", vec![1.0, 2.0]),
        ];
        let (x, y) = extract_pair(&arrays).unwrap();
        assert_eq!(x, vec![1.0, 2.0]);
        assert_eq!(y, vec![4.0, 5.0]);
    }

    #[test]
    fn matrix_rows_are_read_column_major() {
        // [[1, 2, 3], [10, 20, 30]] stored column by column
        let arrays = vec![NamedArray {
            name: "gasfurnace".to_string(),
            dims: vec![2, 3],
            values: vec![1.0, 10.0, 2.0, 20.0, 3.0, 30.0],
        }];
        let (x, y) = extract_pair(&arrays).unwrap();
        assert_eq!(x, vec![1.0, 2.0, 3.0]);
        assert_eq!(y, vec![10.0, 20.0, 30.0]);
    }

    #[test]
    fn transposed_matrix_is_read_by_columns() {
        let arrays = vec![NamedArray {
            name: "OldFFGeyser".to_string(),
            dims: vec![3, 2],
            values: vec![1.0, 2.0, 3.0, 10.0, 20.0, 30.0],
        }];
        let (x, y) = extract_pair(&arrays).unwrap();
        assert_eq!(x, vec![1.0, 2.0, 3.0]);
        assert_eq!(y, vec![10.0, 20.0, 30.0]);
    }

    #[test]
    fn geyser_has_priority_over_eeg() {
        let arrays = vec![
            NamedArray {
                name: "eeg".to_string(),
                dims: vec![2, 1],
                values: vec![0.0, 0.0],
            },
            NamedArray {
                name: "OldFFGeyser".to_string(),
                dims: vec![2, 1],
                values: vec![7.0, 8.0],
            },
        ];
        let (x, y) = extract_pair(&arrays).unwrap();
        assert_eq!((x, y), (vec![7.0], vec![8.0]));
    }

    #[test]
    fn unknown_fields_are_listed_in_error() {
        let arrays = vec![vector("alpha", vec![1.0]), vector("beta", vec![2.0])];
        let err = extract_pair(&arrays).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("alpha, beta"), "message was {msg}");
    }

    #[test]
    fn wrong_matrix_shape_is_rejected() {
        let arrays = vec![NamedArray {
            name: "eeg".to_string(),
            dims: vec![3, 3],
            values: vec![0.0; 9],
        }];
        assert!(matches!(
            extract_pair(&arrays),
            Err(LoadError::UnparseableFormat(_))
        ));
    }

    #[test]
    fn lone_x_vector_is_not_enough() {
        let arrays = vec![vector("x", vec![1.0, 2.0])];
        assert!(extract_pair(&arrays).is_err());
    }

    /// Writes a level 5 MAT file holding one real double matrix.
    fn write_mat(name: &str, dims: [i32; 2], values: &[f64]) -> tempfile::NamedTempFile {
        fn element(data_type: u32, payload: &[u8], out: &mut Vec<u8>) {
            out.extend_from_slice(&data_type.to_le_bytes());
            out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
            out.extend_from_slice(payload);
            out.resize(out.len().next_multiple_of(8), 0);
        }

        let mut matrix = Vec::new();
        // miUINT32 flags: mxDOUBLE_CLASS
        element(6, &[6u32.to_le_bytes(), 0u32.to_le_bytes()].concat(), &mut matrix);
        element(
            5,
            &[dims[0].to_le_bytes(), dims[1].to_le_bytes()].concat(),
            &mut matrix,
        );
        element(1, name.as_bytes(), &mut matrix);
        let real: Vec<u8> = values.iter().flat_map(|v| v.to_le_bytes()).collect();
        element(9, &real, &mut matrix);

        let mut bytes = format!("{:<116}", "MATLAB 5.0 MAT-file").into_bytes();
        bytes.extend_from_slice(&[0u8; 8]);
        bytes.extend_from_slice(&0x0100u16.to_le_bytes());
        bytes.extend_from_slice(b"IM");
        // miMATRIX
        element(14, &matrix, &mut bytes);

        let mut file = tempfile::Builder::new().suffix(".mat").tempfile().unwrap();
        std::io::Write::write_all(&mut file, &bytes).unwrap();
        file
    }

    fn furnace_values(n: usize) -> Vec<f64> {
        (0..n).flat_map(|i| [i as f64, 100.0 + i as f64]).collect()
    }

    #[test]
    fn mat_file_matrix_rows_become_x_and_y() {
        let file = write_mat("gasfurnace", [2, 60], &furnace_values(60));

        let arrays = read_arrays(file.path()).unwrap();
        assert_eq!(arrays.len(), 1);
        assert_eq!(arrays[0].name, "gasfurnace");
        assert_eq!(arrays[0].dims, vec![2, 60]);

        let pair = crate::load_pair(file.path(), crate::SourceHint::Auto, 50).unwrap();
        assert_eq!(pair.source(), SourceKind::Binary);
        assert_eq!(pair.len(), 60);
        assert_eq!(pair.x()[0], 0.0);
        assert_eq!(pair.y()[0], 100.0);
        assert_eq!(pair.x()[59], 59.0);
        assert_eq!(pair.y()[59], 159.0);
    }

    #[test]
    fn mat_file_with_unknown_field_lists_it() {
        let file = write_mat("foo", [2, 60], &furnace_values(60));
        let err = load_binary(file.path(), 50).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("available fields: [foo]"), "message was {msg}");
    }

    #[test]
    fn garbage_file_is_unparseable() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, b"definitely not a mat file").unwrap();
        assert!(matches!(
            read_arrays(file.path()),
            Err(LoadError::UnparseableFormat(_))
        ));
    }
}
