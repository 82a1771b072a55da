//! CSV input of sparse triplets and fixed-precision CSV output of the factors.

use std::fmt::Display;
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::Path;

use anyhow::{anyhow, Context};
use csv::{ReaderBuilder, Trim, WriterBuilder};
use ndarray::{Array1, Array2};
use num_traits::Float;

use crate::randomized::Factorization;
use crate::sparse::Triplet;

/// Decimals written for every value.
pub const PRECISION: usize = 5;

/// Reads `row,col,value` records.
///
/// Index fields may be written as floats (`3.0`) but must hold non-negative integers.
/// Lines starting with `#` are skipped.
pub fn read_triplets(path: &Path) -> anyhow::Result<Vec<Triplet>> {
    let file = File::open(path).with_context(|| format!("could not open {}", path.display()))?;
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(false)
        .trim(Trim::All)
        .comment(Some(b'#'))
        .from_reader(BufReader::new(file));

    let mut triplets = Vec::new();
    for (num_record, result) in rdr.records().enumerate() {
        let record = result.with_context(|| format!("malformed record {} in {}", num_record + 1, path.display()))?;
        if record.len() != 3 {
            return Err(anyhow!(
                "record {} has {} fields, expected row,col,value",
                num_record + 1,
                record.len()
            ));
        }
        let row = parse_index(&record[0], num_record + 1)?;
        let col = parse_index(&record[1], num_record + 1)?;
        let value: f64 = record[2]
            .parse()
            .map_err(|_| anyhow!("record {}: cannot parse value {:?}", num_record + 1, &record[2]))?;
        triplets.push((row, col, value));
    }

    log::info!("read {} triplets from {}", triplets.len(), path.display());
    Ok(triplets)
}

fn parse_index(field: &str, num_record: usize) -> anyhow::Result<usize> {
    if let Ok(index) = field.parse::<usize>() {
        return Ok(index);
    }
    let value: f64 = field
        .parse()
        .map_err(|_| anyhow!("record {}: cannot parse index {:?}", num_record, field))?;
    if !value.is_finite() || value < 0.0 || value.fract() != 0.0 || value > usize::MAX as f64 {
        return Err(anyhow!(
            "record {}: index {:?} is not a non-negative integer",
            num_record,
            field
        ));
    }
    Ok(value as usize)
}

/// Smallest shape holding every triplet.
pub fn infer_shape(triplets: &[Triplet]) -> (usize, usize) {
    triplets
        .iter()
        .fold((0, 0), |(rows, cols), &(i, j, _)| (rows.max(i + 1), cols.max(j + 1)))
}

fn format_value<F: Float + Display>(value: F) -> String {
    format!("{:.*}", PRECISION, value)
}

/// Writes one line per row, comma separated, no header.
pub fn write_matrix<F: Float + Display>(mat: &Array2<F>, path: &Path) -> anyhow::Result<()> {
    let mut wtr = WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .with_context(|| format!("could not create {}", path.display()))?;
    for row in mat.rows() {
        wtr.write_record(row.iter().map(|v| format_value(*v)))?;
    }
    wtr.flush()?;
    log::debug!("wrote {}x{} matrix to {}", mat.nrows(), mat.ncols(), path.display());
    Ok(())
}

/// Writes one value per line.
pub fn write_vector<F: Float + Display>(v: &Array1<F>, path: &Path) -> anyhow::Result<()> {
    let mut file = File::create(path).with_context(|| format!("could not create {}", path.display()))?;
    for value in v.iter() {
        writeln!(file, "{}", format_value(*value))?;
    }
    file.flush()?;
    log::debug!("wrote {} values to {}", v.len(), path.display());
    Ok(())
}

/// Writes `P·diag(σ)`, `V` and `σ`.
pub fn write_factorization(
    factors: &Factorization,
    left: &Path,
    right: &Path,
    sigma: &Path,
) -> anyhow::Result<()> {
    write_matrix(&factors.scaled_left(), left)?;
    write_matrix(&factors.right_factor(), right)?;
    write_vector(factors.s(), sigma)?;
    Ok(())
}

/// Reads back a file written by [`write_matrix`].
pub fn read_matrix(path: &Path) -> anyhow::Result<Array2<f64>> {
    let file = File::open(path).with_context(|| format!("could not open {}", path.display()))?;
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(false)
        .from_reader(BufReader::new(file));

    let mut data = Vec::new();
    let mut nrows = 0;
    let mut ncols = 0;
    for result in rdr.records() {
        let record = result?;
        ncols = record.len();
        for field in record.iter() {
            data.push(field.parse::<f64>().map_err(|_| anyhow!("cannot parse {:?}", field))?);
        }
        nrows += 1;
    }
    Ok(Array2::from_shape_vec((nrows, ncols), data)?)
}
