//! JSON datasets on disk: the recorded signal in, the predictions and timings out.

use std::{
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::Path,
};

use anyhow::{Context, bail};
use ndarray::Array2;
use probe::ResultSet;
use serde::Deserialize;

/// The recorded spike counts, one row per neuron.
#[derive(Deserialize)]
struct SignalFile {
    spks: Vec<Vec<u8>>,
}

/// Reads a `(neurons, frames)` signal from `path`.
pub fn load_signal(path: &Path) -> anyhow::Result<Array2<u8>> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let SignalFile { spks } = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("parsing the signal in {}", path.display()))?;

    to_matrix(spks)
}

/// Writes `results` as JSON into `path`, replacing whatever was there.
pub fn save_results(path: &Path, results: &ResultSet) -> anyhow::Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;

    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, results)?;
    writer.flush()?;
    Ok(())
}

fn to_matrix(rows: Vec<Vec<u8>>) -> anyhow::Result<Array2<u8>> {
    let neurons = rows.len();
    let frames = rows.first().map_or(0, Vec::len);

    if let Some((i, row)) = rows.iter().enumerate().find(|(_, row)| row.len() != frames) {
        bail!(
            "neuron {i} has {} samples while neuron 0 has {frames}",
            row.len()
        );
    }

    let flat = rows.into_iter().flatten().collect();
    Ok(Array2::from_shape_vec((neurons, frames), flat)?)
}
