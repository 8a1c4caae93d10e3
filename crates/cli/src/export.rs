//! Feature table export

use dataset::Dataset;
use std::io::Write;

/// Write one row per retained cycle: `cycle`, every feature column, `target`
pub fn write_feature_table<W: Write>(dataset: &Dataset, writer: W) -> csv::Result<()> {
    let mut out = csv::Writer::from_writer(writer);

    let mut header = Vec::with_capacity(dataset.n_features() + 2);
    header.push("cycle".to_string());
    header.extend(dataset.feature_names.iter().cloned());
    header.push("target".to_string());
    out.write_record(&header)?;

    for ((cycle_id, features), target) in dataset
        .cycle_ids
        .iter()
        .zip(dataset.features.rows())
        .zip(dataset.targets.iter())
    {
        let mut record = Vec::with_capacity(header.len());
        record.push(cycle_id.to_string());
        record.extend(features.iter().map(|v| v.to_string()));
        record.push(target.to_string());
        out.write_record(&record)?;
    }

    out.flush()?;
    Ok(())
}
