use std::path::Path;

use crate::error::Result;

/// Writes predictions as `ImageID,Digit` rows with 1-based ids.
pub fn write_submission<P: AsRef<Path>>(path: P, predictions: &[usize]) -> Result<()> {
    let mut writer = csv::Writer::from_path(ensure_parent(path.as_ref())?)?;
    writer.write_record(["ImageID", "Digit"])?;
    for (i, digit) in predictions.iter().enumerate() {
        writer.write_record([(i + 1).to_string(), digit.to_string()])?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes raw pixel rows as a header-less, label-less CSV that
/// `LabelColumn::None` tables read back.
pub fn write_feature_rows<P: AsRef<Path>>(path: P, rows: &[Vec<u8>]) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(ensure_parent(path.as_ref())?)?;
    for row in rows {
        writer.write_record(row.iter().map(|p| p.to_string()))?;
    }
    writer.flush()?;
    Ok(())
}

fn ensure_parent(path: &Path) -> Result<&Path> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            std::fs::create_dir_all(dir)?;
        }
    }
    Ok(path)
}
