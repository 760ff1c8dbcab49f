//! Labeled and unlabeled digit tables.
//!
//! Source format:
//! - comma-separated integers, one observation per row
//! - an optional header row (detected when any cell of the first record is
//!   not an integer)
//! - in labeled mode one column (usually 0) holds the digit; every remaining
//!   column is a pixel in 0..=255
//!
//! Parsed tables can be cached to a compact binary file so later runs skip
//! the CSV parse.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read};
use std::path::Path;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::network::topology::{DIGITS_COUNT, IMG_AREA};

// ---------------------------------------------------------------------------
// Observation
// ---------------------------------------------------------------------------

/// One image: its digit (absent for inference inputs) and 784 pixels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    label: Option<u8>,
    features: Vec<u8>,
}

impl Observation {
    pub fn new(label: Option<usize>, features: Vec<u8>) -> Result<Observation> {
        if features.len() != IMG_AREA {
            return Err(Error::ShapeMismatch {
                op: "observation",
                left: (1, features.len()),
                right: (1, IMG_AREA),
            });
        }
        let label = match label {
            Some(l) if l >= DIGITS_COUNT => return Err(Error::InvalidLabel(l)),
            Some(l) => Some(l as u8),
            None => None,
        };
        Ok(Observation { label, features })
    }

    pub fn label(&self) -> Option<usize> {
        self.label.map(usize::from)
    }

    pub fn features(&self) -> &[u8] {
        &self.features
    }
}

/// Where the digit lives in each CSV row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelColumn {
    Index(usize),
    /// Unlabeled rows, e.g. inference inputs.
    None,
}

// ---------------------------------------------------------------------------
// DataTable
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataTable {
    observations: Vec<Observation>,
    labeled: bool,
}

impl DataTable {
    /// Builds a table from observations that are either all labeled or all
    /// unlabeled.
    pub fn from_observations(observations: Vec<Observation>) -> Result<DataTable> {
        let first = observations.first().ok_or(Error::EmptyDataset)?;
        let labeled = first.label.is_some();
        if let Some(row) = observations.iter().position(|o| o.label.is_some() != labeled) {
            return Err(Error::InvalidObservation {
                row: row + 1,
                reason: "table mixes labeled and unlabeled rows".into(),
            });
        }
        Ok(DataTable { observations, labeled })
    }

    /// Parses a CSV file. I/O and CSV syntax failures become
    /// `Error::DataLoad`; bad cell values become `Error::InvalidObservation`
    /// with the 1-based data row number.
    pub fn from_csv<P: AsRef<Path>>(path: P, label_column: LabelColumn) -> Result<DataTable> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| Error::DataLoad {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let table = DataTable::from_reader(BufReader::new(file), label_column).map_err(|e| match e {
            Error::Csv(err) => Error::DataLoad { path: path.to_path_buf(), reason: err.to_string() },
            other => other,
        })?;
        log::info!("parsed {} observations from {}", table.len(), path.display());
        Ok(table)
    }

    pub fn from_reader<R: Read>(reader: R, label_column: LabelColumn) -> Result<DataTable> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);

        let mut observations = Vec::new();
        let mut row = 0usize;

        for (idx, result) in csv_reader.records().enumerate() {
            let record = result?;
            if idx == 0 && is_header(&record) {
                continue;
            }
            if record.iter().all(|c| c.is_empty()) {
                continue;
            }
            row += 1;
            observations.push(parse_record(&record, label_column, row)?);
        }

        DataTable::from_observations(observations)
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn is_labeled(&self) -> bool {
        self.labeled
    }

    /// Uniform draw with replacement.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&Observation> {
        self.observations.choose(rng)
    }

    /// Writes the table to a binary cache file.
    pub fn persist<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() {
                std::fs::create_dir_all(dir)?;
            }
        }
        let writer = BufWriter::new(File::create(path)?);
        bincode::serialize_into(writer, self)?;
        Ok(())
    }

    /// Reads a cache written by [`DataTable::persist`]. Every failure,
    /// including a cache that decodes but breaks the table invariants, is
    /// reported as `Error::DataLoad`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<DataTable> {
        let path = path.as_ref();
        let fail = |reason: String| Error::DataLoad { path: path.to_path_buf(), reason };

        let file = File::open(path).map_err(|e| fail(e.to_string()))?;
        let table: DataTable =
            bincode::deserialize_from(BufReader::new(file)).map_err(|e| fail(e.to_string()))?;
        table.revalidate().map_err(|e| fail(format!("invalid cached table: {}", e)))
    }

    /// Rebuilds a decoded table through the checked constructors.
    fn revalidate(self) -> Result<DataTable> {
        let labeled = self.labeled;
        let observations = self
            .observations
            .into_iter()
            .map(|o| Observation::new(o.label.map(usize::from), o.features))
            .collect::<Result<Vec<_>>>()?;
        let table = DataTable::from_observations(observations)?;
        if table.labeled != labeled {
            return Err(Error::InvalidObservation {
                row: 1,
                reason: "labeled flag disagrees with the rows".into(),
            });
        }
        Ok(table)
    }

    /// Loads the binary cache, or rebuilds it from the CSV source when the
    /// cache is missing or unreadable.
    pub fn load_or_build<P: AsRef<Path>, Q: AsRef<Path>>(
        cache: P,
        source: Q,
        label_column: LabelColumn,
    ) -> Result<DataTable> {
        match DataTable::load(&cache) {
            Ok(table) => {
                log::info!("loaded {} observations from cache", table.len());
                Ok(table)
            }
            Err(e) => {
                log::warn!("{}; loading file from disk", e);
                let table = DataTable::from_csv(source, label_column)?;
                if let Err(e) = table.persist(&cache) {
                    log::warn!("could not write cache {}: {}", cache.as_ref().display(), e);
                }
                Ok(table)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

/// The first record is a header if any non-empty cell is not an integer.
fn is_header(record: &csv::StringRecord) -> bool {
    record.iter().any(|c| !c.is_empty() && c.parse::<i64>().is_err())
}

fn parse_record(record: &csv::StringRecord, label_column: LabelColumn, row: usize) -> Result<Observation> {
    let invalid = |reason: String| Error::InvalidObservation { row, reason };

    let mut cells: Vec<&str> = record.iter().collect();
    let label = match label_column {
        LabelColumn::Index(idx) => {
            if idx >= cells.len() {
                return Err(invalid(format!("no label column {} in {} cells", idx, cells.len())));
            }
            let cell = cells.remove(idx);
            let label = cell
                .parse::<usize>()
                .map_err(|_| invalid(format!("label '{}' is not a digit", cell)))?;
            Some(label)
        }
        LabelColumn::None => None,
    };

    let features = cells
        .iter()
        .map(|c| {
            c.parse::<u8>()
                .map_err(|_| invalid(format!("pixel '{}' is not an integer in 0..=255", c)))
        })
        .collect::<Result<Vec<u8>>>()?;

    Observation::new(label, features).map_err(|e| invalid(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn row(label: Option<u8>, pixel: u8) -> String {
        let mut cells: Vec<String> = Vec::new();
        if let Some(l) = label {
            cells.push(l.to_string());
        }
        cells.extend(std::iter::repeat(pixel.to_string()).take(IMG_AREA));
        cells.join(",")
    }

    fn header(labeled: bool) -> String {
        let mut cells: Vec<String> = Vec::new();
        if labeled {
            cells.push("label".into());
        }
        cells.extend((0..IMG_AREA).map(|i| format!("pixel{}", i)));
        cells.join(",")
    }

    #[test]
    fn labeled_csv_with_header() {
        let text = format!("{}\n{}\n{}\n", header(true), row(Some(7), 0), row(Some(2), 255));
        let table = DataTable::from_reader(text.as_bytes(), LabelColumn::Index(0)).unwrap();
        assert_eq!(table.len(), 2);
        assert!(table.is_labeled());
        assert_eq!(table.observations()[0].label(), Some(7));
        assert_eq!(table.observations()[1].features()[783], 255);
    }

    #[test]
    fn unlabeled_csv_without_header() {
        let text = format!("{}\n{}\n", row(None, 3), row(None, 4));
        let table = DataTable::from_reader(text.as_bytes(), LabelColumn::None).unwrap();
        assert_eq!(table.len(), 2);
        assert!(!table.is_labeled());
        assert_eq!(table.observations()[1].label(), None);
        assert_eq!(table.observations()[1].features().len(), IMG_AREA);
    }

    #[test]
    fn label_column_can_be_last() {
        let mut cells: Vec<String> = std::iter::repeat("1".to_string()).take(IMG_AREA).collect();
        cells.push("9".into());
        let text = cells.join(",");
        let table = DataTable::from_reader(text.as_bytes(), LabelColumn::Index(IMG_AREA)).unwrap();
        assert_eq!(table.observations()[0].label(), Some(9));
    }

    #[test]
    fn bad_rows_report_their_row_number() {
        let text = format!("{}\n{}\n", row(Some(1), 0), row(Some(12), 0));
        match DataTable::from_reader(text.as_bytes(), LabelColumn::Index(0)) {
            Err(Error::InvalidObservation { row, .. }) => assert_eq!(row, 2),
            other => panic!("expected invalid observation, got {:?}", other),
        }

        let short = "1,2,3";
        assert!(matches!(
            DataTable::from_reader(short.as_bytes(), LabelColumn::Index(0)),
            Err(Error::InvalidObservation { row: 1, .. })
        ));

        let text = row(Some(1), 0).replacen(",0", ",256", 1);
        assert!(DataTable::from_reader(text.as_bytes(), LabelColumn::Index(0)).is_err());
    }

    #[test]
    fn empty_source_is_an_error() {
        let text = format!("{}\n", header(true));
        assert!(matches!(
            DataTable::from_reader(text.as_bytes(), LabelColumn::Index(0)),
            Err(Error::EmptyDataset)
        ));
    }

    #[test]
    fn sample_draws_from_the_table() {
        let obs = vec![
            Observation::new(Some(1), vec![1; IMG_AREA]).unwrap(),
            Observation::new(Some(2), vec![2; IMG_AREA]).unwrap(),
        ];
        let table = DataTable::from_observations(obs).unwrap();
        let mut rng = StdRng::seed_from_u64(9);
        let mut seen = [false; 3];
        for _ in 0..100 {
            let o = table.sample(&mut rng).unwrap();
            seen[o.label().unwrap()] = true;
        }
        assert!(seen[1] && seen[2]);
    }

    #[test]
    fn mixed_labels_are_rejected() {
        let obs = vec![
            Observation::new(Some(1), vec![0; IMG_AREA]).unwrap(),
            Observation::new(None, vec![0; IMG_AREA]).unwrap(),
        ];
        assert!(DataTable::from_observations(obs).is_err());
    }

    #[test]
    fn cache_round_trip_and_rebuild() {
        let dir = tempfile::tempdir().unwrap();
        let csv_path = dir.path().join("train.csv");
        let cache_path = dir.path().join("cache").join("train.data");
        std::fs::write(&csv_path, format!("{}\n{}\n", header(true), row(Some(5), 9))).unwrap();

        assert!(matches!(DataTable::load(&cache_path), Err(Error::DataLoad { .. })));

        let built = DataTable::load_or_build(&cache_path, &csv_path, LabelColumn::Index(0)).unwrap();
        assert!(cache_path.exists());

        let cached = DataTable::load(&cache_path).unwrap();
        assert_eq!(cached.observations(), built.observations());
        assert!(cached.is_labeled());
    }

    #[test]
    fn corrupt_cache_falls_back_to_source() {
        let dir = tempfile::tempdir().unwrap();
        let csv_path = dir.path().join("train.csv");
        let cache_path = dir.path().join("train.data");
        std::fs::write(&csv_path, row(Some(4), 1)).unwrap();
        std::fs::write(&cache_path, b"not a table").unwrap();

        let table = DataTable::load_or_build(&cache_path, &csv_path, LabelColumn::Index(0)).unwrap();
        assert_eq!(table.observations()[0].label(), Some(4));
        assert!(DataTable::load(&cache_path).is_ok());
    }

    #[test]
    fn malformed_cache_is_rebuilt_from_source() {
        let dir = tempfile::tempdir().unwrap();
        let csv_path = dir.path().join("train.csv");
        let cache_path = dir.path().join("train.data");
        std::fs::write(&csv_path, row(Some(6), 2)).unwrap();

        // Decodes fine but holds an out-of-range label and three pixels.
        let bad = DataTable {
            observations: vec![Observation { label: Some(42), features: vec![1, 2, 3] }],
            labeled: true,
        };
        bad.persist(&cache_path).unwrap();
        assert!(matches!(DataTable::load(&cache_path), Err(Error::DataLoad { .. })));

        let table = DataTable::load_or_build(&cache_path, &csv_path, LabelColumn::Index(0)).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.observations()[0].label(), Some(6));
        assert_eq!(table.observations()[0].features().len(), IMG_AREA);

        let cached = DataTable::load(&cache_path).unwrap();
        assert_eq!(cached.observations(), table.observations());
    }

    #[test]
    fn cache_with_wrong_labeled_flag_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let cache_path = dir.path().join("train.data");
        let bad = DataTable {
            observations: vec![Observation::new(None, vec![0; IMG_AREA]).unwrap()],
            labeled: true,
        };
        bad.persist(&cache_path).unwrap();
        assert!(matches!(DataTable::load(&cache_path), Err(Error::DataLoad { .. })));
    }

    #[test]
    fn missing_csv_is_data_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let res = DataTable::from_csv(dir.path().join("absent.csv"), LabelColumn::None);
        assert!(matches!(res, Err(Error::DataLoad { .. })));
    }
}
