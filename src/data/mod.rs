pub mod data_table;
pub mod writers;

pub use data_table::{DataTable, LabelColumn, Observation};
pub use writers::{write_feature_rows, write_submission};
