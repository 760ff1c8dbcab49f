pub mod digits;

pub use digits::{handmade_file_to_features, handmade_to_features, render_grid};
