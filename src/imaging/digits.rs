//! Conversions between 784-pixel digit vectors and grayscale images.
//!
//! `render_grid` tiles sampled digits into one PNG for eyeballing a dataset;
//! `handmade_to_features` turns a hand-drawn PNG into an input row the
//! classifier can score.

use std::path::Path;

use image::{imageops::FilterType, GrayImage, Luma};
use rand::Rng;

use crate::data::data_table::DataTable;
use crate::error::{Error, Result};

/// Side length of one digit image.
pub const SIZE: u32 = 28;

/// Samples `wide × high` observations and tiles them into one grayscale
/// image. Pixel `k` of the digit in grid cell `(i, j)` lands at
/// `(i·28 + k mod 28, j·28 + k div 28)`.
///
/// Returns the image and the sampled feature rows in drawing order.
pub fn render_grid<R: Rng + ?Sized>(
    table: &DataTable,
    wide: u32,
    high: u32,
    rng: &mut R,
) -> Result<(GrayImage, Vec<Vec<u8>>)> {
    if wide == 0 || high == 0 {
        return Err(Error::Config("grid must be at least 1x1".into()));
    }

    let mut image = GrayImage::new(wide * SIZE, high * SIZE);
    let mut small_images = Vec::with_capacity((wide * high) as usize);

    for i in 0..wide {
        for j in 0..high {
            let digit = table.sample(rng).ok_or(Error::EmptyDataset)?;
            for (k, &pixel) in digit.features().iter().enumerate() {
                let k = k as u32;
                image.put_pixel(i * SIZE + k % SIZE, j * SIZE + k / SIZE, Luma([pixel]));
            }
            small_images.push(digit.features().to_vec());
        }
    }

    Ok((image, small_images))
}

/// Decodes a hand-drawn image into classifier input.
///
/// The image is converted to 8-bit grayscale and resized to 28×28 when it
/// is not already that size. Pure white (255) is kept as stroke; every other
/// pixel becomes 0.
pub fn handmade_to_features(bytes: &[u8]) -> Result<Vec<u8>> {
    let img = image::load_from_memory(bytes)?;
    let img = if img.width() != SIZE || img.height() != SIZE {
        img.resize_exact(SIZE, SIZE, FilterType::Lanczos3)
    } else {
        img
    };
    let gray = img.to_luma8();
    Ok(gray.pixels().map(|p| if p.0[0] == 255 { 255 } else { 0 }).collect())
}

/// Reads and converts a hand-drawn image file.
pub fn handmade_file_to_features<P: AsRef<Path>>(path: P) -> Result<Vec<u8>> {
    let bytes = std::fs::read(path)?;
    handmade_to_features(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::data_table::Observation;
    use image::ImageOutputFormat;
    use rand::{rngs::StdRng, SeedableRng};
    use std::io::Cursor;

    fn png_bytes(img: &GrayImage) -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        image::DynamicImage::ImageLuma8(img.clone())
            .write_to(&mut buf, ImageOutputFormat::Png)
            .unwrap();
        buf.into_inner()
    }

    #[test]
    fn grid_places_pixels_row_major_per_cell() {
        let mut features = vec![0u8; 784];
        features[0] = 10;
        features[29] = 20; // row 1, column 1
        let table =
            DataTable::from_observations(vec![Observation::new(Some(0), features.clone()).unwrap()])
                .unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        let (img, rows) = render_grid(&table, 2, 3, &mut rng).unwrap();

        assert_eq!(img.dimensions(), (56, 84));
        assert_eq!(rows.len(), 6);
        assert_eq!(rows[0], features);
        assert_eq!(img.get_pixel(28, 56).0[0], 10);
        assert_eq!(img.get_pixel(29, 57).0[0], 20);
        assert_eq!(img.get_pixel(30, 57).0[0], 0);
    }

    #[test]
    fn empty_grid_is_rejected() {
        let table =
            DataTable::from_observations(vec![Observation::new(None, vec![0; 784]).unwrap()]).unwrap();
        let mut rng = StdRng::seed_from_u64(4);
        assert!(render_grid(&table, 0, 5, &mut rng).is_err());
    }

    #[test]
    fn handmade_keeps_only_pure_white() {
        let mut img = GrayImage::new(28, 28);
        img.put_pixel(0, 0, Luma([255]));
        img.put_pixel(1, 0, Luma([254]));
        img.put_pixel(0, 1, Luma([255]));
        let features = handmade_to_features(&png_bytes(&img)).unwrap();

        assert_eq!(features.len(), 784);
        assert_eq!(features[0], 255);
        assert_eq!(features[1], 0);
        assert_eq!(features[28], 255);
        assert_eq!(features.iter().filter(|&&p| p == 255).count(), 2);
    }

    #[test]
    fn handmade_is_resized_to_digit_size() {
        let img = GrayImage::from_pixel(56, 56, Luma([255]));
        let features = handmade_to_features(&png_bytes(&img)).unwrap();
        assert_eq!(features.len(), 784);
    }

    #[test]
    fn garbage_bytes_are_an_image_error() {
        assert!(matches!(handmade_to_features(b"not a png"), Err(Error::Image(_))));
    }
}
