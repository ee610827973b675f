//! Image-I/O collaborator.
//!
//! The runners only need two operations: read a pixel array from disk and
//! write one back. [`ImageIo`] keeps that seam narrow so the ShIRT runner
//! can be tested with a scripted implementation. [`DiskImageIo`] handles
//! common raster formats through the `image` crate and the tools' native
//! `.image`/`.mask`/`.map` files as a plain-text array format (one header
//! line `rows cols`, then one line of values per row).

use std::fs;
use std::path::Path;

use ndarray::Array2;
use tracing::debug;

use crate::error::{BenchError, Result};

/// Extensions stored in the native text format.
const NATIVE_EXTENSIONS: [&str; 3] = ["image", "mask", "map"];

pub trait ImageIo {
    /// Read an image into a 2-D intensity array.
    fn load(&self, path: &Path) -> Result<Array2<f64>>;
    /// Write a 2-D intensity array; format chosen from the path's extension.
    fn save(&self, data: &Array2<f64>, path: &Path) -> Result<()>;
}

/// Disk-backed implementation.
#[derive(Debug, Default)]
pub struct DiskImageIo;

fn is_native(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| NATIVE_EXTENSIONS.contains(&ext))
}

impl ImageIo for DiskImageIo {
    fn load(&self, path: &Path) -> Result<Array2<f64>> {
        if is_native(path) {
            return load_native(path);
        }
        let img = image::open(path)
            .map_err(|e| BenchError::Image {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?
            .to_luma8();
        let (width, height) = (img.width() as usize, img.height() as usize);
        let data = Array2::from_shape_fn((height, width), |(row, col)| {
            f64::from(img.get_pixel(col as u32, row as u32)[0])
        });
        debug!(path = %path.display(), rows = height, cols = width, "loaded raster image");
        Ok(data)
    }

    fn save(&self, data: &Array2<f64>, path: &Path) -> Result<()> {
        if is_native(path) {
            return save_native(data, path);
        }
        let (rows, cols) = data.dim();
        let mut img = image::GrayImage::new(cols as u32, rows as u32);
        for ((row, col), value) in data.indexed_iter() {
            img.put_pixel(col as u32, row as u32, image::Luma([*value as u8]));
        }
        img.save(path).map_err(|e| BenchError::Image {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        debug!(path = %path.display(), rows, cols, "saved raster image");
        Ok(())
    }
}

fn load_native(path: &Path) -> Result<Array2<f64>> {
    let contents = fs::read_to_string(path)
        .map_err(|e| BenchError::io(format!("read {}", path.display()), e))?;
    parse_native(&contents).map_err(|reason| BenchError::Image {
        path: path.to_path_buf(),
        reason,
    })
}

fn parse_native(contents: &str) -> std::result::Result<Array2<f64>, String> {
    let mut lines = contents.lines();
    let header = lines.next().ok_or_else(|| "empty file".to_string())?;
    let mut dims = header.split_whitespace();
    let rows: usize = dims
        .next()
        .ok_or_else(|| "missing row count".to_string())?
        .parse()
        .map_err(|_| "bad row count".to_string())?;
    let cols: usize = dims
        .next()
        .ok_or_else(|| "missing column count".to_string())?
        .parse()
        .map_err(|_| "bad column count".to_string())?;

    let mut values = Vec::with_capacity(rows * cols);
    for line in lines {
        for token in line.split_whitespace() {
            let value: f64 = token
                .parse()
                .map_err(|_| format!("bad value `{token}`"))?;
            values.push(value);
        }
    }
    if values.len() != rows * cols {
        return Err(format!(
            "expected {} values, found {}",
            rows * cols,
            values.len()
        ));
    }
    Array2::from_shape_vec((rows, cols), values).map_err(|e| e.to_string())
}

fn save_native(data: &Array2<f64>, path: &Path) -> Result<()> {
    let (rows, cols) = data.dim();
    let mut buf = format!("{rows} {cols}\n");
    for row in data.rows() {
        let line: Vec<String> = row.iter().map(|v| v.to_string()).collect();
        buf.push_str(&line.join(" "));
        buf.push('\n');
    }
    fs::write(path, buf).map_err(|e| BenchError::io(format!("write {}", path.display()), e))?;
    debug!(path = %path.display(), rows, cols, "saved native image");
    Ok(())
}
