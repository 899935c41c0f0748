// src/mask.rs - Binary foreground mask consumed by the boundary tracer

use image::{GrayImage, Luma};

/// Row-major 2D grid of foreground flags
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryMask {
    height: usize,
    width: usize,
    data: Vec<bool>,
}

impl BinaryMask {
    /// Create an all-background mask
    pub fn new(height: usize, width: usize) -> Self {
        Self {
            height,
            width,
            data: vec![false; height * width],
        }
    }

    /// Build a mask by evaluating `f(row, col)` for every cell
    pub fn from_fn<F>(height: usize, width: usize, mut f: F) -> Self
    where
        F: FnMut(usize, usize) -> bool,
    {
        let mut data = Vec::with_capacity(height * width);
        for row in 0..height {
            for col in 0..width {
                data.push(f(row, col));
            }
        }
        Self { height, width, data }
    }

    /// Build a mask from rows of 0/1 values. Rows shorter than the first are padded with background.
    pub fn from_rows<R: AsRef<[u8]>>(rows: &[R]) -> Self {
        let height = rows.len();
        let width = rows.first().map(|r| r.as_ref().len()).unwrap_or(0);
        Self::from_fn(height, width, |row, col| {
            rows[row].as_ref().get(col).copied().unwrap_or(0) != 0
        })
    }

    /// Foreground is every pixel whose luma is non-zero
    pub fn from_gray_image(image: &GrayImage) -> Self {
        let (width, height) = image.dimensions();
        Self::from_fn(height as usize, width as usize, |row, col| {
            image.get_pixel(col as u32, row as u32)[0] > 0
        })
    }

    /// Render as a black/white image (foreground = 255)
    pub fn to_gray_image(&self) -> GrayImage {
        GrayImage::from_fn(self.width as u32, self.height as u32, |x, y| {
            if self.get(y as usize, x as usize) {
                Luma([255u8])
            } else {
                Luma([0u8])
            }
        })
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Foreground flag at (row, col); anything outside the grid is background
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> bool {
        row < self.height && col < self.width && self.data[row * self.width + col]
    }

    /// Signed lookup used when stepping off the grid edge
    #[inline]
    pub fn get_signed(&self, row: isize, col: isize) -> bool {
        row >= 0 && col >= 0 && self.get(row as usize, col as usize)
    }

    pub fn foreground_count(&self) -> usize {
        self.data.iter().filter(|&&v| v).count()
    }

    /// True when the mask has no foreground pixel (or no cells at all)
    pub fn is_empty(&self) -> bool {
        !self.data.iter().any(|&v| v)
    }

    /// True when the pixel is foreground and at least one 4-neighbor is background
    pub fn is_boundary(&self, row: usize, col: usize) -> bool {
        if !self.get(row, col) {
            return false;
        }
        let (r, c) = (row as isize, col as isize);
        !self.get_signed(r - 1, c)
            || !self.get_signed(r + 1, c)
            || !self.get_signed(r, c - 1)
            || !self.get_signed(r, c + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_bounds_is_background() {
        let mask = BinaryMask::from_rows(&[[1u8, 1], [1, 1]]);
        assert!(mask.get(1, 1));
        assert!(!mask.get(2, 0));
        assert!(!mask.get_signed(-1, 0));
        assert_eq!(mask.foreground_count(), 4);
    }

    #[test]
    fn test_boundary_excludes_interior() {
        let mask = BinaryMask::from_fn(3, 3, |_, _| true);
        assert!(mask.is_boundary(0, 0));
        assert!(!mask.is_boundary(1, 1));
    }

    #[test]
    fn test_gray_round_trip() {
        let mask = BinaryMask::from_rows(&[[0u8, 1, 0], [1, 1, 0]]);
        let image = mask.to_gray_image();
        assert_eq!(image.dimensions(), (3, 2));
        assert_eq!(BinaryMask::from_gray_image(&image), mask);
    }

    #[test]
    fn test_empty_mask() {
        assert!(BinaryMask::new(4, 4).is_empty());
        assert!(BinaryMask::new(0, 0).is_empty());
    }
}
