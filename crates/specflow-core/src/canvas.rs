//! Display surfaces the renderer can paint into.

use image::{Rgba, RgbaImage};

use crate::scroll::PixelColumn;

/// A fixed-size 2-D pixel target
pub trait DisplaySurface {
    /// (width, height) in pixels
    fn size(&self) -> (u32, u32);

    /// Reset every pixel to transparent
    fn clear(&mut self);

    /// Replace the pixels of column `x` with `column` (no blending).
    fn put_column(&mut self, x: u32, column: &PixelColumn);
}

/// In-memory RGBA canvas
#[derive(Debug, Clone)]
pub struct PixelCanvas {
    image: RgbaImage,
}

impl PixelCanvas {
    /// Transparent canvas of the given size
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::new(width, height),
        }
    }

    /// Canvas width
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Canvas height
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Pixel at (x, y), `None` outside the canvas
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        (x < self.image.width() && y < self.image.height()).then(|| self.image.get_pixel(x, y).0)
    }

    /// Row-major RGBA bytes, ready for a texture upload
    pub fn as_rgba(&self) -> &[u8] {
        self.image.as_raw()
    }
}

impl DisplaySurface for PixelCanvas {
    fn size(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    fn clear(&mut self) {
        for px in self.image.pixels_mut() {
            *px = Rgba([0, 0, 0, 0]);
        }
    }

    fn put_column(&mut self, x: u32, column: &PixelColumn) {
        if x >= self.image.width() {
            return;
        }
        let rows = (column.height() as u32).min(self.image.height());
        for y in 0..rows {
            if let Some(pixel) = column.pixel(y as usize) {
                self.image.put_pixel(x, y, Rgba(pixel));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_canvas_is_transparent() {
        let canvas = PixelCanvas::new(4, 3);
        assert_eq!(canvas.size(), (4, 3));
        assert_eq!(canvas.as_rgba().len(), 4 * 3 * 4);
        assert!(canvas.as_rgba().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_put_column_replaces_pixels() {
        let mut canvas = PixelCanvas::new(2, 2);
        let mut column = PixelColumn::transparent(2);
        column.set_pixel(1, [10, 20, 30, 40]);

        canvas.put_column(1, &column);
        assert_eq!(canvas.pixel(1, 1), Some([10, 20, 30, 40]));
        assert_eq!(canvas.pixel(1, 0), Some([0, 0, 0, 0]));
        assert_eq!(canvas.pixel(0, 1), Some([0, 0, 0, 0]));

        // A transparent pixel overwrites rather than blends
        canvas.put_column(1, &PixelColumn::transparent(2));
        assert_eq!(canvas.pixel(1, 1), Some([0, 0, 0, 0]));
    }

    #[test]
    fn test_put_column_out_of_range() {
        let mut canvas = PixelCanvas::new(2, 2);
        let mut column = PixelColumn::transparent(5);
        column.set_pixel(4, [1, 1, 1, 1]);
        canvas.put_column(7, &column);
        canvas.put_column(0, &column);
        assert!(canvas.as_rgba().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_clear() {
        let mut canvas = PixelCanvas::new(1, 1);
        let mut column = PixelColumn::transparent(1);
        column.set_pixel(0, [255, 0, 0, 255]);
        canvas.put_column(0, &column);
        canvas.clear();
        assert_eq!(canvas.pixel(0, 0), Some([0, 0, 0, 0]));
    }
}
