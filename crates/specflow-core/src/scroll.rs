//! Pixel columns and the bounded scroll history.

use std::collections::VecDeque;

/// One vertical strip of RGBA pixels, row 0 at the top
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelColumn {
    rgba: Vec<u8>,
}

impl PixelColumn {
    /// Fully transparent column of `height` pixels
    pub fn transparent(height: usize) -> Self {
        Self {
            rgba: vec![0; height * 4],
        }
    }

    /// Number of pixels
    pub fn height(&self) -> usize {
        self.rgba.len() / 4
    }

    /// Pixel at `row`, `None` past the end
    pub fn pixel(&self, row: usize) -> Option<[u8; 4]> {
        let px = self.rgba.get(row * 4..row * 4 + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Overwrite the pixel at `row`. Out-of-range rows are ignored.
    pub fn set_pixel(&mut self, row: usize, pixel: [u8; 4]) {
        if let Some(px) = self.rgba.get_mut(row * 4..row * 4 + 4) {
            px.copy_from_slice(&pixel);
        }
    }

    /// Raw RGBA bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.rgba
    }
}

/// Most-recent-first history of columns, never longer than its capacity
#[derive(Debug, Clone, Default)]
pub struct ScrollBuffer {
    columns: VecDeque<PixelColumn>,
    capacity: usize,
}

impl ScrollBuffer {
    /// Empty buffer holding at most `capacity` columns
    pub fn new(capacity: usize) -> Self {
        Self {
            columns: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Insert at the front, evicting the oldest column once full.
    pub fn push(&mut self, column: PixelColumn) {
        if self.capacity == 0 {
            return;
        }
        self.columns.push_front(column);
        self.columns.truncate(self.capacity);
    }

    /// Change the bound, dropping the oldest columns if it shrinks
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity;
        self.columns.truncate(capacity);
    }

    /// Maximum number of columns
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of columns currently held
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Whether the buffer holds no columns
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Columns from newest to oldest
    pub fn iter(&self) -> impl Iterator<Item = &PixelColumn> {
        self.columns.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn marked(mark: u8) -> PixelColumn {
        let mut column = PixelColumn::transparent(2);
        column.set_pixel(0, [mark, 0, 0, 255]);
        column
    }

    #[test]
    fn test_column_pixels() {
        let mut column = PixelColumn::transparent(3);
        assert_eq!(column.height(), 3);
        assert_eq!(column.pixel(1), Some([0, 0, 0, 0]));

        column.set_pixel(1, [1, 2, 3, 4]);
        assert_eq!(column.pixel(1), Some([1, 2, 3, 4]));
        assert_eq!(&column.as_bytes()[4..8], &[1, 2, 3, 4]);

        column.set_pixel(3, [9, 9, 9, 9]);
        assert_eq!(column.pixel(3), None);
    }

    #[test]
    fn test_push_front_and_evict() {
        let mut buffer = ScrollBuffer::new(3);
        for mark in 1..=5 {
            buffer.push(marked(mark));
        }
        assert_eq!(buffer.len(), 3);
        let marks: Vec<u8> = buffer
            .iter()
            .map(|c| c.pixel(0).unwrap()[0])
            .collect();
        assert_eq!(marks, vec![5, 4, 3]);
    }

    #[test]
    fn test_shrink_capacity() {
        let mut buffer = ScrollBuffer::new(4);
        for mark in 1..=4 {
            buffer.push(marked(mark));
        }
        buffer.set_capacity(2);
        assert_eq!(buffer.len(), 2);
        assert_eq!(buffer.iter().next().unwrap().pixel(0).unwrap()[0], 4);
    }

    #[test]
    fn test_zero_capacity_holds_nothing() {
        let mut buffer = ScrollBuffer::new(0);
        buffer.push(marked(1));
        assert!(buffer.is_empty());
    }
}
