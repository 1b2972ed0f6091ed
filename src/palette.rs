//! Append-only palette of processed tiles

use crate::models::{ProcessedImage, Tile};

/// Tiles accumulated across processing and import operations.
///
/// Entries are never edited; the list only grows, or is filtered/cleared
/// in bulk.
#[derive(Debug, Clone, Default)]
pub struct Palette {
    entries: Vec<ProcessedImage>,
}

impl Palette {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a batch of entries, keeping their order.
    pub fn extend(&mut self, images: impl IntoIterator<Item = ProcessedImage>) -> usize {
        let before = self.entries.len();
        self.entries.extend(images);
        let added = self.entries.len() - before;
        log::debug!("palette grew by {} to {} entries", added, self.entries.len());
        added
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProcessedImage> {
        self.entries.iter()
    }

    pub fn get(&self, index: usize) -> Option<&ProcessedImage> {
        self.entries.get(index)
    }

    pub fn find(&self, id: &str) -> Option<&ProcessedImage> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    /// The grid tile for the entry with this id.
    pub fn tile(&self, id: &str) -> Option<Tile> {
        self.find(id).map(ProcessedImage::to_tile)
    }

    pub fn first_tile(&self) -> Option<Tile> {
        self.entries.first().map(ProcessedImage::to_tile)
    }

    /// Keep only the entries matching `keep`.
    pub fn retain(&mut self, keep: impl FnMut(&ProcessedImage) -> bool) {
        self.entries.retain(keep);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbaImage;
    use std::sync::Arc;

    fn entry(size: u32) -> ProcessedImage {
        ProcessedImage::new(Arc::new(RgbaImage::new(size, size)), RgbaImage::new(size, size), size)
    }

    #[test]
    fn test_extend_accumulates_in_order() {
        let mut palette = Palette::new();
        let first = vec![entry(8), entry(8)];
        let first_ids: Vec<String> = first.iter().map(|e| e.id.clone()).collect();

        assert_eq!(palette.extend(first), 2);
        assert_eq!(palette.extend(vec![entry(16)]), 1);

        assert_eq!(palette.len(), 3);
        assert_eq!(palette.get(0).unwrap().id, first_ids[0]);
        assert_eq!(palette.get(1).unwrap().id, first_ids[1]);
        assert_eq!(palette.get(2).unwrap().tile_size, 16);
    }

    #[test]
    fn test_tile_lookup_by_id() {
        let mut palette = Palette::new();
        let e = entry(4);
        let id = e.id.clone();
        palette.extend([e]);

        let tile = palette.tile(&id).unwrap();
        assert_eq!(tile.id, id);
        assert_eq!((tile.width, tile.height), (4, 4));
        assert!(palette.tile("missing").is_none());
    }

    #[test]
    fn test_retain_and_clear() {
        let mut palette = Palette::new();
        palette.extend([entry(4), entry(8), entry(8)]);

        palette.retain(|e| e.tile_size == 8);
        assert_eq!(palette.len(), 2);

        palette.clear();
        assert!(palette.is_empty());
        assert!(palette.first_tile().is_none());
    }
}
