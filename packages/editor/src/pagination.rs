//! # Pagination View
//!
//! Fixed-size windows over the tile sequence. Purely derived display state:
//! nothing here is ever written back into the document.

use crate::document::Tile;
use std::ops::Range;

pub const DEFAULT_PAGE_SIZE: usize = 5;

/// Split tiles into pages of `page_size`; the last page holds the remainder
pub fn compute_pages(tiles: &[Tile], page_size: usize) -> Vec<&[Tile]> {
    tiles.chunks(page_size.max(1)).collect()
}

/// `ceil(tile_count / page_size)`
pub fn total_pages(tile_count: usize, page_size: usize) -> usize {
    tile_count.div_ceil(page_size.max(1))
}

/// Current page plus the numbers needed to render controls
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageInfo {
    /// 1-based
    pub current_page: usize,
    pub total_pages: usize,
    /// Indices into the tile sequence shown on this page
    pub range: Range<usize>,
}

impl PageInfo {
    pub fn has_previous(&self) -> bool {
        self.current_page > 1
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages
    }
}

#[derive(Debug, Clone)]
pub struct PaginationView {
    page_size: usize,
    current_page: usize,
    tile_count: usize,
}

impl PaginationView {
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
            current_page: 1,
            tile_count: 0,
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn total_pages(&self) -> usize {
        total_pages(self.tile_count, self.page_size)
    }

    /// Refresh after the tile sequence changed length or order
    pub fn recompute(&mut self, tile_count: usize) {
        self.tile_count = tile_count;
        self.current_page = self.clamp(self.current_page as isize);
    }

    /// Move by `delta` pages, clamped to the valid range
    pub fn change_page(&mut self, delta: isize) -> usize {
        self.current_page = self.clamp((self.current_page as isize).saturating_add(delta));
        self.current_page
    }

    /// Jump to a 1-based page, clamped
    pub fn go_to(&mut self, page: usize) -> usize {
        self.current_page = self.clamp(isize::try_from(page).unwrap_or(isize::MAX));
        self.current_page
    }

    pub fn info(&self) -> PageInfo {
        PageInfo {
            current_page: self.current_page,
            total_pages: self.total_pages(),
            range: self.visible_range(),
        }
    }

    pub fn visible_range(&self) -> Range<usize> {
        let start = ((self.current_page - 1) * self.page_size).min(self.tile_count);
        let end = (start + self.page_size).min(self.tile_count);
        start..end
    }

    pub fn visible<'a>(&self, tiles: &'a [Tile]) -> &'a [Tile] {
        let range = self.visible_range();
        let end = range.end.min(tiles.len());
        &tiles[range.start.min(end)..end]
    }

    // With no tiles there are no pages; the view rests on page 1.
    fn clamp(&self, page: isize) -> usize {
        let last = self.total_pages().max(1) as isize;
        page.clamp(1, last) as usize
    }
}

impl Default for PaginationView {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiles(n: usize) -> Vec<Tile> {
        (0..n)
            .map(|i| Tile::new(format!("scene {}", i), format!("{}.png", i)))
            .collect()
    }

    #[test]
    fn test_twelve_tiles_make_three_pages() {
        let tiles = tiles(12);
        let pages = compute_pages(&tiles, 5);
        let sizes: Vec<_> = pages.iter().map(|p| p.len()).collect();

        assert_eq!(sizes, vec![5, 5, 2]);
        assert_eq!(total_pages(12, 5), 3);
    }

    #[test]
    fn test_change_page_clamps_at_end() {
        let mut view = PaginationView::new(5);
        view.recompute(12);

        assert_eq!(view.change_page(2), 3);
        assert_eq!(view.change_page(1), 3);
        assert_eq!(view.change_page(-10), 1);
    }

    #[test]
    fn test_change_page_with_extreme_deltas() {
        let mut view = PaginationView::new(5);
        view.recompute(12);

        assert_eq!(view.change_page(isize::MAX), 3);
        assert_eq!(view.change_page(isize::MAX), 3);
        assert_eq!(view.change_page(isize::MIN), 1);
        assert_eq!(view.go_to(usize::MAX), 3);
    }

    #[test]
    fn test_recompute_clamps_current_page() {
        let mut view = PaginationView::new(5);
        view.recompute(12);
        view.go_to(3);

        view.recompute(6);
        assert_eq!(view.current_page(), 2);
        assert_eq!(view.visible_range(), 5..6);
    }

    #[test]
    fn test_empty_sequence() {
        let mut view = PaginationView::default();
        view.recompute(0);

        assert_eq!(view.total_pages(), 0);
        assert_eq!(view.current_page(), 1);
        assert_eq!(view.visible_range(), 0..0);
        assert!(view.visible(&[]).is_empty());
        assert!(!view.info().has_next());
        assert!(!view.info().has_previous());
    }

    #[test]
    fn test_visible_window() {
        let tiles = tiles(7);
        let mut view = PaginationView::new(5);
        view.recompute(tiles.len());
        view.change_page(1);

        let visible = view.visible(&tiles);
        assert_eq!(visible.len(), 2);
        assert_eq!(visible[0].scene_text, "scene 5");
    }

    #[test]
    fn test_zero_page_size_is_treated_as_one() {
        let view = PaginationView::new(0);
        assert_eq!(view.page_size(), 1);
        assert_eq!(compute_pages(&tiles(3), 0).len(), 3);
    }
}
