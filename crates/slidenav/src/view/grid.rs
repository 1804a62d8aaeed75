use crate::deck::Deck;
use crate::nav::SlideView;

/// Width the slides are authored for; thumbnails are scaled down from it.
pub const DEFAULT_DESIGN_WIDTH: f32 = 1280.0;
pub const DEFAULT_GAP: f32 = 16.0;

/// Columns and rows of a near-square grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridLayout {
    pub columns: usize,
    pub rows: usize,
}

impl GridLayout {
    pub fn for_count(count: usize) -> Self {
        let mut columns = 1;
        while columns * columns < count {
            columns += 1;
        }
        Self {
            columns,
            rows: count.div_ceil(columns),
        }
    }

    /// (column, row) of the cell holding slide `index`.
    pub fn cell(&self, index: usize) -> (usize, usize) {
        (index % self.columns, index / self.columns)
    }

    /// Width of one cell when the grid spans `viewport_width`.
    pub fn cell_width(&self, viewport_width: f32, gap: f32) -> f32 {
        let cols = self.columns as f32;
        ((viewport_width - gap * (cols - 1.0)) / cols).max(0.0)
    }
}

/// A scaled copy of one slide, with every fragment shown.
#[derive(Debug, Clone, PartialEq)]
pub struct Thumbnail {
    pub index: usize,
    /// One-based slide number shown on the badge.
    pub label: String,
    pub view: SlideView,
    /// Factor mapping the design width onto the thumbnail width.
    pub scale: f32,
}

#[derive(Debug, Clone)]
pub struct GridOverview {
    pub design_width: f32,
    pub gap: f32,
    layout: GridLayout,
    thumbnails: Vec<Thumbnail>,
}

impl Default for GridOverview {
    fn default() -> Self {
        Self::new(DEFAULT_DESIGN_WIDTH)
    }
}

impl GridOverview {
    pub fn new(design_width: f32) -> Self {
        Self {
            design_width,
            gap: DEFAULT_GAP,
            layout: GridLayout::for_count(0),
            thumbnails: Vec::new(),
        }
    }

    pub fn layout(&self) -> GridLayout {
        self.layout
    }

    pub fn thumbnails(&self) -> &[Thumbnail] {
        &self.thumbnails
    }

    /// Discard every thumbnail and generate a fresh set for `deck`.
    pub fn rebuild(&mut self, deck: &Deck, viewport_width: f32) {
        self.thumbnails.clear();
        self.layout = GridLayout::for_count(deck.len());

        let thumb_width = self.layout.cell_width(viewport_width, self.gap);
        let scale = thumb_width / self.design_width;

        self.thumbnails.extend(deck.slides.iter().map(|slide| Thumbnail {
            index: slide.index,
            label: (slide.index + 1).to_string(),
            view: SlideView::fully_revealed(slide),
            scale,
        }));
        tracing::debug!(
            thumbnails = self.thumbnails.len(),
            columns = self.layout.columns,
            rows = self.layout.rows,
            scale,
            "grid rebuilt"
        );
    }
}
