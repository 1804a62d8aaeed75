use serde::Serialize;

use crate::deck::Deck;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TocEntry {
    pub index: usize,
    pub title: String,
}

/// One entry per slide, built once when the deck opens.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TableOfContents {
    pub entries: Vec<TocEntry>,
}

impl TableOfContents {
    pub fn build(deck: &Deck) -> Self {
        let entries = deck
            .titles()
            .enumerate()
            .map(|(index, title)| TocEntry { index, title })
            .collect();
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
