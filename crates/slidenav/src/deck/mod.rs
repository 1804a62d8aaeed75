pub mod markup;

use std::path::Path;

use thiserror::Error;

/// Errors raised while loading a slide document.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed markup at byte {position}: {source}")]
    Markup {
        position: u64,
        #[source]
        source: quick_xml::Error,
    },

    #[error("No slides found (expected elements with class=\"slide\")")]
    NoSlides,
}

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone)]
pub struct Deck {
    /// Contents of the document `<title>`, if any.
    pub title: Option<String>,
    pub slides: Vec<Slide>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlideKind {
    Standard,
    /// At most one fragment is visible at a time and it drives the highlight.
    CodeExplanation,
}

impl SlideKind {
    pub fn from_attr(value: Option<&str>) -> Self {
        match value {
            Some("code-explanation") => Self::CodeExplanation,
            _ => Self::Standard,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Slide {
    pub index: usize,
    pub title: Option<String>,
    pub kind: SlideKind,
    pub fragments: Vec<Fragment>,
    pub highlights: Vec<HighlightTarget>,
    pub blocks: Vec<Block>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    pub order: usize,
    /// Highlight id named by `data-explains`.
    pub explains: Option<String>,
}

/// A region declared with `data-highlight-id`.
#[derive(Debug, Clone, PartialEq)]
pub struct HighlightTarget {
    pub id: String,
    pub region: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub kind: BlockKind,
    /// Innermost fragment enclosing the element that opens this block.
    pub fragment: Option<usize>,
    pub runs: Vec<Run>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BlockKind {
    Heading(u8),
    Paragraph,
    ListItem,
    Code { language: Option<String> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Run {
    pub text: String,
    /// Highlight region this text belongs to.
    pub region: Option<usize>,
    /// Fragment wrapping this text inside its block, as in
    /// `<p>Hello <span class="fragment">world</span></p>`.
    pub fragment: Option<usize>,
}

impl Deck {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        markup::parse(&content)
    }

    pub fn len(&self) -> usize {
        self.slides.len()
    }

    /// Slide titles as shown in the table of contents.
    pub fn titles(&self) -> impl Iterator<Item = String> + '_ {
        self.slides.iter().map(Slide::display_title)
    }
}

impl Slide {
    pub fn display_title(&self) -> String {
        self.title
            .clone()
            .unwrap_or_else(|| format!("Slide {}", self.index + 1))
    }

    pub fn fragment_count(&self) -> usize {
        self.fragments.len()
    }

    /// Resolve a highlight id to the first region declaring it.
    pub fn resolve_highlight(&self, id: &str) -> Option<usize> {
        self.highlights
            .iter()
            .find(|h| h.id == id)
            .map(|h| h.region)
    }

    /// Region activated by fragment `order`, if it names one that exists.
    pub fn fragment_region(&self, order: usize) -> Option<usize> {
        let id = self.fragments.get(order)?.explains.as_deref()?;
        self.resolve_highlight(id)
    }

    /// `(fragment order, id)` for each `data-explains` reference with no
    /// matching `data-highlight-id`.
    pub fn dangling_references(&self) -> Vec<(usize, &str)> {
        self.fragments
            .iter()
            .filter_map(|f| Some((f.order, f.explains.as_deref()?)))
            .filter(|(_, id)| self.resolve_highlight(id).is_none())
            .collect()
    }
}

impl Block {
    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slide(kind: SlideKind) -> Slide {
        Slide {
            index: 2,
            title: None,
            kind,
            fragments: vec![
                Fragment {
                    order: 0,
                    explains: Some("a".into()),
                },
                Fragment {
                    order: 1,
                    explains: Some("missing".into()),
                },
                Fragment {
                    order: 2,
                    explains: None,
                },
            ],
            highlights: vec![
                HighlightTarget {
                    id: "a".into(),
                    region: 0,
                },
                HighlightTarget {
                    id: "a".into(),
                    region: 1,
                },
            ],
            blocks: Vec::new(),
        }
    }

    #[test]
    fn test_default_title() {
        assert_eq!(slide(SlideKind::Standard).display_title(), "Slide 3");
    }

    #[test]
    fn test_highlight_resolves_to_first_region() {
        let s = slide(SlideKind::CodeExplanation);
        assert_eq!(s.resolve_highlight("a"), Some(0));
        assert_eq!(s.fragment_region(0), Some(0));
        assert_eq!(s.fragment_region(1), None);
        assert_eq!(s.fragment_region(2), None);
        assert_eq!(s.fragment_region(9), None);
    }

    #[test]
    fn test_dangling_references() {
        let s = slide(SlideKind::CodeExplanation);
        assert_eq!(s.dangling_references(), vec![(1, "missing")]);
    }

    #[test]
    fn test_kind_from_attr() {
        assert_eq!(
            SlideKind::from_attr(Some("code-explanation")),
            SlideKind::CodeExplanation
        );
        assert_eq!(SlideKind::from_attr(Some("standard")), SlideKind::Standard);
        assert_eq!(SlideKind::from_attr(None), SlideKind::Standard);
    }
}
