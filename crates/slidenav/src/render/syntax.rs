use std::collections::HashMap;
use std::ops::Range;
use std::sync::LazyLock;

use eframe::egui::Color32;
use rayon::prelude::*;
use syntect::easy::HighlightLines;
use syntect::highlighting::ThemeSet;
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;

use crate::deck::{BlockKind, Deck};

static SYNTAX_SET: LazyLock<SyntaxSet> = LazyLock::new(SyntaxSet::load_defaults_newlines);
static THEME_SET: LazyLock<ThemeSet> = LazyLock::new(ThemeSet::load_defaults);

/// Foreground color for a byte range of a code block's text.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorSpan {
    pub range: Range<usize>,
    pub color: Color32,
}

/// Syntax colors for every code block in a deck, keyed by (slide, block).
#[derive(Debug, Default)]
pub struct SyntaxCache {
    spans: HashMap<(usize, usize), Vec<ColorSpan>>,
}

impl SyntaxCache {
    pub fn spans(&self, slide: usize, block: usize) -> &[ColorSpan] {
        self.spans
            .get(&(slide, block))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// Highlight every code block in the deck. Blocks are independent, so the
/// work is spread across the rayon pool.
pub fn highlight_all(deck: &Deck, theme_name: &str) -> SyntaxCache {
    let Some(theme) = THEME_SET.themes.get(theme_name) else {
        tracing::warn!(theme = theme_name, "unknown syntax theme, code stays uncolored");
        return SyntaxCache::default();
    };

    let blocks: Vec<_> = deck
        .slides
        .iter()
        .flat_map(|slide| {
            slide
                .blocks
                .iter()
                .enumerate()
                .filter_map(move |(i, block)| match &block.kind {
                    BlockKind::Code { language } => {
                        Some(((slide.index, i), language.as_deref(), block.text()))
                    }
                    _ => None,
                })
        })
        .collect();

    let spans = blocks
        .into_par_iter()
        .filter_map(|(key, language, code)| {
            let spans = highlight(&code, language, theme)?;
            Some((key, spans))
        })
        .collect::<HashMap<_, _>>();

    tracing::debug!(blocks = spans.len(), theme = theme_name, "syntax highlighted");
    SyntaxCache { spans }
}

fn highlight(
    code: &str,
    language: Option<&str>,
    theme: &syntect::highlighting::Theme,
) -> Option<Vec<ColorSpan>> {
    let syntax = language
        .and_then(|lang| SYNTAX_SET.find_syntax_by_token(lang))
        .unwrap_or_else(|| SYNTAX_SET.find_syntax_plain_text());
    let mut highlighter = HighlightLines::new(syntax, theme);

    let mut spans = Vec::new();
    let mut offset = 0;
    for line in LinesWithEndings::from(code) {
        let ranges = match highlighter.highlight_line(line, &SYNTAX_SET) {
            Ok(ranges) => ranges,
            Err(e) => {
                tracing::warn!(?language, "syntax highlighting failed: {e}");
                return None;
            }
        };
        for (style, text) in ranges {
            let fg = style.foreground;
            spans.push(ColorSpan {
                range: offset..offset + text.len(),
                color: Color32::from_rgb(fg.r, fg.g, fg.b),
            });
            offset += text.len();
        }
    }
    Some(spans)
}
