//! Extract slides, fragments and highlight regions from an XHTML document.
//!
//! The reader is forgiving about HTML habits: void elements such
//! as `<br>` need no closing slash and mismatched end tags do not abort the
//! parse. Everything else must be well-formed.

use quick_xml::Reader;
use quick_xml::escape::unescape;
use quick_xml::events::{BytesStart, Event};

use super::{
    Block, BlockKind, Deck, Error, Fragment, HighlightTarget, Result, Run, Slide, SlideKind,
};

const VOID_ELEMENTS: &[&[u8]] = &[
    b"br", b"img", b"hr", b"meta", b"link", b"input", b"source", b"wbr", b"col", b"area",
];

/// Elements that start a new text block without giving it a kind of its own.
const BOUNDARY_ELEMENTS: &[&[u8]] = &[
    b"div",
    b"section",
    b"article",
    b"header",
    b"footer",
    b"aside",
    b"ul",
    b"ol",
    b"dl",
    b"dt",
    b"dd",
    b"blockquote",
    b"figure",
    b"figcaption",
    b"table",
    b"tr",
    b"td",
    b"th",
];

/// An element currently open inside a slide.
struct Open {
    name: Vec<u8>,
    fragment: Option<usize>,
    region: Option<usize>,
    block: Option<BlockKind>,
    language: Option<String>,
}

impl Open {
    fn opens_block(&self) -> bool {
        self.block.is_some() || BOUNDARY_ELEMENTS.contains(&self.name.as_slice())
    }
}

struct SlideBuilder {
    /// Stack depth of the slide element itself.
    depth: usize,
    slide: Slide,
    pending: Option<Block>,
}

/// Attributes the reader cares about, decoded once per element.
#[derive(Default)]
struct Attrs {
    classes: Vec<String>,
    slide_type: Option<String>,
    title: Option<String>,
    explains: Option<String>,
    highlight_id: Option<String>,
}

impl Attrs {
    fn read(e: &BytesStart) -> Self {
        let mut attrs = Attrs::default();
        for attr in e.attributes() {
            let attr = match attr {
                Ok(attr) => attr,
                Err(err) => {
                    tracing::warn!(
                        element = %String::from_utf8_lossy(e.local_name().as_ref()),
                        "skipping malformed attribute (values must be quoted): {err}"
                    );
                    continue;
                }
            };
            let raw = String::from_utf8_lossy(&attr.value);
            let value = unescape(&raw)
                .map(|v| v.into_owned())
                .unwrap_or_else(|_| raw.to_string());
            match attr.key.as_ref() {
                b"class" => {
                    attrs.classes = value.split_ascii_whitespace().map(String::from).collect()
                }
                b"data-slide-type" => attrs.slide_type = Some(value),
                b"data-title" => attrs.title = Some(value),
                b"data-explains" if !value.is_empty() => attrs.explains = Some(value),
                b"data-highlight-id" if !value.is_empty() => attrs.highlight_id = Some(value),
                _ => {}
            }
        }
        attrs
    }

    fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    fn language(&self) -> Option<String> {
        self.classes.iter().find_map(|c| {
            c.strip_prefix("language-")
                .or_else(|| c.strip_prefix("lang-"))
                .map(String::from)
        })
    }
}

/// Parse a slide document into a [`Deck`].
pub fn parse(content: &str) -> Result<Deck> {
    let mut reader = Reader::from_str(content);
    let config = reader.config_mut();
    config.trim_text(false);
    config.check_end_names = false;
    config.allow_unmatched_ends = true;

    let mut parser = Parser::default();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = element_name(&e);
                let attrs = Attrs::read(&e);
                if VOID_ELEMENTS.contains(&name.as_slice()) {
                    parser.empty(&name, &attrs);
                } else {
                    parser.start(name, &attrs);
                }
            }
            Ok(Event::Empty(e)) => {
                let name = element_name(&e);
                let attrs = Attrs::read(&e);
                parser.empty(&name, &attrs);
            }
            Ok(Event::End(e)) => {
                let name = e.local_name().as_ref().to_ascii_lowercase();
                parser.end(&name);
            }
            Ok(Event::Text(e)) => {
                parser.text(&String::from_utf8_lossy(e.as_ref()));
            }
            Ok(Event::CData(e)) => {
                parser.text(&String::from_utf8_lossy(&e));
            }
            Ok(Event::GeneralRef(e)) => {
                let entity = String::from_utf8_lossy(e.as_ref());
                match resolve_entity(&entity) {
                    Some(c) => parser.text(c.encode_utf8(&mut [0; 4])),
                    None => parser.text(&format!("&{entity};")),
                }
            }
            Ok(Event::Eof) => break,
            Err(source) => {
                return Err(Error::Markup {
                    position: reader.error_position() as u64,
                    source,
                });
            }
            _ => {}
        }
    }

    parser.finish()
}

fn element_name(e: &BytesStart) -> Vec<u8> {
    e.local_name().as_ref().to_ascii_lowercase()
}

/// Resolve a named or numeric entity reference (without `&` and `;`).
fn resolve_entity(entity: &str) -> Option<char> {
    if let Some(num) = entity.strip_prefix('#') {
        let code = match num.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => num.parse().ok()?,
        };
        return char::from_u32(code);
    }
    match entity {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        "mdash" => Some('\u{2014}'),
        "ndash" => Some('\u{2013}'),
        "hellip" => Some('\u{2026}'),
        "rarr" => Some('\u{2192}'),
        "larr" => Some('\u{2190}'),
        "times" => Some('\u{d7}'),
        "copy" => Some('\u{a9}'),
        _ => None,
    }
}

fn block_kind(name: &[u8]) -> Option<BlockKind> {
    match name {
        [b'h', level @ b'1'..=b'6'] => Some(BlockKind::Heading(level - b'0')),
        b"p" => Some(BlockKind::Paragraph),
        b"li" => Some(BlockKind::ListItem),
        b"pre" => Some(BlockKind::Code { language: None }),
        _ => None,
    }
}

#[derive(Default)]
struct Parser {
    slides: Vec<Slide>,
    current: Option<SlideBuilder>,
    stack: Vec<Open>,
    /// Depth of the open `<title>` element outside any slide.
    title_depth: Option<usize>,
    title: String,
}

impl Parser {
    fn start(&mut self, name: Vec<u8>, attrs: &Attrs) {
        if self.current.is_none() {
            if attrs.has_class("slide") {
                self.begin_slide(attrs);
            } else if name == b"title" {
                self.title_depth = Some(self.stack.len());
            }
        } else if block_kind(&name).is_some() || BOUNDARY_ELEMENTS.contains(&name.as_slice()) {
            self.flush();
        }

        let (fragment, region) = self.register(attrs);
        self.stack.push(Open {
            block: block_kind(&name),
            name,
            fragment,
            region,
            language: attrs.language(),
        });
    }

    /// An element with no content: `<br/>`, `<img class="fragment">` and the like.
    fn empty(&mut self, name: &[u8], attrs: &Attrs) {
        if self.current.is_none() {
            if attrs.has_class("slide") {
                self.begin_slide(attrs);
                self.stack.push(Open {
                    name: name.to_vec(),
                    fragment: None,
                    region: None,
                    block: None,
                    language: None,
                });
                self.end(name);
            }
            return;
        }

        if name == b"br" {
            if self.in_code() {
                self.text("\n");
            } else {
                self.flush();
            }
            return;
        }
        if name == b"hr" {
            self.flush();
        }
        self.register(attrs);
    }

    fn end(&mut self, name: &[u8]) {
        let Some(pos) = self.stack.iter().rposition(|o| o.name == name) else {
            return;
        };

        if self.stack[pos..].iter().any(Open::opens_block) {
            self.flush();
        }

        self.stack.truncate(pos);

        if self.title_depth.is_some_and(|d| d >= pos) {
            self.title_depth = None;
        }
        if self.current.as_ref().is_some_and(|b| b.depth >= pos) {
            self.end_slide();
        }
    }

    fn text(&mut self, raw: &str) {
        if self.title_depth.is_some() && self.current.is_none() {
            self.title.push_str(raw);
            return;
        }
        if self.current.is_none() {
            return;
        }

        let code = self.in_code();
        let kind = self.innermost_kind();
        let region = self.stack.iter().rev().find_map(|o| o.region);
        // Fragments on or above the element owning the block hide the whole
        // block; fragments below it hide only their own text.
        let owner = self.block_owner();
        let fragment = self.stack[..=owner].iter().rev().find_map(|o| o.fragment);
        let inline_fragment = self.stack[owner + 1..].iter().rev().find_map(|o| o.fragment);

        let needs_new = match self.pending() {
            Some(block) => block.kind != kind || block.fragment != fragment,
            None => true,
        };

        let text = if code {
            raw.to_string()
        } else {
            collapse_whitespace(raw)
        };

        if needs_new {
            if !code && text.trim().is_empty() {
                return;
            }
            self.flush();
            if let Some(builder) = self.current.as_mut() {
                builder.pending = Some(Block {
                    kind,
                    fragment,
                    runs: Vec::new(),
                });
            }
        }

        let Some(block) = self.pending_mut() else {
            return;
        };
        let at_word_start = block.runs.last().is_none_or(|r| r.text.ends_with(' '));
        let text = if !code && at_word_start {
            text.trim_start().to_string()
        } else {
            text
        };
        if text.is_empty() {
            return;
        }
        match block.runs.last_mut() {
            Some(last) if last.region == region && last.fragment == inline_fragment => {
                last.text.push_str(&text)
            }
            _ => block.runs.push(Run {
                text,
                region,
                fragment: inline_fragment,
            }),
        }
    }

    fn finish(mut self) -> Result<Deck> {
        if self.current.is_some() {
            self.end_slide();
        }
        if self.slides.is_empty() {
            return Err(Error::NoSlides);
        }

        for slide in &self.slides {
            for (order, id) in slide.dangling_references() {
                tracing::warn!(
                    slide = slide.index + 1,
                    fragment = order + 1,
                    highlight = id,
                    "data-explains names a highlight id that does not exist"
                );
            }
        }

        let title = collapse_whitespace(&self.title).trim().to_string();
        Ok(Deck {
            title: (!title.is_empty()).then_some(title),
            slides: self.slides,
        })
    }

    fn begin_slide(&mut self, attrs: &Attrs) {
        let index = self.slides.len();
        tracing::trace!(index, kind = ?attrs.slide_type, "slide");
        self.current = Some(SlideBuilder {
            depth: self.stack.len(),
            slide: Slide {
                index,
                title: attrs.title.clone().filter(|t| !t.trim().is_empty()),
                kind: SlideKind::from_attr(attrs.slide_type.as_deref()),
                fragments: Vec::new(),
                highlights: Vec::new(),
                blocks: Vec::new(),
            },
            pending: None,
        });
    }

    fn end_slide(&mut self) {
        self.flush();
        if let Some(builder) = self.current.take() {
            self.slides.push(builder.slide);
        }
    }

    /// Record fragment / highlight declarations on an element inside a slide.
    fn register(&mut self, attrs: &Attrs) -> (Option<usize>, Option<usize>) {
        let Some(builder) = self.current.as_mut() else {
            return (None, None);
        };
        // The slide element itself is not content.
        if builder.depth == self.stack.len() {
            return (None, None);
        }
        let slide = &mut builder.slide;

        let fragment = attrs.has_class("fragment").then(|| {
            let order = slide.fragments.len();
            slide.fragments.push(Fragment {
                order,
                explains: attrs.explains.clone(),
            });
            order
        });
        let region = attrs.highlight_id.as_ref().map(|id| {
            let region = slide.highlights.len();
            slide.highlights.push(HighlightTarget {
                id: id.clone(),
                region,
            });
            region
        });
        (fragment, region)
    }

    fn flush(&mut self) {
        let Some(builder) = self.current.as_mut() else {
            return;
        };
        let Some(mut block) = builder.pending.take() else {
            return;
        };
        if !matches!(block.kind, BlockKind::Code { .. }) {
            if let Some(last) = block.runs.last_mut() {
                let trimmed = last.text.trim_end().len();
                last.text.truncate(trimmed);
            }
            block.runs.retain(|r| !r.text.is_empty());
        } else if let Some(last) = block.runs.last_mut() {
            // Drop the newline that usually precedes `</code></pre>`.
            if last.text.ends_with('\n') {
                last.text.pop();
            }
        }
        if block.runs.iter().any(|r| !r.text.trim().is_empty()) {
            builder.slide.blocks.push(block);
        }
    }

    /// Stack index of the innermost element that opens a text block, or of
    /// the slide element when text sits directly inside it.
    fn block_owner(&self) -> usize {
        let slide_depth = self.current.as_ref().map_or(0, |b| b.depth);
        self.stack
            .iter()
            .rposition(Open::opens_block)
            .filter(|&i| i > slide_depth)
            .unwrap_or(slide_depth)
    }

    fn in_code(&self) -> bool {
        self.stack.iter().any(|o| o.name == b"pre")
    }

    fn innermost_kind(&self) -> BlockKind {
        match self.stack.iter().rev().find_map(|o| o.block.as_ref()) {
            Some(BlockKind::Code { .. }) => BlockKind::Code {
                language: self.stack.iter().rev().find_map(|o| o.language.clone()),
            },
            Some(kind) => kind.clone(),
            None => BlockKind::Paragraph,
        }
    }

    fn pending(&self) -> Option<&Block> {
        self.current.as_ref()?.pending.as_ref()
    }

    fn pending_mut(&mut self) -> Option<&mut Block> {
        self.current.as_mut()?.pending.as_mut()
    }
}

fn collapse_whitespace(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_space = false;
    for c in s.chars() {
        if c.is_whitespace() && c != '\u{a0}' {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(c);
            in_space = false;
        }
    }
    out
}
