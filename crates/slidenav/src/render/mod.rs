pub mod syntax;

use std::ops::Range;

use eframe::egui::{self, Color32, FontFamily, FontId, Pos2, Rect};

use crate::deck::{Block, BlockKind, Run, Slide};
use crate::nav::SlideView;
use crate::theme::Theme;

use syntax::{ColorSpan, SyntaxCache};

/// Slides are authored for a 16:9 canvas.
pub fn design_height(design_width: f32) -> f32 {
    design_width * 9.0 / 16.0
}

/// Largest 16:9 rect centered in `area`, and the factor mapping the design
/// width onto it.
pub fn fit_slide(area: Rect, design_width: f32) -> (Rect, f32) {
    let scale = (area.width() / design_width).min(area.height() / design_height(design_width));
    let size = egui::vec2(design_width * scale, design_height(design_width) * scale);
    (Rect::from_center_size(area.center(), size), scale)
}

/// Paint `slide` into `rect` as `view` says it currently looks.
///
/// Blocks inside hidden fragments still take up their space, so revealing a
/// fragment never moves the content around it.
pub fn render_slide(
    ui: &egui::Ui,
    slide: &Slide,
    view: &SlideView,
    theme: &Theme,
    syntax: &SyntaxCache,
    rect: Rect,
    scale: f32,
) {
    let painter = ui.painter().with_clip_rect(rect);
    let padding = 64.0 * scale;
    let spacing = 20.0 * scale;
    let max_width = rect.width() - padding * 2.0;
    let mut y = rect.top() + padding;

    for (i, block) in slide.blocks.iter().enumerate() {
        let visible = view.is_visible(block.fragment);
        let pos = Pos2::new(rect.left() + padding, y);
        let height = match &block.kind {
            BlockKind::Code { .. } => {
                let spans = syntax.spans(slide.index, i);
                draw_code_block(&painter, block, spans, view, theme, pos, max_width, scale, visible)
            }
            BlockKind::ListItem => {
                let indent = 32.0 * scale;
                let size = theme.body_size * scale;
                if visible {
                    let bullet = painter.layout_no_wrap(
                        "\u{2022}".to_string(),
                        FontId::new(size, FontFamily::Proportional),
                        theme.accent,
                    );
                    painter.galley(pos, bullet, theme.accent);
                }
                let job = text_job(
                    &block.runs,
                    view,
                    FontId::new(size, FontFamily::Proportional),
                    theme.foreground,
                    theme.highlight,
                    max_width - indent,
                );
                draw_job(&painter, job, pos + egui::vec2(indent, 0.0), visible)
            }
            BlockKind::Heading(level) => {
                let job = text_job(
                    &block.runs,
                    view,
                    FontId::new(theme.heading_size(*level) * scale, FontFamily::Proportional),
                    theme.heading_color,
                    theme.highlight,
                    max_width,
                );
                draw_job(&painter, job, pos, visible)
            }
            BlockKind::Paragraph => {
                let job = text_job(
                    &block.runs,
                    view,
                    FontId::new(theme.body_size * scale, FontFamily::Proportional),
                    theme.foreground,
                    theme.highlight,
                    max_width,
                );
                draw_job(&painter, job, pos, visible)
            }
        };
        y += height + spacing;
    }
}

fn draw_job(painter: &egui::Painter, job: egui::text::LayoutJob, pos: Pos2, visible: bool) -> f32 {
    let galley = painter.layout_job(job);
    let height = galley.rect.height();
    if visible {
        painter.galley(pos, galley, Color32::PLACEHOLDER);
    }
    height
}

/// Layout job for prose; text in the active region gets `highlight` behind it.
/// Text of hidden inline fragments is laid out but transparent.
pub fn text_job(
    runs: &[Run],
    view: &SlideView,
    font_id: FontId,
    color: Color32,
    highlight: Color32,
    max_width: f32,
) -> egui::text::LayoutJob {
    let mut job = egui::text::LayoutJob::default();
    job.wrap.max_width = max_width;
    for run in runs {
        let shown = view.is_visible(run.fragment);
        let background = if shown && run.region.is_some() && run.region == view.active_region {
            highlight
        } else {
            Color32::TRANSPARENT
        };
        job.append(
            &run.text,
            0.0,
            egui::text::TextFormat {
                font_id: font_id.clone(),
                color: if shown { color } else { Color32::TRANSPARENT },
                background,
                ..Default::default()
            },
        );
    }
    job
}

/// A stretch of code text with one region and one syntax color.
#[derive(Debug, Clone, PartialEq)]
pub struct CodeSection {
    pub range: Range<usize>,
    pub region: Option<usize>,
    pub fragment: Option<usize>,
    pub color: Option<Color32>,
}

/// Split a code block's text wherever the run or the syntax color changes.
pub fn code_sections(runs: &[Run], spans: &[ColorSpan]) -> Vec<CodeSection> {
    let mut run_ranges = Vec::with_capacity(runs.len());
    let mut offset = 0;
    for run in runs {
        run_ranges.push((offset..offset + run.text.len(), run));
        offset += run.text.len();
    }
    let len = offset;

    let mut cuts: Vec<usize> = run_ranges
        .iter()
        .map(|(r, _)| r.start)
        .chain(spans.iter().flat_map(|s| [s.range.start, s.range.end]))
        .filter(|&c| c < len)
        .collect();
    cuts.push(len);
    cuts.sort_unstable();
    cuts.dedup();

    let mut sections = Vec::new();
    let mut start = 0;
    for end in cuts {
        if end <= start {
            continue;
        }
        let run = run_ranges
            .iter()
            .find(|(r, _)| r.contains(&start))
            .map(|(_, run)| *run);
        let color = spans
            .iter()
            .find(|s| s.range.contains(&start))
            .map(|s| s.color);
        sections.push(CodeSection {
            range: start..end,
            region: run.and_then(|r| r.region),
            fragment: run.and_then(|r| r.fragment),
            color,
        });
        start = end;
    }
    sections
}

/// Draw a code block with syntax colors and the active region marked.
/// Returns height used.
#[allow(clippy::too_many_arguments)]
fn draw_code_block(
    painter: &egui::Painter,
    block: &Block,
    spans: &[ColorSpan],
    view: &SlideView,
    theme: &Theme,
    pos: Pos2,
    max_width: f32,
    scale: f32,
    visible: bool,
) -> f32 {
    let padding = 16.0 * scale;
    let text = block.text();
    let font_id = FontId::new(theme.code_size * scale, FontFamily::Monospace);

    let mut job = egui::text::LayoutJob::default();
    job.wrap.max_width = max_width - padding * 2.0;
    for section in code_sections(&block.runs, spans) {
        let shown = view.is_visible(section.fragment);
        let active =
            shown && section.region.is_some() && section.region == view.active_region;
        job.append(
            &text[section.range],
            0.0,
            egui::text::TextFormat {
                font_id: font_id.clone(),
                color: if shown {
                    section.color.unwrap_or(theme.code_foreground)
                } else {
                    Color32::TRANSPARENT
                },
                background: if active {
                    theme.highlight
                } else {
                    Color32::TRANSPARENT
                },
                ..Default::default()
            },
        );
    }
    let galley = painter.layout_job(job);
    let total_height = galley.rect.height() + padding * 2.0;

    if visible {
        let bg_rect = Rect::from_min_size(pos, egui::vec2(max_width, total_height));
        painter.rect_filled(bg_rect, 8.0 * scale, theme.code_background);
        let code_pos = Pos2::new(pos.x + padding, pos.y + padding);
        painter.galley(code_pos, galley, theme.code_foreground);
    }

    total_height
}
