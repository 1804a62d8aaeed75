use std::path::PathBuf;

use eframe::egui;

use crate::config::{Config, StartMode};
use crate::deck::Deck;
use crate::input::{Command, Key};
use crate::location::{self, SessionHistory};
use crate::presenter::{Overlay, Presenter};
use crate::render::{self, syntax::SyntaxCache};
use crate::theme::Theme;

/// Overlay to open right after the deck is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOverlay {
    None,
    Toc,
    Grid,
}

struct PresentationApp {
    presenter: Presenter<SessionHistory>,
    theme: Theme,
    syntax: SyntaxCache,
    title: String,
    design_width: f32,
    /// Location last written to the window title.
    shown_location: String,
}

impl PresentationApp {
    fn new(
        presenter: Presenter<SessionHistory>,
        theme: Theme,
        syntax: SyntaxCache,
        title: String,
        design_width: f32,
    ) -> Self {
        Self {
            presenter,
            theme,
            syntax,
            title,
            design_width,
            shown_location: String::new(),
        }
    }

    fn window_title(&self) -> String {
        format!("{} {}", self.title, self.presenter.location())
    }

    fn handle_input(&mut self, ctx: &egui::Context) -> Vec<egui::ViewportCommand> {
        let mut viewport_cmds = Vec::new();
        let overlay_open = self.presenter.overlay() != Overlay::None;

        ctx.input(|i| {
            for event in &i.events {
                match event {
                    egui::Event::Key {
                        key,
                        pressed: true,
                        modifiers,
                        ..
                    } => {
                        if modifiers.alt {
                            match key {
                                egui::Key::ArrowLeft => {
                                    let step = self.presenter.back();
                                    tracing::debug!(
                                        ?step,
                                        entries = self.presenter.history().len(),
                                        "history back"
                                    );
                                }
                                egui::Key::ArrowRight => {
                                    let step = self.presenter.forward();
                                    tracing::debug!(
                                        ?step,
                                        entries = self.presenter.history().len(),
                                        "history forward"
                                    );
                                }
                                _ => {}
                            }
                            continue;
                        }
                        if !overlay_open && *key == egui::Key::Q {
                            viewport_cmds.push(egui::ViewportCommand::Close);
                            continue;
                        }
                        if !overlay_open && *key == egui::Key::F {
                            viewport_cmds.push(egui::ViewportCommand::Fullscreen(
                                !i.viewport().fullscreen.unwrap_or(false),
                            ));
                            continue;
                        }
                        if let Some(key) = translate_key(*key) {
                            self.presenter.key(key);
                        }
                    }
                    egui::Event::Touch { phase, pos, .. } => match phase {
                        egui::TouchPhase::Start => self.presenter.touch_start(pos.x),
                        egui::TouchPhase::End => {
                            self.presenter.touch_end(pos.x);
                        }
                        egui::TouchPhase::Move | egui::TouchPhase::Cancel => {}
                    },
                    _ => {}
                }
            }
        });

        viewport_cmds
    }

    fn draw_presentation(&self, ui: &egui::Ui, rect: egui::Rect) {
        let nav = self.presenter.navigator();
        let (slide_rect, scale) = render::fit_slide(rect, self.design_width);
        render::render_slide(
            ui,
            nav.current_slide(),
            &nav.view(),
            &self.theme,
            &self.syntax,
            slide_rect,
            scale,
        );
        self.draw_chrome(ui, rect, scale);
    }

    fn draw_chrome(&self, ui: &egui::Ui, rect: egui::Rect, scale: f32) {
        let chrome = self.presenter.chrome();

        // Progress bar
        let bar_height = 4.0 * scale;
        let track = egui::Rect::from_min_size(rect.min, egui::vec2(rect.width(), bar_height));
        ui.painter()
            .rect_filled(track, 0.0, Theme::with_opacity(self.theme.foreground, 0.08));
        let filled = egui::Rect::from_min_size(
            rect.min,
            egui::vec2(rect.width() * chrome.fraction(), bar_height),
        );
        ui.painter().rect_filled(filled, 0.0, self.theme.accent);

        // Slide counter
        let counter_color = Theme::with_opacity(self.theme.foreground, 0.3);
        let counter_galley = ui.painter().layout_no_wrap(
            chrome.counter.clone(),
            egui::FontId::monospace(14.0 * scale),
            counter_color,
        );
        let counter_pos = egui::pos2(
            rect.right() - counter_galley.rect.width() - 16.0 * scale,
            rect.bottom() - 30.0 * scale,
        );
        ui.painter()
            .galley(counter_pos, counter_galley, counter_color);
    }

    /// Draw the table of contents over the slide. Returns the command a
    /// click resolved to.
    fn draw_toc(
        &self,
        ui: &egui::Ui,
        rect: egui::Rect,
        scale: f32,
        click: Option<egui::Pos2>,
    ) -> Option<Command> {
        let toc = self.presenter.toc();
        let active = self.presenter.chrome().active;
        let padding = 24.0 * scale;
        let row_height = toc_row_height(toc.len(), scale, rect.height());
        let width = (480.0 * scale).min(rect.width());
        let height = padding * 2.0 + row_height * (toc.len() as f32 + 1.0);
        let panel = egui::Rect::from_center_size(rect.center(), egui::vec2(width, height));

        ui.painter()
            .rect_filled(rect, 0.0, Theme::with_opacity(self.theme.background, 0.6));
        ui.painter()
            .rect_filled(panel, 12.0 * scale, self.theme.overlay_background);
        ui.painter().rect_stroke(
            panel,
            12.0 * scale,
            egui::Stroke::new(1.0, Theme::with_opacity(self.theme.foreground, 0.2)),
            egui::StrokeKind::Outside,
        );

        let painter = ui.painter().with_clip_rect(panel);
        let heading = painter.layout_no_wrap(
            "Contents".to_string(),
            egui::FontId::proportional(24.0 * scale),
            self.theme.heading_color,
        );
        painter.galley(
            panel.min + egui::vec2(padding, padding),
            heading,
            self.theme.heading_color,
        );

        let mut selected = None;
        for entry in &toc.entries {
            let top = panel.top() + padding + row_height * (entry.index as f32 + 1.0);
            let row = egui::Rect::from_min_size(
                egui::pos2(panel.left() + padding * 0.5, top),
                egui::vec2(width - padding, row_height),
            );
            let is_active = entry.index == active;
            if is_active {
                painter.rect_filled(row, 6.0 * scale, Theme::with_opacity(self.theme.accent, 0.15));
            }
            let color = if is_active {
                self.theme.accent
            } else {
                self.theme.foreground
            };
            let galley = painter.layout_no_wrap(
                format!("{:>3}  {}", entry.index + 1, entry.title),
                egui::FontId::proportional((18.0 * scale).min(row_height * 0.6)),
                color,
            );
            let text_pos = egui::pos2(
                row.left() + padding * 0.5,
                row.center().y - galley.rect.height() / 2.0,
            );
            painter.galley(text_pos, galley, color);

            if click.is_some_and(|p| row.contains(p) && panel.contains(p)) {
                selected = Some(Command::SelectEntry(entry.index));
            }
        }

        match click {
            Some(p) if !panel.contains(p) => Some(Command::CloseOverlay),
            Some(_) => selected,
            None => None,
        }
    }

    /// Draw the thumbnail grid. Returns the command a click resolved to.
    fn draw_grid(
        &self,
        ui: &egui::Ui,
        rect: egui::Rect,
        scale: f32,
        click: Option<egui::Pos2>,
    ) -> Option<Command> {
        let grid = self.presenter.grid();
        let layout = grid.layout();
        let margin = 32.0 * scale;
        let active = self.presenter.chrome().active;

        let mut selected = None;
        for thumb in grid.thumbnails() {
            let (col, row) = layout.cell(thumb.index);
            let width = grid.design_width * thumb.scale;
            let height = render::design_height(grid.design_width) * thumb.scale;
            let min = egui::pos2(
                rect.left() + margin + col as f32 * (width + grid.gap),
                rect.top() + margin + row as f32 * (height + grid.gap),
            );
            let cell = egui::Rect::from_min_size(min, egui::vec2(width, height));

            ui.painter().rect_filled(cell, 4.0 * scale, self.theme.background);
            let slide = &self.presenter.navigator().deck().slides[thumb.index];
            render::render_slide(
                ui,
                slide,
                &thumb.view,
                &self.theme,
                &self.syntax,
                cell,
                thumb.scale,
            );

            let (stroke_width, stroke_color) = if thumb.index == active {
                (3.0 * scale, self.theme.accent)
            } else {
                (1.0, Theme::with_opacity(self.theme.foreground, 0.2))
            };
            ui.painter().rect_stroke(
                cell,
                4.0 * scale,
                egui::Stroke::new(stroke_width, stroke_color),
                egui::StrokeKind::Outside,
            );
            self.draw_slide_badge(ui, cell, &thumb.label, scale);

            if click.is_some_and(|p| cell.contains(p)) {
                selected = Some(Command::SelectThumbnail(thumb.index));
            }
        }
        selected
    }

    fn draw_slide_badge(&self, ui: &egui::Ui, cell_rect: egui::Rect, label: &str, scale: f32) {
        let badge_bg = Theme::with_opacity(self.theme.code_background, 0.7);
        let badge_text_color = Theme::with_opacity(self.theme.foreground, 0.9);
        let badge_galley = ui.painter().layout_no_wrap(
            format!(" {label} "),
            egui::FontId::monospace(12.0 * scale),
            badge_text_color,
        );
        let badge_rect = egui::Rect::from_min_size(
            cell_rect.min + egui::vec2(4.0 * scale, 4.0 * scale),
            badge_galley.rect.size() + egui::vec2(4.0 * scale, 2.0 * scale),
        );
        ui.painter().rect_filled(badge_rect, 3.0 * scale, badge_bg);
        ui.painter().galley(
            badge_rect.min + egui::vec2(2.0 * scale, 1.0 * scale),
            badge_galley,
            badge_text_color,
        );
    }
}

impl eframe::App for PresentationApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Sent after the input closure; sending inside it deadlocks.
        let viewport_cmds = self.handle_input(ctx);
        for cmd in viewport_cmds {
            ctx.send_viewport_cmd(cmd);
        }

        let click = ctx.input(|i| {
            if i.pointer.button_pressed(egui::PointerButton::Primary) {
                i.pointer.hover_pos()
            } else {
                None
            }
        });

        let bg = self.theme.background;
        let mut pending = None;
        let mut grid_width = None;
        egui::CentralPanel::default()
            .frame(egui::Frame::new().fill(bg).inner_margin(0.0))
            .show(ctx, |ui| {
                let rect = ui.max_rect();
                let scale = rect.width() / self.design_width;
                grid_width = Some(rect.width() - 64.0 * scale);

                self.draw_presentation(ui, rect);
                pending = match self.presenter.overlay() {
                    Overlay::None => None,
                    Overlay::Toc => self.draw_toc(ui, rect, scale, click),
                    Overlay::Grid => {
                        ui.painter().rect_filled(rect, 0.0, bg);
                        self.draw_grid(ui, rect, scale, click)
                    }
                };
            });

        if let Some(width) = grid_width {
            self.presenter.set_viewport_width(width);
        }
        if let Some(command) = pending {
            self.presenter.dispatch(command);
            ctx.request_repaint();
        }

        if self.shown_location != self.presenter.location() {
            self.shown_location = self.presenter.location().to_string();
            ctx.send_viewport_cmd(egui::ViewportCommand::Title(self.window_title()));
        }
    }
}

/// Height of one TOC row (the heading takes one more). Rows shrink so the
/// whole list fits in `available` and every entry stays clickable.
fn toc_row_height(entries: usize, scale: f32, available: f32) -> f32 {
    let padding = 24.0 * scale;
    let fit = (available - padding * 2.0).max(0.0) / (entries as f32 + 1.0);
    (40.0 * scale).min(fit)
}

fn translate_key(key: egui::Key) -> Option<Key> {
    let key = match key {
        egui::Key::ArrowRight => Key::ArrowRight,
        egui::Key::ArrowLeft => Key::ArrowLeft,
        egui::Key::Space => Key::Space,
        egui::Key::Home => Key::Home,
        egui::Key::End => Key::End,
        egui::Key::Escape => Key::Escape,
        other => {
            let mut chars = other.name().chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) if c.is_ascii_alphanumeric() => Key::Char(c),
                _ => return None,
            }
        }
    };
    Some(key)
}

/// Where the deck opens: an explicit location wins, then a slide number,
/// then the configured start mode.
fn initial_location(
    location: Option<String>,
    slide: Option<usize>,
    start_mode: StartMode,
) -> String {
    if let Some(location) = location {
        return location;
    }
    match slide {
        Some(n) => location::encode(n.saturating_sub(1)),
        None => match start_mode {
            StartMode::Slide(n) => location::encode(n - 1),
            _ => String::new(),
        },
    }
}

fn initial_overlay(start: StartOverlay, start_mode: StartMode) -> Option<Command> {
    match (start, start_mode) {
        (StartOverlay::Grid, _) | (StartOverlay::None, StartMode::Overview) => {
            Some(Command::ToggleGrid)
        }
        (StartOverlay::Toc, _) | (StartOverlay::None, StartMode::Toc) => Some(Command::ToggleToc),
        _ => None,
    }
}

pub fn run(
    file: PathBuf,
    windowed: bool,
    location: Option<String>,
    slide: Option<usize>,
    start: StartOverlay,
    theme_override: Option<String>,
) -> anyhow::Result<()> {
    let deck = Deck::load(&file)?;

    let title = deck.title.clone().unwrap_or_else(|| {
        format!(
            "slidenav - {}",
            file.file_name().unwrap_or_default().to_string_lossy()
        )
    });

    // CLI flags override config
    let config = Config::load_or_default();
    let presenter_options = config.presenter_options();
    let design_width = presenter_options.design_width;
    let theme_name = theme_override.unwrap_or_else(|| config.theme_name().to_string());
    let theme = Theme::from_name(&theme_name);

    let syntax = render::syntax::highlight_all(&deck, theme.syntect_theme_name());

    let history = SessionHistory::new(initial_location(location, slide, config.start_mode()));
    let mut presenter = Presenter::start(deck, history, presenter_options)?;
    if let Some(command) = initial_overlay(start, config.start_mode()) {
        presenter.dispatch(command);
    }

    let viewport = if windowed {
        egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 720.0])
            .with_title(&title)
    } else {
        egui::ViewportBuilder::default()
            .with_fullscreen(true)
            .with_title(&title)
    };

    let options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };

    let app_name = title.clone();
    eframe::run_native(
        &app_name,
        options,
        Box::new(move |_cc| {
            Ok(Box::new(PresentationApp::new(
                presenter,
                theme,
                syntax,
                title,
                design_width,
            )))
        }),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))
}
