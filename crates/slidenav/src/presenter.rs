use tracing::{debug, info};

use crate::deck::{Deck, Error};
use crate::input::{Command, Key, KeyMap, Swipe};
use crate::location::{self, History, HistoryEntry, PopState};
use crate::nav::{NavPolicy, Navigator, Step};
use crate::view::{Chrome, GridOverview, TableOfContents};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Overlay {
    #[default]
    None,
    Toc,
    Grid,
}

/// Presenter settings that do not belong to the navigator itself.
#[derive(Debug, Clone, Copy)]
pub struct Options {
    pub policy: NavPolicy,
    pub keys: KeyMap,
    /// Whether the grid overview can be opened at all.
    pub grid_enabled: bool,
    pub design_width: f32,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            policy: NavPolicy::default(),
            keys: KeyMap::default(),
            grid_enabled: true,
            design_width: crate::view::grid::DEFAULT_DESIGN_WIDTH,
        }
    }
}

/// Owns the navigator and everything that reacts to it.
pub struct Presenter<H: History> {
    nav: Navigator,
    history: H,
    overlay: Overlay,
    keys: KeyMap,
    swipe: Swipe,
    grid_enabled: bool,
    toc: TableOfContents,
    grid: GridOverview,
    chrome: Chrome,
    /// Width the grid lays itself out in; set by the front end.
    viewport_width: f32,
}

impl<H: History> Presenter<H> {
    /// Open `deck` at the slide named by the history's current location,
    /// or at the first slide when it names none.
    pub fn start(deck: Deck, history: H, options: Options) -> Result<Self, Error> {
        let toc = TableOfContents::build(&deck);
        let mut nav = Navigator::new(deck, options.policy)?;

        if let Some(index) = location::decode(history.location()) {
            nav.jump_to(index);
        }

        let mut presenter = Self {
            nav,
            history,
            overlay: Overlay::None,
            keys: options.keys,
            swipe: Swipe::default(),
            grid_enabled: options.grid_enabled,
            toc,
            grid: GridOverview::new(options.design_width),
            chrome: Chrome::default(),
            viewport_width: options.design_width,
        };
        presenter.slide_changed();
        info!(
            slides = presenter.nav.total(),
            start = presenter.nav.current() + 1,
            "presentation opened"
        );
        Ok(presenter)
    }

    pub fn navigator(&self) -> &Navigator {
        &self.nav
    }

    pub fn history(&self) -> &H {
        &self.history
    }

    pub fn overlay(&self) -> Overlay {
        self.overlay
    }

    pub fn toc(&self) -> &TableOfContents {
        &self.toc
    }

    pub fn grid(&self) -> &GridOverview {
        &self.grid
    }

    pub fn chrome(&self) -> &Chrome {
        &self.chrome
    }

    pub fn location(&self) -> &str {
        self.history.location()
    }

    /// Record the width the grid lays itself out in. An open grid is
    /// rebuilt when it changes.
    pub fn set_viewport_width(&mut self, width: f32) {
        if (self.viewport_width - width).abs() < 0.5 {
            return;
        }
        self.viewport_width = width;
        if self.overlay == Overlay::Grid {
            self.grid.rebuild(self.nav.deck(), width);
        }
    }

    pub fn dispatch(&mut self, command: Command) -> Step {
        debug!(?command, overlay = ?self.overlay, "dispatch");
        let step = match command {
            Command::Advance => self.nav.advance(),
            Command::Retreat => self.nav.retreat(),
            Command::First => self.nav.first(),
            Command::Last => self.nav.last(),
            Command::JumpTo(index) => self.nav.jump_to(index),
            Command::ToggleToc => {
                self.toggle(Overlay::Toc);
                Step::Ignored
            }
            Command::ToggleGrid => {
                if self.grid_enabled {
                    self.toggle(Overlay::Grid);
                }
                Step::Ignored
            }
            Command::CloseOverlay => {
                self.overlay = Overlay::None;
                Step::Ignored
            }
            Command::SelectEntry(index) => {
                let step = self.nav.jump_to(index);
                self.overlay = Overlay::None;
                step
            }
            Command::SelectThumbnail(index) => {
                self.overlay = Overlay::None;
                self.nav.jump_to(index)
            }
        };
        if step.changed_slide() {
            self.slide_changed();
        }
        step
    }

    pub fn key(&mut self, key: Key) -> Step {
        match self.keys.command(key, self.overlay != Overlay::None) {
            Some(command) => self.dispatch(command),
            None => Step::Ignored,
        }
    }

    pub fn touch_start(&mut self, x: f32) {
        self.swipe.touch_start(x);
    }

    pub fn touch_end(&mut self, x: f32) -> Step {
        match self.swipe.touch_end(x) {
            Some(command) => self.dispatch(command),
            None => Step::Ignored,
        }
    }

    pub fn back(&mut self) -> Step {
        match self.history.back() {
            Some(event) => self.pop_state(event),
            None => Step::Ignored,
        }
    }

    pub fn forward(&mut self) -> Step {
        match self.history.forward() {
            Some(event) => self.pop_state(event),
            None => Step::Ignored,
        }
    }

    /// Restore the slide recorded in a history entry, falling back to the
    /// entry's location identifier when it carries no state.
    pub fn pop_state(&mut self, event: PopState) -> Step {
        let target = match event.state {
            Some(entry) => Some(entry.index),
            None => location::decode(&event.location),
        };
        match target {
            Some(index) => self.dispatch(Command::JumpTo(index)),
            None => {
                debug!(location = %event.location, "pop state without a slide");
                Step::Ignored
            }
        }
    }

    fn toggle(&mut self, overlay: Overlay) {
        if self.overlay == overlay {
            self.overlay = Overlay::None;
            return;
        }
        self.overlay = overlay;
        if overlay == Overlay::Grid {
            self.grid.rebuild(self.nav.deck(), self.viewport_width);
        }
    }

    fn slide_changed(&mut self) {
        self.chrome.mark_active(&self.nav);
        self.chrome.update_counter(&self.nav);
        self.chrome.update_progress(&self.nav);
        self.sync_location();
    }

    fn sync_location(&mut self) {
        let index = self.nav.current();
        let wanted = location::encode(index);
        if self.history.location() != wanted {
            debug!(location = %wanted, "push history entry");
            self.history.push(HistoryEntry::for_slide(index), wanted);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deck::markup;
    use crate::location::SessionHistory;

    const DECK: &str = r#"
<body>
  <div class="slide" data-title="Start">
    <p class="fragment">one</p>
    <p class="fragment">two</p>
  </div>
  <div class="slide" data-slide-type="code-explanation">
    <pre><span data-highlight-id="a">a</span> <span data-highlight-id="b">b</span></pre>
    <p class="fragment" data-explains="a">A</p>
    <p class="fragment" data-explains="b">B</p>
  </div>
  <div class="slide"><p>end</p></div>
</body>"#;

    fn presenter_at(location: &str) -> Presenter<SessionHistory> {
        presenter_with(location, Options::default())
    }

    fn presenter_with(location: &str, options: Options) -> Presenter<SessionHistory> {
        let deck = markup::parse(DECK).unwrap();
        Presenter::start(deck, SessionHistory::new(location), options).unwrap()
    }

    #[test]
    fn test_start_without_location_pushes_first_slide() {
        let p = presenter_at("");
        assert_eq!(p.navigator().current(), 0);
        assert_eq!(p.location(), "#1");
        assert_eq!(p.history().len(), 2);
        assert_eq!(p.chrome().counter, "1 / 3");
    }

    #[test]
    fn test_start_from_location() {
        let p = presenter_at("#2");
        assert_eq!(p.navigator().current(), 1);
        assert_eq!(p.history().len(), 1);
        assert_eq!(p.chrome().active, 1);
    }

    #[test]
    fn test_start_ignores_out_of_range_location() {
        let p = presenter_at("#9");
        assert_eq!(p.navigator().current(), 0);
        assert_eq!(p.location(), "#1");
    }

    #[test]
    fn test_location_tracks_every_transition() {
        let mut p = presenter_at("");
        let commands = [
            Command::Advance,
            Command::Advance,
            Command::Advance,
            Command::Retreat,
            Command::Retreat,
            Command::Last,
            Command::First,
            Command::JumpTo(1),
            Command::JumpTo(7),
        ];
        for command in commands {
            p.dispatch(command);
            assert_eq!(p.location(), location::encode(p.navigator().current()));
            assert_eq!(
                p.chrome().counter,
                format!("{} / 3", p.navigator().current() + 1)
            );
        }
    }

    #[test]
    fn test_no_duplicate_history_entries() {
        let mut p = presenter_at("");
        let before = p.history().len();
        p.dispatch(Command::Advance);
        assert_eq!(p.history().len(), before);
        p.dispatch(Command::JumpTo(0));
        assert_eq!(p.history().len(), before);
        p.dispatch(Command::JumpTo(2));
        assert_eq!(p.history().len(), before + 1);
    }

    #[test]
    fn test_back_restores_from_state() {
        let mut p = presenter_at("");
        p.dispatch(Command::JumpTo(2));
        p.dispatch(Command::JumpTo(1));
        assert_eq!(p.back(), Step::Jumped);
        assert_eq!(p.navigator().current(), 2);
        assert_eq!(p.location(), "#3");
        assert_eq!(p.forward(), Step::Jumped);
        assert_eq!(p.navigator().current(), 1);
    }

    #[test]
    fn test_back_to_stateless_entry_parses_location() {
        let mut p = presenter_at("#3");
        p.dispatch(Command::First);
        assert_eq!(p.back(), Step::Jumped);
        assert_eq!(p.navigator().current(), 2);
    }

    #[test]
    fn test_pop_state_with_bad_location_is_ignored() {
        let mut p = presenter_at("");
        p.dispatch(Command::JumpTo(1));
        let step = p.pop_state(PopState {
            state: None,
            location: "#intro".to_string(),
        });
        assert_eq!(step, Step::Ignored);
        assert_eq!(p.navigator().current(), 1);

        let step = p.pop_state(PopState {
            state: None,
            location: String::new(),
        });
        assert_eq!(step, Step::Ignored);
    }

    #[test]
    fn test_overlay_swallows_navigation_keys() {
        let mut p = presenter_at("");
        p.key(Key::Char('t'));
        assert_eq!(p.overlay(), Overlay::Toc);
        assert_eq!(p.key(Key::ArrowRight), Step::Ignored);
        assert_eq!(p.navigator().view().visible, vec![false, false]);
        p.key(Key::Char('g'));
        assert_eq!(p.overlay(), Overlay::Toc);
        p.key(Key::Escape);
        assert_eq!(p.overlay(), Overlay::None);
        assert_eq!(p.key(Key::ArrowRight), Step::Revealed);
    }

    #[test]
    fn test_toc_selection_jumps_and_closes() {
        let mut p = presenter_at("");
        assert_eq!(p.toc().len(), 3);
        p.dispatch(Command::ToggleToc);
        assert_eq!(p.dispatch(Command::SelectEntry(2)), Step::Jumped);
        assert_eq!(p.overlay(), Overlay::None);
        assert_eq!(p.navigator().current(), 2);
    }

    #[test]
    fn test_grid_rebuilds_each_time_it_opens() {
        let mut p = presenter_at("");
        p.set_viewport_width(1280.0);
        p.dispatch(Command::ToggleGrid);
        assert_eq!(p.overlay(), Overlay::Grid);
        assert_eq!(p.grid().thumbnails().len(), 3);
        p.dispatch(Command::ToggleGrid);
        assert_eq!(p.overlay(), Overlay::None);
        p.dispatch(Command::ToggleGrid);
        assert_eq!(p.grid().thumbnails().len(), 3);
        assert_eq!(p.grid().layout().columns, 2);
    }

    #[test]
    fn test_open_grid_follows_resize() {
        let mut p = presenter_at("");
        p.dispatch(Command::ToggleGrid);
        let before = p.grid().thumbnails()[0].scale;
        p.set_viewport_width(640.0);
        let after = p.grid().thumbnails()[0].scale;
        assert!(after < before);
    }

    #[test]
    fn test_thumbnail_selection_jumps_hidden() {
        let mut p = presenter_at("");
        p.dispatch(Command::ToggleGrid);
        assert_eq!(p.dispatch(Command::SelectThumbnail(1)), Step::Jumped);
        assert_eq!(p.overlay(), Overlay::None);
        assert_eq!(p.navigator().current(), 1);
        assert_eq!(p.navigator().view().active_region, None);
        assert_eq!(p.location(), "#2");
    }

    #[test]
    fn test_grid_can_be_disabled() {
        let mut p = presenter_with(
            "",
            Options {
                grid_enabled: false,
                ..Default::default()
            },
        );
        p.key(Key::Char('g'));
        assert_eq!(p.overlay(), Overlay::None);
    }

    #[test]
    fn test_swipes_navigate() {
        let mut p = presenter_at("");
        p.touch_start(500.0);
        assert_eq!(p.touch_end(200.0), Step::Revealed);
        p.touch_start(200.0);
        assert_eq!(p.touch_end(500.0), Step::Hidden);
        p.touch_start(200.0);
        assert_eq!(p.touch_end(200.0), Step::Ignored);
    }

    #[test]
    fn test_home_and_end() {
        let mut p = presenter_at("");
        p.key(Key::End);
        assert_eq!(p.navigator().current(), 2);
        p.key(Key::Home);
        assert_eq!(p.navigator().current(), 0);
    }
}
