//! Keyboard and touch adapters. Both turn raw input into [`Command`]s.

/// Something the presenter can be asked to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Advance,
    Retreat,
    First,
    Last,
    JumpTo(usize),
    ToggleToc,
    ToggleGrid,
    CloseOverlay,
    /// A table of contents entry was chosen.
    SelectEntry(usize),
    /// A grid thumbnail was chosen.
    SelectThumbnail(usize),
}

/// Keys the presenter reacts to, independent of the windowing toolkit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    ArrowRight,
    ArrowLeft,
    Space,
    Home,
    End,
    Escape,
    Char(char),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyMap {
    pub toc: char,
    pub grid: char,
}

impl Default for KeyMap {
    fn default() -> Self {
        Self {
            toc: 't',
            grid: 'g',
        }
    }
}

impl KeyMap {
    /// While an overlay is open only Escape gets through, and it closes it.
    pub fn command(&self, key: Key, overlay_open: bool) -> Option<Command> {
        if overlay_open {
            return (key == Key::Escape).then_some(Command::CloseOverlay);
        }
        match key {
            Key::ArrowRight | Key::Space | Key::Char(' ') => Some(Command::Advance),
            Key::ArrowLeft => Some(Command::Retreat),
            Key::Home => Some(Command::First),
            Key::End => Some(Command::Last),
            Key::Char(c) if c.eq_ignore_ascii_case(&self.toc) => Some(Command::ToggleToc),
            Key::Char(c) if c.eq_ignore_ascii_case(&self.grid) => Some(Command::ToggleGrid),
            _ => None,
        }
    }
}

/// Horizontal swipe detection. Any movement counts; there is no threshold.
#[derive(Debug, Default, Clone, Copy)]
pub struct Swipe {
    start_x: Option<f32>,
}

impl Swipe {
    pub fn touch_start(&mut self, x: f32) {
        self.start_x = Some(x);
    }

    pub fn touch_end(&mut self, x: f32) -> Option<Command> {
        let start = self.start_x.take()?;
        if x < start {
            Some(Command::Advance)
        } else if x > start {
            Some(Command::Retreat)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_navigation_keys() {
        let keys = KeyMap::default();
        assert_eq!(keys.command(Key::ArrowRight, false), Some(Command::Advance));
        assert_eq!(keys.command(Key::Space, false), Some(Command::Advance));
        assert_eq!(keys.command(Key::ArrowLeft, false), Some(Command::Retreat));
        assert_eq!(keys.command(Key::Home, false), Some(Command::First));
        assert_eq!(keys.command(Key::End, false), Some(Command::Last));
        assert_eq!(keys.command(Key::Escape, false), None);
        assert_eq!(keys.command(Key::Char('x'), false), None);
    }

    #[test]
    fn test_overlay_keys_ignore_case() {
        let keys = KeyMap::default();
        assert_eq!(keys.command(Key::Char('t'), false), Some(Command::ToggleToc));
        assert_eq!(keys.command(Key::Char('T'), false), Some(Command::ToggleToc));
        assert_eq!(keys.command(Key::Char('G'), false), Some(Command::ToggleGrid));
    }

    #[test]
    fn test_open_overlay_only_honors_escape() {
        let keys = KeyMap::default();
        assert_eq!(keys.command(Key::ArrowRight, true), None);
        assert_eq!(keys.command(Key::Char('t'), true), None);
        assert_eq!(keys.command(Key::End, true), None);
        assert_eq!(keys.command(Key::Escape, true), Some(Command::CloseOverlay));
    }

    #[test]
    fn test_custom_bindings() {
        let keys = KeyMap { toc: 'c', grid: 'o' };
        assert_eq!(keys.command(Key::Char('c'), false), Some(Command::ToggleToc));
        assert_eq!(keys.command(Key::Char('O'), false), Some(Command::ToggleGrid));
        assert_eq!(keys.command(Key::Char('t'), false), None);
    }

    #[test]
    fn test_swipe_direction() {
        let mut swipe = Swipe::default();
        swipe.touch_start(300.0);
        assert_eq!(swipe.touch_end(299.0), Some(Command::Advance));
        swipe.touch_start(300.0);
        assert_eq!(swipe.touch_end(420.0), Some(Command::Retreat));
        swipe.touch_start(300.0);
        assert_eq!(swipe.touch_end(300.0), None);
    }

    #[test]
    fn test_swipe_needs_a_start() {
        let mut swipe = Swipe::default();
        assert_eq!(swipe.touch_end(10.0), None);
        swipe.touch_start(50.0);
        swipe.touch_end(10.0);
        assert_eq!(swipe.touch_end(0.0), None);
    }
}
