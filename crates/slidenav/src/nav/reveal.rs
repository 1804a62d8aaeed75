use crate::deck::SlideKind;

/// Fragment visibility for one slide.
///
/// Standard slides reveal a growing prefix of their fragments. Code
/// explanation slides show at most one fragment, which is replaced on every
/// step in either direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reveal {
    Prefix { shown: usize, total: usize },
    Single { shown: Option<usize>, total: usize },
}

impl Reveal {
    /// Baseline used when a slide is entered moving forward: nothing visible.
    pub fn hidden(kind: SlideKind, total: usize) -> Self {
        match kind {
            SlideKind::Standard => Self::Prefix { shown: 0, total },
            SlideKind::CodeExplanation => Self::Single { shown: None, total },
        }
    }

    /// Baseline used when a slide is entered moving backward.
    pub fn revealed(kind: SlideKind, total: usize) -> Self {
        match kind {
            SlideKind::Standard => Self::Prefix {
                shown: total,
                total,
            },
            SlideKind::CodeExplanation => Self::Single {
                shown: total.checked_sub(1),
                total,
            },
        }
    }

    pub fn has_next(&self) -> bool {
        match *self {
            Self::Prefix { shown, total } => shown < total,
            Self::Single { shown, total } => shown.map_or(0, |i| i + 1) < total,
        }
    }

    pub fn any_visible(&self) -> bool {
        match *self {
            Self::Prefix { shown, .. } => shown > 0,
            Self::Single { shown, .. } => shown.is_some(),
        }
    }

    /// Reveal the next fragment. Returns false when there is none.
    pub fn step_forward(&mut self) -> bool {
        if !self.has_next() {
            return false;
        }
        match self {
            Self::Prefix { shown, .. } => *shown += 1,
            Self::Single { shown, .. } => *shown = Some(shown.map_or(0, |i| i + 1)),
        }
        true
    }

    /// Hide the most recently revealed fragment. A code explanation slide
    /// falls back to the fragment before it. Returns false when nothing is
    /// visible.
    pub fn step_back(&mut self) -> bool {
        if !self.any_visible() {
            return false;
        }
        match self {
            Self::Prefix { shown, .. } => *shown -= 1,
            Self::Single { shown, .. } => *shown = shown.and_then(|i| i.checked_sub(1)),
        }
        true
    }

    pub fn is_visible(&self, order: usize) -> bool {
        match *self {
            Self::Prefix { shown, .. } => order < shown,
            Self::Single { shown, .. } => shown == Some(order),
        }
    }

    /// The fragment that owns the slide's highlight, if any.
    pub fn focused(&self) -> Option<usize> {
        match *self {
            Self::Prefix { .. } => None,
            Self::Single { shown, .. } => shown,
        }
    }

    pub fn visible_count(&self) -> usize {
        match *self {
            Self::Prefix { shown, .. } => shown,
            Self::Single { shown, .. } => usize::from(shown.is_some()),
        }
    }
}
