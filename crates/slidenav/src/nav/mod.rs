pub mod reveal;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::deck::{Deck, Error, Slide, SlideKind};

pub use reveal::Reveal;

/// Fragment state a slide lands in after `jump_to`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Landing {
    #[default]
    Hidden,
    Revealed,
}

impl Landing {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "hidden" => Some(Self::Hidden),
            "revealed" => Some(Self::Revealed),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Hidden => "hidden",
            Self::Revealed => "revealed",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NavPolicy {
    /// Advancing past the last slide returns to the first one.
    pub wrap_forward: bool,
    pub jump_landing: Landing,
}

/// What a navigation call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Revealed,
    Hidden,
    SlideAdvanced,
    SlideRetreated,
    Jumped,
    Ignored,
}

impl Step {
    pub fn changed_slide(self) -> bool {
        matches!(
            self,
            Self::SlideAdvanced | Self::SlideRetreated | Self::Jumped
        )
    }
}

/// Visibility snapshot of a single slide, as consumed by the views.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlideView {
    pub index: usize,
    pub visible: Vec<bool>,
    /// Highlight region currently emphasised.
    pub active_region: Option<usize>,
}

impl SlideView {
    fn from_reveal(slide: &Slide, reveal: &Reveal) -> Self {
        let visible = (0..slide.fragment_count())
            .map(|i| reveal.is_visible(i))
            .collect();
        let active_region = match slide.kind {
            SlideKind::CodeExplanation => reveal
                .focused()
                .and_then(|order| slide.fragment_region(order)),
            SlideKind::Standard => None,
        };
        Self {
            index: slide.index,
            visible,
            active_region,
        }
    }

    /// The slide as it looks once every step has been taken.
    pub fn fully_revealed(slide: &Slide) -> Self {
        let reveal = Reveal::revealed(slide.kind, slide.fragment_count());
        let mut view = Self::from_reveal(slide, &reveal);
        // Thumbnails show every fragment; only the highlight follows the last one.
        view.visible.iter_mut().for_each(|v| *v = true);
        view
    }

    pub fn is_visible(&self, fragment: Option<usize>) -> bool {
        fragment.is_none_or(|i| self.visible.get(i).copied().unwrap_or(false))
    }
}

/// Slide position plus per-slide fragment visibility.
#[derive(Debug)]
pub struct Navigator {
    deck: Deck,
    current: usize,
    reveals: Vec<Reveal>,
    policy: NavPolicy,
}

impl Navigator {
    pub fn new(deck: Deck, policy: NavPolicy) -> Result<Self, Error> {
        if deck.slides.is_empty() {
            return Err(Error::NoSlides);
        }
        let reveals = deck
            .slides
            .iter()
            .map(|s| Reveal::hidden(s.kind, s.fragment_count()))
            .collect();
        Ok(Self {
            deck,
            current: 0,
            reveals,
            policy,
        })
    }

    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn total(&self) -> usize {
        self.deck.slides.len()
    }

    pub fn current_slide(&self) -> &Slide {
        &self.deck.slides[self.current]
    }

    pub fn reveal(&self) -> &Reveal {
        &self.reveals[self.current]
    }

    pub fn view(&self) -> SlideView {
        SlideView::from_reveal(self.current_slide(), self.reveal())
    }

    pub fn advance(&mut self) -> Step {
        let idx = self.current;
        if self.reveals[idx].step_forward() {
            debug!(
                slide = idx,
                visible = self.reveals[idx].visible_count(),
                "advance: revealed fragment"
            );
            return Step::Revealed;
        }

        let last = idx + 1 >= self.total();
        if last && !self.policy.wrap_forward {
            debug!(slide = idx, "advance: end of deck");
            return Step::Ignored;
        }

        self.reset(idx);
        self.current = if last { 0 } else { idx + 1 };
        debug!(from = idx, to = self.current, "advance: next slide");
        Step::SlideAdvanced
    }

    pub fn retreat(&mut self) -> Step {
        let idx = self.current;
        if self.reveals[idx].step_back() {
            debug!(
                slide = idx,
                visible = self.reveals[idx].visible_count(),
                "retreat: hid fragment"
            );
            return Step::Hidden;
        }

        let total = self.total();
        self.current = (idx + total - 1) % total;
        let slide = &self.deck.slides[self.current];
        self.reveals[self.current] = Reveal::revealed(slide.kind, slide.fragment_count());
        debug!(from = idx, to = self.current, "retreat: previous slide");
        Step::SlideRetreated
    }

    /// Jump to a slide by index. Out of range targets are ignored.
    pub fn jump_to(&mut self, index: usize) -> Step {
        if index >= self.total() {
            debug!(index, total = self.total(), "jump: out of range");
            return Step::Ignored;
        }
        self.reset(self.current);
        let from = self.current;
        self.current = index;
        if self.policy.jump_landing == Landing::Revealed {
            let slide = &self.deck.slides[index];
            self.reveals[index] = Reveal::revealed(slide.kind, slide.fragment_count());
        }
        debug!(from, to = index, "jump");
        Step::Jumped
    }

    pub fn first(&mut self) -> Step {
        self.jump_to(0)
    }

    pub fn last(&mut self) -> Step {
        self.jump_to(self.total() - 1)
    }

    /// Hide every fragment (and so every highlight) on a slide.
    fn reset(&mut self, index: usize) {
        let slide = &self.deck.slides[index];
        self.reveals[index] = Reveal::hidden(slide.kind, slide.fragment_count());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deck::markup;

    /// Slide 0: standard, 2 fragments. Slide 1: code explanation, 3
    /// fragments each explaining a region. Slide 2: standard, no fragments.
    const SCENARIO: &str = r#"
<body>
  <div class="slide">
    <p class="fragment">one</p>
    <p class="fragment">two</p>
  </div>
  <div class="slide" data-slide-type="code-explanation">
    <pre><code><span data-highlight-id="a">let a;</span>
<span data-highlight-id="b">let b;</span>
<span data-highlight-id="c">let c;</span></code></pre>
    <p class="fragment" data-explains="a">A</p>
    <p class="fragment" data-explains="b">B</p>
    <p class="fragment" data-explains="c">C</p>
  </div>
  <div class="slide"><p>done</p></div>
</body>"#;

    fn navigator(policy: NavPolicy) -> Navigator {
        Navigator::new(markup::parse(SCENARIO).unwrap(), policy).unwrap()
    }

    fn state(nav: &Navigator) -> (usize, Vec<bool>, Option<usize>) {
        let view = nav.view();
        (nav.current(), view.visible, view.active_region)
    }

    /// The code explanation slide never shows more than one fragment or
    /// highlight.
    fn assert_single_focus(nav: &Navigator) {
        if nav.current_slide().kind == SlideKind::CodeExplanation {
            let view = nav.view();
            assert!(view.visible.iter().filter(|v| **v).count() <= 1);
        }
    }

    #[test]
    fn test_walkthrough_scenario() {
        let mut nav = navigator(NavPolicy::default());
        assert_eq!(state(&nav), (0, vec![false, false], None));

        assert_eq!(nav.advance(), Step::Revealed);
        assert_eq!(state(&nav), (0, vec![true, false], None));
        assert_eq!(nav.advance(), Step::Revealed);
        assert_eq!(state(&nav), (0, vec![true, true], None));

        assert_eq!(nav.advance(), Step::SlideAdvanced);
        assert_eq!(state(&nav), (1, vec![false, false, false], None));
        assert_eq!(nav.advance(), Step::Revealed);
        assert_eq!(state(&nav), (1, vec![true, false, false], Some(0)));

        nav.advance();
        nav.advance();
        assert_eq!(state(&nav), (1, vec![false, false, true], Some(2)));

        assert_eq!(nav.advance(), Step::SlideAdvanced);
        assert_eq!(nav.current(), 2);

        assert_eq!(nav.retreat(), Step::SlideRetreated);
        assert_eq!(state(&nav), (1, vec![false, false, true], Some(2)));
    }

    #[test]
    fn test_leaving_slide_resets_its_fragments() {
        let mut nav = navigator(NavPolicy::default());
        nav.advance();
        nav.advance();
        nav.advance();
        assert_eq!(nav.current(), 1);
        assert_eq!(nav.reveals[0], Reveal::hidden(SlideKind::Standard, 2));
    }

    #[test]
    fn test_advance_on_last_slide_is_ignored() {
        let mut nav = navigator(NavPolicy::default());
        nav.jump_to(2);
        assert_eq!(nav.advance(), Step::Ignored);
        assert_eq!(nav.current(), 2);
    }

    #[test]
    fn test_advance_wraps_when_enabled() {
        let mut nav = navigator(NavPolicy {
            wrap_forward: true,
            ..Default::default()
        });
        nav.jump_to(2);
        assert_eq!(nav.advance(), Step::SlideAdvanced);
        assert_eq!(state(&nav), (0, vec![false, false], None));
    }

    #[test]
    fn test_retreat_from_first_slide_wraps_to_last() {
        let mut nav = navigator(NavPolicy::default());
        assert_eq!(nav.retreat(), Step::SlideRetreated);
        assert_eq!(nav.current(), 2);
    }

    #[test]
    fn test_retreat_enters_standard_slide_fully_revealed() {
        let mut nav = navigator(NavPolicy::default());
        nav.jump_to(1);
        assert_eq!(nav.retreat(), Step::SlideRetreated);
        assert_eq!(state(&nav), (0, vec![true, true], None));
    }

    #[test]
    fn test_retreat_on_code_slide_restores_previous_highlight() {
        let mut nav = navigator(NavPolicy::default());
        nav.jump_to(1);
        nav.advance();
        nav.advance();
        assert_eq!(nav.view().active_region, Some(1));
        assert_eq!(nav.retreat(), Step::Hidden);
        assert_eq!(state(&nav), (1, vec![true, false, false], Some(0)));
        assert_eq!(nav.retreat(), Step::Hidden);
        assert_eq!(state(&nav), (1, vec![false, false, false], None));
        assert_eq!(nav.retreat(), Step::SlideRetreated);
        assert_eq!(nav.current(), 0);
    }

    #[test]
    fn test_jump_lands_hidden_for_every_slide() {
        let mut nav = navigator(NavPolicy::default());
        for i in 0..nav.total() {
            nav.advance();
            assert_eq!(nav.jump_to(i), Step::Jumped);
            assert_eq!(nav.current(), i);
            assert!(nav.view().visible.iter().all(|v| !v));
            assert_eq!(nav.view().active_region, None);
        }
    }

    #[test]
    fn test_jump_to_same_slide_resets_fragments() {
        let mut nav = navigator(NavPolicy::default());
        nav.advance();
        assert_eq!(nav.jump_to(0), Step::Jumped);
        assert_eq!(state(&nav), (0, vec![false, false], None));
    }

    #[test]
    fn test_jump_landing_revealed_policy() {
        let mut nav = navigator(NavPolicy {
            jump_landing: Landing::Revealed,
            ..Default::default()
        });
        nav.jump_to(1);
        assert_eq!(state(&nav), (1, vec![false, false, true], Some(2)));
    }

    #[test]
    fn test_jump_out_of_range_is_ignored() {
        let mut nav = navigator(NavPolicy::default());
        nav.advance();
        assert_eq!(nav.jump_to(3), Step::Ignored);
        assert_eq!(state(&nav), (0, vec![true, false], None));
    }

    #[test]
    fn test_intra_slide_steps_are_reversible() {
        let mut nav = navigator(NavPolicy::default());
        nav.jump_to(1);
        nav.advance();
        let before = state(&nav);
        nav.advance();
        nav.advance();
        nav.retreat();
        nav.retreat();
        assert_eq!(state(&nav), before);
    }

    #[test]
    fn test_forward_and_backward_entry_differ() {
        // Standard slide: entered forward with nothing shown, backward with everything.
        let mut nav = navigator(NavPolicy::default());
        nav.advance();
        nav.advance();
        nav.advance();
        nav.retreat();
        assert_eq!(state(&nav), (0, vec![true, true], None));

        // Code explanation slide: forward entry has no focus, backward entry focuses the last.
        let mut nav = navigator(NavPolicy::default());
        nav.jump_to(1);
        let forward = state(&nav);
        nav.advance();
        nav.advance();
        nav.advance();
        nav.advance();
        nav.retreat();
        assert_eq!(forward, (1, vec![false, false, false], None));
        assert_eq!(state(&nav), (1, vec![false, false, true], Some(2)));
    }

    #[test]
    fn test_code_slide_keeps_single_focus() {
        let mut nav = navigator(NavPolicy::default());
        let script = [1, 1, 1, 1, 0, 1, 1, 0, 0, 0, 1, 1, 1, 1, 1, 0, 0, 0, 0, 0, 0];
        for forward in script {
            if forward == 1 {
                nav.advance();
            } else {
                nav.retreat();
            }
            assert_single_focus(&nav);
        }
    }

    #[test]
    fn test_fully_revealed_view() {
        let nav = navigator(NavPolicy::default());
        let code = &nav.deck().slides[1];
        let view = SlideView::fully_revealed(code);
        assert_eq!(view.visible, vec![true, true, true]);
        assert_eq!(view.active_region, Some(2));

        let plain = SlideView::fully_revealed(&nav.deck().slides[0]);
        assert_eq!(plain.visible, vec![true, true]);
        assert_eq!(plain.active_region, None);
    }

    #[test]
    fn test_missing_highlight_target_is_skipped() {
        let deck = markup::parse(
            r#"<div class="slide" data-slide-type="code-explanation">
                 <p class="fragment" data-explains="ghost">x</p>
               </div>"#,
        )
        .unwrap();
        let mut nav = Navigator::new(deck, NavPolicy::default()).unwrap();
        assert_eq!(nav.advance(), Step::Revealed);
        assert_eq!(state(&nav), (0, vec![true], None));
    }

    #[test]
    fn test_single_slide_deck_retreat_wraps_onto_itself() {
        let deck = markup::parse(r#"<div class="slide"><p class="fragment">x</p></div>"#).unwrap();
        let mut nav = Navigator::new(deck, NavPolicy::default()).unwrap();
        assert_eq!(nav.retreat(), Step::SlideRetreated);
        assert_eq!(state(&nav), (0, vec![true], None));
    }
}
