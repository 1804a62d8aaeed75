use crate::nav::Navigator;

/// Position indicators shown around the current slide.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Chrome {
    /// Slide marked active.
    pub active: usize,
    /// `position / total`, one-based.
    pub counter: String,
    /// Progress through the deck in percent.
    pub progress: f32,
}

impl Chrome {
    pub fn mark_active(&mut self, nav: &Navigator) {
        self.active = nav.current();
    }

    pub fn update_counter(&mut self, nav: &Navigator) {
        self.counter = format!("{} / {}", nav.current() + 1, nav.total());
    }

    pub fn update_progress(&mut self, nav: &Navigator) {
        self.progress = (nav.current() + 1) as f32 / nav.total() as f32 * 100.0;
    }

    /// Progress as a 0..=1 fraction, for drawing.
    pub fn fraction(&self) -> f32 {
        self.progress / 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deck::markup;
    use crate::nav::NavPolicy;

    #[test]
    fn test_counter_and_progress() {
        let deck = markup::parse(
            r#"<div class="slide">a</div><div class="slide">b</div>
               <div class="slide">c</div><div class="slide">d</div>"#,
        )
        .unwrap();
        let mut nav = Navigator::new(deck, NavPolicy::default()).unwrap();
        nav.jump_to(1);

        let mut chrome = Chrome::default();
        chrome.mark_active(&nav);
        chrome.update_counter(&nav);
        chrome.update_progress(&nav);

        assert_eq!(chrome.active, 1);
        assert_eq!(chrome.counter, "2 / 4");
        assert!((chrome.progress - 50.0).abs() < f32::EPSILON);
        assert!((chrome.fraction() - 0.5).abs() < f32::EPSILON);
    }
}
