//! Session default colors.
//!
//! The editor has no explicit "no colorscheme" signal: it sends `update_fg`/`update_bg` with -1
//! and then stays quiet. Until a real color arrives the session shows hold-over defaults; once
//! `grace` redraw batches pass without one, the defaults are committed for the rest of the
//! session. A real color at any point marks the colorscheme as set and stops the count.

use core_style::{Color, DefaultColors};
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct ColorPolicy {
    defaults: DefaultColors,
    grace: u32,
    foreground: Option<Color>,
    background: Option<Color>,
    special: Option<Color>,
    colorscheme_set: bool,
    committed: bool,
    quiet_batches: u32,
    real_in_batch: bool,
}

impl ColorPolicy {
    pub fn new(defaults: DefaultColors, grace: u32) -> Self {
        Self {
            defaults,
            grace,
            foreground: None,
            background: None,
            special: None,
            colorscheme_set: false,
            committed: false,
            quiet_batches: 0,
            real_in_batch: false,
        }
    }

    pub fn begin_batch(&mut self) {
        self.real_in_batch = false;
    }

    /// `update_fg`. Returns `true` when the effective foreground changed.
    pub fn update_foreground(&mut self, packed: i64) -> bool {
        let fallback = self.defaults.foreground;
        let next = self.incoming(packed, self.foreground, fallback);
        replace(&mut self.foreground, next)
    }

    /// `update_bg`. Returns `true` when the effective background changed.
    pub fn update_background(&mut self, packed: i64) -> bool {
        let fallback = self.defaults.background;
        let next = self.incoming(packed, self.background, fallback);
        replace(&mut self.background, next)
    }

    /// `update_sp`: -1 resets to the default special color (white unless configured).
    pub fn update_special(&mut self, packed: i64) -> bool {
        let next = Color::from_packed(packed).unwrap_or(self.defaults.special);
        replace(&mut self.special, Some(next))
    }

    /// A real color always wins. -1 only fills an empty slot with the hold-over default; once a
    /// color is present it is kept.
    fn incoming(&mut self, packed: i64, current: Option<Color>, fallback: Color) -> Option<Color> {
        match Color::from_packed(packed) {
            Some(color) => {
                self.real_in_batch = true;
                if !self.colorscheme_set {
                    self.colorscheme_set = true;
                    info!(target: "redraw.color", color = %color.hex(), "colorscheme_detected");
                }
                Some(color)
            }
            None => Some(current.unwrap_or(fallback)),
        }
    }

    /// Close a redraw batch. Returns `true` when the defaults were committed by this batch.
    pub fn end_batch(&mut self) -> bool {
        if self.colorscheme_set || self.committed || self.real_in_batch {
            return false;
        }
        self.quiet_batches += 1;
        debug!(target: "redraw.color", quiet = self.quiet_batches, grace = self.grace, "quiet_batch");
        if self.quiet_batches < self.grace {
            return false;
        }
        self.foreground = Some(self.defaults.foreground);
        self.background = Some(self.defaults.background);
        self.committed = true;
        info!(
            target: "redraw.color",
            quiet = self.quiet_batches,
            foreground = %self.defaults.foreground.hex(),
            background = %self.defaults.background.hex(),
            "default_colors_committed"
        );
        true
    }

    /// Colors the renderer should use right now.
    pub fn effective(&self) -> DefaultColors {
        DefaultColors {
            foreground: self.foreground.unwrap_or(self.defaults.foreground),
            background: self.background.unwrap_or(self.defaults.background),
            special: self.special.unwrap_or(self.defaults.special),
        }
    }

    pub fn foreground(&self) -> Option<Color> {
        self.foreground
    }

    pub fn background(&self) -> Option<Color> {
        self.background
    }

    pub fn is_colorscheme_set(&self) -> bool {
        self.colorscheme_set
    }

    /// Defaults were committed after the grace period ran out.
    pub fn is_committed(&self) -> bool {
        self.committed
    }

    pub fn quiet_batches(&self) -> u32 {
        self.quiet_batches
    }
}

fn replace(slot: &mut Option<Color>, next: Option<Color>) -> bool {
    if *slot == next {
        return false;
    }
    *slot = next;
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(grace: u32) -> ColorPolicy {
        ColorPolicy::new(DefaultColors::default(), grace)
    }

    #[test]
    fn unset_color_uses_hold_over_until_grace_runs_out() {
        let mut p = policy(2);
        p.begin_batch();
        assert!(p.update_foreground(-1));
        assert_eq!(p.foreground(), Some(DefaultColors::default().foreground));
        assert!(!p.end_batch());
        assert!(!p.is_committed());

        p.begin_batch();
        assert!(!p.update_foreground(-1));
        assert!(p.end_batch());
        assert!(p.is_committed());
        assert_eq!(p.effective(), DefaultColors::default());
        // Nothing left to commit.
        p.begin_batch();
        assert!(!p.end_batch());
    }

    #[test]
    fn real_color_stops_the_count() {
        let mut p = policy(2);
        p.begin_batch();
        p.update_foreground(-1);
        p.end_batch();
        p.begin_batch();
        assert!(p.update_background(0x101010));
        assert!(!p.end_batch());
        assert!(p.is_colorscheme_set());
        assert!(!p.is_committed());
        for _ in 0..5 {
            p.begin_batch();
            assert!(!p.end_batch());
        }
        assert_eq!(p.background(), Some(Color::rgb(16, 16, 16)));
    }

    #[test]
    fn unset_after_colorscheme_keeps_the_color() {
        let mut p = policy(2);
        p.begin_batch();
        p.update_foreground(0xff0000);
        assert!(!p.update_foreground(-1));
        assert_eq!(p.foreground(), Some(Color::rgb(255, 0, 0)));
        assert!(p.update_foreground(0x00ff00));
        assert_eq!(p.foreground(), Some(Color::rgb(0, 255, 0)));
    }

    #[test]
    fn special_unset_resets_to_white() {
        let mut p = policy(2);
        p.update_special(0x123456);
        assert!(p.update_special(-1));
        assert_eq!(p.effective().special, Color::WHITE);
    }

    #[test]
    fn zero_grace_commits_on_first_batch() {
        let mut p = policy(0);
        p.begin_batch();
        assert!(p.end_batch());
        assert!(p.is_committed());
    }

    #[test]
    fn real_color_after_commit_still_applies() {
        let mut p = policy(1);
        p.begin_batch();
        p.end_batch();
        assert!(p.is_committed());
        assert!(p.update_foreground(0x0000ff));
        assert_eq!(p.effective().foreground, Color::rgb(0, 0, 255));
    }
}
