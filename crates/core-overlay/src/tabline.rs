//! External tab line (`tabline_update`).

use crate::{Anchor, Overlay};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tab {
    pub handle: i64,
    pub name: String,
}

impl Tab {
    pub fn new(handle: i64, name: impl Into<String>) -> Self {
        Self {
            handle,
            name: name.into(),
        }
    }
}

/// Visible only while more than one tab exists.
#[derive(Debug, Default)]
pub struct Tabline {
    tabs: Vec<Tab>,
    current: Option<i64>,
}

impl Tabline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, current: i64, tabs: Vec<Tab>) {
        self.current = Some(current);
        self.tabs = tabs;
    }

    pub fn current(&self) -> Option<i64> {
        self.current
    }
}

impl Overlay for Tabline {
    type Item = Tab;

    fn is_visible(&self) -> bool {
        self.tabs.len() > 1
    }

    fn items(&self) -> &[Tab] {
        &self.tabs
    }

    fn selected_index(&self) -> Option<usize> {
        let current = self.current?;
        self.tabs.iter().position(|t| t.handle == current)
    }

    fn anchor_position(&self) -> Anchor {
        Anchor::default()
    }

    fn hide(&mut self) -> bool {
        let was = self.is_visible();
        self.tabs.clear();
        self.current = None;
        was
    }
}
