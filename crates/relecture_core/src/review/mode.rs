//! Review view modes and per-surface state.

use crate::model::entry::EntryRef;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Layout selected on the review surface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    #[default]
    Chronological,
    Thematic,
    Consolations,
    River,
    Constellation,
}

impl ViewMode {
    pub const ALL: [ViewMode; 5] = [
        ViewMode::Chronological,
        ViewMode::Thematic,
        ViewMode::Consolations,
        ViewMode::River,
        ViewMode::Constellation,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Chronological => "chronological",
            Self::Thematic => "thematic",
            Self::Consolations => "consolations",
            Self::River => "river",
            Self::Constellation => "constellation",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str() == normalized)
    }
}

impl Display for ViewMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State owned by one review surface and passed to every render.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReviewState {
    pub mode: ViewMode,
    pub hovered: Option<EntryRef>,
}

impl ReviewState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Switches layout. Hover is kept so highlights survive the switch.
    pub fn select_mode(&mut self, mode: ViewMode) {
        self.mode = mode;
    }

    pub fn hover(&mut self, entry: EntryRef) {
        self.hovered = Some(entry);
    }

    pub fn clear_hover(&mut self) {
        self.hovered = None;
    }
}
