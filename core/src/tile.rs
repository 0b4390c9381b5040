use serde::{Deserialize, Serialize};

/// Per-cell mark as tracked for both the player grid and the solver grid.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TileState {
    /// Nothing known or marked yet.
    Blank,
    Filled,
    /// Logically excluded from being filled.
    Blocked,
    /// Player marked the tile filled but the solution disagrees. Only the
    /// gameplay layer ever writes this; the solver reads it as blocked and
    /// never clears it.
    Error,
}

impl TileState {
    pub const fn is_blank(self) -> bool {
        matches!(self, Self::Blank)
    }

    pub const fn is_filled(self) -> bool {
        matches!(self, Self::Filled)
    }

    pub const fn is_set(self) -> bool {
        !self.is_blank()
    }

    /// Whether a run of filled cells may not occupy this tile.
    pub const fn rules_out_fill(self) -> bool {
        matches!(self, Self::Blocked | Self::Error)
    }
}

impl Default for TileState {
    fn default() -> Self {
        Self::Blank
    }
}
