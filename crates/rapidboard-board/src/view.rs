//! Plain-data board view: what a UI renders.
//!
//! Rapidboard doesn't draw anything. A [`BoardView`] holds the texts a UI
//! would put in its widgets: one row per display slot, the guest's own
//! row, an info line, and whether the board content is visible.

use rapidboard_protocol::ScoreEntry;

use crate::BoardError;

// ---------------------------------------------------------------------------
// Rows
// ---------------------------------------------------------------------------

/// Rank, name and score text of one displayed row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlotText {
    /// e.g. `"1."`
    pub rank: String,
    pub name: String,
    /// e.g. `"100"`
    pub score: String,
}

impl SlotText {
    /// Formats `entry` as `"{rank}."`, `name`, `"{score}"`.
    pub fn from_entry(entry: &ScoreEntry) -> Self {
        Self {
            rank: format!("{}.", entry.rank),
            name: entry.name.clone(),
            score: entry.score.to_string(),
        }
    }

    /// `true` when all three texts are empty.
    pub fn is_empty(&self) -> bool {
        self.rank.is_empty() && self.name.is_empty() && self.score.is_empty()
    }
}

/// The guest's own row.
///
/// Empty means "not ranked yet", which is a normal state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSlot {
    text: SlotText,
}

impl SessionSlot {
    /// Shows `entry`, or clears the row for `None`.
    pub fn bind(&mut self, entry: Option<&ScoreEntry>) {
        self.text = entry.map(SlotText::from_entry).unwrap_or_default();
    }

    /// The current texts.
    pub fn text(&self) -> &SlotText {
        &self.text
    }

    /// `true` when the row is cleared.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

// ---------------------------------------------------------------------------
// DisplayWindow
// ---------------------------------------------------------------------------

/// The "other entries" part of a board: three parallel columns of rank,
/// name and score texts.
///
/// The column length is the number of rows fetched per refresh and is
/// fixed at construction. The columns are meant to be equally long; a
/// window built with [`with_columns`](Self::with_columns) from mismatched
/// widget lists refuses to refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayWindow {
    ranks: Vec<String>,
    names: Vec<String>,
    scores: Vec<String>,
}

impl DisplayWindow {
    /// A window of `size` empty rows.
    pub fn new(size: usize) -> Self {
        Self::with_columns(size, size, size)
    }

    /// A window with independently sized columns, as laid out by a UI.
    pub fn with_columns(ranks: usize, names: usize, scores: usize) -> Self {
        Self {
            ranks: vec![String::new(); ranks],
            names: vec![String::new(); names],
            scores: vec![String::new(); scores],
        }
    }

    /// Number of rows to fetch per refresh.
    ///
    /// # Errors
    /// [`BoardError::Misconfigured`] when the columns differ in length.
    pub fn fetch_count(&self) -> Result<usize, BoardError> {
        let (ranks, names, scores) = (self.ranks.len(), self.names.len(), self.scores.len());
        if ranks == names && names == scores {
            Ok(ranks)
        } else {
            Err(BoardError::Misconfigured {
                ranks,
                names,
                scores,
            })
        }
    }

    /// Fills the rows from `entries` in order. Rows beyond the end of
    /// `entries` are cleared; entries beyond the last row are ignored.
    pub fn bind(&mut self, entries: &[ScoreEntry]) {
        let rows = self.ranks.len().min(self.names.len()).min(self.scores.len());
        for i in 0..rows {
            let text = entries.get(i).map(SlotText::from_entry).unwrap_or_default();
            self.ranks[i] = text.rank;
            self.names[i] = text.name;
            self.scores[i] = text.score;
        }
    }

    /// Row `index`, if it exists in all three columns.
    pub fn row(&self, index: usize) -> Option<SlotText> {
        Some(SlotText {
            rank: self.ranks.get(index)?.clone(),
            name: self.names.get(index)?.clone(),
            score: self.scores.get(index)?.clone(),
        })
    }

    /// Every complete row, top first.
    pub fn rows(&self) -> Vec<SlotText> {
        (0..self.ranks.len()).map_while(|i| self.row(i)).collect()
    }

    pub fn ranks(&self) -> &[String] {
        &self.ranks
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn scores(&self) -> &[String] {
        &self.scores
    }
}

// ---------------------------------------------------------------------------
// BoardView
// ---------------------------------------------------------------------------

/// What the board is doing, as last reported by a pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardStatus {
    /// Nothing has run yet.
    Idle,
    /// A pipeline is running.
    Loading,
    /// The last pipeline failed with this raw message.
    Failed(String),
    /// The last pipeline succeeded.
    Ready,
}

/// Everything a UI needs to draw a board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardView {
    pub status: BoardStatus,
    /// Whether the rows should be shown. Hidden while loading and after
    /// a failure.
    pub content_visible: bool,
    /// The info line: loading text, failure text or success text.
    pub info_text: String,
    pub window: DisplayWindow,
    pub session: SessionSlot,
}

impl BoardView {
    /// An idle view around `window`.
    pub fn new(window: DisplayWindow) -> Self {
        Self {
            status: BoardStatus::Idle,
            content_visible: false,
            info_text: String::new(),
            window,
            session: SessionSlot::default(),
        }
    }
}
