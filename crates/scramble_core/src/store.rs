//! The grid of cells and per-player turn state.
//!
//! `CellStore` is pure data plus an invariant checker. All mutation goes
//! through the board's exclusive section; the store itself does no
//! locking.

use crate::cell::Cell;
use crate::error::{BoardError, BoardResult};
use crate::turn::TurnState;
use crate::types::{CardValue, PlayerId, Position};
use std::collections::{BTreeMap, HashMap};

/// Rectangular layout of optional initial card values, row-major.
///
/// `None` positions start (and stay) empty. Supplied by an external
/// parser such as `scramble_format`.
pub type Layout = Vec<Vec<Option<CardValue>>>;

/// The board's cells and ownership map.
///
/// # Invariants
///
/// - Grid dimensions are fixed at construction.
/// - A face-up cell with a controller appears in that controller's turn
///   state, and a `HoldingOne` turn points at a face-up cell controlled
///   by that player.
/// - At most one controller per cell (structural: one `Option` field).
///
/// [`CellStore::verify`] re-validates the store-wide invariant; it runs
/// at operation boundaries because a single protocol transition updates
/// a cell and a turn tag as two writes.
#[derive(Debug)]
pub struct CellStore {
    rows: usize,
    cols: usize,
    cells: Vec<Cell>,
    turns: HashMap<PlayerId, TurnState>,
}

impl CellStore {
    /// Builds a store from a rectangular layout.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::InvalidLayout`] if the layout has no rows,
    /// no columns, or rows of inconsistent length.
    pub fn from_layout(layout: Layout) -> BoardResult<Self> {
        let rows = layout.len();
        if rows == 0 {
            return Err(BoardError::invalid_layout("board has no rows"));
        }
        let cols = layout[0].len();
        if cols == 0 {
            return Err(BoardError::invalid_layout("board has no columns"));
        }

        let mut cells = Vec::with_capacity(rows * cols);
        for (r, row) in layout.into_iter().enumerate() {
            if row.len() != cols {
                return Err(BoardError::invalid_layout(format!(
                    "row {r} has {} columns, expected {cols}",
                    row.len()
                )));
            }
            for value in row {
                cells.push(match value {
                    Some(value) => Cell::FaceDown(value),
                    None => Cell::Empty,
                });
            }
        }

        Ok(Self {
            rows,
            cols,
            cells,
            turns: HashMap::new(),
        })
    }

    /// Number of rows.
    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    #[must_use]
    pub fn cols(&self) -> usize {
        self.cols
    }

    fn index(&self, pos: Position) -> BoardResult<usize> {
        if pos.row < self.rows && pos.col < self.cols {
            Ok(pos.row * self.cols + pos.col)
        } else {
            Err(BoardError::InvalidPosition {
                pos,
                rows: self.rows,
                cols: self.cols,
            })
        }
    }

    /// Returns the cell at `pos`.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::InvalidPosition`] for out-of-bounds
    /// coordinates.
    pub fn get(&self, pos: Position) -> BoardResult<&Cell> {
        let idx = self.index(pos)?;
        Ok(&self.cells[idx])
    }

    /// Replaces the cell at `pos`.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::InvalidPosition`] for out-of-bounds
    /// coordinates.
    pub fn set(&mut self, pos: Position, cell: Cell) -> BoardResult<()> {
        let idx = self.index(pos)?;
        self.cells[idx] = cell;
        Ok(())
    }

    /// Returns the turn state for `player` (default `Idle`).
    #[must_use]
    pub fn turn(&self, player: &PlayerId) -> TurnState {
        self.turns.get(player).copied().unwrap_or_default()
    }

    /// Records the turn state for `player`, dropping `Idle` entries.
    pub fn set_turn(&mut self, player: &PlayerId, state: TurnState) {
        if state.is_empty() {
            self.turns.remove(player);
        } else {
            self.turns.insert(player.clone(), state);
        }
    }

    /// Iterates over all positions and their cells in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (Position, &Cell)> {
        let cols = self.cols;
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, cell)| (Position::new(i / cols, i % cols), cell))
    }

    /// Positions of every cell currently showing `value`, face up or down.
    #[must_use]
    pub fn positions_with_value(&self, value: &CardValue) -> Vec<Position> {
        self.iter()
            .filter(|(_, cell)| cell.value() == Some(value))
            .map(|(pos, _)| pos)
            .collect()
    }

    /// Groups every card-bearing position by its current value.
    #[must_use]
    pub fn value_positions(&self) -> BTreeMap<CardValue, Vec<Position>> {
        let mut groups: BTreeMap<CardValue, Vec<Position>> = BTreeMap::new();
        for (pos, cell) in self.iter() {
            if let Some(value) = cell.value() {
                groups.entry(value.clone()).or_default().push(pos);
            }
        }
        groups
    }

    /// Re-validates the store-wide representation invariant.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::InvariantViolation`] on any inconsistency.
    /// This is fatal: it indicates a bug in the engine, not bad input.
    pub fn verify(&self) -> BoardResult<()> {
        if self.cells.len() != self.rows * self.cols {
            return Err(BoardError::invariant_violation(format!(
                "cell count {} does not match {}x{} grid",
                self.cells.len(),
                self.rows,
                self.cols
            )));
        }

        // Every controlled cell must be listed in its controller's turn.
        for (pos, cell) in self.iter() {
            if let Some(player) = cell.controller() {
                if !self.turn(player).holds(pos) {
                    return Err(BoardError::invariant_violation(format!(
                        "cell {pos} is held by {player} but absent from their turn state"
                    )));
                }
            }
        }

        // Every recorded turn must be internally consistent.
        for (player, state) in &self.turns {
            match *state {
                TurnState::Idle => {
                    return Err(BoardError::invariant_violation(format!(
                        "idle turn state stored for {player}"
                    )));
                }
                TurnState::HoldingOne(pos) => {
                    let cell = self.get(pos)?;
                    if cell.controller() != Some(player) {
                        return Err(BoardError::invariant_violation(format!(
                            "{player} holds one card at {pos} but does not control it"
                        )));
                    }
                }
                TurnState::Resolved { first, second } => {
                    if first == second {
                        return Err(BoardError::invariant_violation(format!(
                            "{player} resolved a pair on a single position {first}"
                        )));
                    }
                    // The cells themselves may since have been taken or
                    // removed by other players (mismatched pairs lose
                    // control immediately); bounds are all that must hold.
                    self.index(first)?;
                    self.index(second)?;
                }
            }
        }

        Ok(())
    }
}
