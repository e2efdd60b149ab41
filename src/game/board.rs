use std::fmt;

use serde::Serialize;

use crate::error::MoveRejected;

pub const CELL_COUNT: usize = 9;

/// Every row, column and diagonal, as cell indices.
pub const WIN_LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

/// The mark a peer places. The host always plays `A` (shown as X).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Symbol {
    #[serde(rename = "X")]
    A,
    #[serde(rename = "O")]
    B,
}

impl Symbol {
    pub fn as_char(self) -> char {
        match self {
            Symbol::A => 'X',
            Symbol::B => 'O',
        }
    }
}

/// Nine cells in row-major order. A placed mark stays until the board is
/// replaced by a reset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Board {
    cells: [Option<Symbol>; CELL_COUNT],
}

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cells(&self) -> &[Option<Symbol>; CELL_COUNT] {
        &self.cells
    }

    pub fn get(&self, cell: usize) -> Option<Symbol> {
        self.cells.get(cell).copied().flatten()
    }

    pub fn place(&mut self, cell: usize, symbol: Symbol) -> Result<(), MoveRejected> {
        let slot = self.cells.get_mut(cell).ok_or(MoveRejected::OutOfRange(cell))?;
        if slot.is_some() {
            return Err(MoveRejected::Occupied(cell));
        }
        *slot = Some(symbol);
        Ok(())
    }

    pub fn has_line(&self, symbol: Symbol) -> bool {
        WIN_LINES
            .iter()
            .any(|line| line.iter().all(|&i| self.cells[i] == Some(symbol)))
    }

    pub fn is_full(&self) -> bool {
        self.cells.iter().all(Option::is_some)
    }

    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(Option::is_none)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (row, cells) in self.cells.chunks(3).enumerate() {
            if row > 0 {
                writeln!(f, "---+---+---")?;
            }
            let marks: Vec<String> = cells
                .iter()
                .map(|c| format!(" {} ", c.map_or(' ', Symbol::as_char)))
                .collect();
            writeln!(f, "{}", marks.join("|"))?;
        }
        Ok(())
    }
}
