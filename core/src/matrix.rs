//! # The Incidence Matrix and its Exchange Format
//!
//! Row `i` of the matrix represents the `i`-th set of the family, column `j` represents universe
//! element `j + 1`. The plain-text exchange format is
//!
//! ```text
//! <n> <t>
//! 1 <b_0> <b_1> ... <b_{t-1}>
//! ...
//! n <b_0> <b_1> ... <b_{t-1}>
//! ```
//!
//! with single spaces between fields, newlines between rows and no trailing newline. The leading
//! row index of each row is documentary only. When reading, any whitespace separates tokens.

use std::{
    fmt, fs,
    ops::{Index, IndexMut},
    path::Path,
    str::FromStr,
};

use itertools::Itertools;

use crate::{Error, Result, Universe};

/// A binary `n x t` matrix stored as a fixed-size row-major grid
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IncidenceMatrix {
    n_sets: usize,
    universe_size: usize,
    cells: Vec<bool>,
}

impl IncidenceMatrix {
    /// Creates a matrix of zeroes
    pub fn new(n_sets: usize, universe_size: usize) -> Self {
        IncidenceMatrix {
            n_sets,
            universe_size,
            cells: vec![false; n_sets * universe_size],
        }
    }

    /// The number of rows `n`
    pub fn n_sets(&self) -> usize {
        self.n_sets
    }

    /// The number of columns `t`
    pub fn universe_size(&self) -> usize {
        self.universe_size
    }

    pub fn universe(&self) -> Universe {
        Universe::with_size(self.universe_size)
    }

    pub fn get(&self, row: usize, col: usize) -> Option<bool> {
        if row < self.n_sets && col < self.universe_size {
            Some(self.cells[row * self.universe_size + col])
        } else {
            None
        }
    }

    /// Gets a row of the matrix
    ///
    /// # Panics
    ///
    /// If `row` is out of bounds
    pub fn row(&self, row: usize) -> &[bool] {
        assert!(row < self.n_sets, "row {row} out of bounds");
        &self.cells[row * self.universe_size..(row + 1) * self.universe_size]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[bool]> + '_ {
        (0..self.n_sets).map(move |row| self.row(row))
    }

    /// Iterates over the columns that have a one in the given row
    pub fn covering(&self, row: usize) -> impl Iterator<Item = usize> + '_ {
        self.row(row).iter().positions(|&bit| bit)
    }

    pub fn n_nonzeros(&self) -> usize {
        self.cells.iter().filter(|&&bit| bit).count()
    }

    /// Iterates over the (0-based) rows without any one
    pub fn empty_rows(&self) -> impl Iterator<Item = usize> + '_ {
        self.rows().positions(|row| !row.contains(&true))
    }

    /// Reads a matrix file in the exchange format
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        fs::read_to_string(path)?.parse()
    }

    /// Writes the matrix to a file in the exchange format, replacing any existing file
    pub fn write_to_path<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, self.to_string())?;
        Ok(())
    }
}

impl Index<(usize, usize)> for IncidenceMatrix {
    type Output = bool;

    fn index(&self, (row, col): (usize, usize)) -> &Self::Output {
        assert!(col < self.universe_size, "column {col} out of bounds");
        &self.cells[row * self.universe_size + col]
    }
}

impl IndexMut<(usize, usize)> for IncidenceMatrix {
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut Self::Output {
        assert!(col < self.universe_size, "column {col} out of bounds");
        &mut self.cells[row * self.universe_size + col]
    }
}

impl fmt::Display for IncidenceMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.n_sets, self.universe_size)?;
        for (idx, row) in self.rows().enumerate() {
            write!(f, "\n{}", idx + 1)?;
            for &bit in row {
                write!(f, " {}", u8::from(bit))?;
            }
        }
        Ok(())
    }
}

impl FromStr for IncidenceMatrix {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut tokens = s.split_whitespace();
        let n_sets = parse_dimension(tokens.next(), "number of sets")?;
        let universe_size = parse_dimension(tokens.next(), "universe size")?;
        let data: Vec<&str> = tokens.collect();
        // each row holds its index followed by one token per element
        let width = universe_size
            .checked_add(1)
            .ok_or_else(|| Error::MalformedFile(String::from("universe size too large")))?;
        let expected = n_sets
            .checked_mul(width)
            .ok_or_else(|| Error::MalformedFile(String::from("matrix dimensions too large")))?;
        if data.len() != expected {
            return Err(Error::MalformedFile(format!(
                "expected {expected} tokens for {n_sets} sets over a universe of size \
                 {universe_size}, found {}",
                data.len()
            )));
        }
        let mut matrix = IncidenceMatrix::new(n_sets, universe_size);
        for (row, tokens) in data.chunks(width).enumerate() {
            if tokens[0].parse::<usize>().is_err() {
                return Err(Error::MalformedFile(format!(
                    "invalid row index `{}` for row {}",
                    tokens[0],
                    row + 1
                )));
            }
            for (col, &token) in tokens[1..].iter().enumerate() {
                matrix[(row, col)] = match token {
                    "0" => false,
                    "1" => true,
                    _ => {
                        return Err(Error::MalformedFile(format!(
                            "invalid entry `{token}` in row {}, column {}",
                            row + 1,
                            col + 1
                        )))
                    }
                };
            }
        }
        Ok(matrix)
    }
}

fn parse_dimension(token: Option<&str>, what: &str) -> Result<usize> {
    let Some(token) = token else {
        return Err(Error::MalformedFile(format!("missing {what} in header")));
    };
    match token.parse::<usize>() {
        Ok(val) if val > 0 => Ok(val),
        _ => Err(Error::MalformedFile(format!(
            "invalid {what} `{token}` in header, expected a positive integer"
        ))),
    }
}

/// Builds the incidence matrix of a set family over the given universe
///
/// Fails if a set contains an element outside of the universe.
pub fn encode<S: AsRef<[usize]>>(sets: &[S], universe: &Universe) -> Result<IncidenceMatrix> {
    let mut matrix = IncidenceMatrix::new(sets.len(), universe.size());
    for (row, set) in sets.iter().enumerate() {
        for &element in set.as_ref() {
            let Some(col) = universe.column(element) else {
                return Err(Error::InvalidInput(format!(
                    "element {element} of set {} is not in the universe 1..={}",
                    row + 1,
                    universe.size()
                )));
            };
            matrix[(row, col)] = true;
        }
    }
    Ok(matrix)
}

/// Produces the exchange format of a matrix
pub fn serialize(matrix: &IncidenceMatrix) -> String {
    matrix.to_string()
}

/// Parses the exchange format
pub fn deserialize(text: &str) -> Result<IncidenceMatrix> {
    text.parse()
}
