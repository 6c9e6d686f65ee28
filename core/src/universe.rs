//! # The Universe of Selectable Elements
//!
//! The reduction requires the universe to be exactly the contiguous range `1..=t`. Element `k`
//! is represented by matrix column `k - 1`, whether or not it appears in any set.

use std::{cmp, ops::RangeInclusive};

use crate::{Error, Result};

/// A universe `1..=size` of positive integers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Universe {
    size: usize,
}

impl Universe {
    pub fn with_size(size: usize) -> Self {
        Universe { size }
    }

    /// The number of elements, which is also the largest element
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    pub fn contains(&self, element: usize) -> bool {
        (1..=self.size).contains(&element)
    }

    /// Gets the matrix column of an element, if the element is in the universe
    pub fn column(&self, element: usize) -> Option<usize> {
        if self.contains(element) {
            Some(element - 1)
        } else {
            None
        }
    }

    /// Iterates over the elements in ascending order
    pub fn iter(&self) -> RangeInclusive<usize> {
        1..=self.size
    }
}

impl TryFrom<RangeInclusive<usize>> for Universe {
    type Error = Error;

    fn try_from(range: RangeInclusive<usize>) -> Result<Self> {
        if *range.start() != 1 {
            return Err(Error::InvalidInput(format!(
                "universe must be a range starting at 1, got {}..={}",
                range.start(),
                range.end()
            )));
        }
        Ok(Universe::with_size(*range.end()))
    }
}

/// Derives the universe `1..=max_element` from a set family
///
/// Fails if the family is empty or an element is not positive. If all sets are empty, the
/// universe is empty as well.
pub fn build_universe<S: AsRef<[usize]>>(sets: &[S]) -> Result<Universe> {
    if sets.is_empty() {
        return Err(Error::InvalidInput(String::from("the set family is empty")));
    }
    let mut max_element = 0;
    for (idx, set) in sets.iter().enumerate() {
        for &element in set.as_ref() {
            if element == 0 {
                return Err(Error::InvalidInput(format!(
                    "set {} contains the non-positive element 0",
                    idx + 1
                )));
            }
            max_element = cmp::max(max_element, element);
        }
    }
    Ok(Universe::with_size(max_element))
}
