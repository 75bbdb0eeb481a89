//! Random row sampling
//!
//! The generator is always supplied by the caller, so a seeded generator
//! reproduces the same sample and separate calls never share state.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::{Result, TableError};
use crate::model::{Row, Table};

/// Pick `count` row positions out of `row_count`.
///
/// With replacement, positions are drawn independently and may repeat.
/// Without replacement, the result is the first `count` positions of a
/// uniform permutation, and asking for more rows than exist is an error.
pub fn sample_row_indices<R: Rng + ?Sized>(
    row_count: usize,
    count: usize,
    replace: bool,
    rng: &mut R,
) -> Result<Vec<usize>> {
    if replace {
        if row_count == 0 && count > 0 {
            return Err(TableError::SampleTooLarge {
                requested: count,
                available: row_count,
            });
        }
        return Ok((0..count).map(|_| rng.gen_range(0..row_count)).collect());
    }

    if count > row_count {
        return Err(TableError::SampleTooLarge {
            requested: count,
            available: row_count,
        });
    }
    let mut permutation: Vec<usize> = (0..row_count).collect();
    permutation.shuffle(rng);
    permutation.truncate(count);
    Ok(permutation)
}

impl Table {
    /// Sample rows; see [`sample_row_indices`]
    pub fn sample<R: Rng + ?Sized>(
        &self,
        count: usize,
        replace: bool,
        rng: &mut R,
    ) -> Result<Vec<&Row>> {
        let indices = sample_row_indices(self.row_count(), count, replace, rng)?;
        Ok(indices.into_iter().map(|i| &self.rows[i]).collect())
    }
}
