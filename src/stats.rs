//! Per-column statistics
//!
//! Each column is summarized independently from the shared, read-only table;
//! columns are processed in parallel and reassembled in header order.

use std::hash::Hash;

use indexmap::IndexMap;
use rayon::prelude::*;
use serde::Serialize;
use tracing::debug;

use crate::error::{Result, TableError};
use crate::model::{CellValue, Column, ColumnType, Table};

/// Number of entries kept in each frequency table
pub const MOST_FREQUENT_LIMIT: usize = 5;

/// A value and how many times it occurs
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValueCount<T> {
    pub value: T,
    pub count: usize,
}

/// Aggregates for an integer column
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntStats {
    pub min: i64,
    pub max: i64,
    pub sum: i128,
    pub mean: f64,
    pub median: f64,
    /// Sample standard deviation (n - 1 denominator)
    pub stdev: f64,
    pub unique_values: usize,
    pub most_frequent: Vec<ValueCount<i64>>,
}

/// Aggregates for a float column
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FloatStats {
    pub min: f64,
    pub max: f64,
    pub sum: f64,
    pub mean: f64,
    pub median: f64,
    /// Sample standard deviation (n - 1 denominator)
    pub stdev: f64,
    pub unique_values: usize,
    pub most_frequent: Vec<ValueCount<f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BooleanStats {
    pub true_count: usize,
    pub false_count: usize,
}

/// Aggregates for a date or datetime column, formatted canonically
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemporalStats {
    pub min: String,
    pub max: String,
    pub unique_values: usize,
    pub most_frequent: Vec<ValueCount<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StringStats {
    /// Longest cell, in bytes
    pub max_length: usize,
    pub unique_values: usize,
    pub most_frequent: Vec<ValueCount<String>>,
}

/// Type-specific part of a column summary
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Summary {
    Null,
    Int(IntStats),
    Float(FloatStats),
    Boolean(BooleanStats),
    Temporal(TemporalStats),
    String(StringStats),
}

/// Statistics for one column
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnStats {
    /// 0-based column position
    pub index: usize,
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    pub null_count: usize,
    pub summary: Summary,
}

/// Compute statistics for every column, in parallel.
///
/// A failure in any column fails the whole computation.
pub fn compute_stats(table: &Table) -> Result<Vec<ColumnStats>> {
    debug!(columns = table.column_count(), "computing column statistics");
    (0..table.column_count())
        .into_par_iter()
        .map(|column| column_stats(table, column))
        .collect()
}

/// Infer every column's type, in parallel
pub fn describe(table: &Table) -> Vec<Column> {
    table
        .header()
        .par_iter()
        .enumerate()
        .map(|(i, name)| Column::new(name.clone(), i, table.infer_type(i)))
        .collect()
}

/// Compute statistics for a single column
pub fn column_stats(table: &Table, column: usize) -> Result<ColumnStats> {
    let column_type = table.infer_type(column);
    let null_count = table.column_values(column).filter(|v| v.is_empty()).count();
    let values = typed_values(table, column, column_type)?;

    // exhaustive over the lattice so a new type must pick a summary
    let summary = match column_type {
        ColumnType::Null => Summary::Null,
        ColumnType::Int => Summary::Int(int_stats(&values)),
        ColumnType::Float => Summary::Float(float_stats(&values)),
        ColumnType::Boolean => Summary::Boolean(boolean_stats(&values)),
        ColumnType::Date | ColumnType::Datetime => Summary::Temporal(temporal_stats(&values)),
        ColumnType::String => Summary::String(string_stats(&values)),
    };

    Ok(ColumnStats {
        index: column,
        name: table.header()[column].clone(),
        column_type,
        null_count,
        summary,
    })
}

/// Non-null cells of a column read under the column's type
fn typed_values(table: &Table, column: usize, column_type: ColumnType) -> Result<Vec<CellValue<'_>>> {
    let mut values = Vec::with_capacity(table.row_count());
    for (i, raw) in table.column_values(column).enumerate() {
        if raw.is_empty() {
            continue;
        }
        let value = CellValue::parse(raw, column_type).ok_or_else(|| TableError::CellParse {
            column,
            row: i + 1,
            value: raw.to_string(),
            expected: column_type,
        })?;
        values.push(value);
    }
    Ok(values)
}

/// Count distinct values and keep the most frequent ones, by descending
/// count. Ties keep first-appearance order.
fn most_frequent<K, I>(values: I) -> (usize, Vec<ValueCount<K>>)
where
    K: Hash + Eq,
    I: IntoIterator<Item = K>,
{
    let mut counts: IndexMap<K, usize> = IndexMap::new();
    for value in values {
        *counts.entry(value).or_insert(0) += 1;
    }
    let unique = counts.len();
    let mut ranked: Vec<ValueCount<K>> = counts
        .into_iter()
        .map(|(value, count)| ValueCount { value, count })
        .collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count));
    ranked.truncate(MOST_FREQUENT_LIMIT);
    (unique, ranked)
}

/// Median of an ascending slice; mean of the two middle values for even sizes
fn median(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    if n == 0 {
        return f64::NAN;
    }
    if n % 2 == 0 {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    } else {
        sorted[n / 2]
    }
}

fn sample_stdev(values: &[f64], mean: f64) -> f64 {
    let squares: f64 = values.iter().map(|v| (v - mean) * (v - mean)).sum();
    (squares / (values.len() as f64 - 1.0)).sqrt()
}

fn int_stats(values: &[CellValue<'_>]) -> IntStats {
    let ints: Vec<i64> = values
        .iter()
        .filter_map(|v| match v {
            CellValue::Int(i) => Some(*i),
            _ => None,
        })
        .collect();

    let sum: i128 = ints.iter().map(|&i| i as i128).sum();
    let mean = sum as f64 / ints.len() as f64;
    let mut sorted: Vec<f64> = ints.iter().map(|&i| i as f64).collect();
    sorted.sort_by(f64::total_cmp);
    let (unique_values, most_frequent) = most_frequent(ints.iter().copied());

    IntStats {
        min: ints.iter().copied().min().unwrap_or_default(),
        max: ints.iter().copied().max().unwrap_or_default(),
        sum,
        mean,
        median: median(&sorted),
        stdev: sample_stdev(&sorted, mean),
        unique_values,
        most_frequent,
    }
}

fn float_stats(values: &[CellValue<'_>]) -> FloatStats {
    let floats: Vec<f64> = values
        .iter()
        .filter_map(|v| match v {
            CellValue::Float(f) => Some(*f),
            _ => None,
        })
        .collect();

    let sum: f64 = floats.iter().sum();
    let mean = sum / floats.len() as f64;
    let mut sorted = floats.clone();
    sorted.sort_by(f64::total_cmp);
    let (unique_values, counts) = most_frequent(floats.iter().map(|f| f.to_bits()));

    FloatStats {
        min: floats.iter().copied().fold(f64::INFINITY, f64::min),
        max: floats.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        sum,
        mean,
        median: median(&sorted),
        stdev: sample_stdev(&floats, mean),
        unique_values,
        most_frequent: counts
            .into_iter()
            .map(|vc| ValueCount {
                value: f64::from_bits(vc.value),
                count: vc.count,
            })
            .collect(),
    }
}

fn boolean_stats(values: &[CellValue<'_>]) -> BooleanStats {
    let true_count = values
        .iter()
        .filter(|v| matches!(v, CellValue::Bool(true)))
        .count();
    let false_count = values
        .iter()
        .filter(|v| matches!(v, CellValue::Bool(false)))
        .count();
    BooleanStats {
        true_count,
        false_count,
    }
}

fn temporal_stats(values: &[CellValue<'_>]) -> TemporalStats {
    let min = values.iter().min().map(CellValue::display).unwrap_or_default();
    let max = values.iter().max().map(CellValue::display).unwrap_or_default();
    let (unique_values, most_frequent) = most_frequent(values.iter().map(CellValue::display));
    TemporalStats {
        min,
        max,
        unique_values,
        most_frequent,
    }
}

fn string_stats(values: &[CellValue<'_>]) -> StringStats {
    let strings: Vec<&str> = values
        .iter()
        .filter_map(|v| match v {
            CellValue::String(s) => Some(*s),
            _ => None,
        })
        .collect();
    let max_length = strings.iter().map(|s| s.len()).max().unwrap_or(0);
    let (unique_values, counts) = most_frequent(strings.iter().copied());
    StringStats {
        max_length,
        unique_values,
        most_frequent: counts
            .into_iter()
            .map(|vc| ValueCount {
                value: vc.value.to_string(),
                count: vc.count,
            })
            .collect(),
    }
}

impl Table {
    /// Statistics for every column; see [`compute_stats`]
    pub fn stats(&self) -> Result<Vec<ColumnStats>> {
        compute_stats(self)
    }
}
