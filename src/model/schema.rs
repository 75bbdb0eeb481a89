//! Column types and the inference lattice

use serde::{Deserialize, Serialize};

use super::value::{parse_bool, parse_date, parse_datetime, parse_float, parse_int};

/// Inferred type of a column.
///
/// The variants form a join-semilattice: `Null` is the bottom element,
/// `String` is the top, `Int` widens to `Float` and `Date` widens to
/// `Datetime`. Every other distinct pair joins to `String`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    #[default]
    Null,
    Int,
    Float,
    Boolean,
    Date,
    Datetime,
    String,
}

impl ColumnType {
    /// All variants, bottom to top
    pub const ALL: [ColumnType; 7] = [
        ColumnType::Null,
        ColumnType::Int,
        ColumnType::Float,
        ColumnType::Boolean,
        ColumnType::Date,
        ColumnType::Datetime,
        ColumnType::String,
    ];

    /// Classify a single cell value.
    ///
    /// Formats are tried from the most to the least restrictive and the first
    /// that parses wins.
    pub fn classify(value: &str) -> ColumnType {
        if value.is_empty() {
            ColumnType::Null
        } else if parse_int(value).is_some() {
            ColumnType::Int
        } else if parse_float(value).is_some() {
            ColumnType::Float
        } else if parse_bool(value).is_some() {
            ColumnType::Boolean
        } else if parse_date(value).is_some() {
            ColumnType::Date
        } else if parse_datetime(value).is_some() {
            ColumnType::Datetime
        } else {
            ColumnType::String
        }
    }

    /// Least upper bound of two types
    pub fn join(self, other: ColumnType) -> ColumnType {
        if self == other {
            return self;
        }

        match (self, other) {
            (ColumnType::Null, t) | (t, ColumnType::Null) => t,
            (ColumnType::Int, ColumnType::Float) | (ColumnType::Float, ColumnType::Int) => {
                ColumnType::Float
            }
            (ColumnType::Date, ColumnType::Datetime) | (ColumnType::Datetime, ColumnType::Date) => {
                ColumnType::Datetime
            }
            _ => ColumnType::String,
        }
    }
}

impl std::fmt::Display for ColumnType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ColumnType::Null => write!(f, "null"),
            ColumnType::Int => write!(f, "int"),
            ColumnType::Float => write!(f, "float"),
            ColumnType::Boolean => write!(f, "boolean"),
            ColumnType::Date => write!(f, "date"),
            ColumnType::Datetime => write!(f, "datetime"),
            ColumnType::String => write!(f, "string"),
        }
    }
}

/// Fold the lattice join over a column's values.
///
/// Returns as soon as the running type reaches `String`, since nothing can
/// widen it further.
pub fn infer_column<'a, I>(values: I) -> ColumnType
where
    I: IntoIterator<Item = &'a str>,
{
    let mut inferred = ColumnType::Null;
    for value in values {
        inferred = inferred.join(ColumnType::classify(value));
        if inferred == ColumnType::String {
            break;
        }
    }
    inferred
}

/// Column metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Column {
    /// Column name (from header)
    pub name: String,
    /// Column index (0-based position)
    pub index: usize,
    /// Inferred type from data
    #[serde(rename = "type")]
    pub column_type: ColumnType,
}

impl Column {
    pub fn new(name: impl Into<String>, index: usize, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            index,
            column_type,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_classify() {
        assert_eq!(ColumnType::classify(""), ColumnType::Null);
        assert_eq!(ColumnType::classify("42"), ColumnType::Int);
        assert_eq!(ColumnType::classify("-7"), ColumnType::Int);
        assert_eq!(ColumnType::classify("0x1F"), ColumnType::Int);
        assert_eq!(ColumnType::classify("3.14"), ColumnType::Float);
        assert_eq!(ColumnType::classify("1e3"), ColumnType::Float);
        assert_eq!(ColumnType::classify("TRUE"), ColumnType::Boolean);
        assert_eq!(ColumnType::classify("f"), ColumnType::Boolean);
        assert_eq!(ColumnType::classify("2023-01-02"), ColumnType::Date);
        assert_eq!(ColumnType::classify("1/2/2023"), ColumnType::Date);
        assert_eq!(
            ColumnType::classify("2023-01-02 12:00:00"),
            ColumnType::Datetime
        );
        assert_eq!(
            ColumnType::classify("2023-01-01T12:00:00Z"),
            ColumnType::Datetime
        );
        assert_eq!(ColumnType::classify("hello"), ColumnType::String);
    }

    #[test]
    fn test_classify_multibyte_strings() {
        for value in ["Zürich", "aé", "Ελλάδα", "0é", "-ü", "日本", "é"] {
            assert_eq!(ColumnType::classify(value), ColumnType::String, "{}", value);
        }
        assert_eq!(
            infer_column(["", "Zürich", "aé"].iter().copied()),
            ColumnType::String
        );
    }

    #[test]
    fn test_join_rules() {
        use ColumnType::*;
        assert_eq!(Null.join(Int), Int);
        assert_eq!(Int.join(Float), Float);
        assert_eq!(Date.join(Datetime), Datetime);
        assert_eq!(Int.join(Boolean), String);
        assert_eq!(Float.join(Date), String);
        assert_eq!(String.join(Null), String);
        assert_eq!(Boolean.join(Boolean), Boolean);
    }

    #[test]
    fn test_join_is_commutative_for_all_pairs() {
        for a in ColumnType::ALL {
            for b in ColumnType::ALL {
                assert_eq!(a.join(b), b.join(a), "{} / {}", a, b);
            }
        }
    }

    #[test]
    fn test_infer_column() {
        let cases: &[(&[&str], ColumnType)] = &[
            (&["", ""], ColumnType::Null),
            (&[], ColumnType::Null),
            (&["", "1"], ColumnType::Int),
            (&["", "1.0"], ColumnType::Float),
            (&["", "true"], ColumnType::Boolean),
            (&["2023-01-01", "2023-01-02"], ColumnType::Date),
            (&["2023-01-01", "2023-01-02 12:00:00"], ColumnType::Datetime),
            (&["1", "2", "3.0"], ColumnType::Float),
            (&["1", "2", "hello"], ColumnType::String),
            (&["1", "2", "true"], ColumnType::String),
        ];
        for (values, expected) in cases {
            assert_eq!(infer_column(values.iter().copied()), *expected, "{:?}", values);
        }
    }

    #[test]
    fn test_infer_column_stops_at_string() {
        let mut seen = 0;
        let values = ["1", "x", "2", "3"];
        let inferred = infer_column(values.iter().inspect(|_| seen += 1).copied());
        assert_eq!(inferred, ColumnType::String);
        assert_eq!(seen, 2);
    }

    fn any_value() -> impl Strategy<Value = &'static str> {
        prop::sample::select(vec![
            "", "1", "-3", "2.5", "true", "F", "2023-01-01", "2023-01-01 10:00:00", "abc",
            "Zürich", "aé", "Ελλάδα",
        ])
    }

    proptest! {
        #[test]
        fn prop_inference_is_order_independent(
            values in prop::collection::vec(any_value(), 0..12)
        ) {
            let forward = infer_column(values.iter().copied());
            let backward = infer_column(values.iter().rev().copied());
            prop_assert_eq!(forward, backward);
        }
    }
}
