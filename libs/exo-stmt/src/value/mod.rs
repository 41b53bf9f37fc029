// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! The value model: data types, literals, parameters and the expression tree built from them.

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

mod aggregate;
mod expr;
mod function;
mod literal;
mod operators;
mod parameter;

pub use aggregate::{Aggregate, AggregateFunction, WindowCompatible, avg, count, count_all, max, min, sum};
pub use expr::{
    Aliased, BinaryOperator, Expr, LogicalOperator, SortDirection, SortOrder, UnaryOperator,
};
pub use function::{CaseThen, CaseWhen, Function, case_when, coalesce, exists, lower, trim, upper, verbatim};
pub use literal::{Null, SqlValue};
pub use operators::{Aliasable, Arithmetic, Comparable, Logical, Sortable, not};
pub use parameter::{Parameter, parameter};

/// The data type of a value, without nullability.
///
/// `Numeric` is the generic type produced by arithmetic; vendors disagree on the concrete result
/// type, so it only promises "some number".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    Boolean,
    Integral,
    UnsignedIntegral,
    FloatingPoint,
    Numeric,
    Text,
    Blob,
    Date,
    Timestamp,
    TimeOfDay,
    /// The type of the `NULL` literal, compatible with every other type
    Null,
}

impl DataType {
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            DataType::Boolean
                | DataType::Integral
                | DataType::UnsignedIntegral
                | DataType::FloatingPoint
                | DataType::Numeric
                | DataType::Null
        )
    }

    pub fn is_integral(&self) -> bool {
        matches!(self, DataType::Integral | DataType::UnsignedIntegral)
    }

    pub fn is_text(&self) -> bool {
        matches!(self, DataType::Text | DataType::Null)
    }

    pub fn is_boolean(&self) -> bool {
        matches!(self, DataType::Boolean | DataType::Null)
    }

    /// Whether values of the two types may be compared with each other
    pub fn is_comparable_with(&self, other: &DataType) -> bool {
        use DataType::*;

        match (self, other) {
            (Null, _) | (_, Null) => true,
            (a, b) if a.is_numeric() && b.is_numeric() => true,
            (Text, Text) | (Blob, Blob) | (TimeOfDay, TimeOfDay) => true,
            (Date | Timestamp, Date | Timestamp) => true,
            _ => false,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            DataType::Boolean => "boolean",
            DataType::Integral => "integral",
            DataType::UnsignedIntegral => "unsigned integral",
            DataType::FloatingPoint => "floating point",
            DataType::Numeric => "numeric",
            DataType::Text => "text",
            DataType::Blob => "blob",
            DataType::Date => "date",
            DataType::Timestamp => "timestamp",
            DataType::TimeOfDay => "time of day",
            DataType::Null => "null",
        }
    }
}

/// A data type together with its nullability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ValueType {
    pub data_type: DataType,
    pub nullable: bool,
}

impl ValueType {
    pub fn new(data_type: DataType) -> Self {
        Self {
            data_type,
            nullable: data_type == DataType::Null,
        }
    }

    pub fn nullable(data_type: DataType) -> Self {
        Self {
            data_type,
            nullable: true,
        }
    }

    pub fn with_nullable(self, nullable: bool) -> Self {
        Self {
            nullable: self.nullable || nullable,
            ..self
        }
    }

    pub fn is_comparable_with(&self, other: &ValueType) -> bool {
        self.data_type.is_comparable_with(&other.data_type)
    }
}

impl Display for ValueType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.nullable && self.data_type != DataType::Null {
            write!(f, "optional {}", self.data_type.name())
        } else {
            write!(f, "{}", self.data_type.name())
        }
    }
}

/// Anything that carries a value type: expressions, columns, parameters and their dynamic
/// wrappers. Clauses and statements deliberately do not implement this.
pub trait Typed {
    fn value_type(&self) -> ValueType;
}

/// The value type of a typed node
pub fn value_type_of<T: Typed + ?Sized>(node: &T) -> ValueType {
    node.value_type()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comparability() {
        assert!(DataType::Integral.is_comparable_with(&DataType::FloatingPoint));
        assert!(DataType::Boolean.is_comparable_with(&DataType::Integral));
        assert!(DataType::Date.is_comparable_with(&DataType::Timestamp));
        assert!(DataType::Null.is_comparable_with(&DataType::Blob));
        assert!(!DataType::Text.is_comparable_with(&DataType::Integral));
        assert!(!DataType::TimeOfDay.is_comparable_with(&DataType::Timestamp));
    }

    #[test]
    fn display() {
        assert_eq!(ValueType::new(DataType::Integral).to_string(), "integral");
        assert_eq!(
            ValueType::nullable(DataType::Text).to_string(),
            "optional text"
        );
        assert_eq!(ValueType::new(DataType::Null).to_string(), "null");
    }
}
