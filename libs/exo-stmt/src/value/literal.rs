// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use bytes::Bytes;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};

use crate::sql::{ExpressionBuilder, SQLBuilder};

use super::{DataType, Typed, ValueType};

/// A literal value. Literals are rendered inline, using the escaping rules of the dialect.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Boolean(bool),
    Integral(i64),
    UnsignedIntegral(u64),
    FloatingPoint(f64),
    Text(String),
    Blob(Bytes),
    Date(NaiveDate),
    Timestamp(NaiveDateTime),
    TimeOfDay(NaiveTime),
}

/// Marker for the `NULL` literal, so that `Null` can be used wherever a value is expected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Null;

impl SqlValue {
    pub fn data_type(&self) -> DataType {
        match self {
            SqlValue::Null => DataType::Null,
            SqlValue::Boolean(_) => DataType::Boolean,
            SqlValue::Integral(_) => DataType::Integral,
            SqlValue::UnsignedIntegral(_) => DataType::UnsignedIntegral,
            SqlValue::FloatingPoint(_) => DataType::FloatingPoint,
            SqlValue::Text(_) => DataType::Text,
            SqlValue::Blob(_) => DataType::Blob,
            SqlValue::Date(_) => DataType::Date,
            SqlValue::Timestamp(_) => DataType::Timestamp,
            SqlValue::TimeOfDay(_) => DataType::TimeOfDay,
        }
    }
}

impl Typed for SqlValue {
    fn value_type(&self) -> ValueType {
        ValueType::new(self.data_type())
    }
}

impl ExpressionBuilder for SqlValue {
    fn build(&self, builder: &mut SQLBuilder) {
        builder.push_value(self);
    }
}

macro_rules! sql_value_from {
    ($($source:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$source> for SqlValue {
                fn from(value: $source) -> Self {
                    SqlValue::$variant(value.into())
                }
            }
        )*
    };
}

sql_value_from!(
    bool => Boolean,
    i16 => Integral,
    i32 => Integral,
    i64 => Integral,
    u16 => UnsignedIntegral,
    u32 => UnsignedIntegral,
    u64 => UnsignedIntegral,
    f32 => FloatingPoint,
    f64 => FloatingPoint,
    String => Text,
    &str => Text,
    Bytes => Blob,
    Vec<u8> => Blob,
    NaiveDate => Date,
    NaiveDateTime => Timestamp,
    NaiveTime => TimeOfDay,
);

impl From<DateTime<Utc>> for SqlValue {
    fn from(value: DateTime<Utc>) -> Self {
        SqlValue::Timestamp(value.naive_utc())
    }
}

impl From<Null> for SqlValue {
    fn from(_: Null) -> Self {
        SqlValue::Null
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(SqlValue::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_types() {
        assert_eq!(SqlValue::from(17).value_type(), ValueType::new(DataType::Integral));
        assert_eq!(
            SqlValue::from(17u32).value_type(),
            ValueType::new(DataType::UnsignedIntegral)
        );
        assert_eq!(SqlValue::from("a").data_type(), DataType::Text);
        assert_eq!(SqlValue::from(None::<i32>), SqlValue::Null);
        assert!(SqlValue::from(Null).value_type().nullable);
        assert_eq!(SqlValue::from(vec![1u8, 2]).data_type(), DataType::Blob);
    }
}
