// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Operator capabilities, available on everything that converts into an [`Expr`].

use crate::check_error::CheckError;
use crate::dynamic::MaybeDynamic;
use crate::statement::SelectStatement;

use super::{
    Aliased, BinaryOperator, Expr, LogicalOperator, SortDirection, SortOrder, UnaryOperator,
};

pub trait Comparable: Into<Expr> + Sized {
    fn equal(self, rhs: impl Into<Expr>) -> Result<Expr, CheckError> {
        Expr::comparison(BinaryOperator::Equal, self.into(), rhs.into())
    }

    fn not_equal(self, rhs: impl Into<Expr>) -> Result<Expr, CheckError> {
        Expr::comparison(BinaryOperator::NotEqual, self.into(), rhs.into())
    }

    fn less(self, rhs: impl Into<Expr>) -> Result<Expr, CheckError> {
        Expr::comparison(BinaryOperator::Less, self.into(), rhs.into())
    }

    fn less_equal(self, rhs: impl Into<Expr>) -> Result<Expr, CheckError> {
        Expr::comparison(BinaryOperator::LessEqual, self.into(), rhs.into())
    }

    fn greater(self, rhs: impl Into<Expr>) -> Result<Expr, CheckError> {
        Expr::comparison(BinaryOperator::Greater, self.into(), rhs.into())
    }

    fn greater_equal(self, rhs: impl Into<Expr>) -> Result<Expr, CheckError> {
        Expr::comparison(BinaryOperator::GreaterEqual, self.into(), rhs.into())
    }

    fn is_distinct_from(self, rhs: impl Into<Expr>) -> Result<Expr, CheckError> {
        Expr::comparison(BinaryOperator::IsDistinctFrom, self.into(), rhs.into())
    }

    fn is_not_distinct_from(self, rhs: impl Into<Expr>) -> Result<Expr, CheckError> {
        Expr::comparison(BinaryOperator::IsNotDistinctFrom, self.into(), rhs.into())
    }

    fn like(self, pattern: impl Into<Expr>) -> Result<Expr, CheckError> {
        Expr::text_operation(BinaryOperator::Like, self.into(), pattern.into())
    }

    fn is_null(self) -> Expr {
        Expr::IsNull {
            operand: Box::new(self.into()),
            negated: false,
        }
    }

    fn is_not_null(self) -> Expr {
        Expr::IsNull {
            operand: Box::new(self.into()),
            negated: true,
        }
    }

    fn in_<I, V>(self, values: I) -> Result<Expr, CheckError>
    where
        I: IntoIterator<Item = V>,
        V: Into<Expr>,
    {
        Expr::in_list(
            self.into(),
            values.into_iter().map(Into::into).collect(),
            false,
        )
    }

    fn not_in<I, V>(self, values: I) -> Result<Expr, CheckError>
    where
        I: IntoIterator<Item = V>,
        V: Into<Expr>,
    {
        Expr::in_list(
            self.into(),
            values.into_iter().map(Into::into).collect(),
            true,
        )
    }

    /// `<self> IN (<select>)`; the select must have exactly one column
    fn in_select(self, select: SelectStatement) -> Result<Expr, CheckError> {
        Expr::in_select(self.into(), select, false)
    }

    fn not_in_select(self, select: SelectStatement) -> Result<Expr, CheckError> {
        Expr::in_select(self.into(), select, true)
    }

    fn between(self, low: impl Into<Expr>, high: impl Into<Expr>) -> Result<Expr, CheckError> {
        Expr::between(self.into(), low.into(), high.into())
    }
}

impl<T: Into<Expr>> Comparable for T {}

/// Arithmetic on numeric operands (booleans count as numbers) and text concatenation
pub trait Arithmetic: Into<Expr> + Sized {
    fn plus(self, rhs: impl Into<Expr>) -> Result<Expr, CheckError> {
        Expr::arithmetic(BinaryOperator::Plus, self.into(), rhs.into())
    }

    fn minus(self, rhs: impl Into<Expr>) -> Result<Expr, CheckError> {
        Expr::arithmetic(BinaryOperator::Minus, self.into(), rhs.into())
    }

    fn multiply(self, rhs: impl Into<Expr>) -> Result<Expr, CheckError> {
        Expr::arithmetic(BinaryOperator::Multiply, self.into(), rhs.into())
    }

    fn divide(self, rhs: impl Into<Expr>) -> Result<Expr, CheckError> {
        Expr::arithmetic(BinaryOperator::Divide, self.into(), rhs.into())
    }

    fn modulus(self, rhs: impl Into<Expr>) -> Result<Expr, CheckError> {
        Expr::arithmetic(BinaryOperator::Modulus, self.into(), rhs.into())
    }

    fn negate(self) -> Result<Expr, CheckError> {
        Expr::unary(UnaryOperator::Negate, self.into())
    }

    fn concat(self, rhs: impl Into<Expr>) -> Result<Expr, CheckError> {
        Expr::text_operation(BinaryOperator::Concat, self.into(), rhs.into())
    }
}

impl<T: Into<Expr>> Arithmetic for T {}

pub trait Logical: Into<Expr> + Sized {
    /// `<self> AND <rhs>`; `rhs` may be dynamic
    fn and(self, rhs: impl Into<MaybeDynamic<Expr>>) -> Result<Expr, CheckError> {
        Expr::logical(LogicalOperator::And, self.into(), rhs.into())
    }

    /// `<self> OR <rhs>`; `rhs` may be dynamic
    fn or(self, rhs: impl Into<MaybeDynamic<Expr>>) -> Result<Expr, CheckError> {
        Expr::logical(LogicalOperator::Or, self.into(), rhs.into())
    }
}

impl<T: Into<Expr>> Logical for T {}

pub fn not(operand: impl Into<Expr>) -> Result<Expr, CheckError> {
    Expr::unary(UnaryOperator::Not, operand.into())
}

pub trait Aliasable: Into<Expr> + Sized {
    /// Name the expression so that it can be used as a select column
    fn as_(self, name: impl Into<String>) -> Aliased {
        Aliased {
            expr: self.into(),
            name: name.into(),
        }
    }
}

impl<T: Into<Expr>> Aliasable for T {}

pub trait Sortable: Into<Expr> + Sized {
    fn asc(self) -> SortOrder {
        SortOrder {
            expr: self.into(),
            direction: SortDirection::Asc,
        }
    }

    fn desc(self) -> SortOrder {
        SortOrder {
            expr: self.into(),
            direction: SortDirection::Desc,
        }
    }
}

impl<T: Into<Expr>> Sortable for T {}
