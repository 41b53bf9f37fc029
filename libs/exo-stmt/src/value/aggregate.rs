// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use crate::check_error::CheckError;
use crate::dependency::Node;
use crate::sql::{ExpressionBuilder, SQLBuilder};

use super::{DataType, Expr, Typed, ValueType};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateFunction {
    Count,
    Sum,
    Avg,
    Min,
    Max,
}

impl AggregateFunction {
    fn name(&self) -> &'static str {
        match self {
            AggregateFunction::Count => "COUNT",
            AggregateFunction::Sum => "SUM",
            AggregateFunction::Avg => "AVG",
            AggregateFunction::Min => "MIN",
            AggregateFunction::Max => "MAX",
        }
    }
}

/// An aggregate function call. Aggregates cannot be nested; turning one into a window function
/// with [`WindowCompatible::over`] yields a plain (non-aggregate) expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregate {
    function: AggregateFunction,
    distinct: bool,
    /// `None` for `COUNT(*)`
    argument: Option<Box<Expr>>,
}

impl Aggregate {
    fn new(function: AggregateFunction, argument: Expr) -> Result<Self, CheckError> {
        if argument.contains_aggregate() {
            return Err(CheckError::AggregateNesting {
                expression: argument.to_sql_text(),
            });
        }

        let argument_type = argument.value_type();
        if matches!(function, AggregateFunction::Sum | AggregateFunction::Avg)
            && !argument_type.data_type.is_numeric()
        {
            return Err(CheckError::incompatible(
                function.name(),
                argument_type,
                argument_type,
            ));
        }

        Ok(Self {
            function,
            distinct: false,
            argument: Some(Box::new(argument)),
        })
    }

    /// Aggregate over distinct values only
    pub fn distinct(self) -> Self {
        Self {
            distinct: true,
            ..self
        }
    }

    pub fn function(&self) -> AggregateFunction {
        self.function
    }

    pub fn argument(&self) -> Option<&Expr> {
        self.argument.as_deref()
    }
}

pub fn count(argument: impl Into<Expr>) -> Result<Aggregate, CheckError> {
    Aggregate::new(AggregateFunction::Count, argument.into())
}

/// `COUNT(*)`
pub fn count_all() -> Aggregate {
    Aggregate {
        function: AggregateFunction::Count,
        distinct: false,
        argument: None,
    }
}

pub fn sum(argument: impl Into<Expr>) -> Result<Aggregate, CheckError> {
    Aggregate::new(AggregateFunction::Sum, argument.into())
}

pub fn avg(argument: impl Into<Expr>) -> Result<Aggregate, CheckError> {
    Aggregate::new(AggregateFunction::Avg, argument.into())
}

pub fn min(argument: impl Into<Expr>) -> Result<Aggregate, CheckError> {
    Aggregate::new(AggregateFunction::Min, argument.into())
}

pub fn max(argument: impl Into<Expr>) -> Result<Aggregate, CheckError> {
    Aggregate::new(AggregateFunction::Max, argument.into())
}

pub trait WindowCompatible {
    /// Evaluate over the whole result set as a window function (`OVER ()`)
    fn over(self) -> Expr;
}

impl WindowCompatible for Aggregate {
    fn over(self) -> Expr {
        Expr::Window(self)
    }
}

impl Typed for Aggregate {
    fn value_type(&self) -> ValueType {
        let argument_type = self
            .argument
            .as_ref()
            .map(|argument| argument.value_type().data_type);

        match (self.function, argument_type) {
            (AggregateFunction::Count, _) => ValueType::new(DataType::Integral),
            (AggregateFunction::Avg, _) => ValueType::nullable(DataType::FloatingPoint),
            (AggregateFunction::Sum, Some(DataType::Boolean)) => {
                ValueType::nullable(DataType::Integral)
            }
            (_, Some(data_type)) => ValueType::nullable(data_type),
            (_, None) => ValueType::nullable(DataType::Null),
        }
    }
}

impl Node for Aggregate {
    fn nodes_of(&self) -> Vec<&dyn Node> {
        match &self.argument {
            Some(argument) => vec![argument.as_ref()],
            None => vec![],
        }
    }

    fn contains_aggregate(&self) -> bool {
        true
    }
}

impl ExpressionBuilder for Aggregate {
    fn build(&self, builder: &mut SQLBuilder) {
        builder.push_str(self.function.name());
        builder.push('(');
        if self.distinct {
            builder.push_str("DISTINCT ");
        }
        match &self.argument {
            Some(argument) => argument.build(builder),
            None => builder.push('*'),
        }
        builder.push(')');
    }
}
