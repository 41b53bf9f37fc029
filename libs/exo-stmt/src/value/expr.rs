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

use crate::check_error::{CheckError, ClauseKind};
use crate::dependency::Node;
use crate::dynamic::{MaybeDynamic, maybe_dynamic_from};
use crate::schema::Column;
use crate::sql::{ExpressionBuilder, SQLBuilder, Standard};
use crate::statement::SelectStatement;

use super::{Aggregate, DataType, Function, Null, Parameter, SqlValue, Typed, ValueType};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Negate,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Plus,
    Minus,
    Multiply,
    Divide,
    Modulus,
    Concat,
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    IsDistinctFrom,
    IsNotDistinctFrom,
    Like,
}

impl BinaryOperator {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOperator::Plus => "+",
            BinaryOperator::Minus => "-",
            BinaryOperator::Multiply => "*",
            BinaryOperator::Divide => "/",
            BinaryOperator::Modulus => "%",
            BinaryOperator::Concat => "||",
            BinaryOperator::Equal => "=",
            BinaryOperator::NotEqual => "<>",
            BinaryOperator::Less => "<",
            BinaryOperator::LessEqual => "<=",
            BinaryOperator::Greater => ">",
            BinaryOperator::GreaterEqual => ">=",
            BinaryOperator::IsDistinctFrom => "IS DISTINCT FROM",
            BinaryOperator::IsNotDistinctFrom => "IS NOT DISTINCT FROM",
            BinaryOperator::Like => "LIKE",
        }
    }

    fn is_arithmetic(&self) -> bool {
        matches!(
            self,
            BinaryOperator::Plus
                | BinaryOperator::Minus
                | BinaryOperator::Multiply
                | BinaryOperator::Divide
                | BinaryOperator::Modulus
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOperator {
    And,
    Or,
}

impl LogicalOperator {
    fn symbol(&self) -> &'static str {
        match self {
            LogicalOperator::And => "AND",
            LogicalOperator::Or => "OR",
        }
    }
}

/// A value expression.
///
/// Expressions are built through the operator traits ([`super::Comparable`],
/// [`super::Arithmetic`], [`super::Logical`]) and the free functions of this module, all of which
/// check operand types as the expression is built. The variants are public for inspection.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Column(Column),
    Value(SqlValue),
    Parameter(Parameter),
    Unary {
        operator: UnaryOperator,
        operand: Box<Expr>,
    },
    Binary {
        operator: BinaryOperator,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    /// `AND`/`OR`. Only the right-hand side may be dynamic; when it is switched off, the
    /// expression renders as its left-hand side.
    Logical {
        operator: LogicalOperator,
        lhs: Box<Expr>,
        rhs: Box<MaybeDynamic<Expr>>,
    },
    IsNull {
        operand: Box<Expr>,
        negated: bool,
    },
    In {
        operand: Box<Expr>,
        values: Vec<Expr>,
        negated: bool,
    },
    InSelect {
        operand: Box<Expr>,
        select: Box<SelectStatement>,
        negated: bool,
    },
    Between {
        operand: Box<Expr>,
        low: Box<Expr>,
        high: Box<Expr>,
    },
    Case {
        when: Box<Expr>,
        then: Box<Expr>,
        otherwise: Box<Expr>,
    },
    Aggregate(Aggregate),
    /// An aggregate evaluated as a window function (`... OVER ()`)
    Window(Aggregate),
    Function {
        function: Function,
        args: Vec<Expr>,
    },
    Exists(Box<SelectStatement>),
    Verbatim {
        sql: String,
        value_type: ValueType,
    },
}

impl Expr {
    pub(crate) fn comparison(
        operator: BinaryOperator,
        lhs: Expr,
        rhs: Expr,
    ) -> Result<Expr, CheckError> {
        check_comparable(operator.symbol(), &lhs, &rhs)?;
        check_not_self_comparison(&lhs, &rhs)?;

        Ok(Expr::Binary {
            operator,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        })
    }

    pub(crate) fn arithmetic(
        operator: BinaryOperator,
        lhs: Expr,
        rhs: Expr,
    ) -> Result<Expr, CheckError> {
        let (lhs_type, rhs_type) = (lhs.value_type(), rhs.value_type());
        if !lhs_type.data_type.is_numeric() || !rhs_type.data_type.is_numeric() {
            return Err(CheckError::incompatible(
                operator.symbol(),
                lhs_type,
                rhs_type,
            ));
        }

        Ok(Expr::Binary {
            operator,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        })
    }

    pub(crate) fn text_operation(
        operator: BinaryOperator,
        lhs: Expr,
        rhs: Expr,
    ) -> Result<Expr, CheckError> {
        let (lhs_type, rhs_type) = (lhs.value_type(), rhs.value_type());
        if !lhs_type.data_type.is_text() || !rhs_type.data_type.is_text() {
            return Err(CheckError::incompatible(
                operator.symbol(),
                lhs_type,
                rhs_type,
            ));
        }

        Ok(Expr::Binary {
            operator,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        })
    }

    pub(crate) fn logical(
        operator: LogicalOperator,
        lhs: Expr,
        rhs: MaybeDynamic<Expr>,
    ) -> Result<Expr, CheckError> {
        let (lhs_type, rhs_type) = (lhs.value_type(), rhs.inner().value_type());
        if !lhs_type.data_type.is_boolean() || !rhs_type.data_type.is_boolean() {
            return Err(CheckError::incompatible(
                operator.symbol(),
                lhs_type,
                rhs_type,
            ));
        }

        Ok(Expr::Logical {
            operator,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        })
    }

    pub(crate) fn unary(operator: UnaryOperator, operand: Expr) -> Result<Expr, CheckError> {
        let operand_type = operand.value_type();
        let valid = match operator {
            UnaryOperator::Negate => operand_type.data_type.is_numeric(),
            UnaryOperator::Not => operand_type.data_type.is_boolean(),
        };
        if !valid {
            let symbol = match operator {
                UnaryOperator::Negate => "-",
                UnaryOperator::Not => "NOT",
            };
            return Err(CheckError::incompatible(symbol, operand_type, operand_type));
        }

        Ok(Expr::Unary {
            operator,
            operand: Box::new(operand),
        })
    }

    pub(crate) fn in_list(
        operand: Expr,
        values: Vec<Expr>,
        negated: bool,
    ) -> Result<Expr, CheckError> {
        if values.is_empty() {
            return Err(CheckError::EmptyArgumentList {
                clause: ClauseKind::Function,
            });
        }
        for value in &values {
            check_comparable("IN", &operand, value)?;
            check_not_self_comparison(&operand, value)?;
        }

        Ok(Expr::In {
            operand: Box::new(operand),
            values,
            negated,
        })
    }

    pub(crate) fn in_select(
        operand: Expr,
        select: SelectStatement,
        negated: bool,
    ) -> Result<Expr, CheckError> {
        let value = select.scalar_value_type()?;
        let operand_type = operand.value_type();
        if !operand_type.is_comparable_with(&value) {
            return Err(CheckError::incompatible("IN", operand_type, value));
        }

        Ok(Expr::InSelect {
            operand: Box::new(operand),
            select: Box::new(select),
            negated,
        })
    }

    pub(crate) fn between(operand: Expr, low: Expr, high: Expr) -> Result<Expr, CheckError> {
        check_comparable("BETWEEN", &operand, &low)?;
        check_comparable("BETWEEN", &operand, &high)?;

        Ok(Expr::Between {
            operand: Box::new(operand),
            low: Box::new(low),
            high: Box::new(high),
        })
    }

    /// The direct sub-expressions (sub-selects are opaque)
    pub fn sub_expressions(&self) -> Vec<&Expr> {
        match self {
            Expr::Column(_)
            | Expr::Value(_)
            | Expr::Parameter(_)
            | Expr::Exists(_)
            | Expr::Verbatim { .. } => vec![],
            Expr::Unary { operand, .. }
            | Expr::IsNull { operand, .. }
            | Expr::InSelect { operand, .. } => vec![operand.as_ref()],
            Expr::Binary { lhs, rhs, .. } => vec![lhs.as_ref(), rhs.as_ref()],
            Expr::Logical { lhs, rhs, .. } => vec![lhs.as_ref(), rhs.inner()],
            Expr::In {
                operand, values, ..
            } => std::iter::once(operand.as_ref()).chain(values).collect(),
            Expr::Between { operand, low, high } => {
                vec![operand.as_ref(), low.as_ref(), high.as_ref()]
            }
            Expr::Case {
                when,
                then,
                otherwise,
            } => vec![when.as_ref(), then.as_ref(), otherwise.as_ref()],
            Expr::Aggregate(aggregate) | Expr::Window(aggregate) => {
                aggregate.argument().into_iter().collect()
            }
            Expr::Function { args, .. } => args.iter().collect(),
        }
    }

    fn requires_parentheses(&self) -> bool {
        matches!(
            self,
            Expr::Unary { .. }
                | Expr::Binary { .. }
                | Expr::Logical { .. }
                | Expr::IsNull { .. }
                | Expr::In { .. }
                | Expr::InSelect { .. }
                | Expr::Between { .. }
                | Expr::Case { .. }
        )
    }

    /// The expression as generic SQL text, used in diagnostics
    pub(crate) fn to_sql_text(&self) -> String {
        self.to_sql(&Standard).0
    }
}

fn check_comparable(operator: &str, lhs: &Expr, rhs: &Expr) -> Result<(), CheckError> {
    let (lhs_type, rhs_type) = (lhs.value_type(), rhs.value_type());
    if lhs_type.is_comparable_with(&rhs_type) {
        Ok(())
    } else {
        Err(CheckError::incompatible(operator, lhs_type, rhs_type))
    }
}

/// Comparing a column-based expression with itself is always a mistake (it is either trivially
/// true or trivially unknown)
fn check_not_self_comparison(lhs: &Expr, rhs: &Expr) -> Result<(), CheckError> {
    if lhs == rhs && !lhs.required_tables_of().is_empty() {
        Err(CheckError::SelfComparison {
            expression: lhs.to_sql_text(),
        })
    } else {
        Ok(())
    }
}

impl Typed for Expr {
    fn value_type(&self) -> ValueType {
        let boolean = ValueType::new(DataType::Boolean);

        match self {
            Expr::Column(column) => column.value_type(),
            Expr::Value(value) => value.value_type(),
            Expr::Parameter(parameter) => parameter.value_type(),
            Expr::Unary { operator, operand } => {
                let operand_type = operand.value_type();
                match operator {
                    UnaryOperator::Negate => operand_type,
                    UnaryOperator::Not => boolean.with_nullable(operand_type.nullable),
                }
            }
            Expr::Binary { operator, lhs, rhs } => {
                let nullable = lhs.value_type().nullable || rhs.value_type().nullable;
                let data_type = if operator.is_arithmetic() {
                    DataType::Numeric
                } else if *operator == BinaryOperator::Concat {
                    DataType::Text
                } else {
                    DataType::Boolean
                };
                match operator {
                    BinaryOperator::IsDistinctFrom | BinaryOperator::IsNotDistinctFrom => boolean,
                    _ => ValueType::new(data_type).with_nullable(nullable),
                }
            }
            Expr::Logical { lhs, rhs, .. } => boolean
                .with_nullable(lhs.value_type().nullable || rhs.inner().value_type().nullable),
            Expr::IsNull { .. } | Expr::Exists(_) => boolean,
            Expr::In {
                operand, values, ..
            } => boolean.with_nullable(
                operand.value_type().nullable || values.iter().any(|v| v.value_type().nullable),
            ),
            Expr::InSelect { operand, .. } => boolean.with_nullable(operand.value_type().nullable),
            Expr::Between { operand, low, high } => boolean.with_nullable(
                operand.value_type().nullable
                    || low.value_type().nullable
                    || high.value_type().nullable,
            ),
            Expr::Case {
                when,
                then,
                otherwise,
            } => {
                let (then_type, otherwise_type) = (then.value_type(), otherwise.value_type());
                let data_type = if then_type.data_type == DataType::Null {
                    otherwise_type.data_type
                } else {
                    then_type.data_type
                };
                ValueType::new(data_type).with_nullable(
                    when.value_type().nullable || then_type.nullable || otherwise_type.nullable,
                )
            }
            Expr::Aggregate(aggregate) | Expr::Window(aggregate) => aggregate.value_type(),
            Expr::Function { function, args } => function.value_type(args),
            Expr::Verbatim { value_type, .. } => *value_type,
        }
    }
}

impl Node for Expr {
    fn nodes_of(&self) -> Vec<&dyn Node> {
        match self {
            Expr::Column(column) => vec![column],
            Expr::Parameter(parameter) => vec![parameter],
            Expr::Value(_) | Expr::Verbatim { .. } => vec![],
            Expr::Logical { lhs, rhs, .. } => vec![lhs.as_ref(), rhs.as_ref()],
            Expr::InSelect {
                operand, select, ..
            } => vec![operand.as_ref(), select.as_ref()],
            Expr::Exists(select) => vec![select.as_ref()],
            Expr::Aggregate(aggregate) | Expr::Window(aggregate) => vec![aggregate],
            _ => self
                .sub_expressions()
                .into_iter()
                .map(|expr| expr as &dyn Node)
                .collect(),
        }
    }

    fn contains_aggregate(&self) -> bool {
        match self {
            Expr::Aggregate(_) => true,
            Expr::Window(_) => false,
            _ => self
                .nodes_of()
                .into_iter()
                .any(|node| node.contains_aggregate()),
        }
    }
}

fn build_operand(expr: &Expr, builder: &mut SQLBuilder) {
    if expr.requires_parentheses() {
        builder.push('(');
        expr.build(builder);
        builder.push(')');
    } else {
        expr.build(builder);
    }
}

/// Operands of a logical chain using the same operator do not need parentheses
fn build_logical_operand(expr: &Expr, operator: LogicalOperator, builder: &mut SQLBuilder) {
    match expr {
        Expr::Logical {
            operator: inner, ..
        } if *inner == operator => expr.build(builder),
        _ => build_operand(expr, builder),
    }
}

impl ExpressionBuilder for Expr {
    fn build(&self, builder: &mut SQLBuilder) {
        match self {
            Expr::Column(column) => column.build(builder),
            Expr::Value(value) => value.build(builder),
            Expr::Parameter(parameter) => parameter.build(builder),
            Expr::Unary { operator, operand } => {
                match operator {
                    UnaryOperator::Negate => builder.push('-'),
                    UnaryOperator::Not => builder.push_str("NOT "),
                }
                match operand.as_ref() {
                    Expr::Column(_) | Expr::Parameter(_) => operand.build(builder),
                    _ => {
                        builder.push('(');
                        operand.build(builder);
                        builder.push(')');
                    }
                }
            }
            Expr::Binary {
                operator: BinaryOperator::Concat,
                lhs,
                rhs,
            } if !builder.dialect().supports_concat_operator() => {
                builder.push_str("CONCAT(");
                lhs.build(builder);
                builder.push_str(", ");
                rhs.build(builder);
                builder.push(')');
            }
            Expr::Binary { operator, lhs, rhs } => {
                build_operand(lhs, builder);
                builder.push_space();
                builder.push_str(operator.symbol());
                builder.push_space();
                build_operand(rhs, builder);
            }
            Expr::Logical { operator, lhs, rhs } => match rhs.active() {
                Some(rhs) => {
                    build_logical_operand(lhs, *operator, builder);
                    builder.push_space();
                    builder.push_str(operator.symbol());
                    builder.push_space();
                    build_logical_operand(rhs, *operator, builder);
                }
                None => lhs.build(builder),
            },
            Expr::IsNull { operand, negated } => {
                build_operand(operand, builder);
                builder.push_str(if *negated { " IS NOT NULL" } else { " IS NULL" });
            }
            Expr::In {
                operand,
                values,
                negated,
            } => {
                build_operand(operand, builder);
                builder.push_str(if *negated { " NOT IN (" } else { " IN (" });
                builder.push_elems(values, ", ");
                builder.push(')');
            }
            Expr::InSelect {
                operand,
                select,
                negated,
            } => {
                build_operand(operand, builder);
                builder.push_str(if *negated { " NOT IN (" } else { " IN (" });
                select.build(builder);
                builder.push(')');
            }
            Expr::Between { operand, low, high } => {
                build_operand(operand, builder);
                builder.push_str(" BETWEEN ");
                build_operand(low, builder);
                builder.push_str(" AND ");
                build_operand(high, builder);
            }
            Expr::Case {
                when,
                then,
                otherwise,
            } => {
                builder.push_str("CASE WHEN ");
                when.build(builder);
                builder.push_str(" THEN ");
                then.build(builder);
                builder.push_str(" ELSE ");
                otherwise.build(builder);
                builder.push_str(" END");
            }
            Expr::Aggregate(aggregate) => aggregate.build(builder),
            Expr::Window(aggregate) => {
                aggregate.build(builder);
                builder.push_str(" OVER ()");
            }
            Expr::Function { function, args } => {
                builder.push_str(function.name());
                builder.push('(');
                builder.push_elems(args, ", ");
                builder.push(')');
            }
            Expr::Exists(select) => {
                builder.push_str("EXISTS (");
                select.build(builder);
                builder.push(')');
            }
            Expr::Verbatim { sql, .. } => builder.push_str(sql),
        }
    }
}

/// An expression with an output name, as required for select columns
#[derive(Debug, Clone, PartialEq)]
pub struct Aliased {
    pub(crate) expr: Expr,
    pub(crate) name: String,
}

impl Aliased {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn expr(&self) -> &Expr {
        &self.expr
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

/// An ORDER BY element
#[derive(Debug, Clone, PartialEq)]
pub struct SortOrder {
    pub(crate) expr: Expr,
    pub(crate) direction: SortDirection,
}

impl SortOrder {
    pub fn expr(&self) -> &Expr {
        &self.expr
    }
}

impl Node for SortOrder {
    fn nodes_of(&self) -> Vec<&dyn Node> {
        vec![&self.expr]
    }
}

impl ExpressionBuilder for SortOrder {
    fn build(&self, builder: &mut SQLBuilder) {
        self.expr.build(builder);
        builder.push_str(match self.direction {
            SortDirection::Asc => " ASC",
            SortDirection::Desc => " DESC",
        });
    }
}

macro_rules! expr_from_value {
    ($($source:ty),* $(,)?) => {
        $(
            impl From<$source> for Expr {
                fn from(value: $source) -> Self {
                    Expr::Value(value.into())
                }
            }
        )*
    };
}

expr_from_value!(
    SqlValue,
    Null,
    bool,
    i16,
    i32,
    i64,
    u16,
    u32,
    u64,
    f32,
    f64,
    String,
    &str,
    Bytes,
    Vec<u8>,
    NaiveDate,
    NaiveDateTime,
    NaiveTime,
    DateTime<Utc>,
);

impl From<Column> for Expr {
    fn from(column: Column) -> Self {
        Expr::Column(column)
    }
}

impl From<&Column> for Expr {
    fn from(column: &Column) -> Self {
        Expr::Column(column.clone())
    }
}

impl From<Parameter> for Expr {
    fn from(parameter: Parameter) -> Self {
        Expr::Parameter(parameter)
    }
}

impl From<Aggregate> for Expr {
    fn from(aggregate: Aggregate) -> Self {
        Expr::Aggregate(aggregate)
    }
}

maybe_dynamic_from!(Expr; Expr, Column, Parameter, Aggregate, SqlValue, bool, i32, i64, u32, u64, f64, &str, String);
