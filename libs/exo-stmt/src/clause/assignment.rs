// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use crate::check_error::{CheckError, ClauseKind, ColumnOperation};
use crate::dependency::{NameSet, Node};
use crate::dynamic::{MaybeDynamic, maybe_dynamic_from};
use crate::schema::Column;
use crate::sql::{ExpressionBuilder, SQLBuilder};
use crate::value::{DataType, Expr, Typed, ValueType};

/// The right-hand side of an assignment
#[derive(Debug, Clone, PartialEq)]
pub enum AssignValue {
    Expr(Expr),
    Null,
    Default,
}

impl Node for AssignValue {
    fn nodes_of(&self) -> Vec<&dyn Node> {
        match self {
            AssignValue::Expr(expr) => vec![expr],
            AssignValue::Null | AssignValue::Default => vec![],
        }
    }
}

impl ExpressionBuilder for AssignValue {
    fn build(&self, builder: &mut SQLBuilder) {
        match self {
            AssignValue::Expr(expr) => {
                builder.with_fully_qualified_column_names(|builder| expr.build(builder))
            }
            AssignValue::Null => builder.push_str("NULL"),
            AssignValue::Default => builder.push_str("DEFAULT"),
        }
    }
}

/// `column = value`, used by INSERT, UPDATE and ON CONFLICT DO UPDATE
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    column: Column,
    value: AssignValue,
}

impl Assignment {
    pub fn column(&self) -> &Column {
        &self.column
    }

    pub fn value(&self) -> &AssignValue {
        &self.value
    }
}

impl Column {
    /// Assign a value. The value must have a type comparable with the column's and may only be
    /// nullable if the column is.
    pub fn assign(&self, value: impl Into<Expr>) -> Result<Assignment, CheckError> {
        let value = value.into();
        let value_type = value.value_type();
        if value_type.data_type == DataType::Null {
            return self.assign_null();
        }

        let column_type = self.value_type();
        if !column_type.is_comparable_with(&value_type) || (value_type.nullable && !column_type.nullable)
        {
            return Err(CheckError::incompatible("=", column_type, value_type));
        }
        if value.contains_aggregate() {
            return Err(CheckError::AggregateConsistencyViolation {
                clause: ClauseKind::UpdateSet,
                expression: value.to_sql_text(),
            });
        }

        Ok(Assignment {
            column: self.clone(),
            value: AssignValue::Expr(value),
        })
    }

    pub fn assign_null(&self) -> Result<Assignment, CheckError> {
        let column_type = self.value_type();
        if !column_type.nullable {
            return Err(CheckError::incompatible(
                "=",
                column_type,
                ValueType::new(DataType::Null),
            ));
        }
        Ok(Assignment {
            column: self.clone(),
            value: AssignValue::Null,
        })
    }

    pub fn assign_default(&self) -> Assignment {
        Assignment {
            column: self.clone(),
            value: AssignValue::Default,
        }
    }
}

impl Node for Assignment {
    fn nodes_of(&self) -> Vec<&dyn Node> {
        vec![&self.column, &self.value]
    }
}

impl ExpressionBuilder for Assignment {
    fn build(&self, builder: &mut SQLBuilder) {
        builder.without_fully_qualified_column_names(|builder| self.column.build(builder));
        builder.push_str(" = ");
        self.value.build(builder);
    }
}

maybe_dynamic_from!(Assignment; Assignment);

/// Reject assigning a column twice or assigning a column the schema protects from `operation`
pub(crate) fn check_assignments(
    assignments: &[MaybeDynamic<Assignment>],
    operation: ColumnOperation,
) -> Result<(), CheckError> {
    let mut assigned = NameSet::new();
    for assignment in assignments {
        let column = &assignment.inner().column;
        let flags = &column.spec().flags;
        let prohibited = match operation {
            ColumnOperation::Insert => flags.must_not_insert,
            ColumnOperation::Update => flags.must_not_update,
        };
        if prohibited {
            return Err(CheckError::ProhibitedColumnOperation {
                column: column.qualified_name(),
                operation,
            });
        }
        if !assigned.insert(column.qualified_name()) {
            return Err(CheckError::DuplicateAssignmentColumn {
                column: column.qualified_name(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamic::dynamic;
    use crate::sql::Standard;
    use crate::testing::{TableExt, baz, foo};
    use crate::value::{Arithmetic, Null};

    #[test]
    fn assignment_rendering() {
        let foo = foo();

        assert_binding!(
            foo.col("age")
                .assign(foo.col("age").plus(1).unwrap())
                .unwrap()
                .to_sql(&Standard),
            "age = foo.age + 1"
        );
        assert_binding!(
            foo.col("name").assign("x").unwrap().to_sql(&Standard),
            "name = 'x'"
        );
        assert_binding!(
            foo.col("age").assign(Null).unwrap().to_sql(&Standard),
            "age = NULL"
        );
        assert_binding!(
            foo.col("id").assign_default().to_sql(&Standard),
            "id = DEFAULT"
        );
    }

    #[test]
    fn assigned_value_must_fit_the_column() {
        let foo = foo();

        assert!(matches!(
            foo.col("name").assign(foo.col("id")),
            Err(CheckError::IncompatibleOperandTypes { .. })
        ));
        // `age` may be NULL, `id` may not
        assert!(matches!(
            foo.col("id").assign(foo.col("age")),
            Err(CheckError::IncompatibleOperandTypes { .. })
        ));
        assert!(matches!(
            foo.col("name").assign(Null),
            Err(CheckError::IncompatibleOperandTypes { .. })
        ));
    }

    #[test]
    fn duplicate_and_prohibited_assignments() {
        let (foo, baz) = (foo(), baz());
        let name = foo.col("name");

        let duplicate = vec![
            name.assign("a").unwrap().into(),
            dynamic(true, name.assign("b").unwrap()).into(),
        ];
        assert_eq!(
            check_assignments(&duplicate, ColumnOperation::Insert),
            Err(CheckError::DuplicateAssignmentColumn {
                column: "foo.name".to_string()
            })
        );

        let computed = vec![baz.col("computed").assign(1).unwrap().into()];
        assert_eq!(
            check_assignments(&computed, ColumnOperation::Update),
            Err(CheckError::ProhibitedColumnOperation {
                column: "baz.computed".to_string(),
                operation: ColumnOperation::Update
            })
        );

        let id = vec![foo.col("id").assign(1).unwrap().into()];
        assert!(check_assignments(&id, ColumnOperation::Insert).is_ok());
        assert!(check_assignments(&id, ColumnOperation::Update).is_err());
    }
}
