// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use crate::value::Parameter;

use super::{Dialect, SQLBuilder};

/// A trait for types that can build themselves into an SQL expression.
///
/// Each constituent of a statement (column, value, clause, statement) implements this trait, which
/// is then used to hierarchically build an SQL string and the list of parameters to be supplied to
/// it. An absent clause builds nothing, so statements never special-case optional clauses.
pub trait ExpressionBuilder {
    /// Build the SQL expression into the given SQL builder
    fn build(&self, builder: &mut SQLBuilder);

    /// Build the SQL expression into a string and return it along with the parameters. This is
    /// useful for testing/debugging, where we want to assert on the generated SQL without going
    /// through the whole process of creating an SQLBuilder, then building the SQL expression into
    /// it, and finally extracting the SQL string and params. Unlike
    /// [`crate::Statement::serialize`], this performs no checks.
    fn to_sql(&self, dialect: &dyn Dialect) -> (String, Vec<Parameter>) {
        let mut builder = SQLBuilder::new(dialect);
        self.build(&mut builder);
        builder.into_sql()
    }
}

impl<T> ExpressionBuilder for Box<T>
where
    T: ExpressionBuilder,
{
    fn build(&self, builder: &mut SQLBuilder) {
        self.as_ref().build(builder)
    }
}

impl<T> ExpressionBuilder for &T
where
    T: ExpressionBuilder,
{
    fn build(&self, builder: &mut SQLBuilder) {
        (**self).build(builder)
    }
}

/// An absent clause renders as nothing
impl<T> ExpressionBuilder for Option<T>
where
    T: ExpressionBuilder,
{
    fn build(&self, builder: &mut SQLBuilder) {
        if let Some(inner) = self {
            inner.build(builder)
        }
    }
}
