// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Statements: SELECT, INSERT, UPDATE and DELETE, composed slot by slot, plus custom queries
//! assembled from statements and verbatim SQL.
//!
//! Every clause entry point fills one empty slot and fails with
//! [`CheckError::ClauseAlreadySupplied`] if the slot is taken. Whole-statement rules are checked by
//! the [`Statement`] methods, which build on each other: consistency, then prepare (all tables and
//! CTEs resolvable), then run (no parameters left to bind).

use std::fmt::{Display, Formatter};

use tracing::{debug, instrument};

use crate::check;
use crate::check_error::CheckError;
use crate::dependency::Node;
use crate::sql::{Dialect, ExpressionBuilder};
use crate::value::Parameter;

mod custom;
mod delete;
mod insert;
mod select;
mod update;

pub use custom::{CustomPart, CustomQuery, custom_query};
pub use delete::{DeleteStatement, delete_from};
pub use insert::{InsertStatement, insert_into};
pub use select::{SelectStatement, select};
pub use update::{UpdateStatement, update};

pub use crate::clause::{ResultField, UnionKind};
pub(crate) use crate::clause::fields_match;

pub trait Statement: Node + ExpressionBuilder {
    /// Statement-wide rules that do not need the surrounding context: required clauses, duplicate
    /// providers, aggregate usage
    fn check_consistency(&self) -> Result<(), CheckError>;

    /// The row produced by the statement (empty for statements without RETURNING)
    fn result_fields(&self) -> Vec<ResultField>;

    /// Clauses the dialect cannot express
    fn check_dialect(&self, _dialect: &dyn Dialect) -> Result<(), CheckError> {
        Ok(())
    }

    /// Consistency plus closure: every table and CTE the statement uses is provided by it, and
    /// everything used statically is provided statically
    #[instrument(name = "Statement::check_prepare", skip_all)]
    fn check_prepare(&self) -> Result<(), CheckError> {
        self.check_consistency()
            .and_then(|_| check::check_closure(self))
            .inspect_err(|error| debug!(%error, "statement cannot be prepared"))
    }

    /// Prepare check plus "nothing to bind": a statement with parameters must be prepared and
    /// bound instead
    fn check_run(&self) -> Result<(), CheckError> {
        self.check_prepare()?;
        check::check_parameters(self).inspect_err(|error| debug!(%error, "statement cannot be run"))
    }

    /// Check the statement for preparation on the given dialect and render it
    #[instrument(name = "Statement::serialize", skip_all, fields(dialect = dialect.name()))]
    fn serialize(&self, dialect: &dyn Dialect) -> Result<SqlStatement, CheckError> {
        self.check_prepare()?;
        self.check_dialect(dialect)?;

        let (sql, parameters) = self.to_sql(dialect);
        debug!(%sql, parameters = parameters.len(), "serialized statement");
        Ok(SqlStatement { sql, parameters })
    }
}

/// SQL text with the parameters its placeholders stand for, in placeholder order
#[derive(Debug, Clone, PartialEq)]
pub struct SqlStatement {
    pub sql: String,
    pub parameters: Vec<Parameter>,
}

impl Display for SqlStatement {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.sql)
    }
}
