// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Composition of SQL statements that are checked before any SQL text exists.
//!
//! Statements are assembled clause by clause from typed tables, columns and values. Each entry
//! point enforces the rules local to its clause and returns a [`CheckError`] describing the exact
//! violation. Rules that span the whole statement are checked in three stages through the
//! [`Statement`] trait:
//!
//! - [`Statement::check_consistency`]: required clauses, duplicate providers, aggregate usage.
//! - [`Statement::check_prepare`]: additionally, every table and CTE used is provided, and
//!   everything used unconditionally is provided unconditionally. Parts of a statement can be
//!   made [`dynamic`], which means they are only rendered if a run-time condition holds.
//! - [`Statement::check_run`]: additionally, there are no [`Parameter`]s left to bind.
//!
//! A checked statement is rendered for a [`Dialect`] with [`Statement::serialize`] and handed to
//! a database driver through the [`connector`] module.
#[macro_use]
mod sql;

mod check;
mod check_error;
mod clause;
mod dependency;
mod dynamic;
mod relation;
mod statement;
mod value;

pub mod config;
pub mod connector;
pub mod schema;

#[cfg(test)]
mod testing;

pub use check_error::{CheckError, ClauseKind, ColumnOperation};
pub use dependency::{Dependencies, NameSet, Node};
pub use dynamic::{Dynamic, MaybeDynamic, dynamic};

pub use clause::{
    AssignValue, Assignment, ConflictAction, ConflictTarget, OnConflict, SelectColumn, SelectFlag,
    all_of, excluded, on_conflict,
};
pub use relation::{
    Cte, CteBuilder, CteRef, DerivedTable, Join, JoinKind, Joinable, PreJoin, Relation,
    VerbatimTable, cte, verbatim_table,
};
pub use statement::{
    CustomPart, CustomQuery, DeleteStatement, InsertStatement, ResultField, SelectStatement,
    SqlStatement, Statement, UnionKind, UpdateStatement, custom_query, delete_from, insert_into,
    select, update,
};
pub use value::{
    Aggregate, AggregateFunction, Aliasable, Aliased, Arithmetic, BinaryOperator, CaseThen,
    CaseWhen, Comparable, DataType, Expr, Function, Logical, LogicalOperator, Null, Parameter,
    SortDirection, SortOrder, Sortable, SqlValue, Typed, UnaryOperator, ValueType,
    WindowCompatible, avg, case_when, coalesce, count, count_all, exists, lower, max, min, not,
    parameter, sum, trim, upper, value_type_of, verbatim,
};

pub use schema::{Column, ColumnFlags, ColumnSpec, Schema, SchemaError, Table, TableAlias};
pub use sql::{Dialect, ExpressionBuilder, MySql, Postgres, Sqlite, Standard};
