// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! SQL text generation.
//!
//! Every node of a statement implements [`ExpressionBuilder`] and renders itself into a
//! [`SQLBuilder`], which accumulates the SQL text and the parameters in the order they appear.
//! Vendor differences are isolated in the [`Dialect`] the builder carries.

#[macro_use]
#[cfg(test)]
mod test_util;

mod dialect;
mod expression_builder;
mod sql_builder;

pub use dialect::{Dialect, MySql, Postgres, Sqlite, Standard};
pub use expression_builder::ExpressionBuilder;
pub use sql_builder::SQLBuilder;
