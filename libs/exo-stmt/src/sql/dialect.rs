// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::fmt::Debug;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// Vendor-specific rendering rules.
///
/// The default methods describe generic SQL; the vendor dialects override what differs.
pub trait Dialect: Debug + Send + Sync {
    fn name(&self) -> &'static str;

    fn identifier_quote(&self) -> char {
        '"'
    }

    fn quote_all_identifiers(&self) -> bool {
        false
    }

    /// The placeholder for the parameter at the given (1-based) position
    fn parameter_marker(&self, _position: usize) -> String {
        "?".to_string()
    }

    fn boolean_literal(&self, value: bool) -> &'static str {
        if value { "TRUE" } else { "FALSE" }
    }

    /// Whether a backslash in a string literal is an escape character
    fn escapes_backslash(&self) -> bool {
        false
    }

    fn blob_literal(&self, bytes: &[u8]) -> String {
        format!("X'{}'", hex(bytes))
    }

    fn date_literal(&self, date: &NaiveDate) -> String {
        format!("DATE '{}'", date.format("%Y-%m-%d"))
    }

    fn timestamp_literal(&self, timestamp: &NaiveDateTime) -> String {
        format!("TIMESTAMP '{}'", timestamp.format("%Y-%m-%d %H:%M:%S%.f"))
    }

    fn time_literal(&self, time: &NaiveTime) -> String {
        format!("TIME '{}'", time.format("%H:%M:%S%.f"))
    }

    fn supports_concat_operator(&self) -> bool {
        true
    }

    fn supports_returning(&self) -> bool {
        true
    }

    fn supports_on_conflict(&self) -> bool {
        true
    }

    fn supports_full_outer_join(&self) -> bool {
        true
    }

    /// Row locking with `SELECT ... FOR UPDATE`
    fn supports_for_update(&self) -> bool {
        true
    }
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|byte| format!("{byte:02x}")).collect()
}

/// Generic SQL, mostly useful for diagnostics and tests
#[derive(Debug, Clone, Copy, Default)]
pub struct Standard;

impl Dialect for Standard {
    fn name(&self) -> &'static str {
        "standard"
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Postgres;

impl Dialect for Postgres {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn parameter_marker(&self, position: usize) -> String {
        format!("${position}")
    }

    fn blob_literal(&self, bytes: &[u8]) -> String {
        format!(r"'\x{}'", hex(bytes))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Sqlite;

impl Dialect for Sqlite {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn boolean_literal(&self, value: bool) -> &'static str {
        if value { "1" } else { "0" }
    }

    // No typed literals; dates and times are stored as text
    fn date_literal(&self, date: &NaiveDate) -> String {
        format!("'{}'", date.format("%Y-%m-%d"))
    }

    fn timestamp_literal(&self, timestamp: &NaiveDateTime) -> String {
        format!("'{}'", timestamp.format("%Y-%m-%d %H:%M:%S%.f"))
    }

    fn time_literal(&self, time: &NaiveTime) -> String {
        format!("'{}'", time.format("%H:%M:%S%.f"))
    }

    // Locking is per database file
    fn supports_for_update(&self) -> bool {
        false
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MySql;

impl Dialect for MySql {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn identifier_quote(&self) -> char {
        '`'
    }

    fn escapes_backslash(&self) -> bool {
        true
    }

    fn supports_concat_operator(&self) -> bool {
        false
    }

    fn supports_returning(&self) -> bool {
        false
    }

    fn supports_on_conflict(&self) -> bool {
        false
    }

    fn supports_full_outer_join(&self) -> bool {
        false
    }
}
