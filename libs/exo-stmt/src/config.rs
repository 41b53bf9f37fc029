// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sql::{Dialect, MySql, Postgres, Sqlite, Standard};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown SQL dialect '{0}' (expected one of standard, postgres, sqlite, mysql)")]
pub struct UnknownDialect(pub String);

/// The dialect to render statements in, as it appears in configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DialectKind {
    #[default]
    Standard,
    Postgres,
    Sqlite,
    MySql,
}

impl DialectKind {
    pub fn dialect(self) -> &'static dyn Dialect {
        match self {
            DialectKind::Standard => &Standard,
            DialectKind::Postgres => &Postgres,
            DialectKind::Sqlite => &Sqlite,
            DialectKind::MySql => &MySql,
        }
    }
}

impl FromStr for DialectKind {
    type Err = UnknownDialect;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "standard" => Ok(DialectKind::Standard),
            "postgres" | "postgresql" => Ok(DialectKind::Postgres),
            "sqlite" => Ok(DialectKind::Sqlite),
            "mysql" => Ok(DialectKind::MySql),
            _ => Err(UnknownDialect(s.to_string())),
        }
    }
}

impl Display for DialectKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.dialect().name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_dialect_names() {
        assert_eq!("postgres".parse(), Ok(DialectKind::Postgres));
        assert_eq!("PostgreSQL".parse(), Ok(DialectKind::Postgres));
        assert_eq!("mysql".parse(), Ok(DialectKind::MySql));
        assert_eq!(
            "oracle".parse::<DialectKind>(),
            Err(UnknownDialect("oracle".to_string()))
        );
    }

    #[test]
    fn names_round_trip_through_serde() {
        for kind in [
            DialectKind::Standard,
            DialectKind::Postgres,
            DialectKind::Sqlite,
            DialectKind::MySql,
        ] {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{kind}\""));
            assert_eq!(serde_json::from_str::<DialectKind>(&json).unwrap(), kind);
            assert_eq!(kind.to_string().parse(), Ok(kind));
        }
    }

    #[test]
    fn resolves_to_dialect() {
        assert_eq!(DialectKind::Sqlite.dialect().name(), "sqlite");
        assert_eq!(DialectKind::default().dialect().name(), "standard");
        assert!(!DialectKind::MySql.dialect().supports_returning());
        assert_eq!(DialectKind::Postgres.dialect().parameter_marker(2), "$2");
    }
}
