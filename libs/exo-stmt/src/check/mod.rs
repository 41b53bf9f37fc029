// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Statement-wide checks shared by the statement kinds.

use crate::check_error::{CheckError, ClauseKind};
use crate::dependency::Node;
use crate::relation::check_disjoint_providers;

mod aggregate;

pub(crate) use aggregate::check_aggregates;

/// Fail with [`CheckError::MissingRequiredClause`] if a required slot is empty
pub(crate) fn require<T>(slot: &Option<T>, clause: ClauseKind) -> Result<(), CheckError> {
    match slot {
        Some(_) => Ok(()),
        None => Err(CheckError::MissingRequiredClause { clause }),
    }
}

/// No two clauses of a statement may provide the same table
pub(crate) fn check_providers(providers: &[&dyn Node]) -> Result<(), CheckError> {
    let provided: Vec<_> = providers
        .iter()
        .map(|provider| provider.provided_tables_of())
        .collect();
    check_disjoint_providers(&provided)
}

/// Every table the node uses is provided by it. CTEs are not considered, which makes this the
/// check for selects that are nested in a statement that may still provide CTEs.
pub(crate) fn check_table_closure<N: Node + ?Sized>(node: &N) -> Result<(), CheckError> {
    let unknown = node.required_tables_of();
    if !unknown.is_empty() {
        return Err(CheckError::UnknownTableOrCte {
            names: unknown.into_iter().collect(),
        });
    }

    let statically_unknown = node.required_static_tables_of();
    if !statically_unknown.is_empty() {
        return Err(CheckError::StaticallyUnknownTableOrCte {
            names: statically_unknown.into_iter().collect(),
        });
    }

    Ok(())
}

/// Every table and CTE the node uses is provided by it, statically where it is used statically
pub(crate) fn check_closure<N: Node + ?Sized>(node: &N) -> Result<(), CheckError> {
    check_table_closure(node)?;

    let unknown = node.required_ctes_of();
    if !unknown.is_empty() {
        return Err(CheckError::UnknownTableOrCte {
            names: unknown.into_iter().collect(),
        });
    }

    let statically_unknown = node.required_static_ctes_of();
    if !statically_unknown.is_empty() {
        return Err(CheckError::StaticallyUnknownTableOrCte {
            names: statically_unknown.into_iter().collect(),
        });
    }

    Ok(())
}

pub(crate) fn check_parameters<N: Node + ?Sized>(node: &N) -> Result<(), CheckError> {
    let parameters = node.parameters_of();
    if parameters.is_empty() {
        Ok(())
    } else {
        Err(CheckError::UnboundParameters {
            names: parameters
                .iter()
                .map(|parameter| parameter.name().to_string())
                .collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamic::dynamic;
    use crate::relation::Joinable;
    use crate::testing::{TableExt, bar, foo};
    use crate::value::{Comparable, DataType, Logical, parameter};

    #[test]
    fn closure_over_join() {
        let (foo, bar) = (foo(), bar());
        let condition = foo.col("id").equal(bar.col("foo_id")).unwrap();

        let join = foo.clone().join(&bar).unwrap().on(condition.clone()).unwrap();
        assert!(check_closure(&join).is_ok());

        let dynamic_join = foo
            .clone()
            .left_outer_join(dynamic(true, &bar))
            .unwrap()
            .on(condition)
            .unwrap();
        assert!(check_closure(&dynamic_join).is_ok());
    }

    #[test]
    fn unknown_tables() {
        let (foo, bar) = (foo(), bar());
        let condition = foo.col("id").equal(bar.col("foo_id")).unwrap();

        assert_eq!(
            check_closure(&condition),
            Err(CheckError::UnknownTableOrCte {
                names: vec!["foo".to_string(), "bar".to_string()]
            })
        );
    }

    #[test]
    fn parameters_must_be_bound() {
        let foo = foo();
        let condition = foo
            .col("id")
            .equal(parameter("id", DataType::Integral))
            .unwrap()
            .or(foo
                .col("name")
                .equal(parameter("name", DataType::Text))
                .unwrap())
            .unwrap();

        assert_eq!(
            check_parameters(&condition),
            Err(CheckError::UnboundParameters {
                names: vec!["id".to_string(), "name".to_string()]
            })
        );
        assert!(check_parameters(&foo.col("id")).is_ok());
    }

    #[test]
    fn providers_must_be_disjoint() {
        let (foo, bar) = (foo(), bar());

        assert!(check_providers(&[&foo, &bar]).is_ok());
        assert_eq!(
            check_providers(&[&foo, &bar, &foo]),
            Err(CheckError::DuplicateTableProvider {
                name: "foo".to_string()
            })
        );
    }
}
