// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use crate::check::check_table_closure;
use crate::check_error::{CheckError, ClauseKind};
use crate::dependency::{NameSet, Node, difference, name_set, union_of};
use crate::schema::Column;
use crate::sql::{ExpressionBuilder, SQLBuilder};
use crate::statement::{ResultField, SelectStatement, UnionKind, fields_match};
use crate::Statement;

use super::field_column;

/// Start a common table expression definition
pub fn cte(name: impl Into<String>) -> CteBuilder {
    CteBuilder { name: name.into() }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CteBuilder {
    name: String,
}

impl CteBuilder {
    /// Define the CTE by a select. The select may use earlier CTEs but no tables of the statement
    /// the CTE is attached to.
    pub fn as_(self, select: SelectStatement) -> Result<Cte, CheckError> {
        select.check_consistency()?;
        check_table_closure(&select)?;

        let fields = select.result_fields();
        Ok(Cte {
            name: self.name,
            select: Box::new(select),
            recursive: None,
            fields,
        })
    }
}

/// A named select that a statement can use as a table after attaching it with `WITH`
#[derive(Debug, Clone, PartialEq)]
pub struct Cte {
    name: String,
    select: Box<SelectStatement>,
    recursive: Option<(UnionKind, Box<SelectStatement>)>,
    fields: Vec<ResultField>,
}

impl Cte {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Make the CTE recursive: `<select> UNION ALL <rhs>`, where `rhs` may refer to the CTE itself
    /// through [`Cte::reference`]
    pub fn union_all(self, rhs: SelectStatement) -> Result<Cte, CheckError> {
        self.union(UnionKind::All, rhs)
    }

    pub fn union_distinct(self, rhs: SelectStatement) -> Result<Cte, CheckError> {
        self.union(UnionKind::Distinct, rhs)
    }

    fn union(self, kind: UnionKind, rhs: SelectStatement) -> Result<Cte, CheckError> {
        if self.recursive.is_some() {
            return Err(CheckError::ClauseAlreadySupplied {
                clause: ClauseKind::Union,
            });
        }
        rhs.check_consistency()?;
        check_table_closure(&rhs)?;
        if !fields_match(&self.fields, &rhs.result_fields()) {
            return Err(CheckError::UnionResultMismatch);
        }

        Ok(Cte {
            recursive: Some((kind, Box::new(rhs))),
            ..self
        })
    }

    pub fn is_recursive(&self) -> bool {
        self.recursive.is_some()
    }

    /// A relation that refers to this CTE
    pub fn reference(&self) -> CteRef {
        CteRef {
            name: self.name.clone(),
            fields: self.fields.clone(),
        }
    }

    pub fn column(&self, name: &str) -> Option<Column> {
        field_column(&self.name, &self.fields, name)
    }

    fn own_name(&self) -> NameSet {
        name_set([self.name.as_str()])
    }
}

impl Node for Cte {
    fn nodes_of(&self) -> Vec<&dyn Node> {
        let mut nodes: Vec<&dyn Node> = vec![self.select.as_ref()];
        if let Some((_, rhs)) = &self.recursive {
            nodes.push(rhs.as_ref());
        }
        nodes
    }

    fn required_ctes_of(&self) -> NameSet {
        let required = union_of(self.nodes_of(), |node| node.required_ctes_of());
        difference(&required, &self.own_name())
    }

    fn required_static_ctes_of(&self) -> NameSet {
        let required =
            union_of(self.nodes_of(), |node| node.required_static_ctes_of());
        difference(&required, &self.own_name())
    }

    fn provided_ctes_of(&self) -> NameSet {
        self.own_name()
    }
}

impl ExpressionBuilder for Cte {
    fn build(&self, builder: &mut SQLBuilder) {
        builder.push_identifier(&self.name);
        builder.push_str(" AS (");
        self.select.build(builder);
        if let Some((kind, rhs)) = &self.recursive {
            builder.push_str(kind.keyword());
            rhs.build(builder);
        }
        builder.push(')');
    }
}

/// A CTE used as a relation
#[derive(Debug, Clone, PartialEq)]
pub struct CteRef {
    name: String,
    fields: Vec<ResultField>,
}

impl CteRef {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn column(&self, name: &str) -> Option<Column> {
        field_column(&self.name, &self.fields, name)
    }
}

impl Node for CteRef {
    fn provided_tables_of(&self) -> NameSet {
        name_set([self.name.as_str()])
    }

    fn required_ctes_of(&self) -> NameSet {
        name_set([self.name.as_str()])
    }

    fn required_static_ctes_of(&self) -> NameSet {
        self.required_ctes_of()
    }
}

impl ExpressionBuilder for CteRef {
    fn build(&self, builder: &mut SQLBuilder) {
        builder.push_identifier(&self.name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql::Standard;
    use crate::statement::select;
    use crate::testing::{TableExt, foo};
    use crate::columns;
    use crate::value::{Aliasable, Arithmetic, Comparable, Expr};

    #[test]
    fn cte_columns_follow_select() {
        let foo = foo();
        let adults = cte("adults")
            .as_(
                select(columns![foo.col("id"), foo.col("age")])
                    .unwrap()
                    .from(&foo)
                    .unwrap()
                    .where_(foo.col("age").greater_equal(18).unwrap())
                    .unwrap(),
            )
            .unwrap();

        let age = adults.column("age").unwrap();
        assert_eq!(age.table_name(), "adults");
        assert!(age.spec().flags.can_be_null);
        assert!(adults.column("name").is_none());
        assert_eq!(adults.reference().required_ctes_of(), name_set(["adults"]));
    }

    #[test]
    fn recursive_cte() {
        let counter = cte("counter")
            .as_(select(columns![Expr::from(1).as_("n")]).unwrap())
            .unwrap();
        let n = counter.column("n").unwrap();
        let counter = counter
            .clone()
            .union_all(
                select(columns![n.clone().plus(1).unwrap().as_("n")])
                    .unwrap()
                    .from(counter.reference())
                    .unwrap()
                    .where_(n.less(10).unwrap())
                    .unwrap(),
            )
            .unwrap();

        assert!(counter.is_recursive());
        assert!(counter.required_ctes_of().is_empty());
        assert_binding!(
            counter.to_sql(&Standard),
            "counter AS (SELECT 1 AS n UNION ALL SELECT counter.n + 1 AS n FROM counter WHERE counter.n < 10)"
        );
    }

    #[test]
    fn cte_cannot_use_outer_tables() {
        let foo = foo();

        assert_eq!(
            cte("x").as_(select(columns![foo.col("id")]).unwrap()),
            Err(CheckError::UnknownTableOrCte {
                names: vec!["foo".to_string()]
            })
        );
    }
}
