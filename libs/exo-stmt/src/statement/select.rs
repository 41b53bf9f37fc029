// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use crate::check::{check_aggregates, require};
use crate::check_error::{CheckError, ClauseKind};
use crate::clause::{
    ForUpdateClause, FromClause, GroupByClause, HavingClause, LimitClause, OffsetClause, OrderByClause,
    ResultField, SelectColumn, SelectColumnList, SelectFlag, SelectFlagList, UnionClause,
    UnionKind, WhereClause, WithClause, supply,
};
use crate::dependency::{NameSet, Node, difference, union_of};
use crate::dynamic::MaybeDynamic;
use crate::relation::{Cte, DerivedTable, JoinKind, Relation};
use crate::sql::{Dialect, ExpressionBuilder, SQLBuilder};
use crate::value::{Expr, SortOrder, ValueType};

use super::Statement;

/// Start a select with the given output columns (see [`crate::columns!`])
pub fn select(columns: Vec<SelectColumn>) -> Result<SelectStatement, CheckError> {
    SelectStatement::default().columns(columns)
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectStatement {
    with: Option<WithClause>,
    flags: Option<SelectFlagList>,
    columns: Option<SelectColumnList>,
    from: Option<FromClause>,
    where_: Option<WhereClause>,
    group_by: Option<GroupByClause>,
    having: Option<HavingClause>,
    union: Option<UnionClause>,
    order_by: Option<OrderByClause>,
    limit: Option<LimitClause>,
    offset: Option<OffsetClause>,
    for_update: Option<ForUpdateClause>,
}

impl SelectStatement {
    /// Once the statement is the left operand of a UNION, only LIMIT and OFFSET can follow
    fn check_not_union(&self) -> Result<(), CheckError> {
        match self.union {
            Some(_) => Err(CheckError::ClauseAlreadySupplied {
                clause: ClauseKind::Union,
            }),
            None => Ok(()),
        }
    }

    pub fn with<I, C>(mut self, ctes: I) -> Result<Self, CheckError>
    where
        I: IntoIterator<Item = C>,
        C: Into<MaybeDynamic<Cte>>,
    {
        self.check_not_union()?;
        let with = WithClause::new(ctes.into_iter().map(Into::into).collect())?;
        supply(&mut self.with, ClauseKind::With, with)?;
        Ok(self)
    }

    pub fn flags<I, F>(mut self, flags: I) -> Result<Self, CheckError>
    where
        I: IntoIterator<Item = F>,
        F: Into<MaybeDynamic<SelectFlag>>,
    {
        self.check_not_union()?;
        let flags = SelectFlagList::new(flags.into_iter().map(Into::into).collect())?;
        supply(&mut self.flags, ClauseKind::SelectFlags, flags)?;
        Ok(self)
    }

    pub fn distinct(self) -> Result<Self, CheckError> {
        self.flags([SelectFlag::Distinct])
    }

    pub fn columns(mut self, columns: Vec<SelectColumn>) -> Result<Self, CheckError> {
        self.check_not_union()?;
        let columns = SelectColumnList::new(columns)?;
        supply(&mut self.columns, ClauseKind::SelectColumns, columns)?;
        Ok(self)
    }

    pub fn from(mut self, relation: impl Into<Relation>) -> Result<Self, CheckError> {
        self.check_not_union()?;
        supply(
            &mut self.from,
            ClauseKind::From,
            FromClause::new(relation.into()),
        )?;
        Ok(self)
    }

    pub fn where_(mut self, condition: impl Into<MaybeDynamic<Expr>>) -> Result<Self, CheckError> {
        self.check_not_union()?;
        let where_ = WhereClause::new(condition.into())?;
        supply(&mut self.where_, ClauseKind::Where, where_)?;
        Ok(self)
    }

    /// Explicitly select all rows of the FROM relations
    pub fn unconditionally(mut self) -> Result<Self, CheckError> {
        self.check_not_union()?;
        supply(&mut self.where_, ClauseKind::Where, WhereClause::Unconditional)?;
        Ok(self)
    }

    pub fn group_by<I, E>(mut self, expressions: I) -> Result<Self, CheckError>
    where
        I: IntoIterator<Item = E>,
        E: Into<MaybeDynamic<Expr>>,
    {
        self.check_not_union()?;
        let group_by = GroupByClause::new(expressions.into_iter().map(Into::into).collect())?;
        supply(&mut self.group_by, ClauseKind::GroupBy, group_by)?;
        Ok(self)
    }

    pub fn having(mut self, condition: impl Into<MaybeDynamic<Expr>>) -> Result<Self, CheckError> {
        self.check_not_union()?;
        let having = HavingClause::new(condition.into())?;
        supply(&mut self.having, ClauseKind::Having, having)?;
        Ok(self)
    }

    pub fn order_by<I, O>(mut self, orders: I) -> Result<Self, CheckError>
    where
        I: IntoIterator<Item = O>,
        O: Into<MaybeDynamic<SortOrder>>,
    {
        self.check_not_union()?;
        let order_by = OrderByClause::new(orders.into_iter().map(Into::into).collect())?;
        supply(&mut self.order_by, ClauseKind::OrderBy, order_by)?;
        Ok(self)
    }

    pub fn limit(mut self, limit: impl Into<MaybeDynamic<Expr>>) -> Result<Self, CheckError> {
        let limit = LimitClause::new(limit.into())?;
        supply(&mut self.limit, ClauseKind::Limit, limit)?;
        Ok(self)
    }

    pub fn offset(mut self, offset: impl Into<MaybeDynamic<Expr>>) -> Result<Self, CheckError> {
        let offset = OffsetClause::new(offset.into())?;
        supply(&mut self.offset, ClauseKind::Offset, offset)?;
        Ok(self)
    }

    /// Lock the selected rows. Not available once the select is the left operand of a UNION.
    pub fn for_update(mut self) -> Result<Self, CheckError> {
        self.check_not_union()?;
        supply(&mut self.for_update, ClauseKind::ForUpdate, ForUpdateClause)?;
        Ok(self)
    }

    pub fn union_all(self, rhs: SelectStatement) -> Result<Self, CheckError> {
        self.union(UnionKind::All, rhs)
    }

    pub fn union_distinct(self, rhs: SelectStatement) -> Result<Self, CheckError> {
        self.union(UnionKind::Distinct, rhs)
    }

    fn union(self, kind: UnionKind, rhs: SelectStatement) -> Result<Self, CheckError> {
        if self.limit.is_some() || self.offset.is_some() {
            return Err(CheckError::ClauseAlreadySupplied {
                clause: ClauseKind::Limit,
            });
        }
        if self.for_update.is_some() || rhs.for_update.is_some() {
            return Err(CheckError::ClauseAlreadySupplied {
                clause: ClauseKind::ForUpdate,
            });
        }
        Ok(SelectStatement {
            union: Some(UnionClause::new(kind, self, rhs)?),
            ..Default::default()
        })
    }

    /// Use the select as a table in the FROM clause of another statement. The select must be
    /// complete on its own.
    pub fn as_table(self, alias: impl Into<String>) -> Result<DerivedTable, CheckError> {
        self.check_prepare()?;
        let fields = self.result_fields();
        Ok(DerivedTable::new(self, alias.into(), fields))
    }

    /// The type of the select used as a single value (`IN (SELECT ...)`, scalar sub-selects).
    /// The select may yield no row, so the value is nullable.
    pub(crate) fn scalar_value_type(&self) -> Result<ValueType, CheckError> {
        self.check_consistency()?;
        match self.result_fields().as_slice() {
            [field] => Ok(field.value_type.with_nullable(true)),
            fields => Err(CheckError::NotASingleColumnSelect {
                found: fields.len(),
            }),
        }
    }

    fn optional_tables(&self) -> NameSet {
        self.from
            .as_ref()
            .map(Node::provided_optional_tables_of)
            .unwrap_or_default()
    }
}

impl Statement for SelectStatement {
    fn check_consistency(&self) -> Result<(), CheckError> {
        if self.union.is_some() {
            // Both operands were checked when the union was formed
            return Ok(());
        }

        require(&self.columns, ClauseKind::SelectColumns)?;
        let provides_tables = self
            .from
            .as_ref()
            .is_some_and(|from| !from.provided_tables_of().is_empty());
        if provides_tables {
            require(&self.where_, ClauseKind::Where)?;
        }

        if let Some(columns) = &self.columns {
            check_aggregates(
                columns,
                self.group_by.as_ref(),
                self.having.as_ref(),
                self.order_by.as_ref(),
            )?;
        }

        Ok(())
    }

    fn result_fields(&self) -> Vec<ResultField> {
        match (&self.union, &self.columns) {
            (Some(union), _) => union.result_fields(),
            (None, Some(columns)) => columns.fields(&self.optional_tables()),
            (None, None) => Vec::new(),
        }
    }

    fn check_dialect(&self, dialect: &dyn Dialect) -> Result<(), CheckError> {
        let full_outer_join = self
            .from
            .as_ref()
            .is_some_and(|from| from.uses_join_kind(JoinKind::FullOuter));
        if full_outer_join && !dialect.supports_full_outer_join() {
            return Err(CheckError::UnsupportedByDialect {
                feature: "FULL OUTER JOIN",
                dialect: dialect.name(),
            });
        }
        if self.for_update.is_some() && !dialect.supports_for_update() {
            return Err(CheckError::UnsupportedByDialect {
                feature: "FOR UPDATE",
                dialect: dialect.name(),
            });
        }
        Ok(())
    }
}

impl Node for SelectStatement {
    fn nodes_of(&self) -> Vec<&dyn Node> {
        let mut nodes: Vec<&dyn Node> = Vec::new();
        nodes.extend(self.with.iter().map(|clause| clause as &dyn Node));
        nodes.extend(self.flags.iter().map(|clause| clause as &dyn Node));
        nodes.extend(self.columns.iter().map(|clause| clause as &dyn Node));
        nodes.extend(self.from.iter().map(|clause| clause as &dyn Node));
        nodes.extend(self.where_.iter().map(|clause| clause as &dyn Node));
        nodes.extend(self.group_by.iter().map(|clause| clause as &dyn Node));
        nodes.extend(self.having.iter().map(|clause| clause as &dyn Node));
        nodes.extend(self.union.iter().map(|clause| clause as &dyn Node));
        nodes.extend(self.order_by.iter().map(|clause| clause as &dyn Node));
        nodes.extend(self.limit.iter().map(|clause| clause as &dyn Node));
        nodes.extend(self.offset.iter().map(|clause| clause as &dyn Node));
        nodes
    }

    /// Tables used but not provided by the select. For a nested select these are the correlated
    /// references to the enclosing statement.
    fn required_tables_of(&self) -> NameSet {
        let required = union_of(self.nodes_of(), |node| node.required_tables_of());
        difference(&required, &self.provided_tables_of())
    }

    fn required_static_tables_of(&self) -> NameSet {
        let required = union_of(self.nodes_of(), |node| node.required_static_tables_of());
        difference(&required, &self.provided_static_tables_of())
    }

    fn provided_tables_of(&self) -> NameSet {
        self.from
            .as_ref()
            .map(Node::provided_tables_of)
            .unwrap_or_default()
    }

    fn provided_static_tables_of(&self) -> NameSet {
        self.from
            .as_ref()
            .map(Node::provided_static_tables_of)
            .unwrap_or_default()
    }

    fn required_ctes_of(&self) -> NameSet {
        let required = union_of(self.nodes_of(), |node| node.required_ctes_of());
        difference(&required, &self.provided_ctes_of())
    }

    fn required_static_ctes_of(&self) -> NameSet {
        let required = union_of(self.nodes_of(), |node| node.required_static_ctes_of());
        difference(&required, &self.provided_static_ctes_of())
    }

    fn provided_ctes_of(&self) -> NameSet {
        self.with
            .as_ref()
            .map(Node::provided_ctes_of)
            .unwrap_or_default()
    }

    fn provided_static_ctes_of(&self) -> NameSet {
        self.with
            .as_ref()
            .map(Node::provided_static_ctes_of)
            .unwrap_or_default()
    }

    /// A nested select is a value of its own; its aggregates do not make the enclosing
    /// expression an aggregate
    fn contains_aggregate(&self) -> bool {
        false
    }
}

impl ExpressionBuilder for SelectStatement {
    fn build(&self, builder: &mut SQLBuilder) {
        match &self.union {
            Some(union) => union.build(builder),
            None => {
                self.with.build(builder);
                builder.push_str("SELECT ");
                self.flags.build(builder);
                self.columns.build(builder);
                self.from.build(builder);
                self.where_.build(builder);
                self.group_by.build(builder);
                self.having.build(builder);
            }
        }
        self.order_by.build(builder);
        self.limit.build(builder);
        self.offset.build(builder);
        self.for_update.build(builder);
    }
}
