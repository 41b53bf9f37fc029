// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! The boundary to a database driver.
//!
//! The crate does not talk to databases itself. A driver implements [`Connection`] and receives
//! SQL text only after the statement passed the checks. [`insert`] and [`select`] take the
//! values of the statement's parameters as [`Bindings`] and hand them to the driver in
//! placeholder order; [`prepare`] returns a statement whose parameters are bound one by one.

use indexmap::IndexMap;
use tracing::{debug, instrument};

use crate::check_error::CheckError;
use crate::dependency::NameSet;
use crate::sql::Dialect;
use crate::statement::{InsertStatement, ResultField, SelectStatement, SqlStatement, Statement};
use crate::value::{DataType, Parameter, SqlValue, Typed};

/// A synchronous database connection
pub trait Connection {
    type Error: From<CheckError>;
    type Prepared;
    type Cursor: RowCursor<Error = Self::Error>;

    /// The dialect statements are rendered in for this connection
    fn dialect(&self) -> &dyn Dialect;

    /// Run a statement and return the number of affected rows
    fn execute(&mut self, sql: &str) -> Result<u64, Self::Error>;

    /// Run an INSERT with `values` for its placeholders, in order, and return the id of the last
    /// inserted row
    fn insert(&mut self, sql: &str, values: &[SqlValue]) -> Result<i64, Self::Error>;

    /// Run a SELECT with `values` for its placeholders, in order
    fn select(&mut self, sql: &str, values: &[SqlValue]) -> Result<Self::Cursor, Self::Error>;

    /// Prepare a statement whose placeholders stand for `parameters`, in order
    fn prepare(&mut self, sql: &str, parameters: &[Parameter])
    -> Result<Self::Prepared, Self::Error>;

    /// Bind the placeholder at `index` (0-based, in placeholder order)
    fn bind(
        &mut self,
        prepared: &mut Self::Prepared,
        index: usize,
        value: &SqlValue,
    ) -> Result<(), Self::Error>;

    /// Advance a prepared statement; `None` once there are no more rows
    fn step(&mut self, prepared: &mut Self::Prepared) -> Result<Option<Row>, Self::Error>;
}

pub trait RowCursor {
    type Error;

    fn next_row(&mut self) -> Result<Option<Row>, Self::Error>;
}

/// One result row. Fields are addressed by position, in the order of the statement's result
/// fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    values: Vec<SqlValue>,
}

impl Row {
    pub fn new(values: Vec<SqlValue>) -> Self {
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The value and whether it is `NULL`
    pub fn field(&self, index: usize) -> Option<(&SqlValue, bool)> {
        self.values
            .get(index)
            .map(|value| (value, matches!(value, SqlValue::Null)))
    }

    pub fn is_null(&self, index: usize) -> bool {
        self.field(index).is_none_or(|(_, is_null)| is_null)
    }

    pub fn values(&self) -> &[SqlValue] {
        &self.values
    }
}

/// The rows of a select together with their declared fields
pub struct ResultSet<C> {
    fields: Vec<ResultField>,
    cursor: C,
}

impl<C: RowCursor> ResultSet<C> {
    pub fn fields(&self) -> &[ResultField] {
        &self.fields
    }

    pub fn next_row(&mut self) -> Result<Option<Row>, C::Error> {
        self.cursor.next_row()
    }
}

/// Values for the named parameters of a statement
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bindings {
    values: IndexMap<String, SqlValue>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(mut self, name: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }

    /// The value of every placeholder, in placeholder order. Every parameter must be bound with
    /// a value of its type, and every binding must name a parameter.
    fn values_for(&self, parameters: &[Parameter]) -> Result<Vec<SqlValue>, CheckError> {
        if let Some(name) = self
            .values
            .keys()
            .find(|name| parameters.iter().all(|parameter| parameter.name() != name.as_str()))
        {
            return Err(CheckError::UnknownParameter { name: name.clone() });
        }

        let mut unbound = NameSet::new();
        let mut values = Vec::with_capacity(parameters.len());
        for parameter in parameters {
            match self.values.get(parameter.name()) {
                Some(value) => {
                    check_bindable(parameter, value)?;
                    values.push(value.clone());
                }
                None => {
                    unbound.insert(parameter.name().to_string());
                }
            }
        }
        if !unbound.is_empty() {
            return Err(CheckError::UnboundParameters {
                names: unbound.into_iter().collect(),
            });
        }
        Ok(values)
    }
}

/// Check a statement for preparation on the connection, render it, and resolve the values of its
/// placeholders
fn serialize_with_bindings<C: Connection, S: Statement + ?Sized>(
    connection: &C,
    statement: &S,
    bindings: &Bindings,
) -> Result<(String, Vec<SqlValue>), CheckError> {
    let SqlStatement { sql, parameters } = statement.serialize(connection.dialect())?;
    let values = bindings.values_for(&parameters)?;
    Ok((sql, values))
}

/// Run a statement without parameters
#[instrument(skip_all)]
pub fn execute<C: Connection, S: Statement + ?Sized>(
    connection: &mut C,
    statement: &S,
) -> Result<u64, C::Error> {
    statement.check_run()?;
    let sql = statement.serialize(connection.dialect())?;
    debug!(sql = %sql, "executing statement");
    connection.execute(&sql.sql)
}

#[instrument(skip_all)]
pub fn insert<C: Connection>(
    connection: &mut C,
    statement: &InsertStatement,
    bindings: &Bindings,
) -> Result<i64, C::Error> {
    let (sql, values) = serialize_with_bindings(connection, statement, bindings)?;
    debug!(%sql, values = values.len(), "inserting");
    connection.insert(&sql, &values)
}

#[instrument(skip_all)]
pub fn select<C: Connection>(
    connection: &mut C,
    statement: &SelectStatement,
    bindings: &Bindings,
) -> Result<ResultSet<C::Cursor>, C::Error> {
    let (sql, values) = serialize_with_bindings(connection, statement, bindings)?;
    debug!(%sql, values = values.len(), "selecting");
    let cursor = connection.select(&sql, &values)?;
    Ok(ResultSet {
        fields: statement.result_fields(),
        cursor,
    })
}

/// Prepare a statement. Unlike the direct entry points, the statement may contain parameters.
#[instrument(skip_all)]
pub fn prepare<C: Connection, S: Statement + ?Sized>(
    connection: &mut C,
    statement: &S,
) -> Result<PreparedStatement<C::Prepared>, C::Error> {
    let SqlStatement { sql, parameters } = statement.serialize(connection.dialect())?;
    debug!(%sql, parameters = parameters.len(), "preparing statement");
    let handle = connection.prepare(&sql, &parameters)?;
    Ok(PreparedStatement {
        handle,
        bound: vec![false; parameters.len()],
        parameters,
        fields: statement.result_fields(),
    })
}

/// A prepared statement with the parameters its placeholders stand for
pub struct PreparedStatement<P> {
    handle: P,
    parameters: Vec<Parameter>,
    bound: Vec<bool>,
    fields: Vec<ResultField>,
}

impl<P> PreparedStatement<P> {
    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    pub fn fields(&self) -> &[ResultField] {
        &self.fields
    }

    /// Bind a value to every placeholder of the named parameter
    pub fn bind<C>(
        &mut self,
        connection: &mut C,
        name: &str,
        value: impl Into<SqlValue>,
    ) -> Result<(), C::Error>
    where
        C: Connection<Prepared = P>,
    {
        let value = value.into();
        let positions: Vec<usize> = self
            .parameters
            .iter()
            .enumerate()
            .filter(|(_, parameter)| parameter.name() == name)
            .map(|(index, _)| index)
            .collect();

        let Some(&first) = positions.first() else {
            return Err(CheckError::UnknownParameter {
                name: name.to_string(),
            }
            .into());
        };
        check_bindable(&self.parameters[first], &value)?;

        for index in positions {
            connection.bind(&mut self.handle, index, &value)?;
            self.bound[index] = true;
        }
        Ok(())
    }

    /// Fetch the next row; every parameter must have been bound
    pub fn step<C>(&mut self, connection: &mut C) -> Result<Option<Row>, C::Error>
    where
        C: Connection<Prepared = P>,
    {
        let unbound: NameSet = self
            .parameters
            .iter()
            .zip(&self.bound)
            .filter(|(_, bound)| !**bound)
            .map(|(parameter, _)| parameter.name().to_string())
            .collect();
        if !unbound.is_empty() {
            return Err(CheckError::UnboundParameters {
                names: unbound.into_iter().collect(),
            }
            .into());
        }
        connection.step(&mut self.handle)
    }
}

fn check_bindable(parameter: &Parameter, value: &SqlValue) -> Result<(), CheckError> {
    let expected = parameter.value_type();
    let found = value.value_type();
    let null_mismatch = found.data_type == DataType::Null && !expected.nullable;
    if null_mismatch || !expected.is_comparable_with(&found) {
        return Err(CheckError::incompatible("bind", expected, found));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use test_log::test;

    use super::*;
    use crate::columns;
    use crate::schema::Table;
    use crate::sql::Postgres;
    use crate::statement::{delete_from, insert_into, select as select_from};
    use crate::testing::{TableExt, foo};
    use crate::value::{Comparable, Logical, parameter};

    /// Records everything it is asked to do and answers selects from a queue of rows
    #[derive(Default)]
    struct RecordingConnection {
        log: Vec<String>,
        values: Vec<Vec<SqlValue>>,
        rows: VecDeque<Row>,
    }

    struct QueuedRows(VecDeque<Row>);

    impl RowCursor for QueuedRows {
        type Error = CheckError;

        fn next_row(&mut self) -> Result<Option<Row>, CheckError> {
            Ok(self.0.pop_front())
        }
    }

    impl Connection for RecordingConnection {
        type Error = CheckError;
        type Prepared = Vec<Option<SqlValue>>;
        type Cursor = QueuedRows;

        fn dialect(&self) -> &dyn Dialect {
            &Postgres
        }

        fn execute(&mut self, sql: &str) -> Result<u64, CheckError> {
            self.log.push(sql.to_string());
            Ok(1)
        }

        fn insert(&mut self, sql: &str, values: &[SqlValue]) -> Result<i64, CheckError> {
            self.log.push(sql.to_string());
            self.values.push(values.to_vec());
            Ok(42)
        }

        fn select(&mut self, sql: &str, values: &[SqlValue]) -> Result<QueuedRows, CheckError> {
            self.log.push(sql.to_string());
            self.values.push(values.to_vec());
            Ok(QueuedRows(std::mem::take(&mut self.rows)))
        }

        fn prepare(
            &mut self,
            sql: &str,
            parameters: &[Parameter],
        ) -> Result<Vec<Option<SqlValue>>, CheckError> {
            self.log.push(sql.to_string());
            Ok(vec![None; parameters.len()])
        }

        fn bind(
            &mut self,
            prepared: &mut Vec<Option<SqlValue>>,
            index: usize,
            value: &SqlValue,
        ) -> Result<(), CheckError> {
            prepared[index] = Some(value.clone());
            Ok(())
        }

        fn step(&mut self, prepared: &mut Vec<Option<SqlValue>>) -> Result<Option<Row>, CheckError> {
            Ok(Some(Row::new(prepared.iter().flatten().cloned().collect())))
        }
    }

    fn by_id(foo: &Table) -> SelectStatement {
        let id = parameter("id", DataType::Integral);
        select_from(columns![foo.col("name"), foo.col("age")])
            .unwrap()
            .from(foo)
            .unwrap()
            .where_(
                foo.col("id")
                    .equal(id.clone())
                    .unwrap()
                    .or(foo.col("age").equal(id).unwrap())
                    .unwrap(),
            )
            .unwrap()
    }

    #[test]
    fn run_checked_statements() {
        let foo = foo();
        let mut connection = RecordingConnection::default();

        let inserted = insert(
            &mut connection,
            &insert_into(&foo)
                .set([foo.col("name").assign("x").unwrap()])
                .unwrap(),
            &Bindings::new(),
        )
        .unwrap();
        assert_eq!(inserted, 42);

        let deleted = execute(
            &mut connection,
            &delete_from(&foo).unconditionally().unwrap(),
        )
        .unwrap();
        assert_eq!(deleted, 1);

        assert_eq!(
            connection.log,
            vec![
                "INSERT INTO foo (name) VALUES ('x')".to_string(),
                "DELETE FROM foo".to_string()
            ]
        );
    }

    #[test]
    fn statements_with_unbound_parameters_are_not_run() {
        let foo = foo();
        let mut connection = RecordingConnection::default();

        assert!(matches!(
            select(&mut connection, &by_id(&foo), &Bindings::new()),
            Err(CheckError::UnboundParameters { .. })
        ));
        assert!(matches!(
            select(
                &mut connection,
                &by_id(&foo),
                &Bindings::new().bind("id", 1).bind("name", "x")
            ),
            Err(CheckError::UnknownParameter { .. })
        ));
        assert!(matches!(
            select(&mut connection, &by_id(&foo), &Bindings::new().bind("id", "x")),
            Err(CheckError::IncompatibleOperandTypes { .. })
        ));
        assert!(matches!(
            execute(&mut connection, &by_id(&foo)),
            Err(CheckError::UnboundParameters { .. })
        ));
        assert!(connection.log.is_empty());
    }

    #[test]
    fn insert_with_parameters() {
        let foo = foo();
        let mut connection = RecordingConnection::default();

        let statement = insert_into(&foo)
            .set([
                foo.col("name")
                    .assign(parameter("name", DataType::Text))
                    .unwrap(),
                foo.col("age")
                    .assign(parameter("age", DataType::Integral))
                    .unwrap(),
            ])
            .unwrap();
        let inserted = insert(
            &mut connection,
            &statement,
            &Bindings::new().bind("age", 30).bind("name", "x"),
        )
        .unwrap();

        assert_eq!(inserted, 42);
        assert_eq!(
            connection.log,
            vec!["INSERT INTO foo (name, age) VALUES ($1, $2)".to_string()]
        );
        assert_eq!(
            connection.values,
            vec![vec![SqlValue::from("x"), SqlValue::from(30)]]
        );
    }

    #[test]
    fn select_with_repeated_parameter() {
        let foo = foo();
        let mut connection = RecordingConnection::default();

        select(&mut connection, &by_id(&foo), &Bindings::new().bind("id", 7)).unwrap();

        assert_eq!(
            connection.values,
            vec![vec![SqlValue::from(7), SqlValue::from(7)]]
        );
    }

    #[test]
    fn select_rows() {
        let foo = foo();
        let mut connection = RecordingConnection::default();
        connection
            .rows
            .push_back(Row::new(vec![SqlValue::from("x"), SqlValue::Null]));

        let statement = select_from(columns![foo.col("name"), foo.col("age")])
            .unwrap()
            .from(&foo)
            .unwrap()
            .unconditionally()
            .unwrap();
        let mut rows = select(&mut connection, &statement, &Bindings::new()).unwrap();

        assert_eq!(
            rows.fields()
                .iter()
                .map(|field| field.name.as_str())
                .collect::<Vec<_>>(),
            vec!["name", "age"]
        );
        let row = rows.next_row().unwrap().unwrap();
        assert_eq!(row.field(0), Some((&SqlValue::from("x"), false)));
        assert!(row.is_null(1));
        assert!(row.is_null(2));
        assert_eq!(rows.next_row().unwrap(), None);
    }

    #[test]
    fn prepare_and_bind_by_name() {
        let foo = foo();
        let mut connection = RecordingConnection::default();
        let mut prepared = prepare(&mut connection, &by_id(&foo)).unwrap();

        assert_eq!(
            connection.log,
            vec![
                "SELECT foo.name, foo.age FROM foo WHERE (foo.id = $1) OR (foo.age = $2)"
                    .to_string()
            ]
        );
        assert_eq!(prepared.parameters().len(), 2);
        assert_eq!(prepared.fields().len(), 2);

        assert_eq!(
            prepared.step(&mut connection),
            Err(CheckError::UnboundParameters {
                names: vec!["id".to_string()]
            })
        );
        assert_eq!(
            prepared.bind(&mut connection, "name", 1),
            Err(CheckError::UnknownParameter {
                name: "name".to_string()
            })
        );
        assert!(matches!(
            prepared.bind(&mut connection, "id", "one"),
            Err(CheckError::IncompatibleOperandTypes { .. })
        ));
        assert!(matches!(
            prepared.bind(&mut connection, "id", SqlValue::Null),
            Err(CheckError::IncompatibleOperandTypes { .. })
        ));

        prepared.bind(&mut connection, "id", 7).unwrap();
        assert_eq!(
            prepared.step(&mut connection).unwrap(),
            Some(Row::new(vec![SqlValue::from(7), SqlValue::from(7)]))
        );
    }

    #[test]
    fn unbound_names_reported_once() {
        let foo = foo();
        let (id, age) = (
            parameter("id", DataType::Integral),
            parameter("age", DataType::Integral),
        );
        let statement = select_from(columns![foo.col("name")])
            .unwrap()
            .from(&foo)
            .unwrap()
            .where_(
                foo.col("id")
                    .equal(id.clone())
                    .unwrap()
                    .or(foo.col("age").equal(age).unwrap())
                    .unwrap()
                    .or(foo.col("age").equal(id).unwrap())
                    .unwrap(),
            )
            .unwrap();
        let mut connection = RecordingConnection::default();
        let mut prepared = prepare(&mut connection, &statement).unwrap();

        assert_eq!(prepared.parameters().len(), 3);
        assert_eq!(
            prepared.step(&mut connection),
            Err(CheckError::UnboundParameters {
                names: vec!["id".to_string(), "age".to_string()]
            })
        );

        prepared.bind(&mut connection, "age", 3).unwrap();
        assert_eq!(
            prepared.step(&mut connection),
            Err(CheckError::UnboundParameters {
                names: vec!["id".to_string()]
            })
        );
    }
}
