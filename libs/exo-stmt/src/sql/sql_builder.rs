use std::sync::LazyLock;

use regex::Regex;

use crate::value::{Parameter, SqlValue};

use super::{Dialect, ExpressionBuilder};

static PLAIN_IDENTIFIER: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new("^[a-z_][a-z0-9_]*$").ok());

const RESERVED_WORDS: &[&str] = &[
    "all", "and", "as", "asc", "between", "by", "case", "check", "column", "constraint", "create",
    "cross", "default", "delete", "desc", "distinct", "drop", "else", "end", "exists", "false",
    "from", "full", "group", "having", "in", "inner", "insert", "into", "is", "join", "key",
    "left", "like", "limit", "natural", "not", "null", "offset", "on", "or", "order", "outer",
    "primary", "references", "right", "select", "set", "table", "then", "true", "union", "update",
    "user", "using", "values", "when", "where", "with",
];

pub struct SQLBuilder<'a> {
    /// The dialect that decides quoting, literal formats, and placeholders
    dialect: &'a dyn Dialect,
    /// The SQL being built with placeholders for each parameter
    sql: String,
    /// The list of parameters, in the order of their placeholders
    params: Vec<Parameter>,
    /// Indicates if column name should be rendered with the table name i.e. table.col instead
    /// of col (the latter is needed for INSERT column lists and UPDATE assignments)
    fully_qualify_column_names: bool,
}

impl<'a> SQLBuilder<'a> {
    pub fn new(dialect: &'a dyn Dialect) -> Self {
        Self {
            dialect,
            sql: String::new(),
            params: Vec::new(),
            fully_qualify_column_names: true,
        }
    }

    pub fn dialect(&self) -> &'a dyn Dialect {
        self.dialect
    }

    /// Push a string
    pub fn push_str<T: AsRef<str>>(&mut self, s: T) {
        self.sql.push_str(s.as_ref());
    }

    /// Push a character
    pub fn push(&mut self, c: char) {
        self.sql.push(c);
    }

    /// Push an identifier (table, column, alias). Plain lower-case identifiers are pushed as is;
    /// anything else (upper-case letters, special characters, reserved words) is quoted with the
    /// dialect's quote character.
    pub fn push_identifier<T: AsRef<str>>(&mut self, s: T) {
        let s = s.as_ref();
        if self.dialect.quote_all_identifiers() || needs_quoting(s) {
            let quote = self.dialect.identifier_quote();
            self.sql.push(quote);
            for c in s.chars() {
                if c == quote {
                    self.sql.push(quote);
                }
                self.sql.push(c);
            }
            self.sql.push(quote);
        } else {
            self.sql.push_str(s);
        }
    }

    /// Push a column. Push `<table_name>.<column_name>` if in fully_qualify_column_names mode,
    /// otherwise just `<column_name>`.
    pub fn push_column<T: AsRef<str>>(&mut self, table_name: T, column_name: T) {
        if self.fully_qualify_column_names {
            self.push_identifier(table_name);
            self.push('.');
        }
        self.push_identifier(column_name);
    }

    /// Push a space. This is a common operation, so it is provided as a separate method.
    pub fn push_space(&mut self) {
        self.sql.push(' ');
    }

    /// Push a parameter, which will be replaced with a placeholder in the SQL string
    /// and the parameter will be added to the list of parameters.
    pub fn push_param(&mut self, param: Parameter) {
        self.params.push(param);
        let marker = self.dialect.parameter_marker(self.params.len());
        self.push_str(marker);
    }

    /// Push a literal value, formatted and escaped for the dialect
    pub fn push_value(&mut self, value: &SqlValue) {
        match value {
            SqlValue::Null => self.push_str("NULL"),
            SqlValue::Boolean(value) => self.push_str(self.dialect.boolean_literal(*value)),
            SqlValue::Integral(value) => self.push_str(value.to_string()),
            SqlValue::UnsignedIntegral(value) => self.push_str(value.to_string()),
            SqlValue::FloatingPoint(value) => {
                if value.is_finite() {
                    self.push_str(format!("{value:?}"));
                } else if value.is_nan() {
                    self.push_str("'NaN'");
                } else if value.is_sign_positive() {
                    self.push_str("'Infinity'");
                } else {
                    self.push_str("'-Infinity'");
                }
            }
            SqlValue::Text(value) => self.push_text_literal(value),
            SqlValue::Blob(value) => self.push_str(self.dialect.blob_literal(value)),
            SqlValue::Date(value) => self.push_str(self.dialect.date_literal(value)),
            SqlValue::Timestamp(value) => self.push_str(self.dialect.timestamp_literal(value)),
            SqlValue::TimeOfDay(value) => self.push_str(self.dialect.time_literal(value)),
        }
    }

    fn push_text_literal(&mut self, value: &str) {
        let escape_backslash = self.dialect.escapes_backslash();
        self.sql.push('\'');
        for c in value.chars() {
            match c {
                '\'' => self.sql.push_str("''"),
                '\\' if escape_backslash => self.sql.push_str("\\\\"),
                _ => self.sql.push(c),
            }
        }
        self.sql.push('\'');
    }

    /// Push elements of an iterator, separated by `sep`. The `push_elem` function provides
    /// the flexibility to map the elements (compared to [`SQLBuilder::push_elems`], which assumes that
    /// the elements implement [`ExpressionBuilder`] and [`build`](ExpressionBuilder::build) is all you need to call).
    pub fn push_iter<T>(
        &mut self,
        iter: impl ExactSizeIterator<Item = T>,
        sep: &str,
        push_elem: impl Fn(&mut Self, T),
    ) {
        let len = iter.len();
        for (i, item) in iter.enumerate() {
            push_elem(self, item);

            if i < len - 1 {
                self.sql.push_str(sep);
            }
        }
    }

    /// Push elements of a slice, separated by `sep`. The elements must themselves implement
    /// `ExpressionBuilder`.
    pub fn push_elems<T: ExpressionBuilder>(&mut self, elems: &[T], sep: &str) {
        self.push_iter(elems.iter(), sep, |builder, elem| {
            elem.build(builder);
        });
    }

    /// Get the SQL string and the list of parameters. Calling this method should be the final step
    /// in building an SQL expression, and thus this builder consumes the `self`.
    pub fn into_sql(self) -> (String, Vec<Parameter>) {
        (self.sql, self.params)
    }

    /// Execute the given function with the [`Self::fully_qualify_column_names`] flag set to false.
    /// This takes a closure, so that we can restore the original value of the flag after executing
    /// the function.
    pub fn without_fully_qualified_column_names<F, R>(&mut self, func: F) -> R
    where
        F: FnOnce(&mut Self) -> R,
    {
        let cur_fully_qualify_column_names = self.fully_qualify_column_names;
        self.fully_qualify_column_names = false;
        let ret = func(self);
        self.fully_qualify_column_names = cur_fully_qualify_column_names;
        ret
    }

    /// Execute the given function with fully qualified column names, even if an enclosing clause
    /// switched them off (sub-selects inside an UPDATE, for example).
    pub fn with_fully_qualified_column_names<F, R>(&mut self, func: F) -> R
    where
        F: FnOnce(&mut Self) -> R,
    {
        let cur_fully_qualify_column_names = self.fully_qualify_column_names;
        self.fully_qualify_column_names = true;
        let ret = func(self);
        self.fully_qualify_column_names = cur_fully_qualify_column_names;
        ret
    }
}

fn needs_quoting(identifier: &str) -> bool {
    match PLAIN_IDENTIFIER.as_ref() {
        Some(plain) => !plain.is_match(identifier) || RESERVED_WORDS.contains(&identifier),
        None => true,
    }
}
