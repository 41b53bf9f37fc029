#![cfg(test)]

//! Test assertion to check SQL statements and parameters.

/// Assert that the given parameters match the expected ones (by name).
///
/// # Usage:
/// ```no_run
/// assert_params!(actual_params, "expected_name1", "expected_name2", ...);
/// ```
macro_rules! assert_params {
    ($actual_params:expr) => {
        assert!($actual_params.is_empty(), "Extra actual parameters");
    };
    ($actual_params:expr, $($expected_name:expr),+) => {
        let actual_names: Vec<&str> = $actual_params.iter().map(|param| param.name()).collect();
        let expected_names: Vec<&str> = vec![$($expected_name),+];
        assert_eq!(actual_names, expected_names, "Parameter mismatch");
    };
}

/// Assert on the `(sql, params)` pair produced by `to_sql` or `serialize`
macro_rules! assert_binding {
    ($actual:expr, $expected_stmt:expr) => {
        let (actual_stmt, actual_params) = $actual;
        assert_eq!(actual_stmt, $expected_stmt);
        assert_params!(actual_params);
    };
    ($actual:expr, $expected_stmt:expr, $($rest:expr), *) => {
        let (actual_stmt, actual_params) = $actual;
        assert_eq!(actual_stmt, $expected_stmt);
        assert_params!(actual_params, $($rest), *);
    };
}
