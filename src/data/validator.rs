//! Column Validator Module
//! Soft gate that checks a table carries the columns an aggregation needs.

use crate::diagnostics::Diagnostics;
use polars::prelude::*;

/// Names from `required` that `df` does not have, in the order requested.
pub fn missing_columns(df: &DataFrame, required: &[&str]) -> Vec<String> {
    let present = df.get_column_names();
    required
        .iter()
        .filter(|name| !present.iter().any(|c| c.as_str() == **name))
        .map(|name| name.to_string())
        .collect()
}

/// Check `df` has every column in `required`.
///
/// Returns `false` and records an error diagnostic naming exactly the missing
/// columns when any are absent. Never fails.
pub fn check_columns(df: &DataFrame, required: &[&str], diagnostics: &mut Diagnostics) -> bool {
    let missing = missing_columns(df, required);
    if missing.is_empty() {
        return true;
    }

    diagnostics.error(format!("Missing columns: {:?}", missing));
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passes_when_all_present() {
        let df = df!("yr" => &[0i64], "mnth" => &[1i64], "cnt" => &[5i64]).unwrap();
        let mut diagnostics = Diagnostics::new();
        assert!(check_columns(&df, &["yr", "mnth", "cnt"], &mut diagnostics));
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn lists_exactly_the_missing_names() {
        let df = df!("yr" => &[0i64], "cnt" => &[5i64]).unwrap();
        let mut diagnostics = Diagnostics::new();

        assert!(!check_columns(
            &df,
            &["weekday", "yr", "hr", "cnt"],
            &mut diagnostics
        ));
        assert_eq!(diagnostics.items().len(), 1);
        assert_eq!(
            diagnostics.items()[0].message,
            r#"Missing columns: ["weekday", "hr"]"#
        );
        assert!(diagnostics.has_errors());
    }
}
