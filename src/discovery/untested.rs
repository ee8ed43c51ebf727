// src/discovery/untested.rs
//
// Name-based difference between functions and their pytest counterparts.

use std::collections::HashSet;

use crate::discovery::record::FunctionRecord;

/// Non-test functions with no test named `test_<name>` among `functions`.
///
/// Discovery order is preserved. Matching is by exact name across the
/// whole scan; the file a test lives in does not matter.
pub fn untested_functions(functions: &[FunctionRecord]) -> Vec<FunctionRecord> {
    let test_names: HashSet<&str> = functions
        .iter()
        .filter(|f| f.is_test)
        .map(|f| f.name.as_str())
        .collect();

    functions
        .iter()
        .filter(|f| !f.is_test)
        .filter(|f| !test_names.contains(f.expected_test_name().as_str()))
        .cloned()
        .collect()
}
