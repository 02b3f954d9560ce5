//! Test-module discovery for generated test-runner pages

use scriptcat_core::header::{call_argument, PROVIDE_CALL};
use scriptcat_core::Script;
use tracing::debug;

use crate::error::Result;
use crate::session::Session;

/// Child-module pattern used when none is given
pub const DEFAULT_TEST_PATTERN: &str = "Test*";

/// First symbol provided by each child of `packages` matching `pattern`.
///
/// Children without a provide line are skipped.
pub fn discover_test_modules<S: AsRef<str>>(
    session: &mut Session,
    packages: &[S],
    pattern: Option<&str>,
) -> Result<Vec<String>> {
    let pattern = pattern.unwrap_or(DEFAULT_TEST_PATTERN);
    let mut modules = Vec::new();
    for package in packages {
        for child in session.script(package.as_ref()).child_modules(pattern)? {
            match first_provide(&child)? {
                Some(symbol) => modules.push(symbol),
                None => debug!(target: "scriptcat::index", module = %child, "no provide line, skipped"),
            }
        }
    }
    Ok(modules)
}

fn first_provide(script: &Script) -> Result<Option<String>> {
    let content = script.content()?;
    let origin = script.to_string();
    for line in content.split('\n') {
        if let Some(rest) = line.strip_prefix(PROVIDE_CALL) {
            return Ok(Some(call_argument(&origin, line, rest)?));
        }
    }
    Ok(None)
}

/// JSON array literal of module names, for embedding in a page
pub fn module_list_json<S: AsRef<str>>(modules: &[S]) -> String {
    let names: Vec<&str> = modules.iter().map(AsRef::as_ref).collect();
    serde_json::to_string(&names).unwrap_or_else(|_| "[]".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_list_json() {
        assert_eq!(module_list_json(&["cw.Test", "a\"b"]), r#"["cw.Test","a\"b"]"#);
        assert_eq!(module_list_json::<&str>(&[]), "[]");
    }
}
