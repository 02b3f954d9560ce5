//! Header line scanning
//!
//! Two dialects share one scan:
//! - `// import a.b` / `//import a.b` name a module directly
//! - `goog.require('sym')` names a symbol resolved through the directory index;
//!   a `goog.provide(...)` line marks the module as symbol-dialect

use tracing::trace;

use crate::error::{Result, ScriptError};

const IMPORT_PREFIXES: [&str; 2] = ["// import ", "//import "];
pub const REQUIRE_CALL: &str = "goog.require(";
pub const PROVIDE_CALL: &str = "goog.provide(";

/// Dependency declarations found in a module's content
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderInfo {
    /// Dotted names from import lines, in order
    pub imports: Vec<String>,
    /// Symbols from require lines, in order
    pub requires: Vec<String>,
    /// At least one provide line was seen
    pub is_symbol_dialect: bool,
}

/// Scan every line of `content` for dependency declarations.
///
/// `origin` names the module in error messages.
pub fn parse_header(origin: &str, content: &str) -> Result<HeaderInfo> {
    let mut info = HeaderInfo::default();

    for line in content.split('\n') {
        let trimmed = line.trim_end();
        if let Some(name) = IMPORT_PREFIXES
            .iter()
            .find_map(|prefix| trimmed.strip_prefix(prefix))
        {
            info.imports.push(name.to_string());
        } else if let Some(rest) = line.strip_prefix(REQUIRE_CALL) {
            info.requires.push(call_argument(origin, line, rest)?);
        } else if line.starts_with(PROVIDE_CALL) {
            info.is_symbol_dialect = true;
        }
    }

    trace!(
        target: "scriptcat::header",
        origin,
        imports = info.imports.len(),
        requires = info.requires.len(),
        symbol_dialect = info.is_symbol_dialect,
        "parsed header"
    );
    Ok(info)
}

/// Extract the single string argument of a provide/require call.
///
/// `rest` is the line after the opening parenthesis. The argument runs up to
/// the first `)`; single quotes around it are swapped for double quotes and
/// the result is decoded as a JSON string.
pub fn call_argument(origin: &str, line: &str, rest: &str) -> Result<String> {
    let malformed = || ScriptError::MalformedCall {
        origin: origin.to_string(),
        line: line.trim_end().to_string(),
    };

    let (quoted, _) = rest.split_once(')').ok_or_else(malformed)?;
    let normalized = match quoted
        .strip_prefix('\'')
        .and_then(|s| s.strip_suffix('\''))
    {
        Some(inner) => format!("\"{}\"", inner),
        None => quoted.to_string(),
    };
    serde_json::from_str::<String>(&normalized).map_err(|_| malformed())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_both_quote_styles() {
        let line = "goog.provide(\"test one\")";
        assert_eq!(
            call_argument("t", line, &line[PROVIDE_CALL.len()..]).unwrap(),
            "test one"
        );
        let line = "goog.provide('test one');";
        assert_eq!(
            call_argument("t", line, &line[PROVIDE_CALL.len()..]).unwrap(),
            "test one"
        );
    }

    #[test]
    fn test_json_escapes_decode() {
        let line = r#"goog.require('\u0041A')"#;
        assert_eq!(
            call_argument("t", line, &line[REQUIRE_CALL.len()..]).unwrap(),
            "AA"
        );
    }

    #[test]
    fn test_unquoted_argument_is_malformed() {
        let line = "goog.require(foo)";
        let err = call_argument("t", line, &line[REQUIRE_CALL.len()..]).unwrap_err();
        assert!(matches!(err, ScriptError::MalformedCall { .. }));

        let line = "goog.require('never closed'";
        assert!(call_argument("t", line, &line[REQUIRE_CALL.len()..]).is_err());
    }

    #[test]
    fn test_imports_and_requires() {
        let content = "// import p.mod1\n\
                       //import  p.mod2 \r\n\
                       goog.require('q.r');\n\
                       goog.require(\"q.s\");\n\
                       body();\n";
        let info = parse_header("t", content).unwrap();
        assert_eq!(info.imports, vec!["p.mod1", " p.mod2"]);
        assert_eq!(info.requires, vec!["q.r", "q.s"]);
        assert!(!info.is_symbol_dialect);
    }

    #[test]
    fn test_provide_marks_symbol_dialect() {
        let info = parse_header("t", "goog.provide('x.y');\nx.y = 1;\n").unwrap();
        assert!(info.is_symbol_dialect);
        assert!(info.imports.is_empty());
        assert!(info.requires.is_empty());
    }

    #[test]
    fn test_prefixes_must_start_the_line() {
        let content = "  // import p.mod1\n x = goog.require('a')\n//importp.x\n// import\n\
                       // import \n//import   \n// import \t\r\n";
        let info = parse_header("t", content).unwrap();
        assert_eq!(info, HeaderInfo::default());
    }

    #[test]
    fn test_empty_content() {
        assert_eq!(parse_header("t", "").unwrap(), HeaderInfo::default());
    }
}
