//! Lightweight scanning of Go source headers.
//!
//! Only the package clause and the import declarations are read; everything
//! from the first top-level declaration on is ignored.

use std::sync::LazyLock;

use regex::Regex;

/// Pseudo-package that marks a cgo file.
pub const CGO_PSEUDO_PACKAGE: &str = "C";

static PACKAGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*package\s+([A-Za-z_][A-Za-z0-9_]*)").expect("package regex"));
static DECL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*(func|type|var|const)\b").expect("decl regex"));
static IMPORT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)\bimport\s*(?:\((.*?)\)|(?:[A-Za-z_.][A-Za-z0-9_]*\s+)?"([^"]*)")"#)
        .expect("import regex")
});
static SPEC_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?:[A-Za-z_.][A-Za-z0-9_]*\s+)?"([^"]*)""#).expect("import spec regex")
});

/// Header facts of one `.go` file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoFile {
    pub package: String,
    /// Imported paths in source order, `"C"` excluded.
    pub imports: Vec<String>,
    pub is_cgo: bool,
}

impl GoFile {
    /// External test files declare `package <name>_test`.
    pub fn is_external_test(&self) -> bool {
        self.package.ends_with("_test")
    }
}

/// Parse the header of a Go source file. Returns `None` without a package clause.
pub fn parse_go_file(src: &str) -> Option<GoFile> {
    let code = strip_comments(src);
    let package_match = PACKAGE_RE.captures(&code)?;
    let package = package_match.get(1)?.as_str().to_string();
    let header_start = package_match.get(0)?.end();

    let rest = &code[header_start..];
    let header = match DECL_RE.find(rest) {
        Some(m) => &rest[..m.start()],
        None => rest,
    };

    let mut imports = Vec::new();
    let mut is_cgo = false;
    let mut push = |path: &str| {
        if path == CGO_PSEUDO_PACKAGE {
            is_cgo = true;
        } else if !path.is_empty() {
            imports.push(path.to_string());
        }
    };

    for caps in IMPORT_RE.captures_iter(header) {
        if let Some(group) = caps.get(1) {
            for spec in SPEC_RE.captures_iter(group.as_str()) {
                if let Some(path) = spec.get(1) {
                    push(path.as_str());
                }
            }
        } else if let Some(path) = caps.get(2) {
            push(path.as_str());
        }
    }

    Some(GoFile {
        package,
        imports,
        is_cgo,
    })
}

/// Replace comments with whitespace, leaving string and rune literals intact.
fn strip_comments(src: &str) -> String {
    let mut out = String::with_capacity(src.len());
    let mut chars = src.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '/' if chars.peek() == Some(&'/') => {
                for next in chars.by_ref() {
                    if next == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = '\0';
                for next in chars.by_ref() {
                    if next == '\n' {
                        out.push('\n');
                    }
                    if prev == '*' && next == '/' {
                        break;
                    }
                    prev = next;
                }
                out.push(' ');
            }
            '"' | '\'' => {
                out.push(c);
                while let Some(next) = chars.next() {
                    out.push(next);
                    if next == '\\' {
                        if let Some(escaped) = chars.next() {
                            out.push(escaped);
                        }
                    } else if next == c || next == '\n' {
                        break;
                    }
                }
            }
            '`' => {
                out.push(c);
                for next in chars.by_ref() {
                    out.push(next);
                    if next == '`' {
                        break;
                    }
                }
            }
            _ => out.push(c),
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_grouped_and_single_imports() {
        let src = r#"
// Package app does things.
package app

import "fmt"

import (
	"os"
	str "strings" // aliased
	_ "embed"
	. "math"
	/* "commented/out" */
)

func main() {}
"#;
        let file = parse_go_file(src).expect("parse");
        assert_eq!(file.package, "app");
        assert_eq!(file.imports, ["fmt", "os", "strings", "embed", "math"]);
        assert!(!file.is_cgo);
        assert!(!file.is_external_test());
    }

    #[test]
    fn test_cgo_pseudo_package() {
        let src = "package sqlite\n\n/*\n#include <sqlite3.h>\n*/\nimport \"C\"\nimport \"unsafe\"\n";
        let file = parse_go_file(src).expect("parse");
        assert!(file.is_cgo);
        assert_eq!(file.imports, ["unsafe"]);
    }

    #[test]
    fn test_imports_after_declarations_ignored() {
        let src = "package p\nimport \"a\"\nvar s = `\nimport \"b\"\n`\n";
        let file = parse_go_file(src).expect("parse");
        assert_eq!(file.imports, ["a"]);
    }

    #[test]
    fn test_external_test_package() {
        let src = "package app_test\nimport (\"testing\"; \"example.com/app\")\n";
        let file = parse_go_file(src).expect("parse");
        assert!(file.is_external_test());
        assert_eq!(file.imports, ["testing", "example.com/app"]);
    }

    #[test]
    fn test_missing_package_clause() {
        assert!(parse_go_file("// just a comment\n").is_none());
        assert!(parse_go_file("// package fake\n").is_none());
    }
}
