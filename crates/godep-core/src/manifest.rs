//! Reading the project manifest (`go.mod`).
//!
//! Only the parts the graph needs are interpreted: the module path and the
//! `require` directives. Other directives are accepted and skipped.

use std::fs;
use std::path::Path;

use godep_error::{Error, Result};

use crate::policy::RequiredDeps;

pub const MANIFEST_FILE: &str = "go.mod";

/// Directives that are valid in a manifest but carry nothing for the graph.
const SKIPPED_DIRECTIVES: &[&str] = &[
    "go", "toolchain", "godebug", "replace", "exclude", "retract", "tool", "ignore",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    pub path: String,
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    pub module: String,
    pub requires: Vec<Requirement>,
}

impl Manifest {
    /// Read and parse `<project_root>/go.mod`.
    pub fn read(project_root: &Path) -> Result<Self> {
        let path = project_root.join(MANIFEST_FILE);
        let text = fs::read_to_string(&path).map_err(|e| {
            Error::manifest_read(path.display().to_string())
                .with_operation("manifest::read")
                .set_source(e)
        })?;
        Self::parse(&text).map_err(|e| e.with_context("path", path.display().to_string()))
    }

    pub fn parse(text: &str) -> Result<Self> {
        let mut module: Option<String> = None;
        let mut requires = Vec::new();
        let mut block: Option<String> = None;

        for (idx, raw) in text.lines().enumerate() {
            let line_no = idx + 1;
            let tokens = tokenize(raw).map_err(|msg| {
                Error::manifest_parse(line_no, msg).with_operation("manifest::parse")
            })?;
            if tokens.is_empty() {
                continue;
            }

            if let Some(verb) = block.as_deref() {
                if tokens.len() == 1 && tokens[0] == ")" {
                    block = None;
                    continue;
                }
                apply_directive(verb, &tokens, line_no, &mut module, &mut requires)?;
                continue;
            }

            let verb = tokens[0].as_str();
            match &tokens[1..] {
                [open] if open == "(" => {
                    block = Some(verb.to_string());
                }
                [open, close] if open == "(" && close == ")" => {}
                args => apply_directive(verb, args, line_no, &mut module, &mut requires)?,
            }
        }

        if let Some(verb) = block {
            return Err(Error::manifest_parse(
                text.lines().count(),
                format!("unterminated {verb} block"),
            )
            .with_operation("manifest::parse"));
        }

        let module = module.ok_or_else(|| {
            Error::manifest_parse(0, "no module declaration").with_operation("manifest::parse")
        })?;

        Ok(Self { module, requires })
    }

    /// External dependency path prefixes, in declaration order.
    pub fn required_deps(&self) -> RequiredDeps {
        RequiredDeps::from_manifest(self)
    }

    /// The requirement providing `import_path`, longest module path first.
    pub fn requirement_for(&self, import_path: &str) -> Option<&Requirement> {
        self.requires
            .iter()
            .filter(|r| is_path_prefix(&r.path, import_path))
            .max_by_key(|r| r.path.len())
    }

    /// Whether `import_path` lives inside the main module.
    pub fn owns(&self, import_path: &str) -> bool {
        is_path_prefix(&self.module, import_path)
    }
}

/// `prefix` equals `path` or is one of its leading path elements.
pub(crate) fn is_path_prefix(prefix: &str, path: &str) -> bool {
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

fn apply_directive(
    verb: &str,
    args: &[String],
    line_no: usize,
    module: &mut Option<String>,
    requires: &mut Vec<Requirement>,
) -> Result<()> {
    let parse_err = |msg: String| Error::manifest_parse(line_no, msg).with_operation("manifest::parse");

    match verb {
        "module" => {
            if module.is_some() {
                return Err(parse_err("repeated module statement".to_string()));
            }
            match args {
                [path] => *module = Some(path.clone()),
                _ => return Err(parse_err("usage: module module/path".to_string())),
            }
        }
        "require" => match args {
            [path, version] => requires.push(Requirement {
                path: path.clone(),
                version: version.clone(),
            }),
            _ => return Err(parse_err("usage: require module/path v1.2.3".to_string())),
        },
        v if SKIPPED_DIRECTIVES.contains(&v) => {}
        other => return Err(parse_err(format!("unknown directive: {other}"))),
    }
    Ok(())
}

/// Split a manifest line into tokens, dropping `//` comments and unquoting strings.
fn tokenize(line: &str) -> std::result::Result<Vec<String>, String> {
    let mut tokens = Vec::new();
    let mut chars = line.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '(' | ')' => {
                tokens.push(c.to_string());
                chars.next();
            }
            '/' => {
                chars.next();
                if chars.peek() == Some(&'/') {
                    break;
                }
                let mut word = String::from('/');
                take_word(&mut chars, &mut word);
                tokens.push(word);
            }
            '"' => {
                chars.next();
                let mut s = String::new();
                loop {
                    match chars.next() {
                        Some('\\') => match chars.next() {
                            Some(escaped) => s.push(escaped),
                            None => return Err("unterminated quoted string".to_string()),
                        },
                        Some('"') => break,
                        Some(ch) => s.push(ch),
                        None => return Err("unterminated quoted string".to_string()),
                    }
                }
                tokens.push(s);
            }
            '`' => {
                chars.next();
                let mut s = String::new();
                loop {
                    match chars.next() {
                        Some('`') => break,
                        Some(ch) => s.push(ch),
                        None => return Err("unterminated raw string".to_string()),
                    }
                }
                tokens.push(s);
            }
            _ => {
                let mut word = String::new();
                take_word(&mut chars, &mut word);
                tokens.push(word);
            }
        }
    }

    Ok(tokens)
}

fn take_word(chars: &mut std::iter::Peekable<std::str::Chars<'_>>, word: &mut String) {
    while let Some(&c) = chars.peek() {
        if c.is_whitespace() || matches!(c, '(' | ')' | '"' | '`') {
            break;
        }
        if c == '/' {
            let mut ahead = chars.clone();
            ahead.next();
            if ahead.peek() == Some(&'/') {
                break;
            }
        }
        word.push(c);
        chars.next();
    }
}
