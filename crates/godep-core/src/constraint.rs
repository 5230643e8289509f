//! Build constraints.
//!
//! A file belongs to a package only when its `_GOOS`/`_GOARCH` name suffix and
//! its `//go:build` line (or legacy `// +build` lines) hold for the target.

use std::collections::BTreeSet;

use godep_error::{Error, ErrorKind, Result};

const KNOWN_OS: &[&str] = &[
    "aix", "android", "darwin", "dragonfly", "freebsd", "hurd", "illumos", "ios", "js", "linux",
    "nacl", "netbsd", "openbsd", "plan9", "solaris", "wasip1", "windows", "zos",
];

const KNOWN_ARCH: &[&str] = &[
    "386", "amd64", "amd64p32", "arm", "armbe", "arm64", "arm64be", "loong64", "mips", "mipsle",
    "mips64", "mips64le", "mips64p32", "mips64p32le", "ppc", "ppc64", "ppc64le", "riscv",
    "riscv64", "s390", "s390x", "sparc", "sparc64", "wasm",
];

const UNIX_OS: &[&str] = &[
    "aix", "android", "darwin", "dragonfly", "freebsd", "hurd", "illumos", "ios", "linux",
    "netbsd", "openbsd", "solaris",
];

/// Target platform and extra tags that constraints are evaluated against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildContext {
    goos: String,
    goarch: String,
    cgo_enabled: bool,
    tags: BTreeSet<String>,
}

impl Default for BuildContext {
    fn default() -> Self {
        Self::host()
    }
}

impl BuildContext {
    pub fn new(goos: impl Into<String>, goarch: impl Into<String>) -> Self {
        Self {
            goos: goos.into(),
            goarch: goarch.into(),
            cgo_enabled: true,
            tags: BTreeSet::new(),
        }
    }

    /// The running platform, overridden by `$GOOS`, `$GOARCH` and `$CGO_ENABLED`.
    pub fn host() -> Self {
        let goos = env_value("GOOS").unwrap_or_else(|| host_goos().to_string());
        let goarch = env_value("GOARCH").unwrap_or_else(|| host_goarch().to_string());
        let cgo_enabled = env_value("CGO_ENABLED").is_none_or(|v| v != "0");
        Self::new(goos, goarch).with_cgo(cgo_enabled)
    }

    pub fn with_cgo(mut self, enabled: bool) -> Self {
        self.cgo_enabled = enabled;
        self
    }

    /// Extra tags that satisfy constraints, as with `go build -tags`.
    pub fn with_tags<I, T>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.tags
            .extend(tags.into_iter().map(Into::<String>::into).filter(|t| !t.is_empty()));
        self
    }

    pub fn goos(&self) -> &str {
        &self.goos
    }

    pub fn goarch(&self) -> &str {
        &self.goarch
    }

    /// Whether a single build tag is satisfied. Unknown tags are false.
    pub fn matches_tag(&self, tag: &str) -> bool {
        if self.tags.contains(tag) || tag == self.goos || tag == self.goarch {
            return true;
        }
        match tag {
            "gc" => true,
            "cgo" => self.cgo_enabled,
            "unix" => UNIX_OS.contains(&self.goos.as_str()),
            "linux" => self.goos == "android",
            "solaris" => self.goos == "illumos",
            "darwin" => self.goos == "ios",
            _ => is_release_tag(tag),
        }
    }

    /// Whether the `_GOOS`, `_GOARCH` or `_GOOS_GOARCH` suffix of `file_name`, if any, matches.
    pub fn matches_file_name(&self, file_name: &str) -> bool {
        let stem = file_name.split('.').next().unwrap_or(file_name);
        let Some(first) = stem.find('_') else {
            return true;
        };
        let mut parts: Vec<&str> = stem[first..].split('_').collect();
        if parts.last() == Some(&"test") {
            parts.pop();
        }

        let n = parts.len();
        if n >= 2 && KNOWN_OS.contains(&parts[n - 2]) && KNOWN_ARCH.contains(&parts[n - 1]) {
            return self.matches_tag(parts[n - 2]) && self.matches_tag(parts[n - 1]);
        }
        match parts.last() {
            Some(last) if KNOWN_OS.contains(last) || KNOWN_ARCH.contains(last) => {
                self.matches_tag(last)
            }
            _ => true,
        }
    }

    /// Whether the constraint lines in the header of `src` hold.
    ///
    /// A `//go:build` line wins over `// +build` lines, which are ANDed together.
    pub fn allows_source(&self, src: &str) -> Result<bool> {
        let mut legacy = Vec::new();
        for line in constraint_lines(src) {
            if let Some(expr) = go_build_expr(line) {
                return self.eval(expr);
            }
            if let Some(options) = plus_build_options(line) {
                legacy.push(options);
            }
        }
        Ok(legacy.iter().all(|options| self.eval_plus_build(options)))
    }

    /// Evaluate a `//go:build` expression: tags, `!`, `&&`, `||` and parentheses.
    pub fn eval(&self, expr: &str) -> Result<bool> {
        let tokens = tokenize(expr)?;
        if tokens.is_empty() {
            return Err(invalid_expr(expr, "empty expression"));
        }
        let mut parser = ExprParser {
            expr,
            tokens,
            pos: 0,
            ctx: self,
        };
        let value = parser.or()?;
        if parser.pos != parser.tokens.len() {
            return Err(invalid_expr(expr, "unexpected trailing tokens"));
        }
        Ok(value)
    }

    /// `a,b c` means `(a && b) || c`.
    fn eval_plus_build(&self, options: &str) -> bool {
        options.split_whitespace().any(|option| {
            option.split(',').all(|term| match term.strip_prefix('!') {
                Some(tag) => !tag.is_empty() && !self.matches_tag(tag),
                None => self.matches_tag(term),
            })
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token<'a> {
    Not,
    And,
    Or,
    Open,
    Close,
    Tag(&'a str),
}

fn tokenize(expr: &str) -> Result<Vec<Token<'_>>> {
    let mut tokens = Vec::new();
    let mut rest = expr.trim_start();
    while let Some(c) = rest.chars().next() {
        let (token, len) = if rest.starts_with("&&") {
            (Token::And, 2)
        } else if rest.starts_with("||") {
            (Token::Or, 2)
        } else if c == '!' {
            (Token::Not, 1)
        } else if c == '(' {
            (Token::Open, 1)
        } else if c == ')' {
            (Token::Close, 1)
        } else {
            let len = rest
                .find(|c: char| !(c.is_alphanumeric() || c == '_' || c == '.'))
                .unwrap_or(rest.len());
            if len == 0 {
                return Err(invalid_expr(expr, format!("unexpected character {c:?}")));
            }
            (Token::Tag(&rest[..len]), len)
        };
        tokens.push(token);
        rest = rest[len..].trim_start();
    }
    Ok(tokens)
}

/// Recursive descent over the token list, evaluating as it goes.
struct ExprParser<'a, 'c> {
    expr: &'a str,
    tokens: Vec<Token<'a>>,
    pos: usize,
    ctx: &'c BuildContext,
}

impl<'a> ExprParser<'a, '_> {
    fn next(&mut self) -> Option<Token<'a>> {
        let token = self.tokens.get(self.pos).copied();
        self.pos += 1;
        token
    }

    fn eat(&mut self, token: Token<'a>) -> bool {
        if self.tokens.get(self.pos) == Some(&token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn or(&mut self) -> Result<bool> {
        let mut value = self.and()?;
        while self.eat(Token::Or) {
            let rhs = self.and()?;
            value = value || rhs;
        }
        Ok(value)
    }

    fn and(&mut self) -> Result<bool> {
        let mut value = self.not()?;
        while self.eat(Token::And) {
            let rhs = self.not()?;
            value = value && rhs;
        }
        Ok(value)
    }

    fn not(&mut self) -> Result<bool> {
        if self.eat(Token::Not) {
            return Ok(!self.not()?);
        }
        self.atom()
    }

    fn atom(&mut self) -> Result<bool> {
        let expr = self.expr;
        let ctx = self.ctx;
        match self.next() {
            Some(Token::Open) => {
                let value = self.or()?;
                if !self.eat(Token::Close) {
                    return Err(invalid_expr(expr, "missing )"));
                }
                Ok(value)
            }
            Some(Token::Tag(tag)) => Ok(ctx.matches_tag(tag)),
            Some(token) => Err(invalid_expr(expr, format!("unexpected {token:?}"))),
            None => Err(invalid_expr(expr, "unexpected end of expression")),
        }
    }
}

fn invalid_expr(expr: &str, why: impl std::fmt::Display) -> Error {
    Error::new(
        ErrorKind::ResolutionFailed,
        format!("invalid //go:build expression {expr:?}: {why}"),
    )
}

/// Comment lines ahead of the package clause, block comments skipped.
fn constraint_lines(src: &str) -> impl Iterator<Item = &str> {
    let mut in_block = false;
    src.lines()
        .map(str::trim)
        .take_while(move |line| {
            if in_block {
                in_block = !line.contains("*/");
                return true;
            }
            if line.starts_with("/*") {
                in_block = !line.contains("*/");
                return true;
            }
            line.is_empty() || line.starts_with("//")
        })
        .filter(|line| line.starts_with("//"))
}

fn go_build_expr(line: &str) -> Option<&str> {
    let rest = line.strip_prefix("//go:build")?;
    (rest.is_empty() || rest.starts_with(char::is_whitespace)).then(|| rest.trim())
}

fn plus_build_options(line: &str) -> Option<&str> {
    let rest = line.strip_prefix("//")?.trim_start().strip_prefix("+build")?;
    (rest.is_empty() || rest.starts_with(char::is_whitespace)).then(|| rest.trim())
}

/// `go1.N`: every release tag is satisfied.
fn is_release_tag(tag: &str) -> bool {
    tag.strip_prefix("go1.")
        .is_some_and(|minor| !minor.is_empty() && minor.bytes().all(|b| b.is_ascii_digit()))
}

fn env_value(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

fn host_goos() -> &'static str {
    match std::env::consts::OS {
        "macos" => "darwin",
        other => other,
    }
}

fn host_goarch() -> &'static str {
    let little = cfg!(target_endian = "little");
    match std::env::consts::ARCH {
        "x86" => "386",
        "x86_64" => "amd64",
        "aarch64" => "arm64",
        "loongarch64" => "loong64",
        "powerpc" => "ppc",
        "powerpc64" if little => "ppc64le",
        "powerpc64" => "ppc64",
        "mips" if little => "mipsle",
        "mips64" if little => "mips64le",
        "wasm32" => "wasm",
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linux() -> BuildContext {
        BuildContext::new("linux", "amd64")
    }

    #[test]
    fn test_file_name_suffixes() {
        let ctx = linux();
        assert!(ctx.matches_file_name("a.go"));
        assert!(ctx.matches_file_name("a_linux.go"));
        assert!(ctx.matches_file_name("a_amd64.go"));
        assert!(ctx.matches_file_name("a_linux_amd64_test.go"));
        assert!(ctx.matches_file_name("windows.go"));
        assert!(ctx.matches_file_name("a_helper.go"));
        assert!(!ctx.matches_file_name("a_windows.go"));
        assert!(!ctx.matches_file_name("a_arm64.go"));
        assert!(!ctx.matches_file_name("a_linux_arm64.go"));
        assert!(!ctx.matches_file_name("a_darwin_test.go"));
    }

    #[test]
    fn test_tags() {
        let ctx = linux();
        assert!(ctx.matches_tag("unix"));
        assert!(ctx.matches_tag("gc"));
        assert!(ctx.matches_tag("cgo"));
        assert!(ctx.matches_tag("go1.21"));
        assert!(!ctx.matches_tag("tools"));
        assert!(!ctx.matches_tag("ignore"));
        assert!(!ctx.clone().with_cgo(false).matches_tag("cgo"));
        assert!(ctx.with_tags(["tools"]).matches_tag("tools"));
        assert!(BuildContext::new("android", "arm64").matches_tag("linux"));
        assert!(!BuildContext::new("windows", "amd64").matches_tag("unix"));
    }

    #[test]
    fn test_eval_expressions() {
        let ctx = linux();
        assert!(ctx.eval("linux && amd64").expect("eval"));
        assert!(ctx.eval("windows || linux").expect("eval"));
        assert!(ctx.eval("!windows").expect("eval"));
        assert!(!ctx.eval("linux && !(amd64 || arm64)").expect("eval"));
        assert!(ctx.eval("(darwin || linux) && !js").expect("eval"));
        assert!(!ctx.eval("tools").expect("eval"));
    }

    #[test]
    fn test_eval_rejects_malformed() {
        let ctx = linux();
        for expr in ["", "linux &&", "(linux", "linux)", "linux amd64", "linux & amd64"] {
            let err = ctx.eval(expr).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::ResolutionFailed, "{expr}");
        }
    }

    #[test]
    fn test_allows_source() {
        let ctx = linux();
        assert!(ctx.allows_source("package main\n").expect("plain"));
        assert!(!ctx.allows_source("//go:build ignore\n\npackage main\n").expect("ignore"));
        assert!(!ctx.allows_source("//go:build tools\n\npackage tools\n").expect("tools"));
        assert!(ctx.allows_source("// Copyright.\n\n//go:build linux\n\npackage p\n").expect("linux"));
        assert!(ctx.allows_source("/* license\n*/\n//go:build unix\npackage p\n").expect("block"));
        assert!(ctx.allows_source("package main\n//go:build ignore\n").expect("after clause"));
    }

    #[test]
    fn test_legacy_plus_build_lines() {
        let ctx = linux();
        assert!(!ctx.allows_source("// +build ignore\n\npackage main\n").expect("ignore"));
        assert!(ctx.allows_source("// +build darwin linux\n\npackage p\n").expect("or"));
        assert!(!ctx.allows_source("// +build linux,arm64\n\npackage p\n").expect("and"));
        assert!(!ctx
            .allows_source("// +build linux\n// +build !amd64\n\npackage p\n")
            .expect("lines and"));
        // go:build takes precedence
        assert!(ctx
            .allows_source("//go:build linux\n// +build windows\n\npackage p\n")
            .expect("precedence"));
    }
}
