//! Package metadata sources.
//!
//! The traversal only needs `PackageSource`; `GoSourceTree` answers it from a
//! Go checkout on disk.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use godep_error::{Error, ErrorKind, Result};
use tracing::{debug, trace};

use crate::constraint::BuildContext;
use crate::manifest::Manifest;
use crate::scan::parse_go_file;
use crate::unit::UnitFacts;

/// Resolves a package name, relative to a search directory, into its facts.
pub trait PackageSource {
    fn resolve(&self, name: &str, search_dir: &Path) -> Result<UnitFacts>;
}

impl<S: PackageSource + ?Sized> PackageSource for &S {
    fn resolve(&self, name: &str, search_dir: &Path) -> Result<UnitFacts> {
        (**self).resolve(name, search_dir)
    }
}

/// Where a package name led.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Location {
    Dir { dir: PathBuf, is_stdlib: bool },
    /// Standard library package recognised by name alone (no GOROOT known).
    Builtin,
}

/// Package metadata read from Go sources on disk.
#[derive(Debug, Clone)]
pub struct GoSourceTree {
    project_root: PathBuf,
    manifest: Manifest,
    goroot: Option<PathBuf>,
    mod_cache: Option<PathBuf>,
    build: BuildContext,
}

impl GoSourceTree {
    pub fn new(project_root: impl Into<PathBuf>, manifest: Manifest) -> Self {
        Self {
            project_root: project_root.into(),
            manifest,
            goroot: None,
            mod_cache: default_mod_cache(),
            build: BuildContext::host(),
        }
    }

    pub fn with_goroot(mut self, goroot: Option<PathBuf>) -> Self {
        self.goroot = goroot;
        self
    }

    pub fn with_mod_cache(mut self, mod_cache: Option<PathBuf>) -> Self {
        self.mod_cache = mod_cache;
        self
    }

    /// Platform and tags used to select the files of each package.
    pub fn with_build_context(mut self, build: BuildContext) -> Self {
        self.build = build;
        self
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    fn locate(&self, name: &str, search_dir: &Path) -> Result<Location> {
        if name.starts_with("./") || name.starts_with("../") || name == "." || name == ".." {
            return self.existing(search_dir.join(name), false, name);
        }

        if self.manifest.owns(name) {
            let dir = match name[self.manifest.module.len()..].strip_prefix('/') {
                Some(rest) => self.project_root.join(rest),
                None => self.project_root.clone(),
            };
            return self.existing(dir, false, name);
        }

        let dotless = !first_element(name).contains('.');
        match &self.goroot {
            Some(goroot) => {
                let dir = goroot.join("src").join(name);
                if dir.is_dir() {
                    return Ok(Location::Dir {
                        dir,
                        is_stdlib: true,
                    });
                }
            }
            None if dotless => return Ok(Location::Builtin),
            None => {}
        }

        let vendored = self.project_root.join("vendor").join(name);
        if vendored.is_dir() {
            return Ok(Location::Dir {
                dir: vendored,
                is_stdlib: false,
            });
        }

        if let (Some(cache), Some(req)) = (&self.mod_cache, self.manifest.requirement_for(name)) {
            let mut dir = cache.join(format!("{}@{}", escape_module_path(&req.path), req.version));
            let rest = &name[req.path.len()..];
            if let Some(rest) = rest.strip_prefix('/') {
                dir = dir.join(rest);
            }
            if dir.is_dir() {
                return Ok(Location::Dir {
                    dir,
                    is_stdlib: false,
                });
            }
        }

        Err(Error::resolution_failed(
            name,
            format!("cannot find package \"{name}\""),
        ))
    }

    fn existing(&self, dir: PathBuf, is_stdlib: bool, name: &str) -> Result<Location> {
        if dir.is_dir() {
            Ok(Location::Dir { dir, is_stdlib })
        } else {
            Err(Error::resolution_failed(
                name,
                format!("cannot find package \"{name}\" in {}", dir.display()),
            ))
        }
    }

    fn scan_dir(&self, dir: &Path, is_stdlib: bool) -> Result<UnitFacts> {
        let mut files: Vec<PathBuf> = fs::read_dir(dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| is_candidate_file(path))
            .collect();
        files.sort();

        let mut package: Option<(String, String)> = None;
        let mut test_packages: Vec<(String, String)> = Vec::new();
        let mut imports = BTreeSet::new();
        let mut test_imports = BTreeSet::new();
        let mut has_native = false;
        let mut seen_files = 0usize;
        let mut excluded_files = 0usize;

        for path in &files {
            let file_name = path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or_default()
                .to_string();
            if !self.build.matches_file_name(&file_name) {
                trace!(file = %path.display(), "excluded by file name");
                excluded_files += 1;
                continue;
            }

            let src = fs::read_to_string(path)?;
            let allowed = self
                .build
                .allows_source(&src)
                .map_err(|e| e.with_context("file", path.display().to_string()))?;
            if !allowed {
                trace!(file = %path.display(), "excluded by build constraint");
                excluded_files += 1;
                continue;
            }

            let Some(file) = parse_go_file(&src) else {
                return Err(Error::new(
                    ErrorKind::ResolutionFailed,
                    format!("{}: expected 'package' clause", path.display()),
                )
                .with_context("file", path.display().to_string()));
            };
            seen_files += 1;

            if file_name.ends_with("_test.go") {
                let base = if file.is_external_test() {
                    file.package.strip_suffix("_test").unwrap_or(&file.package)
                } else {
                    file.package.as_str()
                };
                test_packages.push((base.to_string(), file_name));
                test_imports.extend(file.imports.iter().cloned());
                continue;
            }

            match &package {
                Some((pkg, first)) if *pkg != file.package => {
                    return Err(conflicting_packages(
                        dir,
                        (pkg.as_str(), first.as_str()),
                        (file.package.as_str(), file_name.as_str()),
                    ));
                }
                Some(_) => {}
                None => package = Some((file.package.clone(), file_name.clone())),
            }

            has_native |= file.is_cgo;
            imports.extend(file.imports.iter().cloned());
        }

        if let Some((pkg, first)) = &package {
            if let Some((other, file)) = test_packages.iter().find(|(base, _)| base != pkg) {
                return Err(conflicting_packages(
                    dir,
                    (pkg.as_str(), first.as_str()),
                    (other.as_str(), file.as_str()),
                ));
            }
        }

        if seen_files == 0 {
            if excluded_files > 0 {
                return Err(Error::new(
                    ErrorKind::NoGoFiles,
                    format!("build constraints exclude all Go files in {}", dir.display()),
                ));
            }
            return Err(Error::no_go_files(dir.display().to_string()));
        }

        Ok(UnitFacts {
            dir: dir.to_path_buf(),
            imports: imports.into_iter().collect(),
            test_imports: test_imports.into_iter().collect(),
            is_stdlib,
            has_native,
        })
    }
}

impl PackageSource for GoSourceTree {
    fn resolve(&self, name: &str, search_dir: &Path) -> Result<UnitFacts> {
        let annotate = |e: Error| {
            e.with_operation("source::resolve")
                .with_context("search_dir", search_dir.display().to_string())
        };

        match self.locate(name, search_dir).map_err(annotate)? {
            Location::Builtin => {
                debug!(package = name, "standard library package");
                Ok(UnitFacts {
                    dir: search_dir.to_path_buf(),
                    is_stdlib: true,
                    ..UnitFacts::default()
                })
            }
            Location::Dir { dir, is_stdlib } => {
                debug!(package = name, dir = %dir.display(), "located package");
                self.scan_dir(&dir, is_stdlib)
                    .map_err(|e| annotate(e.with_context("package", name)))
            }
        }
    }
}

fn conflicting_packages(dir: &Path, first: (&str, &str), second: (&str, &str)) -> Error {
    Error::new(
        ErrorKind::ResolutionFailed,
        format!(
            "found packages {} ({}) and {} ({}) in {}",
            first.0,
            first.1,
            second.0,
            second.1,
            dir.display()
        ),
    )
}

/// `$GOMODCACHE`, else the first `$GOPATH` entry, else `$HOME/go`, joined with `pkg/mod`.
fn default_mod_cache() -> Option<PathBuf> {
    if let Some(cache) = std::env::var_os("GOMODCACHE").filter(|v| !v.is_empty()) {
        return Some(PathBuf::from(cache));
    }
    let gopath = std::env::var_os("GOPATH")
        .and_then(|v| std::env::split_paths(&v).next())
        .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join("go")))?;
    Some(gopath.join("pkg").join("mod"))
}

/// Module cache case-encoding: every upper-case letter becomes `!` plus its lower-case form.
fn escape_module_path(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    for c in path.chars() {
        if c.is_ascii_uppercase() {
            out.push('!');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

fn first_element(name: &str) -> &str {
    name.split('/').next().unwrap_or(name)
}

fn is_candidate_file(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    name.ends_with(".go") && !name.starts_with('_') && !name.starts_with('.') && path.is_file()
}
