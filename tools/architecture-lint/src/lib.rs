//! Repo-local architecture lint for the stream relay backend.
//!
//! Every file under `backend/src` is assigned a layer from its path, and every
//! path it mentions is resolved to a crate module where possible. Two kinds of
//! rule apply:
//!
//! - module rules: the domain reaches nothing outside itself, adapters reach
//!   the domain but not each other, and only the composition root (`server`,
//!   `main.rs`, `lib.rs`) sees everything
//! - crate ownership: an infrastructure crate belongs to the adapter that wraps
//!   it; Diesel stays in `outbound::persistence` and reqwest in
//!   `outbound::media_server`
//!
//! The domain also may not touch `std::env`; configuration reaches it through
//! constructors.
//!
//! Run it with `cargo run -p architecture-lint` from the workspace root, or
//! pass the backend directory explicitly.

use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use syn::visit::Visit;

/// Library name of the backend crate, as used in absolute paths.
const CRATE_NAME: &str = "stream_relay";

/// Top-level modules of the backend crate. A bare path starting with one of
/// these is treated as a crate path.
const CRATE_ROOTS: [&str; 7] = [
    "domain",
    "inbound",
    "middleware",
    "outbound",
    "server",
    "settings",
    "doc",
];

/// Infrastructure crates and the layers allowed to name them.
const CRATE_OWNERS: &[(&str, &[Layer])] = &[
    ("diesel", &[Layer::Persistence]),
    ("diesel_async", &[Layer::Persistence]),
    ("diesel_migrations", &[Layer::Persistence]),
    ("reqwest", &[Layer::MediaServer]),
    ("base64", &[Layer::MediaServer]),
    ("ortho_config", &[Layer::Settings, Layer::Composition]),
    ("clap", &[Layer::Settings, Layer::Composition]),
    (
        "actix_web",
        &[Layer::Inbound, Layer::Middleware, Layer::Composition],
    ),
    ("actix", &[Layer::Inbound, Layer::Middleware, Layer::Composition]),
    (
        "actix_rt",
        &[Layer::Inbound, Layer::Middleware, Layer::Composition],
    ),
    ("utoipa", &[Layer::Inbound, Layer::ApiDoc, Layer::Composition]),
    ("utoipa_swagger_ui", &[Layer::Composition]),
    ("tracing_subscriber", &[Layer::Composition]),
];

/// A single boundary violation discovered by the linter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// File path relative to `backend/src`.
    pub file: PathBuf,
    /// Human-readable description of the violated rule.
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.file.display(), self.message)
    }
}

/// Summary of a clean lint run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LintReport {
    /// Number of source files checked.
    pub files_checked: usize,
}

/// Failure modes returned by the architecture lint.
#[derive(Debug)]
pub enum ArchitectureLintError {
    /// Filesystem traversal or reading failed.
    Io(io::Error),
    /// Rust source parsing failed, or a file sits outside every known layer.
    Parse { file: PathBuf, message: String },
    /// One or more boundary violations were found.
    Violations(Vec<Violation>),
}

impl fmt::Display for ArchitectureLintError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "I/O error while linting architecture: {err}"),
            Self::Parse { file, message } => {
                write!(f, "cannot lint {}: {message}", file.display())
            }
            Self::Violations(violations) => {
                writeln!(f, "{} architecture violation(s):", violations.len())?;
                for violation in violations {
                    writeln!(f, "- {violation}")?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ArchitectureLintError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for ArchitectureLintError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

/// A Rust source file to be linted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintSource {
    /// Path relative to `backend/src`.
    pub file: PathBuf,
    pub contents: String,
}

/// Lint every Rust file under `backend_dir/src`.
pub fn lint_backend_sources(backend_dir: &Path) -> Result<LintReport, ArchitectureLintError> {
    let src_dir = backend_dir.join("src");
    let mut sources = Vec::new();
    collect_sources_under(&src_dir, &src_dir, &mut sources)?;
    sources.sort_by(|left, right| left.file.cmp(&right.file));
    lint_sources(&sources)
}

/// Lint the provided Rust sources.
pub fn lint_sources(sources: &[LintSource]) -> Result<LintReport, ArchitectureLintError> {
    let mut violations = Vec::new();

    for source in sources {
        let layer =
            Layer::infer_from_path(&source.file).ok_or_else(|| ArchitectureLintError::Parse {
                file: source.file.clone(),
                message: "file is not assigned to an architecture layer".to_owned(),
            })?;
        let parsed =
            syn::parse_file(&source.contents).map_err(|err| ArchitectureLintError::Parse {
                file: source.file.clone(),
                message: err.to_string(),
            })?;
        let module = module_path_of(&source.file);
        violations.extend(
            check_file(layer, &module, &parsed)
                .into_iter()
                .map(|message| Violation {
                    file: source.file.clone(),
                    message,
                }),
        );
    }

    if violations.is_empty() {
        Ok(LintReport {
            files_checked: sources.len(),
        })
    } else {
        Err(ArchitectureLintError::Violations(violations))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layer {
    Domain,
    Inbound,
    Middleware,
    Persistence,
    MediaServer,
    /// `outbound/mod.rs` and adapters without infrastructure crates.
    Outbound,
    Settings,
    ApiDoc,
    Composition,
}

impl Layer {
    fn infer_from_path(relative_path: &Path) -> Option<Self> {
        let parts = path_components(relative_path);
        let parts = parts.iter().map(String::as_str).collect::<Vec<_>>();
        match parts.as_slice() {
            ["domain", ..] => Some(Self::Domain),
            ["inbound", ..] => Some(Self::Inbound),
            ["middleware", ..] => Some(Self::Middleware),
            ["outbound", "persistence", ..] => Some(Self::Persistence),
            ["outbound", "media_server", ..] => Some(Self::MediaServer),
            ["outbound", ..] => Some(Self::Outbound),
            ["settings.rs"] => Some(Self::Settings),
            ["doc.rs"] => Some(Self::ApiDoc),
            ["server", ..] | ["main.rs"] | ["lib.rs"] => Some(Self::Composition),
            _ => None,
        }
    }

    const fn name(self) -> &'static str {
        match self {
            Self::Domain => "domain",
            Self::Inbound => "inbound",
            Self::Middleware => "middleware",
            Self::Persistence => "outbound::persistence",
            Self::MediaServer => "outbound::media_server",
            Self::Outbound => "outbound",
            Self::Settings => "settings",
            Self::ApiDoc => "doc",
            Self::Composition => "composition root",
        }
    }

    /// Crate module prefixes this layer must not reach.
    fn forbidden_modules(self) -> &'static [&'static [&'static str]] {
        match self {
            Self::Domain => &[
                &["inbound"],
                &["middleware"],
                &["outbound"],
                &["server"],
                &["settings"],
                &["doc"],
            ],
            Self::Inbound => &[&["outbound"], &["server"], &["settings"]],
            Self::Middleware => &[&["inbound"], &["outbound"], &["server"], &["settings"]],
            Self::Persistence => &[
                &["inbound"],
                &["middleware"],
                &["server"],
                &["settings"],
                &["outbound", "media_server"],
                &["outbound", "memory"],
            ],
            Self::MediaServer => &[
                &["inbound"],
                &["middleware"],
                &["server"],
                &["settings"],
                &["outbound", "persistence"],
                &["outbound", "memory"],
            ],
            Self::Outbound => &[
                &["inbound"],
                &["middleware"],
                &["server"],
                &["settings"],
                &["outbound", "persistence"],
                &["outbound", "media_server"],
            ],
            Self::Settings => &[&["inbound"], &["middleware"], &["server"]],
            Self::ApiDoc => &[&["outbound"], &["server"], &["settings"]],
            Self::Composition => &[],
        }
    }
}

fn path_components(path: &Path) -> Vec<String> {
    path.components()
        .map(|component| component.as_os_str().to_string_lossy().into_owned())
        .collect()
}

/// Module path of a file: `domain/stream_lifecycle/mod.rs` is
/// `domain::stream_lifecycle`, `settings.rs` is `settings`.
fn module_path_of(relative_path: &Path) -> Vec<String> {
    let mut parts = path_components(relative_path);
    if let Some(last) = parts.pop() {
        let stem = last.strip_suffix(".rs").unwrap_or(&last);
        if !matches!(stem, "mod" | "lib" | "main") {
            parts.push(stem.to_owned());
        }
    }
    parts
}

/// Resolve a path to a crate module path, or `None` for external and local
/// paths.
fn resolve_crate_path(segments: &[String], module: &[String]) -> Option<Vec<String>> {
    let first = segments.first()?.as_str();
    match first {
        "crate" | CRATE_NAME => Some(segments[1..].to_vec()),
        "self" => {
            let mut resolved = module.to_vec();
            resolved.extend_from_slice(&segments[1..]);
            Some(resolved)
        }
        "super" => {
            let depth = segments.iter().take_while(|s| *s == "super").count();
            let base_len = module.len().checked_sub(depth)?;
            let mut resolved = module[..base_len].to_vec();
            resolved.extend_from_slice(&segments[depth..]);
            Some(resolved)
        }
        _ if segments.len() > 1 && CRATE_ROOTS.contains(&first) => Some(segments.to_vec()),
        _ => None,
    }
}

fn starts_with(path: &[String], prefix: &[&str]) -> bool {
    path.len() >= prefix.len() && path.iter().zip(prefix).all(|(have, want)| have == want)
}

fn crate_owners(root: &str) -> Option<&'static [Layer]> {
    CRATE_OWNERS
        .iter()
        .find(|(name, _)| *name == root)
        .map(|(_, owners)| *owners)
}

fn check_file(layer: Layer, module: &[String], parsed: &syn::File) -> BTreeSet<String> {
    let mut collector = PathCollector::default();
    collector.visit_file(parsed);

    let mut messages = BTreeSet::new();
    for segments in &collector.paths {
        if let Some(resolved) = resolve_crate_path(segments, module) {
            if let Some(prefix) = layer
                .forbidden_modules()
                .iter()
                .find(|prefix| starts_with(&resolved, prefix))
            {
                messages.insert(format!(
                    "{} module must not depend on crate::{}",
                    layer.name(),
                    prefix.join("::")
                ));
            }
            continue;
        }

        let Some(root) = segments.first().map(String::as_str) else {
            continue;
        };
        if let Some(owners) = crate_owners(root) {
            if !owners.contains(&layer) {
                let names = owners.iter().map(|owner| owner.name()).collect::<Vec<_>>();
                messages.insert(format!(
                    "external crate `{root}` is reserved for {}",
                    names.join(", ")
                ));
            }
        }
        if layer == Layer::Domain && starts_with(segments, &["std", "env"]) {
            messages.insert("domain module must not read the process environment".to_owned());
        }
    }
    messages
}

#[derive(Default)]
struct PathCollector {
    paths: BTreeSet<Vec<String>>,
}

impl PathCollector {
    fn record_use_tree(&mut self, tree: &syn::UseTree, mut prefix: Vec<String>) {
        match tree {
            syn::UseTree::Path(path) => {
                prefix.push(path.ident.to_string());
                self.record_use_tree(&path.tree, prefix);
            }
            syn::UseTree::Name(syn::UseName { ident })
            | syn::UseTree::Rename(syn::UseRename { ident, .. }) => {
                prefix.push(ident.to_string());
                self.paths.insert(prefix);
            }
            syn::UseTree::Glob(_) => {
                prefix.push("*".to_owned());
                self.paths.insert(prefix);
            }
            syn::UseTree::Group(group) => {
                for item in &group.items {
                    self.record_use_tree(item, prefix.clone());
                }
            }
        }
    }
}

impl<'ast> Visit<'ast> for PathCollector {
    fn visit_path(&mut self, node: &'ast syn::Path) {
        let segments = node
            .segments
            .iter()
            .map(|segment| segment.ident.to_string())
            .collect::<Vec<_>>();
        if !segments.is_empty() {
            self.paths.insert(segments);
        }
        syn::visit::visit_path(self, node);
    }

    fn visit_item_use(&mut self, node: &'ast syn::ItemUse) {
        self.record_use_tree(&node.tree, Vec::new());
    }
}

fn collect_sources_under(
    src_root: &Path,
    current: &Path,
    sources: &mut Vec<LintSource>,
) -> Result<(), ArchitectureLintError> {
    for entry in fs::read_dir(current)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_sources_under(src_root, &path, sources)?;
            continue;
        }
        if path.extension().and_then(|ext| ext.to_str()) != Some("rs") {
            continue;
        }

        let relative = path
            .strip_prefix(src_root)
            .map_err(|err| ArchitectureLintError::Parse {
                file: path.clone(),
                message: err.to_string(),
            })?
            .to_path_buf();
        let contents = fs::read_to_string(&path)?;
        sources.push(LintSource {
            file: relative,
            contents,
        });
    }
    Ok(())
}
