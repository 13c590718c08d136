//! Target definitions and source classification.
//!
//! A target is a set of source files compiled together into one module.
//! Its source composition decides which compiler family builds it: pure
//! C-family targets go to the native driver, anything containing Swift
//! sources goes to the managed driver.

use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Language of a single source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceLanguage {
    /// Swift (managed)
    Swift,
    /// C
    C,
    /// Objective-C
    ObjC,
    /// C++
    Cxx,
    /// Objective-C++
    ObjCxx,
}

impl SourceLanguage {
    /// Classify a source file by its extension.
    ///
    /// Returns `None` for files that are not compiled (headers, resources).
    /// Uppercase `.C` is C++ on case-sensitive filesystems.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;

        match ext {
            "swift" => Some(SourceLanguage::Swift),
            "c" => Some(SourceLanguage::C),
            "m" => Some(SourceLanguage::ObjC),
            "mm" => Some(SourceLanguage::ObjCxx),
            "cpp" | "cc" | "cxx" | "c++" | "CPP" | "CC" | "CXX" | "C" => {
                Some(SourceLanguage::Cxx)
            }
            _ => None,
        }
    }

    /// Whether the managed compiler handles this language.
    pub fn is_managed(self) -> bool {
        self == SourceLanguage::Swift
    }

    /// Whether linking this language needs the C++ runtime.
    pub fn is_cxx(self) -> bool {
        matches!(self, SourceLanguage::Cxx | SourceLanguage::ObjCxx)
    }
}

/// What kinds of sources a target contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceComposition {
    /// Only Swift sources
    Managed,
    /// Only C-family sources
    Native,
    /// Swift sources plus private C-family implementation files
    Mixed,
}

/// Source files of a target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sources {
    /// Directory the file paths are relative to
    pub root: PathBuf,

    /// Source files, relative to `root`, in declaration order
    pub files: Vec<PathBuf>,
}

impl Sources {
    /// Create a new source set.
    pub fn new(root: impl Into<PathBuf>, files: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        Sources {
            root: root.into(),
            files: files.into_iter().map(Into::into).collect(),
        }
    }

    /// Swift files, relative to the root.
    pub fn managed_files(&self) -> impl Iterator<Item = &Path> {
        self.files_where(SourceLanguage::is_managed)
    }

    /// C-family files, relative to the root.
    pub fn native_files(&self) -> impl Iterator<Item = &Path> {
        self.files_where(|lang| !lang.is_managed())
    }

    fn files_where(&self, pred: impl Fn(SourceLanguage) -> bool) -> impl Iterator<Item = &Path> {
        self.files
            .iter()
            .map(PathBuf::as_path)
            .filter(move |f| SourceLanguage::from_path(f).is_some_and(&pred))
    }

    /// Derive the composition, or `None` if nothing is compilable.
    pub fn composition(&self) -> Option<SourceComposition> {
        let managed = self.managed_files().next().is_some();
        let native = self.native_files().next().is_some();

        match (managed, native) {
            (true, true) => Some(SourceComposition::Mixed),
            (true, false) => Some(SourceComposition::Managed),
            (false, true) => Some(SourceComposition::Native),
            (false, false) => None,
        }
    }

    /// First file that is absolute or climbs out of the root with `..`.
    ///
    /// Object paths mirror source paths under the target's build directory,
    /// so every file must stay below the root.
    pub fn escaping_file(&self) -> Option<&Path> {
        self.files.iter().map(PathBuf::as_path).find(|file| {
            file.components()
                .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
        })
    }

    /// Whether any file is C++ or Objective-C++.
    pub fn has_cxx(&self) -> bool {
        self.files
            .iter()
            .filter_map(|f| SourceLanguage::from_path(f))
            .any(SourceLanguage::is_cxx)
    }
}

/// An edge from a target to something it depends on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dependency {
    /// Another target, by name
    Target(String),
    /// A product, by name
    Product(String),
}

/// A build target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    /// Target name (unique across the graph)
    pub name: String,

    /// Name of the owning package
    pub package: String,

    /// Source files
    pub sources: Sources,

    /// Public headers directory, relative to the source root or absolute
    #[serde(default)]
    pub public_include_dir: Option<PathBuf>,

    /// Dependencies, in declaration order
    #[serde(default)]
    pub dependencies: Vec<Dependency>,
}

impl Target {
    /// Create a target without include directory or dependencies.
    pub fn new(name: impl Into<String>, package: impl Into<String>, sources: Sources) -> Self {
        Target {
            name: name.into(),
            package: package.into(),
            sources,
            public_include_dir: None,
            dependencies: Vec::new(),
        }
    }

    /// Set the public headers directory.
    pub fn with_include_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.public_include_dir = Some(dir.into());
        self
    }

    /// Add a dependency on another target.
    pub fn depends_on(mut self, target: impl Into<String>) -> Self {
        self.dependencies.push(Dependency::Target(target.into()));
        self
    }

    /// Add a dependency on a product.
    pub fn depends_on_product(mut self, product: impl Into<String>) -> Self {
        self.dependencies.push(Dependency::Product(product.into()));
        self
    }

    /// Absolute public headers directory, if declared.
    pub fn include_dir(&self) -> Option<PathBuf> {
        self.public_include_dir
            .as_ref()
            .map(|dir| self.sources.root.join(dir))
    }

    /// The source composition.
    ///
    /// Graph construction rejects targets without compilable sources, so
    /// this only returns `None` for targets that never entered a graph.
    pub fn composition(&self) -> Option<SourceComposition> {
        self.sources.composition()
    }

    /// Module name usable as a C99 identifier.
    pub fn c99_name(&self) -> String {
        c99_name(&self.name)
    }
}

/// Mangle a name into a C99 identifier.
///
/// Every character outside `[A-Za-z0-9_]` becomes `_`, and a leading digit
/// gets a `_` prefix.
pub fn c99_name(name: &str) -> String {
    let mut out: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();

    if out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_language_classification() {
        assert_eq!(
            SourceLanguage::from_path(Path::new("main.swift")),
            Some(SourceLanguage::Swift)
        );
        assert_eq!(SourceLanguage::from_path(Path::new("a.c")), Some(SourceLanguage::C));
        assert_eq!(SourceLanguage::from_path(Path::new("a.m")), Some(SourceLanguage::ObjC));
        assert_eq!(
            SourceLanguage::from_path(Path::new("a.mm")),
            Some(SourceLanguage::ObjCxx)
        );

        for cxx in ["a.cpp", "a.cc", "a.cxx", "a.c++", "a.C", "a.CPP"] {
            assert_eq!(
                SourceLanguage::from_path(Path::new(cxx)),
                Some(SourceLanguage::Cxx),
                "{cxx}"
            );
        }

        assert_eq!(SourceLanguage::from_path(Path::new("a.h")), None);
        assert_eq!(SourceLanguage::from_path(Path::new("Makefile")), None);
    }

    #[test]
    fn test_composition() {
        let managed = Sources::new("/src", ["main.swift"]);
        assert_eq!(managed.composition(), Some(SourceComposition::Managed));

        let native = Sources::new("/src", ["a.c", "b.h"]);
        assert_eq!(native.composition(), Some(SourceComposition::Native));

        let mixed = Sources::new("/src", ["main.swift", "shim.cpp"]);
        assert_eq!(mixed.composition(), Some(SourceComposition::Mixed));
        assert!(mixed.has_cxx());

        let empty = Sources::new("/src", ["README.md"]);
        assert_eq!(empty.composition(), None);
    }

    #[test]
    fn test_escaping_file() {
        let inside = Sources::new("/pkg/lib", ["a.c", "./nested/b.c"]);
        assert_eq!(inside.escaping_file(), None);

        let absolute = Sources::new("/pkg/lib", ["a.c", "/elsewhere/x.c"]);
        assert_eq!(absolute.escaping_file(), Some(Path::new("/elsewhere/x.c")));

        let parent = Sources::new("/pkg/lib", ["../other/y.c"]);
        assert_eq!(parent.escaping_file(), Some(Path::new("../other/y.c")));
    }

    #[test]
    fn test_include_dir_resolves_against_root() {
        let target = Target::new("lib", "pkg", Sources::new("/pkg/Sources/lib", ["lib.c"]))
            .with_include_dir("include");
        assert_eq!(
            target.include_dir(),
            Some(PathBuf::from("/pkg/Sources/lib/include"))
        );

        let absolute = target.with_include_dir("/opt/headers");
        assert_eq!(absolute.include_dir(), Some(PathBuf::from("/opt/headers")));
    }

    #[test]
    fn test_c99_name() {
        assert_eq!(c99_name("foo"), "foo");
        assert_eq!(c99_name("foo-bar.baz"), "foo_bar_baz");
        assert_eq!(c99_name("1st"), "_1st");
    }
}
