//! The narrow interface between the engine and the toolchain hosting it.
//!
//! A host supplies declarations through a [Resolver], persists generated files
//! through a [CodeGenerator], and surfaces diagnostics through a [Reporter].

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::emit::GeneratedFile;
use crate::error::Error;
use crate::model::{Declaration, SourceFile};
use crate::types::ClassName;

/// Access to the declarations visible in a single processing round.
pub trait Resolver {
    /// All classes annotated with `marker`, in a stable order.
    fn symbols_with_annotation(&self, marker: &ClassName) -> Vec<&dyn Declaration>;

    /// Look up a class declaration by name.
    ///
    /// Returns `None` if `name` does not refer to a class declaration, for
    /// instance because it names a type alias.
    fn declaration(&self, name: &ClassName) -> Option<&dyn Declaration>;
}

/// Persists generated files.
pub trait CodeGenerator {
    /// Write a generated file, and record that it depends on the file's
    /// origin.
    fn write(&mut self, file: &GeneratedFile) -> Result<(), Error>;
}

/// Keeps generated files in memory.
impl CodeGenerator for Vec<GeneratedFile> {
    fn write(&mut self, file: &GeneratedFile) -> Result<(), Error> {
        self.push(file.clone());
        Ok(())
    }
}

/// Writes generated files into a source directory, one directory per package
/// segment.
#[derive(Debug)]
pub struct Filer {
    root: PathBuf,
    dependencies: Vec<(PathBuf, Option<SourceFile>)>,
}

impl Filer {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            dependencies: Vec::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The path a generated file is written to.
    pub fn path_for(&self, file: &GeneratedFile) -> PathBuf {
        let mut path = self.root.clone();

        for segment in file.package.split('.').filter(|s| !s.is_empty()) {
            path.push(segment);
        }

        path.push(file.file_name());
        path
    }

    /// Every written file together with the source it was generated from.
    pub fn dependencies(&self) -> &[(PathBuf, Option<SourceFile>)] {
        &self.dependencies
    }
}

impl CodeGenerator for Filer {
    fn write(&mut self, file: &GeneratedFile) -> Result<(), Error> {
        let path = self.path_for(file);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| Error::Io {
                path: parent.to_owned(),
                source,
            })?;
        }

        fs::write(&path, &file.content).map_err(|source| Error::Io {
            path: path.clone(),
            source,
        })?;

        tracing::debug!(path = %path.display(), "wrote generated file");
        self.dependencies.push((path, file.origin.clone()));
        Ok(())
    }
}

/// The source element a diagnostic is attributed to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Site {
    /// A class declaration.
    Class(ClassName),
    /// The `@ContributesAssistedFactory` annotation on a class.
    Annotation { class: ClassName },
    /// The constructor of a class.
    Constructor(ClassName),
    /// A member function.
    Function { owner: ClassName, function: String },
    /// A parameter of a function or constructor.
    Parameter {
        owner: ClassName,
        function: String,
        parameter: String,
    },
}

impl fmt::Display for Site {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Class(class) => write!(fmt, "{}", class),
            Self::Annotation { class } => write!(fmt, "{} (annotation)", class),
            Self::Constructor(class) => write!(fmt, "{}.<init>", class),
            Self::Function { owner, function } => write!(fmt, "{}.{}", owner, function),
            Self::Parameter {
                owner,
                function,
                parameter,
            } => write!(fmt, "{}.{}({})", owner, function, parameter),
        }
    }
}

/// Receives compile-time diagnostics.
pub trait Reporter {
    /// Report an error at the given site.
    fn error(&mut self, site: &Site, message: &str);
}

/// A reported diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub site: Site,
    pub message: String,
}

/// Collects diagnostics in memory.
impl Reporter for Vec<Diagnostic> {
    fn error(&mut self, site: &Site, message: &str) {
        self.push(Diagnostic {
            site: site.clone(),
            message: message.to_owned(),
        });
    }
}
