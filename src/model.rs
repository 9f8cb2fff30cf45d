//! A read-only model of the declarations the engine inspects.
//!
//! The engine never talks to a compiler directly. Front ends describe classes
//! through the [Declaration] trait, either by implementing it over their own
//! symbol references or by building [ClassDeclaration] values.
//!
//! Every type mentioned by a declaration is a [TypeRef]. A front end that
//! cannot resolve a type yet, typically because another processor has not
//! generated it, must say so with [TypeRef::Unresolved] rather than leaving
//! it out.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::types::{ClassName, TypeName};

/// A reference to a type which may not be resolvable yet.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "RawTypeRef", into = "RawTypeRef")]
pub enum TypeRef {
    /// The type is known.
    Resolved(TypeName),
    /// The type could not be resolved in the current round. Holds the type as
    /// spelled in source.
    Unresolved(String),
}

impl TypeRef {
    /// Construct an unresolved reference.
    pub fn unresolved(spelling: impl Into<String>) -> Self {
        Self::Unresolved(spelling.into())
    }

    /// The resolved type, if any.
    pub fn resolved(&self) -> Option<&TypeName> {
        match self {
            Self::Resolved(ty) => Some(ty),
            Self::Unresolved(..) => None,
        }
    }

    /// The spelling of the reference if it is unresolved.
    pub fn unresolved_spelling(&self) -> Option<&str> {
        match self {
            Self::Resolved(..) => None,
            Self::Unresolved(spelling) => Some(spelling),
        }
    }
}

impl From<TypeName> for TypeRef {
    fn from(value: TypeName) -> Self {
        Self::Resolved(value)
    }
}

impl From<ClassName> for TypeRef {
    fn from(value: ClassName) -> Self {
        Self::Resolved(TypeName::class(value))
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Resolved(ty) => fmt::Display::fmt(ty, fmt),
            Self::Unresolved(spelling) => fmt.write_str(spelling),
        }
    }
}

/// Serialized form of a [TypeRef]: a type string, `{"unresolved": "..."}`,
/// or a plain class spelled out as `{"package": "...", "names": [...]}`.
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RawTypeRef {
    Unresolved { unresolved: String },
    Resolved(TypeName),
    Class(ClassName),
}

impl From<RawTypeRef> for TypeRef {
    fn from(value: RawTypeRef) -> Self {
        match value {
            RawTypeRef::Unresolved { unresolved } => Self::Unresolved(unresolved),
            RawTypeRef::Resolved(ty) => Self::Resolved(ty),
            RawTypeRef::Class(name) => Self::from(name),
        }
    }
}

impl From<TypeRef> for RawTypeRef {
    fn from(value: TypeRef) -> Self {
        match value {
            TypeRef::Unresolved(unresolved) => Self::Unresolved { unresolved },
            TypeRef::Resolved(TypeName::Class {
                name,
                arguments,
                nullable: false,
            }) if arguments.is_empty() && !name.parses_back() => Self::Class(name),
            TypeRef::Resolved(ty) => Self::Resolved(ty),
        }
    }
}

/// A constant annotation argument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Value {
    String(String),
    Class(TypeRef),
    Boolean(bool),
    Int(i64),
}

impl Value {
    /// A class literal argument, like `TestApiFactory::class`.
    pub fn class(ty: impl Into<TypeRef>) -> Self {
        Self::Class(ty.into())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(value) => write!(fmt, "{:?}", value),
            Self::Class(ty) => write!(fmt, "{}::class", ty),
            Self::Boolean(value) => fmt::Display::fmt(value, fmt),
            Self::Int(value) => fmt::Display::fmt(value, fmt),
        }
    }
}

/// An argument passed to an annotation, named or positional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Argument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub value: Value,
}

/// An annotation use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    pub name: ClassName,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub arguments: Vec<Argument>,
}

impl Annotation {
    /// An annotation without arguments.
    pub fn new(name: ClassName) -> Self {
        Self {
            name,
            arguments: Vec::new(),
        }
    }

    /// Add a positional argument.
    pub fn positional(mut self, value: Value) -> Self {
        self.arguments.push(Argument { name: None, value });
        self
    }

    /// Add a named argument.
    pub fn named(mut self, name: impl Into<String>, value: Value) -> Self {
        self.arguments.push(Argument {
            name: Some(name.into()),
            value,
        });
        self
    }

    /// Look up an argument by name, falling back to the positional argument
    /// at `index`.
    ///
    /// Kotlin lets positional arguments follow named ones as long as they sit
    /// in their own position, so `index` counts every argument.
    pub fn argument(&self, name: &str, index: usize) -> Option<&Value> {
        if let Some(argument) = self
            .arguments
            .iter()
            .find(|a| a.name.as_deref() == Some(name))
        {
            return Some(&argument.value);
        }

        self.arguments
            .get(index)
            .filter(|a| a.name.is_none())
            .map(|a| &a.value)
    }

    /// The string passed as `value`, if it is not blank.
    pub fn string_value(&self) -> Option<&str> {
        match self.argument("value", 0) {
            Some(Value::String(value)) if !value.trim().is_empty() => Some(value),
            _ => None,
        }
    }
}

fn find<'a>(annotations: &'a [Annotation], marker: &ClassName) -> Option<&'a Annotation> {
    annotations.iter().find(|a| a.name == *marker)
}

/// A value parameter of a function or constructor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeRef,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<Annotation>,
}

impl Parameter {
    pub fn new(name: impl Into<String>, ty: impl Into<TypeRef>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            annotations: Vec::new(),
        }
    }

    pub fn annotated(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    pub fn annotation(&self, marker: &ClassName) -> Option<&Annotation> {
        find(&self.annotations, marker)
    }

    pub fn is_annotated_with(&self, marker: &ClassName) -> bool {
        self.annotation(marker).is_some()
    }
}

/// A function or constructor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Function {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub returns: Option<TypeRef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<Annotation>,
    #[serde(default, rename = "abstract")]
    pub is_abstract: bool,
}

impl Function {
    /// A concrete function.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameters: Vec::new(),
            returns: None,
            annotations: Vec::new(),
            is_abstract: false,
        }
    }

    /// A constructor.
    pub fn constructor() -> Self {
        Self::new("constructor")
    }

    /// An abstract function.
    pub fn abstract_method(name: impl Into<String>) -> Self {
        Self {
            is_abstract: true,
            ..Self::new(name)
        }
    }

    pub fn parameter(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn returns(mut self, ty: impl Into<TypeRef>) -> Self {
        self.returns = Some(ty.into());
        self
    }

    pub fn annotated(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    pub fn annotation(&self, marker: &ClassName) -> Option<&Annotation> {
        find(&self.annotations, marker)
    }

    pub fn is_annotated_with(&self, marker: &ClassName) -> bool {
        self.annotation(marker).is_some()
    }
}

/// What kind of type a class declaration is.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassKind {
    Interface,
    AbstractClass,
    #[default]
    Class,
    Object,
    Enum,
    Annotation,
}

/// The source file a declaration was read from.
///
/// Generated files carry the source file of the declaration they were
/// generated for, so that the host can track the dependency between them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceFile(PathBuf);

impl SourceFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}

impl fmt::Display for SourceFile {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0.display(), fmt)
    }
}

/// A read-only view of a class declaration.
pub trait Declaration {
    /// The fully qualified name of the class.
    fn name(&self) -> &ClassName;

    fn kind(&self) -> ClassKind;

    /// The source file the class is declared in. Classes read from compiled
    /// libraries have none.
    fn source(&self) -> Option<&SourceFile>;

    fn annotations(&self) -> &[Annotation];

    fn constructors(&self) -> &[Function];

    fn supertypes(&self) -> &[TypeRef];

    /// All member functions of the class, inherited ones included.
    fn functions(&self) -> &[Function];

    /// Find the annotation with the given name.
    fn annotation(&self, marker: &ClassName) -> Option<&Annotation> {
        find(self.annotations(), marker)
    }

    fn is_annotated_with(&self, marker: &ClassName) -> bool {
        self.annotation(marker).is_some()
    }

    fn abstract_methods(&self) -> Vec<&Function> {
        self.functions().iter().filter(|f| f.is_abstract).collect()
    }
}

/// An owned class declaration.
///
/// ```rust
/// use assisted_factory::{ClassDeclaration, ClassName, Declaration, Function, Parameter, TypeName};
///
/// let string = TypeName::class(ClassName::new("kotlin", "String"));
///
/// let factory = ClassDeclaration::interface(ClassName::new("com.test", "TestApiFactory"))
///     .function(
///         Function::abstract_method("create")
///             .parameter(Parameter::new("name", string))
///             .returns(ClassName::new("com.test", "TestApi")),
///     );
///
/// assert_eq!(factory.abstract_methods().len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassDeclaration {
    pub name: ClassName,
    #[serde(default)]
    pub kind: ClassKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<SourceFile>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<Annotation>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub constructors: Vec<Function>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub supertypes: Vec<TypeRef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub functions: Vec<Function>,
}

impl ClassDeclaration {
    pub fn new(name: ClassName, kind: ClassKind) -> Self {
        Self {
            name,
            kind,
            source: None,
            annotations: Vec::new(),
            constructors: Vec::new(),
            supertypes: Vec::new(),
            functions: Vec::new(),
        }
    }

    pub fn class(name: ClassName) -> Self {
        Self::new(name, ClassKind::Class)
    }

    pub fn abstract_class(name: ClassName) -> Self {
        Self::new(name, ClassKind::AbstractClass)
    }

    pub fn interface(name: ClassName) -> Self {
        Self::new(name, ClassKind::Interface)
    }

    pub fn source(mut self, source: impl Into<PathBuf>) -> Self {
        self.source = Some(SourceFile::new(source));
        self
    }

    pub fn annotated(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    pub fn constructor(mut self, constructor: Function) -> Self {
        self.constructors.push(constructor);
        self
    }

    pub fn supertype(mut self, ty: impl Into<TypeRef>) -> Self {
        self.supertypes.push(ty.into());
        self
    }

    pub fn function(mut self, function: Function) -> Self {
        self.functions.push(function);
        self
    }
}

impl Declaration for ClassDeclaration {
    fn name(&self) -> &ClassName {
        &self.name
    }

    fn kind(&self) -> ClassKind {
        self.kind
    }

    fn source(&self) -> Option<&SourceFile> {
        self.source.as_ref()
    }

    fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    fn constructors(&self) -> &[Function] {
        &self.constructors
    }

    fn supertypes(&self) -> &[TypeRef] {
        &self.supertypes
    }

    fn functions(&self) -> &[Function] {
        &self.functions
    }
}
