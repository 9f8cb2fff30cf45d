//! Error types.
//!
//! [ValidationError] is a structural defect in the processed sources and is
//! reported through the host as a compile-time diagnostic. The message of
//! every variant is stable, since build tooling matches on it. [Error] covers
//! everything that goes wrong around the engine: reading manifests, parsing
//! type names, and writing generated files.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::host::Site;
use crate::types::{ClassName, TypeName};

/// Errors raised by the engine's infrastructure.
#[derive(Error, Debug)]
pub enum Error {
    #[error("failed to write `{}`: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("bad declaration manifest: {0}")]
    Manifest(#[from] serde_json::Error),

    #[error("bad type `{input}`: {message}")]
    TypeSyntax { input: String, message: String },
}

impl Error {
    pub(crate) fn type_syntax(input: impl Into<String>, message: impl Into<String>) -> Self {
        Self::TypeSyntax {
            input: input.into(),
            message: message.into(),
        }
    }
}

/// A declaration annotated with `@ContributesAssistedFactory` that cannot be
/// turned into a factory.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error(
        "The @ContributesAssistedFactory annotation on class '{}' must have a 'boundType' parameter",
        .class.simple_name()
    )]
    MissingBoundType { class: ClassName },

    #[error("Bound type {bound} must be a class or interface")]
    BoundTypeNotClassOrInterface { class: ClassName, bound: String },

    #[error("Couldn't find scope for {annotation}.")]
    MissingScope {
        class: ClassName,
        annotation: ClassName,
    },

    #[error(
        "Class '{}' annotated with @ContributesAssistedFactory must have a single primary constructor",
        .class.simple_name()
    )]
    MustHaveSinglePrimaryConstructor { class: ClassName },

    #[error(
        "Class '{}' annotated with @ContributesAssistedFactory must have its primary constructor annotated with @AssistedInject",
        .class.simple_name()
    )]
    ConstructorMustBeAssistedInject { class: ClassName },

    #[error(
        "The bound type '{}' for @ContributesAssistedFactory on class '{}' must be an abstract class or interface",
        .bound.simple_name(),
        .class.simple_name()
    )]
    BoundTypeMustBeAbstractOrInterface { class: ClassName, bound: ClassName },

    #[error(
        "The bound type '{}' for @ContributesAssistedFactory must have a single abstract method",
        .bound.simple_name()
    )]
    BoundTypeMustHaveSingleAbstractMethod { class: ClassName, bound: ClassName },

    #[error(
        "Class '{}' annotated with @ContributesAssistedFactory has more than one @Assisted constructor parameter with type '{ty}' and {} ('{first}' and '{second}')",
        .class.simple_name(),
        describe_key(.key)
    )]
    DuplicateAssistedParameterKey {
        class: ClassName,
        ty: TypeName,
        key: Option<String>,
        first: String,
        second: String,
    },

    #[error(
        "The assisted factory method parameters in '{}.{method}' must match the @Assisted parameters in the primary constructor of '{}'",
        .bound.simple_name(),
        .class.simple_name()
    )]
    ParameterCountMismatch {
        class: ClassName,
        bound: ClassName,
        method: String,
    },

    #[error(
        "The parameter '{parameter}' in the factory method '{}.{method}' must be annotated with @AssistedKey instead of @Assisted to avoid conflicts with Dagger's @AssistedFactory annotation",
        .bound.simple_name()
    )]
    WrongAnnotationOnFactoryParameter {
        class: ClassName,
        bound: ClassName,
        method: String,
        parameter: String,
    },

    #[error(
        "The factory method parameter '{parameter}' does not match any @Assisted parameter in the primary constructor of '{}'",
        .class.simple_name()
    )]
    UnmatchedFactoryParameter {
        class: ClassName,
        bound: ClassName,
        method: String,
        parameter: String,
    },
}

impl ValidationError {
    /// The annotated class this error was raised for.
    pub fn class(&self) -> &ClassName {
        match self {
            Self::MissingBoundType { class }
            | Self::BoundTypeNotClassOrInterface { class, .. }
            | Self::MissingScope { class, .. }
            | Self::MustHaveSinglePrimaryConstructor { class }
            | Self::ConstructorMustBeAssistedInject { class }
            | Self::BoundTypeMustBeAbstractOrInterface { class, .. }
            | Self::BoundTypeMustHaveSingleAbstractMethod { class, .. }
            | Self::DuplicateAssistedParameterKey { class, .. }
            | Self::ParameterCountMismatch { class, .. }
            | Self::WrongAnnotationOnFactoryParameter { class, .. }
            | Self::UnmatchedFactoryParameter { class, .. } => class,
        }
    }

    /// The source element the error should be attributed to.
    pub fn site(&self) -> Site {
        match self {
            Self::MissingBoundType { class }
            | Self::BoundTypeNotClassOrInterface { class, .. }
            | Self::MissingScope { class, .. }
            | Self::BoundTypeMustBeAbstractOrInterface { class, .. } => Site::Annotation {
                class: class.clone(),
            },
            Self::MustHaveSinglePrimaryConstructor { class } => Site::Class(class.clone()),
            Self::ConstructorMustBeAssistedInject { class } => Site::Constructor(class.clone()),
            Self::BoundTypeMustHaveSingleAbstractMethod { bound, .. } => Site::Class(bound.clone()),
            Self::DuplicateAssistedParameterKey { class, second, .. } => Site::Parameter {
                owner: class.clone(),
                function: String::from("constructor"),
                parameter: second.clone(),
            },
            Self::ParameterCountMismatch { bound, method, .. } => Site::Function {
                owner: bound.clone(),
                function: method.clone(),
            },
            Self::WrongAnnotationOnFactoryParameter {
                bound,
                method,
                parameter,
                ..
            }
            | Self::UnmatchedFactoryParameter {
                bound,
                method,
                parameter,
                ..
            } => Site::Parameter {
                owner: bound.clone(),
                function: method.clone(),
                parameter: parameter.clone(),
            },
        }
    }
}

fn describe_key(key: &Option<String>) -> String {
    match key {
        Some(key) => format!("key '{}'", key),
        None => String::from("no key"),
    }
}
