//! Validation of `@ContributesAssistedFactory` declarations.
//!
//! Checks run in a fixed order and stop at the first failure, so a
//! declaration is reported at most once per round. A declaration that passes
//! all of them turns into a [GenerationPlan].

use serde::Serialize;

use crate::config::Markers;
use crate::error::ValidationError;
use crate::host::Resolver;
use crate::key::ParameterKey;
use crate::matcher::Matcher;
use crate::model::{ClassKind, Declaration, Parameter, SourceFile, TypeRef, Value};
use crate::types::{ClassName, TypeName};

/// Everything needed to render a factory, in the order it is rendered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationPlan {
    /// The class annotated with `@ContributesAssistedFactory`.
    pub annotated: ClassName,
    /// The scope the factory is contributed to.
    pub scope: ClassName,
    pub bound_type: BoundType,
    pub factory_method: FactoryMethod,
    /// The source file of the annotated class.
    pub origin: Option<SourceFile>,
}

/// The type the generated factory implements or extends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoundType {
    pub name: ClassName,
    pub kind: BoundKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundKind {
    Interface,
    AbstractClass,
}

/// The bound type's single abstract method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FactoryMethod {
    pub name: String,
    /// In the order the bound type declares them.
    pub parameters: Vec<FactoryParameter>,
}

/// A factory method parameter and the constructor parameter it supplies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FactoryParameter {
    pub name: String,
    pub ty: TypeName,
    /// The `@AssistedKey` value of the factory method parameter.
    pub key: Option<String>,
    /// The name of the matching assisted constructor parameter.
    pub constructor_parameter: String,
}

/// Why a declaration did not produce a [GenerationPlan].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// The declaration is invalid. Retrying will not change that.
    Invalid(ValidationError),
    /// The declaration references types that cannot be resolved yet. Holds
    /// their spellings.
    Unresolved(Vec<String>),
}

impl From<ValidationError> for Rejection {
    fn from(value: ValidationError) -> Self {
        Self::Invalid(value)
    }
}

/// Validates a single annotated class.
pub struct Validator<'a> {
    markers: &'a Markers,
    resolver: &'a dyn Resolver,
    class: &'a dyn Declaration,
}

impl<'a> Validator<'a> {
    pub fn new(markers: &'a Markers, resolver: &'a dyn Resolver, class: &'a dyn Declaration) -> Self {
        Self {
            markers,
            resolver,
            class,
        }
    }

    /// Run all checks.
    pub fn validate(&self) -> Result<GenerationPlan, Rejection> {
        let class = self.class.name();
        let annotation = self.class.annotation(&self.markers.contributes_assisted_factory);

        let bound_ref = match annotation.and_then(|a| a.argument("boundType", 1)) {
            Some(Value::Class(ty)) => ty,
            Some(other) => {
                return Err(ValidationError::BoundTypeNotClassOrInterface {
                    class: class.clone(),
                    bound: other.to_string(),
                }
                .into())
            }
            None => {
                return Err(ValidationError::MissingBoundType {
                    class: class.clone(),
                }
                .into())
            }
        };

        let bound_ty = resolved(bound_ref)?;

        let bound = match bound_ty
            .class_name()
            .and_then(|name| self.resolver.declaration(name))
        {
            Some(bound) => bound,
            None => {
                let bound = match bound_ty.class_name() {
                    Some(name) => name.simple_name().to_owned(),
                    None => bound_ty.to_string(),
                };

                return Err(ValidationError::BoundTypeNotClassOrInterface {
                    class: class.clone(),
                    bound,
                }
                .into());
            }
        };

        let scope = match annotation.and_then(|a| a.argument("scope", 0)) {
            Some(Value::Class(ty)) => resolved(ty)?.class_name().cloned(),
            _ => None,
        };

        let scope = match scope {
            Some(scope) => scope,
            None => {
                return Err(ValidationError::MissingScope {
                    class: class.clone(),
                    annotation: self.markers.contributes_assisted_factory.clone(),
                }
                .into())
            }
        };

        let constructor = match self.class.constructors() {
            [constructor] => constructor,
            _ => {
                return Err(ValidationError::MustHaveSinglePrimaryConstructor {
                    class: class.clone(),
                }
                .into())
            }
        };

        if !constructor.is_annotated_with(&self.markers.assisted_inject) {
            return Err(ValidationError::ConstructorMustBeAssistedInject {
                class: class.clone(),
            }
            .into());
        }

        let kind = match bound.kind() {
            ClassKind::Interface => BoundKind::Interface,
            ClassKind::AbstractClass => BoundKind::AbstractClass,
            _ => {
                return Err(ValidationError::BoundTypeMustBeAbstractOrInterface {
                    class: class.clone(),
                    bound: bound.name().clone(),
                }
                .into())
            }
        };

        let factory_method = match bound.abstract_methods().as_slice() {
            [method] => *method,
            _ => {
                return Err(ValidationError::BoundTypeMustHaveSingleAbstractMethod {
                    class: class.clone(),
                    bound: bound.name().clone(),
                }
                .into())
            }
        };

        let mut assisted = Vec::new();

        for parameter in &constructor.parameters {
            if let Some(annotation) = parameter.annotation(&self.markers.assisted) {
                let key = ParameterKey::new(resolved(&parameter.ty)?.clone(), annotation.string_value());
                assisted.push((key, parameter));
            }
        }

        let matcher = Matcher::new(assisted).map_err(|collision| {
            ValidationError::DuplicateAssistedParameterKey {
                class: class.clone(),
                ty: collision.key.ty().clone(),
                key: collision.key.tag().map(String::from),
                first: collision.first.name.clone(),
                second: collision.second.name.clone(),
            }
        })?;

        if matcher.len() != factory_method.parameters.len() {
            return Err(ValidationError::ParameterCountMismatch {
                class: class.clone(),
                bound: bound.name().clone(),
                method: factory_method.name.clone(),
            }
            .into());
        }

        for parameter in &factory_method.parameters {
            if parameter.is_annotated_with(&self.markers.assisted)
                && !parameter.is_annotated_with(&self.markers.assisted_key)
            {
                return Err(ValidationError::WrongAnnotationOnFactoryParameter {
                    class: class.clone(),
                    bound: bound.name().clone(),
                    method: factory_method.name.clone(),
                    parameter: parameter.name.clone(),
                }
                .into());
            }
        }

        let mut keyed = Vec::new();

        for parameter in &factory_method.parameters {
            keyed.push((self.factory_key(parameter)?, parameter));
        }

        let matches = matcher.pair(keyed).map_err(|unmatched| {
            ValidationError::UnmatchedFactoryParameter {
                class: class.clone(),
                bound: bound.name().clone(),
                method: factory_method.name.clone(),
                parameter: unmatched.parameter.name.clone(),
            }
        })?;

        let parameters = matches
            .into_iter()
            .map(|m| FactoryParameter {
                name: m.factory.name.clone(),
                ty: m.key.ty().clone(),
                key: m.key.tag().map(String::from),
                constructor_parameter: m.constructor.name.clone(),
            })
            .collect();

        Ok(GenerationPlan {
            annotated: class.clone(),
            scope,
            bound_type: BoundType {
                name: bound.name().clone(),
                kind,
            },
            factory_method: FactoryMethod {
                name: factory_method.name.clone(),
                parameters,
            },
            origin: self.class.source().cloned(),
        })
    }

    fn factory_key(&self, parameter: &Parameter) -> Result<ParameterKey, Rejection> {
        let tag = parameter
            .annotation(&self.markers.assisted_key)
            .and_then(|a| a.string_value());

        Ok(ParameterKey::new(resolved(&parameter.ty)?.clone(), tag))
    }
}

fn resolved(ty: &TypeRef) -> Result<&TypeName, Rejection> {
    match ty {
        TypeRef::Resolved(ty) => Ok(ty),
        TypeRef::Unresolved(spelling) => Err(Rejection::Unresolved(vec![spelling.clone()])),
    }
}

/// Collect the spellings of every type `class` depends on that cannot be
/// resolved yet, without duplicates.
///
/// This covers the class's constructor parameters and supertypes, the class
/// literals passed to its `@ContributesAssistedFactory` annotation, and the
/// signatures of the bound type's abstract methods.
pub fn unresolved_references(
    class: &dyn Declaration,
    resolver: &dyn Resolver,
    markers: &Markers,
) -> Vec<String> {
    let mut refs = Vec::<&TypeRef>::new();
    let annotation = class.annotation(&markers.contributes_assisted_factory);

    for argument in annotation.into_iter().flat_map(|a| &a.arguments) {
        if let Value::Class(ty) = &argument.value {
            refs.push(ty);
        }
    }

    for constructor in class.constructors() {
        refs.extend(constructor.parameters.iter().map(|p| &p.ty));
    }

    refs.extend(class.supertypes());

    let bound = annotation
        .and_then(|a| match a.argument("boundType", 1) {
            Some(Value::Class(TypeRef::Resolved(ty))) => ty.class_name(),
            _ => None,
        })
        .and_then(|name| resolver.declaration(name));

    if let Some(bound) = bound {
        for method in bound.abstract_methods() {
            refs.extend(method.parameters.iter().map(|p| &p.ty));
            refs.extend(method.returns.as_ref());
        }
    }

    let mut unresolved = Vec::new();

    for spelling in refs.into_iter().filter_map(TypeRef::unresolved_spelling) {
        if !unresolved.iter().any(|u| u == spelling) {
            unresolved.push(spelling.to_owned());
        }
    }

    unresolved
}
