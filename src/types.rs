//! Structural names for Kotlin types.
//!
//! A [TypeName] is compared structurally: two types are the same if they name
//! the same classes with the same arguments, variance and nullability. Labels
//! on function type parameters, like `categoryId` in
//! `(categoryId: Long) -> Unit`, are not part of a type's identity and are
//! dropped when parsing.
//!
//! Type syntax is parsed with the grammar in `kotlin_type.pest`.

use std::fmt;
use std::iter;
use std::str;

use pest::error::LineColLocation;
use pest::iterators::{Pair, Pairs};
use pest::Parser;
use pest_derive::Parser;
use serde::{Deserialize, Serialize};

use crate::error::Error;

#[derive(Parser)]
#[grammar = "kotlin_type.pest"]
struct KotlinTypeParser;

/// The fully qualified name of a class, split into its package and the chain
/// of simple names leading to it.
///
/// Deserializes from either a canonical name or an object that spells out
/// the split, for packages that don't follow the lowercase convention:
///
/// ```rust
/// use assisted_factory::ClassName;
///
/// let name = ClassName::new("com.test", "Outer").nested("Inner");
/// assert_eq!(name.simple_name(), "Inner");
/// assert_eq!(name.canonical_name(), "com.test.Outer.Inner");
/// assert_eq!(ClassName::parse("com.test.Outer.Inner").unwrap(), name);
///
/// let name: ClassName =
///     serde_json::from_str(r#"{"package": "com.MyCompany.app", "names": ["Foo"]}"#).unwrap();
/// assert_eq!(name.package(), "com.MyCompany.app");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawClassName", into = "RawClassName")]
pub struct ClassName {
    package: String,
    simple_names: Vec<String>,
}

impl ClassName {
    /// Construct a top-level class name.
    pub fn new(package: impl Into<String>, simple_name: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            simple_names: vec![simple_name.into()],
        }
    }

    /// Construct the name of a class nested inside of this one.
    pub fn nested(&self, simple_name: impl Into<String>) -> Self {
        let mut simple_names = self.simple_names.clone();
        simple_names.push(simple_name.into());

        Self {
            package: self.package.clone(),
            simple_names,
        }
    }

    /// Parse a canonical name like `kotlin.collections.List`.
    ///
    /// Leading segments that start with a lowercase letter are taken to be the
    /// package, everything from the first capitalized segment onwards names
    /// the class and the classes it is nested in. A name without any
    /// capitalized segment is treated as a top-level class named by its last
    /// segment. Use [ClassName::from_parts] when the package itself has
    /// capitalized segments.
    pub fn parse(canonical: &str) -> Result<Self, Error> {
        let pairs = KotlinTypeParser::parse(Rule::qualified_name, canonical)
            .map_err(|e| syntax_error(canonical, e))?;

        let segments = pairs
            .flatten()
            .filter(|p| p.as_rule() == Rule::ident)
            .map(|p| ident(&p))
            .collect::<Vec<_>>();

        Self::from_segments(segments).ok_or_else(|| Error::type_syntax(canonical, "empty class name"))
    }

    /// Construct a class name from an explicit package and chain of simple
    /// names, outermost first.
    ///
    /// ```rust
    /// use assisted_factory::ClassName;
    ///
    /// let name = ClassName::from_parts("com.MyCompany.app", ["Outer", "Inner"]).unwrap();
    /// assert_eq!(name.package(), "com.MyCompany.app");
    /// assert_eq!(name.simple_names().to_vec(), vec!["Outer", "Inner"]);
    ///
    /// assert!(ClassName::from_parts("com.test", Vec::<String>::new()).is_err());
    /// ```
    pub fn from_parts<I>(package: impl Into<String>, simple_names: I) -> Result<Self, Error>
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let package = package.into();

        if !package.is_empty() {
            KotlinTypeParser::parse(Rule::qualified_name, &package)
                .map_err(|e| syntax_error(&package, e))?;
        }

        let mut names = Vec::new();

        for name in simple_names {
            let name = name.into();

            let pair = KotlinTypeParser::parse(Rule::simple_name, &name)
                .map_err(|e| syntax_error(&name, e))?
                .flatten()
                .find(|p| p.as_rule() == Rule::ident);

            match pair {
                Some(pair) => names.push(ident(&pair)),
                None => return Err(Error::type_syntax(name.as_str(), "expected a simple name")),
            }
        }

        if names.is_empty() {
            return Err(Error::type_syntax(package, "empty class name"));
        }

        Ok(Self {
            package,
            simple_names: names,
        })
    }

    fn from_segments(mut segments: Vec<String>) -> Option<Self> {
        let split = segments
            .iter()
            .position(|s| s.starts_with(|c: char| c.is_uppercase()))
            .unwrap_or_else(|| segments.len().saturating_sub(1));

        let simple_names = segments.split_off(split);

        if simple_names.is_empty() {
            return None;
        }

        Some(Self {
            package: segments.join("."),
            simple_names,
        })
    }

    /// The package this class lives in. Empty for the default package.
    pub fn package(&self) -> &str {
        &self.package
    }

    /// The innermost simple name.
    pub fn simple_name(&self) -> &str {
        self.simple_names.last().map(String::as_str).unwrap_or_default()
    }

    /// All simple names, outermost first.
    pub fn simple_names(&self) -> &[String] {
        &self.simple_names
    }

    /// The outermost class that contains this one, or this class if it is
    /// top-level.
    pub fn top_level(&self) -> Self {
        Self {
            package: self.package.clone(),
            simple_names: self.simple_names.iter().take(1).cloned().collect(),
        }
    }

    /// Test if parsing the canonical name gives back this name, which fails
    /// for packages with capitalized segments.
    pub(crate) fn parses_back(&self) -> bool {
        Self::parse(&self.canonical_name()).map_or(false, |parsed| parsed == *self)
    }

    /// The dotted, fully qualified name.
    pub fn canonical_name(&self) -> String {
        let package = iter::once(self.package.as_str()).filter(|p| !p.is_empty());

        package
            .chain(self.simple_names.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(".")
    }
}

impl fmt::Display for ClassName {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.write_str(&self.canonical_name())
    }
}

impl str::FromStr for ClassName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// The serialized form of a [ClassName].
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RawClassName {
    Canonical(String),
    Parts { package: String, names: Vec<String> },
}

impl TryFrom<RawClassName> for ClassName {
    type Error = Error;

    fn try_from(value: RawClassName) -> Result<Self, Self::Error> {
        match value {
            RawClassName::Canonical(canonical) => Self::parse(&canonical),
            RawClassName::Parts { package, names } => Self::from_parts(package, names),
        }
    }
}

impl From<ClassName> for RawClassName {
    fn from(value: ClassName) -> Self {
        if value.parses_back() {
            return Self::Canonical(value.canonical_name());
        }

        Self::Parts {
            package: value.package,
            names: value.simple_names,
        }
    }
}

/// A type argument together with its use-site variance.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Projection {
    /// `T`
    Invariant(TypeName),
    /// `out T`
    Out(TypeName),
    /// `in T`
    In(TypeName),
    /// `*`
    Star,
}

impl Projection {
    /// The projected type, if this isn't a star projection.
    pub fn ty(&self) -> Option<&TypeName> {
        match self {
            Self::Invariant(ty) | Self::Out(ty) | Self::In(ty) => Some(ty),
            Self::Star => None,
        }
    }

    fn write_to(&self, out: &mut String, name: &dyn Fn(&ClassName) -> String) {
        match self {
            Self::Invariant(ty) => ty.write_to(out, name),
            Self::Out(ty) => {
                out.push_str("out ");
                ty.write_to(out, name);
            }
            Self::In(ty) => {
                out.push_str("in ");
                ty.write_to(out, name);
            }
            Self::Star => out.push('*'),
        }
    }
}

impl From<TypeName> for Projection {
    fn from(value: TypeName) -> Self {
        Self::Invariant(value)
    }
}

/// A structural Kotlin type.
///
/// Parsed from and rendered to Kotlin type syntax:
///
/// ```rust
/// use assisted_factory::TypeName;
///
/// let ty: TypeName = "kotlin.collections.List<(categoryId: kotlin.Long) -> kotlin.Unit>?"
///     .parse()
///     .unwrap();
///
/// assert!(ty.is_nullable());
/// assert_eq!(
///     ty.to_string(),
///     "kotlin.collections.List<(kotlin.Long) -> kotlin.Unit>?"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TypeName {
    /// A class type, possibly parameterized.
    Class {
        name: ClassName,
        arguments: Vec<Projection>,
        nullable: bool,
    },
    /// A function type like `suspend A.(B, C) -> R`.
    Lambda {
        receiver: Option<Box<TypeName>>,
        parameters: Vec<TypeName>,
        returns: Box<TypeName>,
        nullable: bool,
        suspend: bool,
    },
}

impl TypeName {
    /// A non-null, unparameterized class type.
    pub fn class(name: ClassName) -> Self {
        Self::Class {
            name,
            arguments: Vec::new(),
            nullable: false,
        }
    }

    /// A non-null function type without a receiver.
    pub fn lambda(parameters: Vec<TypeName>, returns: TypeName) -> Self {
        Self::Lambda {
            receiver: None,
            parameters,
            returns: Box::new(returns),
            nullable: false,
            suspend: false,
        }
    }

    /// Parameterize a class type with the given arguments.
    ///
    /// Function types are returned unchanged.
    pub fn with_arguments(self, arguments: Vec<Projection>) -> Self {
        match self {
            Self::Class { name, nullable, .. } => Self::Class {
                name,
                arguments,
                nullable,
            },
            other => other,
        }
    }

    /// Give a function type a receiver, as in `A.() -> R`.
    ///
    /// Class types are returned unchanged.
    pub fn with_receiver(self, receiver: TypeName) -> Self {
        match self {
            Self::Lambda {
                parameters,
                returns,
                nullable,
                suspend,
                ..
            } => Self::Lambda {
                receiver: Some(Box::new(receiver)),
                parameters,
                returns,
                nullable,
                suspend,
            },
            other => other,
        }
    }

    /// The `suspend` variant of a function type.
    ///
    /// Class types are returned unchanged.
    pub fn suspending(self) -> Self {
        match self {
            Self::Lambda {
                receiver,
                parameters,
                returns,
                nullable,
                ..
            } => Self::Lambda {
                receiver,
                parameters,
                returns,
                nullable,
                suspend: true,
            },
            other => other,
        }
    }

    /// The nullable variant of this type.
    pub fn nullable(self) -> Self {
        match self {
            Self::Class {
                name, arguments, ..
            } => Self::Class {
                name,
                arguments,
                nullable: true,
            },
            Self::Lambda {
                receiver,
                parameters,
                returns,
                suspend,
                ..
            } => Self::Lambda {
                receiver,
                parameters,
                returns,
                nullable: true,
                suspend,
            },
        }
    }

    /// Test if the type is nullable.
    pub fn is_nullable(&self) -> bool {
        match self {
            Self::Class { nullable, .. } | Self::Lambda { nullable, .. } => *nullable,
        }
    }

    /// The class named by this type if it is a class type.
    pub fn class_name(&self) -> Option<&ClassName> {
        match self {
            Self::Class { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Visit every class name mentioned by this type, outermost first.
    pub fn visit_class_names<'a>(&'a self, visitor: &mut dyn FnMut(&'a ClassName)) {
        match self {
            Self::Class {
                name, arguments, ..
            } => {
                visitor(name);

                for argument in arguments.iter().filter_map(Projection::ty) {
                    argument.visit_class_names(visitor);
                }
            }
            Self::Lambda {
                receiver,
                parameters,
                returns,
                ..
            } => {
                if let Some(receiver) = receiver {
                    receiver.visit_class_names(visitor);
                }

                for parameter in parameters {
                    parameter.visit_class_names(visitor);
                }

                returns.visit_class_names(visitor);
            }
        }
    }

    /// Render the type into `out`, spelling every class name through
    /// `name`.
    pub fn write_to(&self, out: &mut String, name: &dyn Fn(&ClassName) -> String) {
        match self {
            Self::Class {
                name: class,
                arguments,
                nullable,
            } => {
                out.push_str(&name(class));

                if !arguments.is_empty() {
                    out.push('<');

                    for (n, argument) in arguments.iter().enumerate() {
                        if n > 0 {
                            out.push_str(", ");
                        }

                        argument.write_to(out, name);
                    }

                    out.push('>');
                }

                if *nullable {
                    out.push('?');
                }
            }
            Self::Lambda {
                receiver,
                parameters,
                returns,
                nullable,
                suspend,
            } => {
                if *nullable {
                    out.push('(');
                }

                if *suspend {
                    out.push_str("suspend ");
                }

                if let Some(receiver) = receiver {
                    // A non-null function type has to be grouped to be read
                    // back as the receiver.
                    let group = matches!(**receiver, Self::Lambda { nullable: false, .. });

                    if group {
                        out.push('(');
                    }

                    receiver.write_to(out, name);

                    if group {
                        out.push(')');
                    }

                    out.push('.');
                }

                out.push('(');

                for (n, parameter) in parameters.iter().enumerate() {
                    if n > 0 {
                        out.push_str(", ");
                    }

                    parameter.write_to(out, name);
                }

                out.push_str(") -> ");
                returns.write_to(out, name);

                if *nullable {
                    out.push_str(")?");
                }
            }
        }
    }
}

impl From<ClassName> for TypeName {
    fn from(value: ClassName) -> Self {
        Self::class(value)
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        self.write_to(&mut out, &ClassName::canonical_name);
        fmt.write_str(&out)
    }
}

impl str::FromStr for TypeName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let pairs = KotlinTypeParser::parse(Rule::type_name, s).map_err(|e| syntax_error(s, e))?;
        let builder = Builder { input: s };

        let ty = pairs
            .flat_map(|p| p.into_inner())
            .find(|p| p.as_rule() != Rule::EOI);

        match ty {
            Some(pair) => builder.ty(pair),
            None => Err(Error::type_syntax(s, "expected a type")),
        }
    }
}

impl TryFrom<String> for TypeName {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TypeName> for String {
    fn from(value: TypeName) -> Self {
        value.to_string()
    }
}

fn syntax_error(input: &str, error: pest::error::Error<Rule>) -> Error {
    let column = match error.line_col {
        LineColLocation::Pos((_, column)) | LineColLocation::Span((_, column), _) => column,
    };

    Error::type_syntax(
        input,
        format!("{} at column {}", error.variant.message(), column),
    )
}

/// The name of an identifier, without the backticks of an escaped one.
fn ident(pair: &Pair<'_, Rule>) -> String {
    pair.as_str().trim_matches('`').to_owned()
}

/// Turns a parse tree into a [TypeName].
struct Builder<'a> {
    input: &'a str,
}

impl Builder<'_> {
    fn error(&self, message: &str) -> Error {
        Error::type_syntax(self.input, message)
    }

    fn next<'i>(&self, pairs: &mut Pairs<'i, Rule>, what: &str) -> Result<Pair<'i, Rule>, Error> {
        pairs
            .next()
            .ok_or_else(|| self.error(&format!("expected {}", what)))
    }

    fn ty(&self, pair: Pair<'_, Rule>) -> Result<TypeName, Error> {
        match pair.as_rule() {
            Rule::nullable => self.nullable(pair),
            Rule::function_type => self.function_type(pair),
            _ => Err(self.error("expected a type")),
        }
    }

    fn nullable(&self, pair: Pair<'_, Rule>) -> Result<TypeName, Error> {
        let mut inner = pair.into_inner();
        let primary = self.next(&mut inner, "a type")?;

        let ty = match primary.as_rule() {
            Rule::class_type => self.class_type(primary)?,
            Rule::parenthesized => {
                let ty = self.next(&mut primary.into_inner(), "a type")?;
                self.ty(ty)?
            }
            _ => return Err(self.error("expected a type")),
        };

        if inner.any(|p| p.as_rule() == Rule::nullable_mark) {
            return Ok(ty.nullable());
        }

        Ok(ty)
    }

    fn class_type(&self, pair: Pair<'_, Rule>) -> Result<TypeName, Error> {
        let mut segments = Vec::new();
        let mut arguments = Vec::new();

        for inner in pair.into_inner() {
            match inner.as_rule() {
                Rule::ident => segments.push(ident(&inner)),
                Rule::type_arguments => {
                    for projection in inner.into_inner() {
                        arguments.push(self.projection(projection)?);
                    }
                }
                _ => {}
            }
        }

        let name = ClassName::from_segments(segments).ok_or_else(|| self.error("empty class name"))?;
        Ok(TypeName::class(name).with_arguments(arguments))
    }

    fn projection(&self, pair: Pair<'_, Rule>) -> Result<Projection, Error> {
        let mut inner = pair.into_inner();
        let first = self.next(&mut inner, "a type argument")?;

        Ok(match first.as_rule() {
            Rule::star => Projection::Star,
            Rule::out_kw => Projection::Out(self.ty(self.next(&mut inner, "a type")?)?),
            Rule::in_kw => Projection::In(self.ty(self.next(&mut inner, "a type")?)?),
            _ => Projection::Invariant(self.ty(first)?),
        })
    }

    fn function_type(&self, pair: Pair<'_, Rule>) -> Result<TypeName, Error> {
        let mut suspend = false;
        let mut receiver = None;
        let mut parameters = Vec::new();
        let mut returns = None;

        for inner in pair.into_inner() {
            match inner.as_rule() {
                Rule::suspend_kw => suspend = true,
                Rule::receiver => {
                    let ty = self.next(&mut inner.into_inner(), "a receiver")?;
                    receiver = Some(self.ty(ty)?);
                }
                Rule::parameters => {
                    for parameter in inner.into_inner() {
                        let ty = parameter
                            .into_inner()
                            .find(|p| p.as_rule() != Rule::label)
                            .ok_or_else(|| self.error("expected a parameter type"))?;

                        parameters.push(self.ty(ty)?);
                    }
                }
                _ => returns = Some(self.ty(inner)?),
            }
        }

        let returns = returns.ok_or_else(|| self.error("expected a return type"))?;
        let mut ty = TypeName::lambda(parameters, returns);

        if let Some(receiver) = receiver {
            ty = ty.with_receiver(receiver);
        }

        if suspend {
            ty = ty.suspending();
        }

        Ok(ty)
    }
}
