//! Generated assisted factories for Anvil and Dagger.
//!
//! Classes annotated with `@ContributesAssistedFactory` get a generated
//! `@AssistedFactory` which implements a factory interface (or extends an
//! abstract factory class) they name, and which is contributed into a scope
//! through `@ContributesBinding`. This crate holds the engine behind that:
//! validating annotated declarations, pairing factory method parameters with
//! assisted constructor parameters, and rendering the Kotlin source of the
//! factory.
//!
//! The engine doesn't depend on any particular compiler. A host describes
//! declarations through [Declaration] and [Resolver], receives generated files
//! through [CodeGenerator], and receives diagnostics through [Reporter]. For
//! hosts that aren't written in Rust, declarations can be read from a JSON
//! [Manifest].
//!
//! # Examples
//!
//! Given this Kotlin:
//!
//! ```kotlin
//! interface TestApiFactory {
//!     fun create(@AssistedKey("id") id: String, name: String): TestApi
//! }
//!
//! @ContributesAssistedFactory(AppScope::class, TestApiFactory::class)
//! class DefaultTestApi @AssistedInject constructor(
//!     @Assisted name: String,
//!     @Assisted("id") id: String,
//! ) : TestApi
//! ```
//!
//! The same declarations described to the engine:
//!
//! ```rust
//! use assisted_factory::{
//!     Annotation, ClassDeclaration, ClassName, Diagnostic, Driver, Function, GeneratedFile,
//!     Markers, Parameter, SymbolTable, TypeName, Value,
//! };
//!
//! let markers = Markers::default();
//! let string = TypeName::class(ClassName::new("kotlin", "String"));
//! let api = ClassName::new("com.test", "TestApi");
//! let factory = ClassName::new("com.test", "TestApiFactory");
//!
//! let key = |value: &str| {
//!     Annotation::new(markers.assisted_key.clone()).positional(Value::String(value.into()))
//! };
//!
//! let assisted = |value: Option<&str>| {
//!     let annotation = Annotation::new(markers.assisted.clone());
//!
//!     match value {
//!         Some(value) => annotation.positional(Value::String(value.into())),
//!         None => annotation,
//!     }
//! };
//!
//! let symbols: SymbolTable = vec![
//!     ClassDeclaration::interface(api.clone()),
//!     ClassDeclaration::interface(factory.clone()).function(
//!         Function::abstract_method("create")
//!             .parameter(Parameter::new("id", string.clone()).annotated(key("id")))
//!             .parameter(Parameter::new("name", string.clone()))
//!             .returns(api.clone()),
//!     ),
//!     ClassDeclaration::class(ClassName::new("com.test", "DefaultTestApi"))
//!         .annotated(
//!             Annotation::new(markers.contributes_assisted_factory.clone())
//!                 .positional(Value::class(ClassName::new("com.test", "AppScope")))
//!                 .positional(Value::class(factory.clone())),
//!         )
//!         .constructor(
//!             Function::constructor()
//!                 .annotated(Annotation::new(markers.assisted_inject.clone()))
//!                 .parameter(Parameter::new("name", string.clone()).annotated(assisted(None)))
//!                 .parameter(Parameter::new("id", string.clone()).annotated(assisted(Some("id")))),
//!         )
//!         .supertype(api.clone()),
//! ]
//! .into_iter()
//! .collect();
//!
//! let mut files = Vec::<GeneratedFile>::new();
//! let mut diagnostics = Vec::<Diagnostic>::new();
//!
//! let mut driver = Driver::new(markers.clone());
//! driver.process(&symbols, &mut files, &mut diagnostics)?;
//!
//! assert!(diagnostics.is_empty());
//! assert_eq!(files[0].file_name(), "DefaultTestApi_AssistedFactory.kt");
//! assert!(files[0].content.contains("@Assisted(\"id\") id: String,"));
//! # Ok::<_, assisted_factory::Error>(())
//! ```

pub mod config;
pub mod driver;
pub mod emit;
mod error;
pub mod host;
mod key;
pub mod manifest;
mod matcher;
mod model;
mod types;
pub mod validate;

pub use self::config::Markers;
pub use self::driver::{Deferred, Driver, RoundReport};
pub use self::emit::GeneratedFile;
pub use self::error::{Error, ValidationError};
pub use self::host::{CodeGenerator, Diagnostic, Filer, Reporter, Resolver, Site};
pub use self::key::ParameterKey;
pub use self::manifest::{Manifest, SymbolTable};
pub use self::matcher::{Collision, Match, Matcher, Unmatched};
pub use self::model::{
    Annotation, Argument, ClassDeclaration, ClassKind, Declaration, Function, Parameter,
    SourceFile, TypeRef, Value,
};
pub use self::types::{ClassName, Projection, TypeName};
pub use self::validate::{GenerationPlan, Rejection, Validator};
