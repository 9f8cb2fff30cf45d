#![allow(dead_code)]

use assisted_factory::{
    Annotation, ClassDeclaration, ClassName, Diagnostic, Driver, Error, Function, GeneratedFile,
    Markers, Parameter, SymbolTable, TypeName, TypeRef, Value,
};

pub const PACKAGE: &str = "com.test";

/// Install a test subscriber, once.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn name(simple: &str) -> ClassName {
    ClassName::new(PACKAGE, simple)
}

pub fn ty(input: &str) -> TypeName {
    match input.parse() {
        Ok(ty) => ty,
        Err(error) => panic!("bad type `{}`: {}", input, error),
    }
}

pub fn string() -> TypeName {
    ty("kotlin.String")
}

pub fn int() -> TypeName {
    ty("kotlin.Int")
}

pub fn any() -> ClassName {
    ClassName::new("kotlin", "Any")
}

pub fn contributes(scope: impl Into<TypeRef>, bound: impl Into<TypeRef>) -> Annotation {
    Annotation::new(Markers::default().contributes_assisted_factory)
        .positional(Value::Class(scope.into()))
        .positional(Value::Class(bound.into()))
}

pub fn assisted(key: Option<&str>) -> Annotation {
    let annotation = Annotation::new(Markers::default().assisted);

    match key {
        Some(key) => annotation.positional(Value::String(key.to_owned())),
        None => annotation,
    }
}

pub fn assisted_key(key: &str) -> Annotation {
    Annotation::new(Markers::default().assisted_key).positional(Value::String(key.to_owned()))
}

pub fn assisted_inject() -> Annotation {
    Annotation::new(Markers::default().assisted_inject)
}

/// A constructor parameter, `@Assisted` with the given key if `key` is
/// `Some`.
pub fn param(name: &str, ty: impl Into<TypeRef>, key: Option<&str>) -> Parameter {
    Parameter::new(name, ty).annotated(assisted(key))
}

/// A factory method parameter, `@AssistedKey` if `key` is `Some`.
pub fn factory_param(name: &str, ty: impl Into<TypeRef>, key: Option<&str>) -> Parameter {
    let parameter = Parameter::new(name, ty);

    match key {
        Some(key) => parameter.annotated(assisted_key(key)),
        None => parameter,
    }
}

/// `interface TestApi`.
pub fn test_api() -> ClassDeclaration {
    ClassDeclaration::interface(name("TestApi"))
}

/// `interface TestApiFactory { fun <method>(<parameters>): TestApi }`.
pub fn factory(method: &str, parameters: Vec<Parameter>) -> ClassDeclaration {
    let mut function = Function::abstract_method(method).returns(name("TestApi"));
    function.parameters = parameters;
    ClassDeclaration::interface(name("TestApiFactory")).function(function)
}

/// `@ContributesAssistedFactory(Any::class, TestApiFactory::class) class
/// DefaultTestApi @AssistedInject constructor(<parameters>) : TestApi`.
pub fn default_test_api(parameters: Vec<Parameter>) -> ClassDeclaration {
    let mut constructor = Function::constructor().annotated(assisted_inject());
    constructor.parameters = parameters;

    ClassDeclaration::class(name("DefaultTestApi"))
        .source("src/main/kotlin/com/test/DefaultTestApi.kt")
        .annotated(contributes(any(), name("TestApiFactory")))
        .constructor(constructor)
        .supertype(name("TestApi"))
}

pub struct Outcome {
    pub files: Vec<GeneratedFile>,
    pub diagnostics: Vec<Diagnostic>,
}

impl Outcome {
    pub fn messages(&self) -> Vec<&str> {
        self.diagnostics.iter().map(|d| d.message.as_str()).collect()
    }

    pub fn file(&self) -> &GeneratedFile {
        match self.files.as_slice() {
            [file] => file,
            files => panic!("expected a single file, got {}", files.len()),
        }
    }
}

/// Run a single round over the given classes.
pub fn run(classes: Vec<ClassDeclaration>) -> Result<Outcome, Error> {
    init_tracing();

    let symbols = classes.into_iter().collect::<SymbolTable>();
    let mut files = Vec::new();
    let mut diagnostics = Vec::new();

    Driver::default().process(&symbols, &mut files, &mut diagnostics)?;
    Ok(Outcome { files, diagnostics })
}
