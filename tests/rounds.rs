use std::io;
use std::path::PathBuf;

use assisted_factory::validate;
use assisted_factory::{
    ClassDeclaration, ClassName, CodeGenerator, Diagnostic, Driver, Error, Filer, GeneratedFile,
    Markers, Rejection, SourceFile, SymbolTable, TypeRef, Validator,
};

mod common;

use common::*;

fn generated(simple: &str) -> ClassName {
    ClassName::new("me.gulya.anvil.sample", simple)
}

/// A component whose factory depends on two types generated by other
/// processors. `available` says which of them exist yet.
fn sample(available: &[&str]) -> SymbolTable {
    let reference = |simple: &str| -> TypeRef {
        if available.contains(&simple) {
            TypeRef::from(generated(simple))
        } else {
            TypeRef::unresolved(simple)
        }
    };

    let component = generated("SampleComponent");
    let factory = component.nested("Factory");

    let mut create = assisted_factory::Function::abstract_method("invoke").returns(component.clone());
    create.parameters = vec![
        factory_param("generated1", reference("SampleComponentGenerated1"), None),
        factory_param("generated2", reference("SampleComponentGenerated2"), None),
    ];

    let mut constructor = assisted_factory::Function::constructor().annotated(assisted_inject());
    constructor.parameters = vec![
        param("generated1", reference("SampleComponentGenerated1"), None),
        param("generated2", reference("SampleComponentGenerated2"), None),
    ];

    let mut classes = vec![
        ClassDeclaration::interface(component.clone()),
        ClassDeclaration::interface(factory.clone()).function(create),
        ClassDeclaration::class(generated("SampleScope")),
        ClassDeclaration::class(generated("DefaultSampleComponent"))
            .source("SampleComponent.kt")
            .annotated(contributes(generated("SampleScope"), factory))
            .constructor(constructor)
            .supertype(component),
    ];

    for simple in available {
        classes.push(ClassDeclaration::class(generated(simple)));
    }

    classes.into_iter().collect()
}

#[test]
fn test_deferred_until_resolvable() -> Result<(), Error> {
    init_tracing();

    let mut driver = Driver::default();
    let mut files = Vec::<GeneratedFile>::new();
    let mut diagnostics = Vec::<Diagnostic>::new();

    let report = driver.process(&sample(&[]), &mut files, &mut diagnostics)?;
    assert_eq!(report.round, 1);
    assert!(report.generated.is_empty());
    assert_eq!(report.deferred.len(), 1);
    assert_eq!(
        report.deferred[0].unresolved,
        vec!["SampleComponentGenerated1", "SampleComponentGenerated2"]
    );

    let report = driver.process(
        &sample(&["SampleComponentGenerated1"]),
        &mut files,
        &mut diagnostics,
    )?;

    assert_eq!(report.round, 2);
    assert!(report.generated.is_empty());
    assert_eq!(driver.pending().len(), 1);
    assert_eq!(
        driver.pending()[0].unresolved,
        vec!["SampleComponentGenerated2"]
    );

    let report = driver.process(
        &sample(&["SampleComponentGenerated1", "SampleComponentGenerated2"]),
        &mut files,
        &mut diagnostics,
    )?;

    assert_eq!(report.generated, vec![generated("DefaultSampleComponent")]);
    assert!(report.deferred.is_empty());
    assert!(driver.pending().is_empty());
    assert!(diagnostics.is_empty());

    assert_eq!(files.len(), 1);
    assert_eq!(files[0].type_name, "DefaultSampleComponent_AssistedFactory");
    assert!(files[0]
        .content
        .contains("@ContributesBinding(SampleScope::class, SampleComponent.Factory::class)"));

    assert!(driver.finish().is_empty());
    Ok(())
}

#[test]
fn test_unresolved_factory_signature_defers() -> Result<(), Error> {
    init_tracing();

    let mut create = assisted_factory::Function::abstract_method("create")
        .returns(TypeRef::unresolved("GeneratedApi"));
    create.parameters = vec![factory_param("param", string(), None)];

    let symbols = vec![
        test_api(),
        ClassDeclaration::interface(name("TestApiFactory")).function(create),
        default_test_api(vec![param("param", string(), None)]),
    ]
    .into_iter()
    .collect::<SymbolTable>();

    let mut driver = Driver::default();
    let mut files = Vec::<GeneratedFile>::new();
    let mut diagnostics = Vec::<Diagnostic>::new();

    let report = driver.process(&symbols, &mut files, &mut diagnostics)?;

    assert!(files.is_empty());
    assert!(diagnostics.is_empty());
    assert_eq!(report.deferred[0].unresolved, vec!["GeneratedApi"]);

    let remaining = driver.finish();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].name, name("DefaultTestApi"));
    assert!(driver.pending().is_empty());
    Ok(())
}

#[test]
fn test_unresolved_supertype_defers() -> Result<(), Error> {
    let class = default_test_api(vec![param("param", string(), None)])
        .supertype(TypeRef::unresolved("Generated"));

    let symbols = vec![
        test_api(),
        factory("create", vec![factory_param("param", string(), None)]),
        class,
    ]
    .into_iter()
    .collect::<SymbolTable>();

    let markers = Markers::default();
    let class = symbols
        .get(&name("DefaultTestApi"))
        .expect("class is in the table");

    assert_eq!(
        validate::unresolved_references(class, &symbols, &markers),
        vec!["Generated"]
    );

    Ok(())
}

#[test]
fn test_validator_defers_on_unresolved_types() {
    let symbols = vec![
        test_api(),
        factory("create", vec![factory_param("param", string(), None)]),
        default_test_api(vec![param("param", TypeRef::unresolved("Generated"), None)]),
    ]
    .into_iter()
    .collect::<SymbolTable>();

    let markers = Markers::default();
    let class = symbols
        .get(&name("DefaultTestApi"))
        .expect("class is in the table");

    let rejection = Validator::new(&markers, &symbols, class).validate();

    assert_eq!(
        rejection,
        Err(Rejection::Unresolved(vec![String::from("Generated")]))
    );
}

#[test]
fn test_generated_once() -> Result<(), Error> {
    init_tracing();

    let symbols = vec![
        test_api(),
        factory("create", vec![factory_param("param", string(), None)]),
        default_test_api(vec![param("param", string(), None)]),
    ]
    .into_iter()
    .collect::<SymbolTable>();

    let mut driver = Driver::default();
    let mut files = Vec::<GeneratedFile>::new();
    let mut diagnostics = Vec::<Diagnostic>::new();

    let first = driver.process(&symbols, &mut files, &mut diagnostics)?;
    let second = driver.process(&symbols, &mut files, &mut diagnostics)?;

    assert_eq!(first.generated.len(), 1);
    assert!(second.generated.is_empty());
    assert_eq!(files.len(), 1);

    driver.reset();

    let third = driver.process(&symbols, &mut files, &mut diagnostics)?;
    assert_eq!(third.round, 1);
    assert_eq!(third.generated.len(), 1);
    assert_eq!(files.len(), 2);
    assert_eq!(files[0], files[1]);
    Ok(())
}

#[test]
fn test_failures_reported_once() -> Result<(), Error> {
    init_tracing();

    let symbols = vec![
        test_api(),
        factory("create", vec![factory_param("param", int(), None)]),
        default_test_api(vec![param("param", string(), None)]),
    ]
    .into_iter()
    .collect::<SymbolTable>();

    let mut driver = Driver::default();
    let mut files = Vec::<GeneratedFile>::new();
    let mut diagnostics = Vec::<Diagnostic>::new();

    let first = driver.process(&symbols, &mut files, &mut diagnostics)?;
    let second = driver.process(&symbols, &mut files, &mut diagnostics)?;

    assert_eq!(first.failed, vec![name("DefaultTestApi")]);
    assert!(second.failed.is_empty());
    assert_eq!(diagnostics.len(), 1);
    assert!(files.is_empty());
    Ok(())
}

#[test]
fn test_filer() -> anyhow::Result<()> {
    init_tracing();

    let dir = tempfile::tempdir()?;

    let symbols = vec![
        test_api(),
        factory("create", vec![factory_param("param", string(), None)]),
        default_test_api(vec![param("param", string(), None)]),
    ]
    .into_iter()
    .collect::<SymbolTable>();

    let mut filer = Filer::new(dir.path());
    let mut diagnostics = Vec::<Diagnostic>::new();

    Driver::default().process(&symbols, &mut filer, &mut diagnostics)?;

    let path = dir
        .path()
        .join("com")
        .join("test")
        .join("DefaultTestApi_AssistedFactory.kt");

    let content = std::fs::read_to_string(&path)?;
    assert!(content.starts_with("// Generated by assisted-factory."));

    assert_eq!(
        filer.dependencies(),
        &[(
            path,
            Some(SourceFile::new("src/main/kotlin/com/test/DefaultTestApi.kt"))
        )]
    );

    Ok(())
}

/// A generator whose every write fails.
struct FullDisk;

impl CodeGenerator for FullDisk {
    fn write(&mut self, file: &GeneratedFile) -> Result<(), Error> {
        Err(Error::Io {
            path: PathBuf::from(file.file_name()),
            source: io::Error::new(io::ErrorKind::Other, "disk full"),
        })
    }
}

#[test]
fn test_failed_write_updates_pending() -> Result<(), Error> {
    init_tracing();

    let symbols = |ty: TypeRef| -> SymbolTable {
        vec![
            test_api(),
            factory("create", vec![factory_param("param", ty.clone(), None)]),
            default_test_api(vec![param("param", ty, None)]),
        ]
        .into_iter()
        .collect()
    };

    let mut driver = Driver::default();
    let mut files = Vec::<GeneratedFile>::new();
    let mut diagnostics = Vec::<Diagnostic>::new();

    driver.process(&symbols(TypeRef::unresolved("Generated")), &mut files, &mut diagnostics)?;
    assert_eq!(driver.pending().len(), 1);

    let result = driver.process(&symbols(string().into()), &mut FullDisk, &mut diagnostics);
    assert!(matches!(result, Err(Error::Io { .. })));
    assert!(driver.pending().is_empty());

    // The class was not written, so the next round picks it up again.
    let report = driver.process(&symbols(string().into()), &mut files, &mut diagnostics)?;
    assert_eq!(report.round, 3);
    assert_eq!(report.generated, vec![name("DefaultTestApi")]);
    assert_eq!(files.len(), 1);
    assert!(diagnostics.is_empty());
    Ok(())
}
