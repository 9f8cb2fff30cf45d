//! Rendering of generated factories as Kotlin source.

use std::collections::BTreeSet;

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::config::Markers;
use crate::model::SourceFile;
use crate::types::ClassName;
use crate::validate::{BoundKind, GenerationPlan};

/// Appended to the simple name of the annotated class to name its factory.
pub const SUFFIX: &str = "_AssistedFactory";

const HEADER: &str = "// Generated by assisted-factory. Do not edit.";

/// Kotlin's hard keywords, which have to be escaped with backticks when used
/// as identifiers.
const KEYWORDS: &[&str] = &[
    "as",
    "break",
    "class",
    "continue",
    "do",
    "else",
    "false",
    "for",
    "fun",
    "if",
    "in",
    "interface",
    "is",
    "null",
    "object",
    "package",
    "return",
    "super",
    "this",
    "throw",
    "true",
    "try",
    "typealias",
    "typeof",
    "val",
    "var",
    "when",
    "while",
];

/// A rendered source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedFile {
    /// The package of the generated type.
    pub package: String,
    /// The simple name of the generated type.
    pub type_name: String,
    /// Kotlin source.
    pub content: String,
    /// The source file of the declaration the file was generated for.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<SourceFile>,
}

impl GeneratedFile {
    /// The name of the file, like `DefaultTestApi_AssistedFactory.kt`.
    pub fn file_name(&self) -> String {
        format!("{}.kt", self.type_name)
    }

    /// The fully qualified name of the generated type.
    pub fn qualified_name(&self) -> ClassName {
        ClassName::new(self.package.as_str(), self.type_name.as_str())
    }
}

/// The name of the factory generated for `annotated`.
///
/// ```rust
/// use assisted_factory::{emit, ClassName};
///
/// let name = emit::factory_name(&ClassName::new("com.test", "DefaultTestApi"));
/// assert_eq!(name.canonical_name(), "com.test.DefaultTestApi_AssistedFactory");
/// ```
pub fn factory_name(annotated: &ClassName) -> ClassName {
    ClassName::new(
        annotated.package(),
        format!("{}{}", annotated.simple_name(), SUFFIX),
    )
}

/// Render the factory described by `plan`.
pub fn render(plan: &GenerationPlan, markers: &Markers) -> GeneratedFile {
    let name = factory_name(&plan.annotated);
    let package = name.package();
    let keyed = plan.factory_method.parameters.iter().any(|p| p.key.is_some());

    let mut referenced = vec![
        &markers.contributes_binding,
        &markers.assisted_factory,
        &plan.scope,
        &plan.bound_type.name,
        &plan.annotated,
    ];

    if keyed {
        referenced.push(&markers.assisted);
    }

    for parameter in &plan.factory_method.parameters {
        parameter
            .ty
            .visit_class_names(&mut |class| referenced.push(class));
    }

    let imports = Imports::new(package, name.simple_name(), referenced);

    let mut out = String::new();
    out.push_str(HEADER);
    out.push('\n');

    if !package.is_empty() {
        out.push_str("package ");
        out.push_str(&escape_package(package));
        out.push_str("\n\n");
    }

    for import in imports.lines() {
        out.push_str("import ");
        out.push_str(&import);
        out.push('\n');
    }

    if !imports.is_empty() {
        out.push('\n');
    }

    let scope = imports.spell(&plan.scope);
    let bound = imports.spell(&plan.bound_type.name);

    out.push_str(&format!(
        "@{}({}::class, {}::class)\n",
        imports.spell(&markers.contributes_binding),
        scope,
        bound
    ));

    out.push_str(&format!("@{}\n", imports.spell(&markers.assisted_factory)));

    let modifiers = match plan.bound_type.kind {
        BoundKind::Interface => {
            out.push_str(&format!(
                "public interface {} : {} {{\n",
                name.simple_name(),
                bound
            ));
            "override"
        }
        BoundKind::AbstractClass => {
            out.push_str(&format!(
                "public abstract class {} : {}() {{\n",
                name.simple_name(),
                bound
            ));
            "abstract override"
        }
    };

    let method = identifier(&plan.factory_method.name);
    let returns = imports.spell(&plan.annotated);

    if plan.factory_method.parameters.is_empty() {
        out.push_str(&format!("  {} fun {}(): {}\n", modifiers, method, returns));
    } else {
        out.push_str(&format!("  {} fun {}(\n", modifiers, method));

        for parameter in &plan.factory_method.parameters {
            out.push_str("    ");

            if let Some(key) = &parameter.key {
                out.push_str(&format!(
                    "@{}(\"{}\") ",
                    imports.spell(&markers.assisted),
                    escape_string(key)
                ));
            }

            out.push_str(&identifier(&parameter.name));
            out.push_str(": ");
            parameter
                .ty
                .write_to(&mut out, &|class: &ClassName| imports.spell(class));
            out.push_str(",\n");
        }

        out.push_str(&format!("  ): {}\n", returns));
    }

    out.push_str("}\n");

    GeneratedFile {
        package: package.to_owned(),
        type_name: name.simple_name().to_owned(),
        content: out,
        origin: plan.origin.clone(),
    }
}

/// Decides how every class referenced by a generated file is spelled.
///
/// Classes are imported through their top-level class, so a nested class is
/// spelled `Outer.Inner`. When two top-level classes share a simple name,
/// the generated type wins, then classes in the generated package, then the
/// first class in canonical order. Classes that lose are spelled fully
/// qualified.
struct Imports {
    /// Simple name to the top-level class that claimed it.
    claimed: HashMap<String, ClassName>,
    /// Imports, sorted.
    imports: BTreeSet<String>,
}

impl Imports {
    fn new(package: &str, own: &str, referenced: Vec<&ClassName>) -> Self {
        let mut claimed = HashMap::new();
        claimed.insert(own.to_owned(), ClassName::new(package, own));

        let mut top_level = referenced
            .into_iter()
            .map(ClassName::top_level)
            .collect::<Vec<_>>();

        top_level.sort_by_key(ClassName::canonical_name);
        top_level.dedup();

        let (local, other): (Vec<_>, Vec<_>) =
            top_level.into_iter().partition(|c| c.package() == package);

        let mut imports = BTreeSet::new();

        for class in local {
            claimed
                .entry(class.simple_name().to_owned())
                .or_insert(class);
        }

        for class in other {
            if claimed.contains_key(class.simple_name()) {
                continue;
            }

            if !class.package().is_empty() && class.package() != "kotlin" {
                imports.insert(class.canonical_name());
            }

            claimed.insert(class.simple_name().to_owned(), class);
        }

        Self { claimed, imports }
    }

    fn is_empty(&self) -> bool {
        self.imports.is_empty()
    }

    fn lines(&self) -> impl Iterator<Item = String> + '_ {
        self.imports.iter().map(|import| escape_package(import))
    }

    /// Spell `class` the way it is written in the file.
    fn spell(&self, class: &ClassName) -> String {
        let top_level = class.top_level();

        let simple = class
            .simple_names()
            .iter()
            .map(|s| identifier(s))
            .collect::<Vec<_>>()
            .join(".");

        match self.claimed.get(top_level.simple_name()) {
            Some(claimed) if *claimed == top_level => simple,
            _ if class.package().is_empty() => simple,
            _ => format!("{}.{}", escape_package(class.package()), simple),
        }
    }
}

fn identifier(name: &str) -> String {
    if KEYWORDS.contains(&name) {
        format!("`{}`", name)
    } else {
        name.to_owned()
    }
}

fn escape_package(package: &str) -> String {
    package
        .split('.')
        .map(identifier)
        .collect::<Vec<_>>()
        .join(".")
}

/// Escape a value for use inside of a Kotlin string literal.
fn escape_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len());

    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '$' => out.push_str("\\$"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::{escape_string, identifier, Imports};
    use crate::types::ClassName;

    #[test]
    fn test_escapes() {
        assert_eq!(escape_string("a\"b$c\\d\n"), "a\\\"b\\$c\\\\d\\n");
        assert_eq!(identifier("in"), "`in`");
        assert_eq!(identifier("name"), "name");
    }

    #[test]
    fn test_import_clash() {
        let first = ClassName::new("com.a", "Value");
        let second = ClassName::new("com.b", "Value");
        let local = ClassName::new("com.test", "Thing");
        let string = ClassName::new("kotlin", "String");
        let entry = ClassName::new("kotlin.collections", "Map").nested("Entry");

        let imports = Imports::new(
            "com.test",
            "Thing_AssistedFactory",
            vec![&second, &first, &local, &string, &entry],
        );

        assert_eq!(
            imports.lines().collect::<Vec<_>>(),
            vec!["com.a.Value", "kotlin.collections.Map"]
        );

        assert_eq!(imports.spell(&first), "Value");
        assert_eq!(imports.spell(&second), "com.b.Value");
        assert_eq!(imports.spell(&local), "Thing");
        assert_eq!(imports.spell(&string), "String");
        assert_eq!(imports.spell(&entry), "Map.Entry");
    }

    #[test]
    fn test_own_name_wins() {
        let clash = ClassName::new("com.other", "Thing_AssistedFactory");
        let imports = Imports::new("com.test", "Thing_AssistedFactory", vec![&clash]);

        assert!(imports.is_empty());
        assert_eq!(
            imports.spell(&clash),
            "com.other.Thing_AssistedFactory"
        );
    }
}
