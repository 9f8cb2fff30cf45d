//! Declarations serialized as JSON, and an in-memory [Resolver] over them.
//!
//! A manifest is how a front end that is not written in Rust hands its
//! declarations to the engine:
//!
//! ```rust
//! use assisted_factory::{ClassName, Manifest, Resolver, SymbolTable};
//!
//! let manifest = Manifest::from_json(r#"{
//!     "classes": [
//!         {
//!             "name": "com.test.TestApiFactory",
//!             "kind": "interface",
//!             "functions": [
//!                 {
//!                     "name": "create",
//!                     "abstract": true,
//!                     "parameters": [{"name": "id", "type": "kotlin.String"}],
//!                     "returns": {"unresolved": "TestApi"}
//!                 }
//!             ]
//!         }
//!     ]
//! }"#)?;
//!
//! let symbols = SymbolTable::from_manifest(manifest);
//! assert!(symbols.declaration(&ClassName::new("com.test", "TestApiFactory")).is_some());
//! # Ok::<_, assisted_factory::Error>(())
//! ```

use std::io;

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::config::Markers;
use crate::error::Error;
use crate::host::Resolver;
use crate::model::{ClassDeclaration, Declaration};
use crate::types::ClassName;

/// A set of class declarations, optionally with relocated markers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub markers: Option<Markers>,
    #[serde(default)]
    pub classes: Vec<ClassDeclaration>,
}

impl Manifest {
    pub fn from_json(json: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_reader<R>(reader: R) -> Result<Self, Error>
    where
        R: io::Read,
    {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn to_json_pretty(&self) -> Result<String, Error> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// The markers declared by the manifest, or the defaults.
    pub fn markers(&self) -> Markers {
        self.markers.clone().unwrap_or_default()
    }
}

/// Class declarations indexed by name.
///
/// Classes keep the order they were inserted in, which is the order
/// [Resolver::symbols_with_annotation] returns them in.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    classes: Vec<ClassDeclaration>,
    index: HashMap<ClassName, usize>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_manifest(manifest: Manifest) -> Self {
        manifest.classes.into_iter().collect()
    }

    /// Insert a class, replacing any class with the same name in place.
    pub fn insert(&mut self, class: ClassDeclaration) {
        match self.index.get(&class.name) {
            Some(&index) => {
                self.classes[index] = class;
            }
            None => {
                self.index.insert(class.name.clone(), self.classes.len());
                self.classes.push(class);
            }
        }
    }

    pub fn get(&self, name: &ClassName) -> Option<&ClassDeclaration> {
        let index = *self.index.get(name)?;
        self.classes.get(index)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ClassDeclaration> {
        self.classes.iter()
    }
}

impl FromIterator<ClassDeclaration> for SymbolTable {
    fn from_iter<I: IntoIterator<Item = ClassDeclaration>>(iter: I) -> Self {
        let mut table = Self::new();

        for class in iter {
            table.insert(class);
        }

        table
    }
}

impl Extend<ClassDeclaration> for SymbolTable {
    fn extend<I: IntoIterator<Item = ClassDeclaration>>(&mut self, iter: I) {
        for class in iter {
            self.insert(class);
        }
    }
}

impl Resolver for SymbolTable {
    fn symbols_with_annotation(&self, marker: &ClassName) -> Vec<&dyn Declaration> {
        self.classes
            .iter()
            .filter(|c| c.is_annotated_with(marker))
            .map(|c| c as &dyn Declaration)
            .collect()
    }

    fn declaration(&self, name: &ClassName) -> Option<&dyn Declaration> {
        self.get(name).map(|c| c as &dyn Declaration)
    }
}

#[cfg(test)]
mod tests {
    use super::SymbolTable;
    use crate::model::{ClassDeclaration, ClassKind};
    use crate::types::ClassName;

    #[test]
    fn test_insert_replaces_in_place() {
        let a = ClassName::new("com.test", "A");
        let b = ClassName::new("com.test", "B");

        let mut table = SymbolTable::new();
        table.insert(ClassDeclaration::class(a.clone()));
        table.insert(ClassDeclaration::class(b.clone()));
        table.insert(ClassDeclaration::interface(a.clone()));

        assert_eq!(table.len(), 2);
        assert_eq!(table.get(&a).map(|c| c.kind), Some(ClassKind::Interface));

        let names = table.iter().map(|c| c.name.clone()).collect::<Vec<_>>();
        assert_eq!(names, vec![a, b]);
    }
}
