//! The annotations recognized and emitted by the engine.

use serde::{Deserialize, Serialize};

use crate::types::ClassName;

/// Fully qualified names of the annotations the engine works with.
///
/// The defaults point at Anvil, Dagger and the `anvil-utils` annotations.
/// Missing fields fall back to their defaults when deserialized, so a
/// manifest only has to spell out the markers it relocates.
///
/// ```rust
/// use assisted_factory::Markers;
///
/// let markers: Markers = serde_json::from_str(r#"{
///     "assisted_key": "com.example.di.Key"
/// }"#).unwrap();
///
/// assert_eq!(markers.assisted_key.simple_name(), "Key");
/// assert_eq!(markers.assisted, Markers::default().assisted);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Markers {
    /// Requests an assisted factory for the annotated class.
    pub contributes_assisted_factory: ClassName,
    /// Marks the constructor that takes assisted parameters.
    pub assisted_inject: ClassName,
    /// Marks an assisted constructor parameter, and the key on generated
    /// factory parameters.
    pub assisted: ClassName,
    /// Marks a keyed parameter on the bound type's factory method.
    pub assisted_key: ClassName,
    /// Emitted on the generated factory.
    pub assisted_factory: ClassName,
    /// Emitted on the generated factory to bind it into the scope.
    pub contributes_binding: ClassName,
}

impl Default for Markers {
    fn default() -> Self {
        Self {
            contributes_assisted_factory: ClassName::new(
                "me.gulya.anvil.assisted",
                "ContributesAssistedFactory",
            ),
            assisted_inject: ClassName::new("dagger.assisted", "AssistedInject"),
            assisted: ClassName::new("dagger.assisted", "Assisted"),
            assisted_key: ClassName::new("me.gulya.anvil.assisted", "AssistedKey"),
            assisted_factory: ClassName::new("dagger.assisted", "AssistedFactory"),
            contributes_binding: ClassName::new(
                "com.squareup.anvil.annotations",
                "ContributesBinding",
            ),
        }
    }
}
