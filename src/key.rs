use std::fmt;

use crate::types::TypeName;

/// The key assisted parameters are matched by.
///
/// A key is the parameter's type together with an optional string tag. The
/// constructor side takes the tag from `@Assisted("...")`, the factory method
/// side from `@AssistedKey("...")`. A blank tag is the same as no tag.
///
/// # Examples
///
/// ```rust
/// use assisted_factory::{ClassName, ParameterKey, TypeName};
///
/// let string = TypeName::class(ClassName::new("kotlin", "String"));
/// let int = TypeName::class(ClassName::new("kotlin", "Int"));
///
/// assert_eq!(ParameterKey::new(string.clone(), None), ParameterKey::new(string.clone(), Some("")));
/// assert_eq!(ParameterKey::new(string.clone(), Some("a")), ParameterKey::new(string.clone(), Some("a")));
/// assert_ne!(ParameterKey::new(string.clone(), Some("a")), ParameterKey::new(string.clone(), Some("b")));
/// assert_ne!(ParameterKey::new(string, Some("a")), ParameterKey::new(int, Some("a")));
/// ```
#[derive(Debug, Clone, PartialOrd, Ord, PartialEq, Eq, Hash)]
pub struct ParameterKey {
    ty: TypeName,
    tag: Option<String>,
}

impl ParameterKey {
    /// Construct a new key, treating a blank tag as absent.
    pub fn new(ty: TypeName, tag: Option<&str>) -> Self {
        Self {
            ty,
            tag: tag.filter(|t| !t.trim().is_empty()).map(String::from),
        }
    }

    /// Construct a key without a tag.
    pub fn of(ty: TypeName) -> Self {
        Self { ty, tag: None }
    }

    /// The type of the key.
    pub fn ty(&self) -> &TypeName {
        &self.ty
    }

    /// The tag of the key, if any.
    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }
}

impl fmt::Display for ParameterKey {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.tag {
            Some(tag) => write!(fmt, "{} ({:?})", self.ty, tag),
            None => fmt::Display::fmt(&self.ty, fmt),
        }
    }
}
