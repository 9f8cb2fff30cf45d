//! Pairing of factory method parameters with assisted constructor
//! parameters.

use hashbrown::hash_map::{Entry, HashMap};

use crate::key::ParameterKey;
use crate::model::Parameter;

/// Assisted constructor parameters indexed by their [ParameterKey].
pub struct Matcher<'a> {
    by_key: HashMap<ParameterKey, &'a Parameter>,
}

/// Two assisted constructor parameters share a key.
#[derive(Debug)]
pub struct Collision<'a> {
    pub key: ParameterKey,
    pub first: &'a Parameter,
    pub second: &'a Parameter,
}

/// A factory method parameter with no assisted constructor parameter of the
/// same key.
#[derive(Debug)]
pub struct Unmatched<'a> {
    pub key: ParameterKey,
    pub parameter: &'a Parameter,
}

/// A factory method parameter and the constructor parameter it supplies.
#[derive(Debug)]
pub struct Match<'a> {
    pub key: ParameterKey,
    pub factory: &'a Parameter,
    pub constructor: &'a Parameter,
}

impl<'a> Matcher<'a> {
    /// Index the given assisted constructor parameters.
    ///
    /// Fails on the first parameter whose key was already taken.
    pub fn new<I>(assisted: I) -> Result<Self, Collision<'a>>
    where
        I: IntoIterator<Item = (ParameterKey, &'a Parameter)>,
    {
        let mut by_key = HashMap::new();

        for (key, parameter) in assisted {
            match by_key.entry(key) {
                Entry::Occupied(e) => {
                    return Err(Collision {
                        key: e.key().clone(),
                        first: *e.get(),
                        second: parameter,
                    });
                }
                Entry::Vacant(e) => {
                    e.insert(parameter);
                }
            }
        }

        Ok(Self { by_key })
    }

    /// The number of indexed parameters.
    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }

    /// Get the constructor parameter for the given key.
    pub fn get(&self, key: &ParameterKey) -> Option<&'a Parameter> {
        self.by_key.get(key).copied()
    }

    /// Pair every factory method parameter with its constructor parameter.
    ///
    /// The result follows the order of `factory`, since the generated method
    /// has to override the factory method parameter for parameter.
    pub fn pair<I>(&self, factory: I) -> Result<Vec<Match<'a>>, Unmatched<'a>>
    where
        I: IntoIterator<Item = (ParameterKey, &'a Parameter)>,
    {
        let mut matches = Vec::new();

        for (key, parameter) in factory {
            let constructor = match self.get(&key) {
                Some(constructor) => constructor,
                None => return Err(Unmatched { key, parameter }),
            };

            matches.push(Match {
                key,
                factory: parameter,
                constructor,
            });
        }

        Ok(matches)
    }
}

#[cfg(test)]
mod tests {
    use super::Matcher;
    use crate::key::ParameterKey;
    use crate::model::Parameter;
    use crate::types::{ClassName, TypeName};

    fn string() -> TypeName {
        TypeName::class(ClassName::new("kotlin", "String"))
    }

    fn int() -> TypeName {
        TypeName::class(ClassName::new("kotlin", "Int"))
    }

    #[test]
    fn test_pairs_in_factory_order() {
        let constructor = [
            Parameter::new("param1", string()),
            Parameter::new("param2", int()),
            Parameter::new("param3", string()),
        ];

        let factory = [
            Parameter::new("b", int()),
            Parameter::new("c", string()),
            Parameter::new("a", string()),
        ];

        let matcher = Matcher::new(vec![
            (ParameterKey::new(string(), Some("one")), &constructor[0]),
            (ParameterKey::of(int()), &constructor[1]),
            (ParameterKey::new(string(), Some("three")), &constructor[2]),
        ])
        .unwrap();

        assert_eq!(matcher.len(), 3);

        let matches = matcher
            .pair(vec![
                (ParameterKey::of(int()), &factory[0]),
                (ParameterKey::new(string(), Some("three")), &factory[1]),
                (ParameterKey::new(string(), Some("one")), &factory[2]),
            ])
            .unwrap();

        let pairs = matches
            .iter()
            .map(|m| (m.factory.name.as_str(), m.constructor.name.as_str()))
            .collect::<Vec<_>>();

        assert_eq!(pairs, vec![("b", "param2"), ("c", "param3"), ("a", "param1")]);
    }

    #[test]
    fn test_collision() {
        let constructor = [
            Parameter::new("first", string()),
            Parameter::new("second", string()),
        ];

        let collision = match Matcher::new(vec![
            (ParameterKey::new(string(), Some("")), &constructor[0]),
            (ParameterKey::of(string()), &constructor[1]),
        ]) {
            Err(collision) => collision,
            Ok(..) => panic!("expected a collision"),
        };

        assert_eq!(collision.first.name, "first");
        assert_eq!(collision.second.name, "second");
        assert_eq!(collision.key, ParameterKey::of(string()));
    }

    #[test]
    fn test_unmatched_names_parameter() {
        let constructor = [Parameter::new("value", string())];
        let factory = [Parameter::new("value", string())];

        let matcher = Matcher::new(vec![(ParameterKey::of(string()), &constructor[0])]).unwrap();

        let unmatched = match matcher.pair(vec![(ParameterKey::new(string(), Some("key")), &factory[0])]) {
            Err(unmatched) => unmatched,
            Ok(..) => panic!("expected no match"),
        };

        assert_eq!(unmatched.parameter.name, "value");
        assert_eq!(unmatched.key.tag(), Some("key"));
    }
}
