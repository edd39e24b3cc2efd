//! ---
//! mc_section: "01-specification-text"
//! mc_subsection: "module"
//! mc_type: "source"
//! mc_scope: "code"
//! mc_description: "Bracket parameter grammar and ordered parameter sets."
//! mc_version: "v0.0.0-prealpha"
//! mc_owner: "tbd"
//! ---
use crate::{ParameterError, Result};

/// Ordered collection of parsed `key=value` entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterSet {
    entries: Vec<(String, String)>,
}

impl ParameterSet {
    /// Create an empty parameter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry, keeping textual order.
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.push((key.into(), value.into()));
    }

    /// Return the single value stored under `key`.
    pub fn get(&self, key: &str) -> Result<&str> {
        self.get_optional(key)?
            .ok_or_else(|| ParameterError::Missing(key.to_owned()))
    }

    /// Return the value stored under `key` if present at most once.
    pub fn get_optional(&self, key: &str) -> Result<Option<&str>> {
        let mut values = self.values(key);
        let first = values.next();
        let extra = values.count();
        if extra > 0 {
            return Err(ParameterError::Repeated {
                key: key.to_owned(),
                count: extra + 1,
            });
        }
        Ok(first)
    }

    /// Return every value stored under `key`, in textual order.
    pub fn list(&self, key: &str) -> Vec<&str> {
        self.values(key).collect()
    }

    /// All entries in textual order.
    pub fn entries(&self) -> &[(String, String)] {
        &self.entries
    }

    /// Distinct keys in order of first appearance.
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = Vec::new();
        for (key, _) in &self.entries {
            if !keys.contains(&key.as_str()) {
                keys.push(key);
            }
        }
        keys
    }

    /// Fail on the first key that is not part of `accepted`.
    pub fn check_keys(&self, accepted: &[&str]) -> Result<()> {
        match self
            .entries
            .iter()
            .find(|(key, _)| !accepted.contains(&key.as_str()))
        {
            Some((key, _)) => Err(ParameterError::UnknownKey {
                key: key.clone(),
                accepted: accepted.join(", "),
            }),
            None => Ok(()),
        }
    }

    /// Number of entries, counting repeated keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the set holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn values<'a, 'k>(&'a self, key: &'k str) -> impl Iterator<Item = &'a str> + use<'a, 'k> {
        self.entries
            .iter()
            .filter(move |(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ParameterSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut set = ParameterSet::new();
        for (key, value) in iter {
            set.push(key, value);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ParameterSet {
        [("name", "a"), ("requirement", "b"), ("requirement", "c")]
            .into_iter()
            .collect()
    }

    #[test]
    fn get_rejects_repeated_keys() {
        let set = sample();
        assert_eq!(set.get("name").unwrap(), "a");
        assert_eq!(
            set.get("requirement").unwrap_err(),
            ParameterError::Repeated {
                key: "requirement".into(),
                count: 2
            }
        );
        assert!(matches!(set.get("class"), Err(ParameterError::Missing(key)) if key == "class"));
    }

    #[test]
    fn list_and_keys_follow_text_order() {
        let set = sample();
        assert_eq!(set.list("requirement"), vec!["b", "c"]);
        assert!(set.list("predecessor").is_empty());
        assert_eq!(set.keys(), vec!["name", "requirement"]);
    }

    #[test]
    fn values_outlive_a_temporary_key() {
        let set = sample();
        let name = {
            let key = String::from("name");
            set.get_optional(&key).unwrap()
        };
        assert_eq!(name, Some("a"));
        let requirements = {
            let key = String::from("requirement");
            set.list(&key)
        };
        assert_eq!(requirements, vec!["b", "c"]);
    }

    #[test]
    fn check_keys_reports_first_unknown() {
        let set = sample();
        let err = set.check_keys(&["name"]).unwrap_err();
        assert!(matches!(err, ParameterError::UnknownKey { ref key, .. } if key == "requirement"));
        set.check_keys(&["name", "requirement"]).unwrap();
    }
}
