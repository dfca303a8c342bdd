use std::collections::BTreeSet;

use serde::{Deserialize, Deserializer, Serialize};

use super::key::{Key, ParamType};
use super::parameter::Parameter;

/// Insertion-ordered set of parameters, unique by key name and type
///
/// `add` replaces a parameter with the same key; `madd` keeps whatever is
/// already present and, within one batch, the first occurrence of a key.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct ParameterSet {
    params: Vec<Parameter>,
}

/// Decoded lists go through `madd`, so a repeated key keeps its first entry
impl<'de> Deserialize<'de> for ParameterSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<Parameter>::deserialize(deserializer).map(|params| params.into_iter().collect())
    }
}

impl ParameterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, param: Parameter) {
        match self.params.iter_mut().find(|p| p.same_key(&param)) {
            Some(existing) => *existing = param,
            None => self.params.push(param),
        }
    }

    pub fn madd(&mut self, params: impl IntoIterator<Item = Parameter>) {
        for param in params {
            if !self.params.iter().any(|p| p.same_key(&param)) {
                self.params.push(param);
            }
        }
    }

    pub fn remove<T: ParamType>(&mut self, key: &Key<T>) -> Option<Parameter> {
        let index = self
            .params
            .iter()
            .position(|p| p.matches_key(key.name(), T::KEY_TYPE))?;
        Some(self.params.remove(index))
    }

    pub fn get<T: ParamType>(&self, key: &Key<T>) -> Option<&Parameter> {
        self.params
            .iter()
            .find(|p| p.matches_key(key.name(), T::KEY_TYPE))
    }

    /// Look up a parameter with the same name and type as `param`
    pub fn get_matching(&self, param: &Parameter) -> Option<&Parameter> {
        self.params.iter().find(|p| p.same_key(param))
    }

    pub fn exists<T: ParamType>(&self, key: &Key<T>) -> bool {
        self.get(key).is_some()
    }

    /// Names from `names` that have no parameter in this set
    pub fn missing_keys<'a>(&self, names: impl IntoIterator<Item = &'a str>) -> BTreeSet<String> {
        names
            .into_iter()
            .filter(|name| !self.params.iter().any(|p| p.key_name() == *name))
            .map(str::to_string)
            .collect()
    }

    pub fn key_names(&self) -> Vec<&str> {
        self.params.iter().map(Parameter::key_name).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Parameter> {
        self.params.iter()
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

impl FromIterator<Parameter> for ParameterSet {
    fn from_iter<I: IntoIterator<Item = Parameter>>(iter: I) -> Self {
        let mut set = ParameterSet::new();
        set.madd(iter);
        set
    }
}

impl<'a> IntoIterator for &'a ParameterSet {
    type Item = &'a Parameter;
    type IntoIter = std::slice::Iter<'a, Parameter>;

    fn into_iter(self) -> Self::IntoIter {
        self.params.iter()
    }
}

/// Shared builder-style access for anything that carries a parameter set
///
/// Commands and state variables are values: every mutator consumes `self` and
/// hands back the updated record.
pub trait ParameterSetType: Sized {
    fn params(&self) -> &ParameterSet;

    fn params_mut(&mut self) -> &mut ParameterSet;

    fn add(mut self, param: Parameter) -> Self {
        self.params_mut().add(param);
        self
    }

    fn madd(mut self, params: impl IntoIterator<Item = Parameter>) -> Self {
        self.params_mut().madd(params);
        self
    }

    fn remove<T: ParamType>(mut self, key: &Key<T>) -> Self {
        self.params_mut().remove(key);
        self
    }

    fn exists<T: ParamType>(&self, key: &Key<T>) -> bool {
        self.params().exists(key)
    }

    fn get<T: ParamType>(&self, key: &Key<T>) -> Option<&Parameter> {
        self.params().get(key)
    }

    fn missing_keys<'a>(&self, names: impl IntoIterator<Item = &'a str>) -> BTreeSet<String> {
        self.params().missing_keys(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::key::{int_key, string_key};

    #[test]
    fn test_add_replaces_existing_key() {
        let encoder = int_key("encoder");
        let mut set = ParameterSet::new();
        set.add(encoder.set([1]));
        set.add(encoder.set([2]));

        assert_eq!(set.len(), 1);
        assert_eq!(set.get(&encoder).unwrap().values_as::<i32>(), Some(vec![2]));
    }

    #[test]
    fn test_madd_keeps_first_occurrence() {
        let encoder = int_key("encoder");
        let filter = int_key("filter");
        let mut set = ParameterSet::new();
        set.madd([
            encoder.set([1]),
            encoder.set([2]),
            encoder.set([3]),
            filter.set([1]),
            filter.set([2]),
        ]);

        assert_eq!(set.key_names(), vec!["encoder", "filter"]);
        assert_eq!(set.get(&encoder).unwrap().values_as::<i32>(), Some(vec![1]));

        // existing keys are not overwritten by a later madd
        set.madd([int_key("misc").set([100]), encoder.set([9])]);
        assert_eq!(set.key_names(), vec!["encoder", "filter", "misc"]);
        assert_eq!(set.get(&encoder).unwrap().values_as::<i32>(), Some(vec![1]));
    }

    #[test]
    fn test_remove_and_missing_keys() {
        let encoder = int_key("encoder");
        let name = string_key("name");
        let mut set = ParameterSet::new();
        set.add(encoder.set([1]));
        set.add(name.set(["x".to_string()]));

        assert!(set.remove(&encoder).is_some());
        assert!(!set.exists(&encoder));
        assert!(set.remove(&encoder).is_none());

        let missing = set.missing_keys(["encoder", "name", "other"]);
        assert_eq!(
            missing.into_iter().collect::<Vec<_>>(),
            vec!["encoder".to_string(), "other".to_string()]
        );
    }

    #[test]
    fn test_same_name_different_type_are_distinct() {
        let mut set = ParameterSet::new();
        set.add(int_key("mode").set([1]));
        set.add(string_key("mode").set(["fast".to_string()]));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_serde_is_a_plain_list() {
        let set: ParameterSet = [int_key("encoder").set([22, 23])].into_iter().collect();
        let json = serde_json::to_value(&set).unwrap();
        assert!(json.is_array());
        let back: ParameterSet = serde_json::from_value(json).unwrap();
        assert_eq!(back, set);
    }

    #[test]
    fn test_decoding_repeated_keys_keeps_first() {
        let encoder = int_key("encoder");
        let json = serde_json::Value::Array(vec![
            serde_json::to_value(encoder.set([1])).unwrap(),
            serde_json::to_value(encoder.set([2])).unwrap(),
        ]);

        let set: ParameterSet = serde_json::from_value(json).unwrap();

        assert_eq!(set.len(), 1);
        assert_eq!(set.get(&encoder).unwrap().values_as::<i32>(), Some(vec![1]));
    }
}
