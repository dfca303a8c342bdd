use std::fmt::Debug;
use std::time::Duration;

use crate::models::{CurrentState, DemandState, Prefix, StateName};
use crate::params::ParameterSetType;

/// Predicate over a component's published current state
pub trait StateMatcher: Debug + Send + Sync {
    /// Publisher whose states are considered
    fn prefix(&self) -> &Prefix;

    /// Only states with this name are delivered to `check`
    fn state_name(&self) -> &StateName;

    fn check(&self, current: &CurrentState) -> bool;

    /// How long to wait for a match
    fn timeout(&self) -> Duration;
}

/// How demanded values are compared against published ones
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchMode {
    /// Value sequences must be equal
    #[default]
    Exact,
    /// The published sequence must contain every demanded value
    Superset,
}

/// Matches when every demanded parameter is present with matching values
#[derive(Debug, Clone)]
pub struct DemandMatcher {
    demand: DemandState,
    with_units: bool,
    mode: MatchMode,
    timeout: Duration,
}

impl DemandMatcher {
    pub fn new(demand: DemandState, with_units: bool, timeout: Duration) -> Self {
        Self {
            demand,
            with_units,
            mode: MatchMode::Exact,
            timeout,
        }
    }

    pub fn with_mode(mut self, mode: MatchMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn demand(&self) -> &DemandState {
        &self.demand
    }

    pub fn mode(&self) -> MatchMode {
        self.mode
    }
}

impl StateMatcher for DemandMatcher {
    fn prefix(&self) -> &Prefix {
        self.demand.prefix()
    }

    fn state_name(&self) -> &StateName {
        self.demand.state_name()
    }

    fn check(&self, current: &CurrentState) -> bool {
        if current.prefix() != self.demand.prefix()
            || current.state_name() != self.demand.state_name()
        {
            return false;
        }

        self.demand.params().iter().all(|wanted| {
            let Some(actual) = current.params().get_matching(wanted) else {
                return false;
            };
            if self.with_units && actual.units() != wanted.units() {
                return false;
            }
            match self.mode {
                MatchMode::Exact => actual.values() == wanted.values(),
                MatchMode::Superset => wanted.values_subset_of(actual),
            }
        })
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }
}

/// Matches the first state with the right prefix and name, whatever it holds
#[derive(Debug, Clone)]
pub struct PresenceMatcher {
    prefix: Prefix,
    state_name: StateName,
    timeout: Duration,
}

impl PresenceMatcher {
    pub fn new(
        prefix: impl Into<Prefix>,
        state_name: impl Into<StateName>,
        timeout: Duration,
    ) -> Self {
        Self {
            prefix: prefix.into(),
            state_name: state_name.into(),
            timeout,
        }
    }
}

impl StateMatcher for PresenceMatcher {
    fn prefix(&self) -> &Prefix {
        &self.prefix
    }

    fn state_name(&self) -> &StateName {
        &self.state_name
    }

    fn check(&self, current: &CurrentState) -> bool {
        current.prefix() == &self.prefix && current.state_name() == &self.state_name
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{int_key, Units};

    const PREFIX: &str = "wfos.blue.filter";

    fn demand(values: &[i32]) -> DemandState {
        DemandState::new(PREFIX, "filter").add(int_key("encoder").set(values.iter().copied()))
    }

    fn current(values: &[i32]) -> CurrentState {
        CurrentState::new(PREFIX, "filter")
            .add(int_key("encoder").set(values.iter().copied()))
            .add(int_key("temperature").set([12]))
    }

    #[test]
    fn test_exact_match_ignores_extra_keys() {
        let matcher = DemandMatcher::new(demand(&[100]), false, Duration::from_secs(1));
        assert!(matcher.check(&current(&[100])));
        assert!(!matcher.check(&current(&[101])));
        assert!(!matcher.check(&current(&[100, 101])));
    }

    #[test]
    fn test_superset_mode() {
        let matcher = DemandMatcher::new(demand(&[1, 3]), false, Duration::from_secs(1))
            .with_mode(MatchMode::Superset);
        assert!(matcher.check(&current(&[1, 2, 3])));
        assert!(!matcher.check(&current(&[1, 2])));
    }

    #[test]
    fn test_missing_key_never_matches() {
        let matcher = DemandMatcher::new(demand(&[1]), false, Duration::from_secs(1));
        let state = CurrentState::new(PREFIX, "filter").add(int_key("other").set([1]));
        assert!(!matcher.check(&state));
    }

    #[test]
    fn test_prefix_and_name_must_agree() {
        let matcher = DemandMatcher::new(demand(&[1]), false, Duration::from_secs(1));
        let wrong_prefix = CurrentState::new("wfos.red.filter", "filter")
            .add(int_key("encoder").set([1]));
        let wrong_name = CurrentState::new(PREFIX, "other").add(int_key("encoder").set([1]));
        assert!(!matcher.check(&wrong_prefix));
        assert!(!matcher.check(&wrong_name));
    }

    #[test]
    fn test_units_only_checked_when_requested() {
        let wanted = DemandState::new(PREFIX, "filter")
            .add(int_key("encoder").set([5]).with_units(Units::Encoder));
        let published = CurrentState::new(PREFIX, "filter").add(int_key("encoder").set([5]));

        assert!(DemandMatcher::new(wanted.clone(), false, Duration::from_secs(1)).check(&published));
        assert!(!DemandMatcher::new(wanted, true, Duration::from_secs(1)).check(&published));
    }

    #[test]
    fn test_presence_matcher() {
        let matcher = PresenceMatcher::new(PREFIX, "filter", Duration::from_secs(1));
        assert!(matcher.check(&CurrentState::new(PREFIX, "filter")));
        assert!(!matcher.check(&CurrentState::new(PREFIX, "other")));
    }
}
