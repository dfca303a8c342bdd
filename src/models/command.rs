use std::fmt;

use serde::{Deserialize, Serialize};

use super::identity::{ObsId, Prefix, RunId};
use crate::params::{ParameterSet, ParameterSetType};

/// Name of the operation a command asks for
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommandName(String);

impl CommandName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CommandName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CommandName {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandKind {
    /// Changes the target's configuration
    Setup,
    /// Asks the target to observe without reconfiguring
    Observe,
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Setup => write!(f, "setup"),
            Self::Observe => write!(f, "observe"),
        }
    }
}

/// A command sent from one component to another
///
/// The run id is assigned at construction and survives every builder call, so
/// `ControlCommand::setup(..).add(p)` still correlates with the id you read
/// before adding parameters. Use [`clone_command`](Self::clone_command) to
/// resend the same content under a fresh id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlCommand {
    kind: CommandKind,
    run_id: RunId,
    source: Prefix,
    command_name: CommandName,
    maybe_obs_id: Option<ObsId>,
    params: ParameterSet,
}

impl ControlCommand {
    pub fn setup(
        source: impl Into<Prefix>,
        command_name: impl Into<CommandName>,
        maybe_obs_id: Option<ObsId>,
    ) -> Self {
        Self::new(CommandKind::Setup, source.into(), command_name.into(), maybe_obs_id)
    }

    pub fn observe(
        source: impl Into<Prefix>,
        command_name: impl Into<CommandName>,
        maybe_obs_id: Option<ObsId>,
    ) -> Self {
        Self::new(CommandKind::Observe, source.into(), command_name.into(), maybe_obs_id)
    }

    fn new(
        kind: CommandKind,
        source: Prefix,
        command_name: CommandName,
        maybe_obs_id: Option<ObsId>,
    ) -> Self {
        Self {
            kind,
            run_id: RunId::new(),
            source,
            command_name,
            maybe_obs_id,
            params: ParameterSet::new(),
        }
    }

    pub fn kind(&self) -> CommandKind {
        self.kind
    }

    pub fn run_id(&self) -> RunId {
        self.run_id
    }

    pub fn source(&self) -> &Prefix {
        &self.source
    }

    pub fn command_name(&self) -> &CommandName {
        &self.command_name
    }

    pub fn maybe_obs_id(&self) -> Option<&ObsId> {
        self.maybe_obs_id.as_ref()
    }

    /// Same command content under a newly generated run id
    pub fn clone_command(&self) -> Self {
        Self {
            run_id: RunId::new(),
            ..self.clone()
        }
    }
}

impl ParameterSetType for ControlCommand {
    fn params(&self) -> &ParameterSet {
        &self.params
    }

    fn params_mut(&mut self) -> &mut ParameterSet {
        &mut self.params
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::int_key;

    #[test]
    fn test_builder_keeps_run_id() {
        let setup = ControlCommand::setup("wfos.blue.filter", "move", None);
        let run_id = setup.run_id();
        let setup = setup.add(int_key("encoder").set([22, 23]));

        assert_eq!(setup.run_id(), run_id);
        assert_eq!(setup.kind(), CommandKind::Setup);
        assert_eq!(setup.params().len(), 1);
    }

    #[test]
    fn test_clone_command_issues_new_run_id() {
        let observe = ControlCommand::observe("tcs.mount", "track", Some(ObsId::new("Obs001")))
            .add(int_key("encoder").set([1]));
        let cloned = observe.clone_command();

        assert_ne!(cloned.run_id(), observe.run_id());
        assert_eq!(cloned.params(), observe.params());
        assert_eq!(cloned.command_name(), observe.command_name());
        assert_eq!(cloned.maybe_obs_id().map(ObsId::as_str), Some("Obs001"));
    }
}
