use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tracing::{debug, info};

use super::target::CommandTarget;
use crate::error::Result;
use crate::models::{CommandResponse, ControlCommand, RunId};

/// Outcome of one submission during aggregated validation
#[derive(Debug, Clone)]
pub struct TargetResponse {
    pub target: String,
    pub response: CommandResponse,
}

/// Fans one logical submission out to several targets
///
/// Targets and their commands are kept in the order given; that order breaks
/// ties when more than one target rejects.
pub struct CommandDistributor {
    targets: Vec<(Arc<dyn CommandTarget>, Vec<ControlCommand>)>,
}

impl CommandDistributor {
    pub fn new(targets: Vec<(Arc<dyn CommandTarget>, Vec<ControlCommand>)>) -> Self {
        Self { targets }
    }

    /// Submit everything concurrently and return each immediate response in order
    ///
    /// A target that cannot be reached counts as having answered `Error`.
    pub async fn submit_all(&self, timeout: Duration) -> Vec<TargetResponse> {
        self.submit_each(timeout)
            .await
            .into_iter()
            .map(|(_, response)| response)
            .collect()
    }

    async fn submit_each(&self, timeout: Duration) -> Vec<(Arc<dyn CommandTarget>, TargetResponse)> {
        let submissions = self.targets.iter().flat_map(|(target, commands)| {
            commands.iter().cloned().map(move |command| {
                let target = target.clone();
                async move {
                    let run_id = command.run_id();
                    let name = target.target_name();
                    let response = collapse(run_id, target.submit(command, timeout).await);
                    (
                        target,
                        TargetResponse {
                            target: name,
                            response,
                        },
                    )
                }
            })
        });
        join_all(submissions).await
    }

    /// Single response standing for every target's immediate response
    ///
    /// The first negative response in target order, or `Started` under a
    /// fresh run id if no target rejected.
    pub async fn aggregated_validation_response(&self, timeout: Duration) -> CommandResponse {
        let responses = self.submit_all(timeout).await;
        aggregate_validation(RunId::new(), &responses)
    }

    /// Validate across all targets, then wait for every one to finish
    ///
    /// Every outstanding `query_final` is awaited before the aggregate is
    /// built, even after a failure has been seen.
    pub async fn aggregated_completion_response(&self, timeout: Duration) -> CommandResponse {
        let distributor_run_id = RunId::new();
        let submitted = self.submit_each(timeout).await;
        let responses: Vec<TargetResponse> = submitted.iter().map(|(_, r)| r.clone()).collect();

        let validation = aggregate_validation(distributor_run_id, &responses);
        if validation.is_negative() {
            info!(
                run_id = %distributor_run_id,
                response = %validation,
                "Aggregated validation failed"
            );
            return validation;
        }

        let finals = join_all(submitted.into_iter().map(|(target, submitted)| async move {
            if submitted.response.is_terminal() {
                return submitted;
            }
            let run_id = submitted.response.run_id();
            TargetResponse {
                target: submitted.target,
                response: collapse(run_id, target.query_final(run_id, timeout).await),
            }
        }))
        .await;

        aggregate_completion(distributor_run_id, &finals)
    }
}

/// Transport failures and timeouts count as the target answering `Error`
fn collapse(run_id: RunId, result: Result<CommandResponse>) -> CommandResponse {
    result.unwrap_or_else(|e| {
        debug!(run_id = %run_id, error = %e, "Target unreachable, treating as error");
        CommandResponse::error(run_id, e.to_string())
    })
}

pub fn aggregate_validation(run_id: RunId, responses: &[TargetResponse]) -> CommandResponse {
    responses
        .iter()
        .find(|r| r.response.is_negative())
        .map(|r| r.response.clone())
        .unwrap_or(CommandResponse::Started { run_id })
}

pub fn aggregate_completion(run_id: RunId, finals: &[TargetResponse]) -> CommandResponse {
    let failures: Vec<String> = finals
        .iter()
        .filter(|r| !r.response.is_completed())
        .map(|r| format!("{}: {}", r.target, r.response.describe()))
        .collect();

    if failures.is_empty() {
        CommandResponse::completed(run_id)
    } else {
        CommandResponse::error(
            run_id,
            format!("{} of {} targets failed: {}", failures.len(), finals.len(), failures.join("; ")),
        )
    }
}
