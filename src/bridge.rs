use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::Result;
use crate::event::AlarmEvent;
use crate::types::{EventKind, NodeUri, SuppressionAction, SuppressionState};

/// Operations the bridge needs from the monitoring platform.
///
/// [`crate::swis::SwisClient`] is the production implementation; tests plug
/// in an in-memory double.
#[allow(async_fn_in_trait)]
pub trait SuppressionApi {
    /// Resolves a node by its exact `NodeName`. The first match wins.
    async fn find_node_uri(&self, node_name: &str) -> Result<NodeUri>;

    async fn suppression_state(&self, uri: &NodeUri) -> Result<SuppressionState>;

    /// Mutes alerts for `uri` starting at `from`, with no end.
    async fn suppress_alerts(&self, uri: &NodeUri, from: DateTime<Utc>) -> Result<()>;

    async fn resume_alerts(&self, uri: &NodeUri) -> Result<()>;
}

/// What a single run observed and did.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub node_uri: NodeUri,
    pub before: SuppressionState,
    pub kinds: Vec<EventKind>,
    /// Actions sent to the API; empty on dry runs.
    pub actions: Vec<SuppressionAction>,
    pub after: SuppressionState,
}

pub struct AlarmBridge<A> {
    api: A,
    dry_run: bool,
}

impl<A> AlarmBridge<A>
where
    A: SuppressionApi,
{
    pub fn new(api: A) -> Self {
        Self {
            api,
            dry_run: false,
        }
    }

    /// Classify and log, but never call suppress or resume.
    #[must_use]
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub const fn api(&self) -> &A {
        &self.api
    }

    /// Handles one alarm end to end.
    ///
    /// # Errors
    ///
    /// Fails when the target node does not exist or when any API call
    /// fails. Nothing is retried; steps already performed are not undone.
    pub async fn run(&self, event: &AlarmEvent) -> Result<RunReport> {
        let node = event.target_name.as_str();
        info!(
            alarm = %event.alarm_name,
            target = node,
            description = %event.description,
            "alarm received"
        );

        info!(node, "searching node");
        let node_uri = self.api.find_node_uri(node).await?;
        info!(node, uri = %node_uri, "node found");

        let before = self.api.suppression_state(&node_uri).await?;
        log_state(node, &before, "current state");

        let kinds = event.kinds();
        if kinds.is_empty() {
            info!(node, "no standby transition recognised, leaving suppression untouched");
        }
        if kinds.len() > 1 {
            warn!(
                node,
                kinds = ?kinds,
                "description matches several standby patterns, applying each in turn"
            );
        }

        let mut actions = Vec::with_capacity(kinds.len());
        for kind in &kinds {
            let action = kind.action();
            if self.dry_run {
                info!(node, %kind, %action, "dry-run: skipping API call");
                continue;
            }
            match action {
                SuppressionAction::Suppress => {
                    self.api.suppress_alerts(&node_uri, Utc::now()).await?;
                    info!(node, %kind, "node muted");
                }
                SuppressionAction::Resume => {
                    self.api.resume_alerts(&node_uri).await?;
                    info!(node, %kind, "node alerts resumed");
                }
            }
            actions.push(action);
        }

        let after = self.api.suppression_state(&node_uri).await?;
        log_state(node, &after, "final state");

        Ok(RunReport {
            node_uri,
            before,
            kinds,
            actions,
            after,
        })
    }
}

fn log_state(node: &str, state: &SuppressionState, stage: &'static str) {
    if state.is_suppressed() {
        info!(node, mode = %state.mode, stage, "node alerts are muted");
    } else {
        info!(node, mode = %state.mode, stage, "node is active");
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Mutex, PoisonError};

    use chrono::{DateTime, Utc};

    use super::{AlarmBridge, SuppressionApi};
    use crate::Result;
    use crate::error::{Error, SwisError};
    use crate::event::AlarmEvent;
    use crate::types::{
        EventKind, NodeUri, SuppressionAction, SuppressionMode, SuppressionState,
    };

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Find(String),
        State,
        Suppress(DateTime<Utc>),
        Resume,
    }

    struct FakeApi {
        known_node: &'static str,
        mode: Mutex<SuppressionMode>,
        calls: Mutex<Vec<Call>>,
    }

    impl FakeApi {
        fn new(mode: SuppressionMode) -> Self {
            Self {
                known_node: "esx01.lab.local",
                mode: Mutex::new(mode),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn record(&self, call: Call) {
            self.calls
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(call);
        }

        fn calls(&self) -> Vec<Call> {
            self.calls
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone()
        }

        fn count(&self, wanted: fn(&Call) -> bool) -> usize {
            self.calls().iter().filter(|call| wanted(call)).count()
        }

        fn set_mode(&self, mode: SuppressionMode) {
            *self.mode.lock().unwrap_or_else(PoisonError::into_inner) = mode;
        }
    }

    impl SuppressionApi for FakeApi {
        async fn find_node_uri(&self, node_name: &str) -> Result<NodeUri> {
            self.record(Call::Find(node_name.to_string()));
            if node_name == self.known_node {
                Ok(NodeUri::new("swis://orion/Orion/Orion.Nodes/NodeID=42"))
            } else {
                Err(SwisError::NodeNotFound {
                    key: "NodeName",
                    value: node_name.to_string(),
                }
                .into())
            }
        }

        async fn suppression_state(&self, uri: &NodeUri) -> Result<SuppressionState> {
            self.record(Call::State);
            Ok(SuppressionState {
                entity_uri: Some(uri.clone()),
                mode: *self.mode.lock().unwrap_or_else(PoisonError::into_inner),
                suppressed_from: None,
                suppressed_until: None,
            })
        }

        async fn suppress_alerts(&self, _uri: &NodeUri, from: DateTime<Utc>) -> Result<()> {
            self.record(Call::Suppress(from));
            self.set_mode(SuppressionMode::Suppressed);
            Ok(())
        }

        async fn resume_alerts(&self, _uri: &NodeUri) -> Result<()> {
            self.record(Call::Resume);
            self.set_mode(SuppressionMode::NotSuppressed);
            Ok(())
        }
    }

    fn event(description: &str) -> AlarmEvent {
        AlarmEvent {
            alarm_name: "Host standby - DPM".to_string(),
            target_name: "esx01.lab.local".to_string(),
            description: description.to_string(),
        }
    }

    async fn run(
        mode: SuppressionMode,
        description: &str,
    ) -> (AlarmBridge<FakeApi>, super::RunReport) {
        let bridge = AlarmBridge::new(FakeApi::new(mode));
        let report = match bridge.run(&event(description)).await {
            Ok(report) => report,
            Err(err) => panic!("run failed: {err}"),
        };
        (bridge, report)
    }

    const fn is_suppress(call: &Call) -> bool {
        matches!(call, Call::Suppress(_))
    }

    const fn is_resume(call: &Call) -> bool {
        matches!(call, Call::Resume)
    }

    #[tokio::test]
    async fn enter_standby_suppresses_once() {
        let (bridge, report) = run(
            SuppressionMode::NotSuppressed,
            "DRS put esx01.lab.local into standby mode",
        )
        .await;
        assert_eq!(bridge.api().count(is_suppress), 1);
        assert_eq!(bridge.api().count(is_resume), 0);
        assert_eq!(report.actions, vec![SuppressionAction::Suppress]);
        assert!(!report.before.is_suppressed());
        assert!(report.after.is_suppressed());
    }

    #[tokio::test]
    async fn exit_standby_resumes_once() {
        let (bridge, report) = run(
            SuppressionMode::Suppressed,
            "DRS moved esx01.lab.local out of standby mode",
        )
        .await;
        assert_eq!(bridge.api().count(is_resume), 1);
        assert_eq!(bridge.api().count(is_suppress), 0);
        assert_eq!(report.kinds, vec![EventKind::ExitStandby]);
        assert!(!report.after.is_suppressed());
    }

    #[tokio::test]
    async fn failed_exit_resumes_once() {
        let (bridge, report) = run(
            SuppressionMode::Suppressed,
            "DRS cannot move esx01.lab.local out of standby mode",
        )
        .await;
        assert_eq!(bridge.api().count(is_resume), 1);
        assert_eq!(bridge.api().count(is_suppress), 0);
        assert_eq!(report.kinds, vec![EventKind::ExitStandbyFailed]);
    }

    #[tokio::test]
    async fn unrelated_description_changes_nothing() {
        let (bridge, report) = run(
            SuppressionMode::Suppressed,
            "Host esx01.lab.local entered maintenance mode",
        )
        .await;
        assert_eq!(bridge.api().count(is_suppress), 0);
        assert_eq!(bridge.api().count(is_resume), 0);
        assert!(report.actions.is_empty());
        assert_eq!(report.before, report.after);
    }

    #[tokio::test]
    async fn parent_suppression_reads_as_active() {
        let (_, report) = run(
            SuppressionMode::SuppressedByParent,
            "Host esx01.lab.local entered maintenance mode",
        )
        .await;
        assert_eq!(report.before.mode, SuppressionMode::SuppressedByParent);
        assert!(!report.before.is_suppressed());
        assert!(!report.after.is_suppressed());
    }

    #[tokio::test]
    async fn calls_happen_in_pipeline_order() {
        let (bridge, _) = run(
            SuppressionMode::NotSuppressed,
            "DRS put esx01.lab.local into standby mode",
        )
        .await;
        let calls = bridge.api().calls();
        assert_eq!(calls.len(), 4);
        assert_eq!(calls[0], Call::Find("esx01.lab.local".to_string()));
        assert_eq!(calls[1], Call::State);
        assert!(is_suppress(&calls[2]));
        assert_eq!(calls[3], Call::State);
    }

    #[tokio::test]
    async fn suppress_timestamp_is_current_utc() {
        let lower = Utc::now();
        let (bridge, _) = run(
            SuppressionMode::NotSuppressed,
            "DRS put esx01.lab.local into standby mode",
        )
        .await;
        let upper = Utc::now();
        let from = bridge
            .api()
            .calls()
            .into_iter()
            .find_map(|call| match call {
                Call::Suppress(from) => Some(from),
                _ => None,
            });
        match from {
            Some(from) => assert!(lower <= from && from <= upper),
            None => panic!("suppress was not called"),
        }
    }

    #[tokio::test]
    async fn overlapping_patterns_apply_every_action() {
        let (bridge, report) = run(
            SuppressionMode::Suppressed,
            "DRS moved esx01 out of standby mode after DRS cannot move esx01 out of standby mode",
        )
        .await;
        assert_eq!(bridge.api().count(is_resume), 2);
        assert_eq!(report.actions.len(), 2);
    }

    #[tokio::test]
    async fn dry_run_skips_mutations() {
        let bridge =
            AlarmBridge::new(FakeApi::new(SuppressionMode::NotSuppressed)).with_dry_run(true);
        let report = match bridge
            .run(&event("DRS put esx01.lab.local into standby mode"))
            .await
        {
            Ok(report) => report,
            Err(err) => panic!("run failed: {err}"),
        };
        assert_eq!(report.kinds, vec![EventKind::EnterStandby]);
        assert!(report.actions.is_empty());
        assert_eq!(bridge.api().count(is_suppress), 0);
        assert_eq!(report.before, report.after);
    }

    #[tokio::test]
    async fn unknown_node_stops_before_any_suppression_call() {
        let bridge = AlarmBridge::new(FakeApi::new(SuppressionMode::NotSuppressed));
        let mut alarm = event("DRS put esx99 into standby mode");
        alarm.target_name = "esx99.lab.local".to_string();
        let err = match bridge.run(&alarm).await {
            Ok(_) => panic!("expected node lookup to fail"),
            Err(err) => err,
        };
        assert!(err.is_node_not_found());
        assert!(matches!(err, Error::Swis(SwisError::NodeNotFound { .. })));
        assert_eq!(bridge.api().calls().len(), 1);
    }
}
