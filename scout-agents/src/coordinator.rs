//! Request loop: ask the router, run the chosen tool, feed the observation
//! back, until the router answers or the step budget runs out.

use scout_common::session::Session;
use scout_common::{Result, ScoutError};
use std::sync::Arc;

use crate::router::{RouteDecision, Router, Step};
use crate::tools::ToolRegistry;

/// Outcome of one coordinator turn.
#[derive(Debug, Clone, PartialEq)]
pub struct Turn {
    pub answer: String,
    pub steps: Vec<Step>,
    /// The step budget ran out before the router answered.
    pub exhausted: bool,
}

pub struct Coordinator {
    router: Arc<dyn Router>,
    tools: ToolRegistry,
    max_steps: usize,
}

impl Coordinator {
    pub fn new(router: Arc<dyn Router>, tools: ToolRegistry, max_steps: usize) -> Result<Self> {
        if max_steps == 0 {
            return Err(ScoutError::Config(
                "coordinator.max_steps must be at least 1".to_string(),
            ));
        }
        if tools.is_empty() {
            return Err(ScoutError::Config("coordinator has no tools".to_string()));
        }
        Ok(Self {
            router,
            tools,
            max_steps,
        })
    }

    /// Handle `request` and return the final answer text.
    pub async fn handle(&self, request: &str, session: &mut Session) -> Result<String> {
        Ok(self.run(request, session).await?.answer)
    }

    /// Handle `request`, keeping the tool calls made along the way.
    pub async fn run(&self, request: &str, session: &mut Session) -> Result<Turn> {
        let request = request.trim();
        if request.is_empty() {
            return Err(ScoutError::Validation("Request cannot be empty".to_string()));
        }

        let mut steps: Vec<Step> = Vec::new();
        for step_no in 1..=self.max_steps {
            let decision = self.router.next_step(request, &steps, &self.tools).await?;
            let (tool, args) = match decision {
                RouteDecision::Respond(answer) => {
                    tracing::info!(session = %session.id(), steps = steps.len(), "coordinator.respond");
                    return Ok(Turn {
                        answer,
                        steps,
                        exhausted: false,
                    });
                }
                RouteDecision::Call { tool, args } => (tool, args),
            };

            tracing::info!(session = %session.id(), step = step_no, %tool, "coordinator.tool.call");
            let observation = match self.tools.find(&tool) {
                None => {
                    tracing::warn!(%tool, "coordinator.tool.unknown");
                    format!(
                        "Error: unknown tool `{tool}`. Available tools: {}",
                        self.tools.names().join(", ")
                    )
                }
                Some(handler) => match handler.call(args.clone(), session).await {
                    Ok(output) => output,
                    Err(e) => {
                        tracing::warn!(%tool, error = %e, "coordinator.tool.failed");
                        format!("Error: {e}")
                    }
                },
            };
            steps.push(Step {
                tool,
                args,
                observation,
            });
        }

        tracing::warn!(max_steps = self.max_steps, "coordinator.budget_exhausted");
        let last = steps
            .last()
            .map(|s| s.observation.clone())
            .unwrap_or_default();
        Ok(Turn {
            answer: format!(
                "{last}\n\n(Stopped after {} steps without a final answer.)",
                self.max_steps
            ),
            steps,
            exhausted: true,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::{SUMMARIZE_TOOL, SummarizeTool};
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    struct Scripted {
        replies: Mutex<VecDeque<RouteDecision>>,
        seen: Mutex<Vec<usize>>,
    }

    impl Scripted {
        fn new(replies: Vec<RouteDecision>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into()),
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl Router for Scripted {
        async fn next_step(
            &self,
            _request: &str,
            transcript: &[Step],
            _tools: &ToolRegistry,
        ) -> Result<RouteDecision> {
            self.seen.lock().unwrap().push(transcript.len());
            Ok(self
                .replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| RouteDecision::Call {
                    tool: SUMMARIZE_TOOL.into(),
                    args: json!({"content": "again"}),
                }))
        }
    }

    fn registry() -> ToolRegistry {
        let mut tools = ToolRegistry::new();
        tools.add(Arc::new(SummarizeTool));
        tools
    }

    #[tokio::test]
    async fn tool_output_is_fed_back_before_answering() {
        let router = Scripted::new(vec![
            RouteDecision::Call {
                tool: SUMMARIZE_TOOL.into(),
                args: json!({"content": "one two three", "length": "short"}),
            },
            RouteDecision::Respond("Here is your summary: one two three...".into()),
        ]);
        let coordinator = Coordinator::new(router.clone(), registry(), 6).unwrap();
        let mut session = Session::new();

        let turn = coordinator.run("summarize this", &mut session).await.unwrap();
        assert_eq!(turn.answer, "Here is your summary: one two three...");
        assert!(!turn.exhausted);
        assert_eq!(turn.steps.len(), 1);
        assert_eq!(turn.steps[0].observation, "one two three...");
        assert_eq!(*router.seen.lock().unwrap(), vec![0, 1]);
    }

    #[tokio::test]
    async fn tool_errors_become_observations() {
        let router = Scripted::new(vec![
            RouteDecision::Call {
                tool: SUMMARIZE_TOOL.into(),
                args: json!({"url": "https://never.example"}),
            },
            RouteDecision::Call {
                tool: "translator".into(),
                args: json!({}),
            },
            RouteDecision::Respond("could not do it".into()),
        ]);
        let coordinator = Coordinator::new(router, registry(), 6).unwrap();
        let turn = coordinator.run("x", &mut Session::new()).await.unwrap();

        assert!(turn.steps[0]
            .observation
            .contains("No content found for URL https://never.example"));
        assert!(turn.steps[1].observation.contains("unknown tool `translator`"));
        assert!(turn.steps[1].observation.contains(SUMMARIZE_TOOL));
        assert_eq!(turn.answer, "could not do it");
    }

    #[tokio::test]
    async fn step_budget_is_enforced() {
        let router = Scripted::new(Vec::new());
        let coordinator = Coordinator::new(router.clone(), registry(), 3).unwrap();
        let turn = coordinator.run("loop forever", &mut Session::new()).await.unwrap();

        assert!(turn.exhausted);
        assert_eq!(turn.steps.len(), 3);
        assert!(turn.answer.starts_with("again..."));
        assert!(turn.answer.contains("Stopped after 3 steps"));
        assert_eq!(router.seen.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn empty_requests_never_reach_the_router() {
        let router = Scripted::new(Vec::new());
        let coordinator = Coordinator::new(router.clone(), registry(), 3).unwrap();
        let err = coordinator.handle("   ", &mut Session::new()).await.unwrap_err();
        assert!(matches!(err, ScoutError::Validation(_)));
        assert!(router.seen.lock().unwrap().is_empty());
    }

    #[test]
    fn zero_budget_is_rejected() {
        let router = Scripted::new(Vec::new());
        assert!(matches!(
            Coordinator::new(router, registry(), 0),
            Err(ScoutError::Config(_))
        ));
    }
}
