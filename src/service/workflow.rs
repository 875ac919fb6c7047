//! Ordered workflow steps with critical / best-effort semantics
//!
//! The enrollment decision branch mixes load-bearing mutations with side
//! effects that may fail without voiding the decision. Each step carries
//! an explicit tag; the runner aborts-and-reports on a critical failure
//! and logs-and-continues on a best-effort one.

use crate::error::AppError;
use std::future::Future;
use std::pin::Pin;

type StepFuture<'a> = Pin<Box<dyn Future<Output = crate::error::Result<()>> + Send + 'a>>;

/// How a step's failure affects the workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    /// Failure aborts the remaining steps and is reported to the caller
    Critical,
    /// Failure is logged; the remaining steps still run
    BestEffort,
}

/// One named unit of work in an ordered workflow
pub struct Step<'a> {
    name: &'static str,
    kind: StepKind,
    fut: StepFuture<'a>,
}

impl<'a> Step<'a> {
    pub fn critical(
        name: &'static str,
        fut: impl Future<Output = crate::error::Result<()>> + Send + 'a,
    ) -> Self {
        Self {
            name,
            kind: StepKind::Critical,
            fut: Box::pin(fut),
        }
    }

    pub fn best_effort(
        name: &'static str,
        fut: impl Future<Output = crate::error::Result<()>> + Send + 'a,
    ) -> Self {
        Self {
            name,
            kind: StepKind::BestEffort,
            fut: Box::pin(fut),
        }
    }
}

/// A critical step failure, identifying where the workflow stopped
#[derive(Debug)]
pub struct StepFailure {
    pub step: &'static str,
    pub source: AppError,
}

impl std::fmt::Display for StepFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "step '{}' failed: {}", self.step, self.source)
    }
}

/// Run steps in order.
///
/// Stops at the first critical failure and returns it; best-effort
/// failures are logged and skipped over.
pub async fn run_steps(steps: Vec<Step<'_>>) -> std::result::Result<(), StepFailure> {
    for step in steps {
        match step.fut.await {
            Ok(()) => {}
            Err(e) => match step.kind {
                StepKind::Critical => {
                    return Err(StepFailure {
                        step: step.name,
                        source: e,
                    });
                }
                StepKind::BestEffort => {
                    tracing::warn!(step = step.name, error = %e, "best-effort step failed");
                }
            },
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    fn fail() -> crate::error::Result<()> {
        Err(AppError::BadRequest("boom".to_string()))
    }

    #[tokio::test]
    async fn test_steps_run_in_order() {
        let order = Mutex::new(Vec::new());

        let steps = vec![
            Step::critical("first", async {
                order.lock().unwrap().push("first");
                Ok(())
            }),
            Step::best_effort("second", async {
                order.lock().unwrap().push("second");
                Ok(())
            }),
            Step::critical("third", async {
                order.lock().unwrap().push("third");
                Ok(())
            }),
        ];

        run_steps(steps).await.unwrap();
        assert_eq!(*order.lock().unwrap(), vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn test_critical_failure_aborts_remaining_steps() {
        let ran = AtomicUsize::new(0);

        let steps = vec![
            Step::critical("broken", async { fail() }),
            Step::best_effort("after", async {
                ran.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }),
        ];

        let err = run_steps(steps).await.unwrap_err();
        assert_eq!(err.step, "broken");
        assert_eq!(ran.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_best_effort_failure_continues() {
        let ran = AtomicUsize::new(0);

        let steps = vec![
            Step::best_effort("broken", async { fail() }),
            Step::best_effort("after", async {
                ran.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }),
        ];

        run_steps(steps).await.unwrap();
        assert_eq!(ran.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failure_display_names_step() {
        let steps = vec![Step::critical("card_issuance", async { fail() })];

        let err = run_steps(steps).await.unwrap_err();
        assert!(err.to_string().contains("card_issuance"));
    }
}
