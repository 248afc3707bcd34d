//! Runs analysis calls off the event loop and reports back over a channel.
//!
//! The controller is never shared with the spawned task: the task only owns
//! the ticket and a sender, and the loop that owns the controller applies the
//! completion when it arrives.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};
use uuid::Uuid;

use crate::controller::{AnalysisTicket, CompletionOutcome, ViewController};
use crate::error::{AnalysisError, ControllerError};
use crate::traits::AnalysisClient;
use crate::types::{AnalysisResult, ImagePayload};

/// A settled analysis call, tagged with the session it was dispatched for.
#[derive(Debug, Clone)]
pub struct AnalysisCompletion {
    pub session_id: Uuid,
    pub outcome: Result<AnalysisResult, AnalysisError>,
}

/// Run the boundary call and validate what came back.
async fn run_analysis(
    client: &dyn AnalysisClient,
    image: &ImagePayload,
) -> Result<AnalysisResult, AnalysisError> {
    let result = client.analyze(image).await?;
    result.validate()?;
    Ok(result)
}

/// Spawn the analysis for `ticket` on the Tokio runtime.
///
/// Exactly one [`AnalysisCompletion`] is sent on `tx` when the call settles.
pub fn dispatch_analysis(
    client: Arc<dyn AnalysisClient>,
    ticket: AnalysisTicket,
    tx: mpsc::UnboundedSender<AnalysisCompletion>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(
            session_id = %ticket.session_id,
            client = client.name(),
            bytes = ticket.image.len(),
            "Dispatching analysis"
        );
        let outcome = run_analysis(client.as_ref(), &ticket.image).await;
        let completion = AnalysisCompletion {
            session_id: ticket.session_id,
            outcome,
        };
        if tx.send(completion).is_err() {
            debug!(session_id = %ticket.session_id, "Completion receiver dropped");
        }
    })
}

impl ViewController {
    /// Apply a completion received from [`dispatch_analysis`].
    pub fn apply_completion(&mut self, completion: AnalysisCompletion) -> CompletionOutcome {
        self.complete_analysis(completion.session_id, completion.outcome)
    }
}

/// Submit a capture and wait for the analysis in place.
///
/// Used by headless callers that have nothing else to do while the call is
/// outstanding.
pub async fn analyze_capture(
    controller: &mut ViewController,
    client: &dyn AnalysisClient,
    image: ImagePayload,
) -> Result<CompletionOutcome, ControllerError> {
    let ticket = controller.submit_capture(image)?;
    let outcome = run_analysis(client, &ticket.image).await;
    Ok(controller.complete_analysis(ticket.session_id, outcome))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionStatus;
    use crate::types::fixtures;
    use async_trait::async_trait;
    use std::time::Duration;

    struct FixedClient {
        outcome: Result<AnalysisResult, AnalysisError>,
        delay: Duration,
    }

    #[async_trait]
    impl AnalysisClient for FixedClient {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn analyze(&self, _image: &ImagePayload) -> Result<AnalysisResult, AnalysisError> {
            tokio::time::sleep(self.delay).await;
            self.outcome.clone()
        }
    }

    fn client(outcome: Result<AnalysisResult, AnalysisError>) -> Arc<dyn AnalysisClient> {
        Arc::new(FixedClient {
            outcome,
            delay: Duration::from_millis(5),
        })
    }

    #[tokio::test]
    async fn dispatched_success_reaches_review() {
        let mut controller = ViewController::new();
        controller.start_session();
        let ticket = controller.submit_capture(fixtures::image("a.png")).unwrap();
        assert_eq!(controller.session().unwrap().status(), SessionStatus::Analyzing);

        let (tx, mut rx) = mpsc::unbounded_channel();
        dispatch_analysis(client(Ok(fixtures::result())), ticket, tx)
            .await
            .unwrap();

        let completion = rx.recv().await.unwrap();
        assert_eq!(
            controller.apply_completion(completion),
            CompletionOutcome::Applied(SessionStatus::Review)
        );
        assert_eq!(
            controller.session().unwrap().analysis(),
            Some(&fixtures::result())
        );
        // Exactly one completion per dispatch.
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn completion_after_reset_is_ignored() {
        let mut controller = ViewController::new();
        controller.start_session();
        let ticket = controller.submit_capture(fixtures::image("a.png")).unwrap();

        let (tx, mut rx) = mpsc::unbounded_channel();
        let _handle = dispatch_analysis(client(Ok(fixtures::result())), ticket, tx);
        controller.reset_session();
        let replacement = controller.start_session();

        let completion = rx.recv().await.unwrap();
        assert_eq!(controller.apply_completion(completion), CompletionOutcome::Stale);
        let session = controller.session().unwrap();
        assert_eq!(session.id(), replacement);
        assert_eq!(session.status(), SessionStatus::Scanning);
    }

    #[tokio::test]
    async fn invalid_service_output_becomes_error() {
        let mut bad = fixtures::result();
        bad.license_data.authenticity_confidence = 7.0;

        let mut controller = ViewController::new();
        controller.start_session();
        let outcome = analyze_capture(&mut controller, client(Ok(bad)).as_ref(), fixtures::image("a.png"))
            .await
            .unwrap();
        assert_eq!(outcome, CompletionOutcome::Applied(SessionStatus::Error));
        assert!(controller.error_message().unwrap().contains("outside [0, 1]"));
    }

    #[tokio::test]
    async fn analyze_capture_reports_failure_message() {
        let mut controller = ViewController::new();
        controller.start_session();
        let outcome = analyze_capture(
            &mut controller,
            client(Err(AnalysisError::new("low confidence"))).as_ref(),
            fixtures::image("imgB.png"),
        )
        .await
        .unwrap();
        assert_eq!(outcome, CompletionOutcome::Applied(SessionStatus::Error));
        assert_eq!(controller.error_message(), Some("low confidence"));
        assert_eq!(
            controller.session().unwrap().captured_image(),
            Some(&fixtures::image("imgB.png"))
        );
    }

    #[tokio::test]
    async fn analyze_capture_requires_session() {
        let mut controller = ViewController::new();
        let err = analyze_capture(
            &mut controller,
            client(Ok(fixtures::result())).as_ref(),
            fixtures::image("a.png"),
        )
        .await
        .unwrap_err();
        assert_eq!(err, ControllerError::NoActiveSession);
    }
}
