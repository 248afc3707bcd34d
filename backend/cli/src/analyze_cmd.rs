//! `govsync analyze`: one capture, one analysis, printed review.

use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use govsync_core::{
    analyze_capture, AnalysisClient, AnalysisError, GovSyncError, Session, ViewController,
    DEFAULT_ANALYSIS_FAILURE,
};
use govsync_media::FileCapture;
use serde_json::{json, Value};

use crate::terminal_output::render_review;

pub async fn run(
    path: &Path,
    as_json: bool,
    client: Arc<dyn AnalysisClient>,
    capture: &FileCapture,
) -> Result<()> {
    let image = capture
        .capture(path)
        .await
        .with_context(|| format!("Could not capture {}", path.display()))?;

    let mut controller = ViewController::new();
    controller.start_session();
    analyze_capture(&mut controller, client.as_ref(), image).await?;

    let Some(session) = controller.session() else {
        bail!("Session closed before the analysis finished");
    };

    if as_json {
        println!(
            "{}",
            serde_json::to_string_pretty(&session_json(session, controller.error_message()))?
        );
    } else if let Some(result) = session.analysis() {
        print!("{}", render_review(&session.short_id(), result));
    }

    if session.analysis().is_some() {
        return Ok(());
    }
    let message = controller
        .error_message()
        .unwrap_or(DEFAULT_ANALYSIS_FAILURE);
    Err(GovSyncError::Analysis(AnalysisError::new(message)).into())
}

/// Machine-readable view of a settled session.
fn session_json(session: &Session, error: Option<&str>) -> Value {
    let mut out = json!({
        "sessionId": session.id().to_string(),
        "status": session.status().as_str(),
    });
    match session.analysis() {
        Some(result) => {
            out["extractedData"] = json!(result.license_data);
            out["equivalencyResult"] = json!(result.equivalency);
        }
        None => {
            out["error"] = json!(error.unwrap_or(DEFAULT_ANALYSIS_FAILURE));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use govsync_understanding::MockAnalysisClient;
    use std::io::Write;

    fn png_file() -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".png").tempfile().unwrap();
        file.write_all(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 1, 2, 3])
            .unwrap();
        file
    }

    #[tokio::test]
    async fn successful_analysis_returns_ok() {
        let file = png_file();
        let client = Arc::new(MockAnalysisClient::default());
        run(file.path(), true, client, &FileCapture::default())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn failed_analysis_surfaces_the_message() {
        let file = png_file();
        let client = Arc::new(MockAnalysisClient::failing("low confidence"));
        let err = run(file.path(), false, client, &FileCapture::default())
            .await
            .unwrap_err();

        match err.downcast_ref::<GovSyncError>() {
            Some(GovSyncError::Analysis(e)) => assert_eq!(e.message(), "low confidence"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_file_is_a_capture_error() {
        let client = Arc::new(MockAnalysisClient::default());
        let err = run(
            Path::new("/nonexistent/license.jpg"),
            false,
            client,
            &FileCapture::default(),
        )
        .await
        .unwrap_err();
        assert!(err.downcast_ref::<GovSyncError>().is_none());
        assert!(err.to_string().contains("Could not capture"));
    }

    #[test]
    fn failed_session_json_carries_error() {
        let mut controller = ViewController::new();
        let id = controller.start_session();
        controller
            .submit_capture(govsync_core::ImagePayload::new("a.png", "image/png", vec![1u8]))
            .unwrap();
        controller.complete_analysis(id, Err(AnalysisError::new("blurry")));

        let value = session_json(controller.session().unwrap(), controller.error_message());
        assert_eq!(value["status"], "error");
        assert_eq!(value["error"], "blurry");
        assert!(value.get("extractedData").is_none());
    }
}
