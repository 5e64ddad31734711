use super::client::QuestionSetApi;
use super::types::{AggregatedResult, SubmissionEvent, SubmissionOutcome, UploadResult};
use crate::error::{ApiError, SubmissionError};
use crate::selection::ValidSelection;
use futures::stream::{FuturesUnordered, StreamExt};
use std::future::Future;
use std::sync::mpsc::Sender;
use std::time::Duration;
use tracing::{error, info, warn};

#[derive(Debug, Clone, Default)]
pub struct OrchestratorConfig {
    /// Per-request limit. `None` waits for as long as the server takes.
    pub request_timeout: Option<Duration>,
}

/// Runs one submission: fan out the uploads, wait for all of them, then
/// create the question set if every upload succeeded.
pub struct Orchestrator<A> {
    api: A,
    config: OrchestratorConfig,
}

impl<A: QuestionSetApi> Orchestrator<A> {
    pub fn new(api: A, config: OrchestratorConfig) -> Self {
        Self { api, config }
    }

    #[cfg(test)]
    pub fn api(&self) -> &A {
        &self.api
    }

    /// Always reports exactly one `Finished` event, carrying the returned outcome.
    pub async fn submit(
        &self,
        selection: &ValidSelection,
        events: &Sender<SubmissionEvent>,
    ) -> SubmissionOutcome {
        let outcome = match self.run(selection, events).await {
            Ok(url) => {
                info!("Question set created at {}", url);
                SubmissionOutcome::Succeeded(url)
            }
            Err(e) => {
                warn!("Submission failed: {}", e);
                SubmissionOutcome::Failed(e.to_string())
            }
        };

        let _ = events.send(SubmissionEvent::Finished(outcome.clone()));
        outcome
    }

    async fn run(
        &self,
        selection: &ValidSelection,
        events: &Sender<SubmissionEvent>,
    ) -> Result<String, SubmissionError> {
        let files = selection.selection().files();
        let num_files = files.len();
        info!("Uploading {} file(s)", num_files);

        let mut pending: FuturesUnordered<_> = files
            .iter()
            .map(|file| async move {
                let result = self.limited(self.api.upload(file, num_files)).await;
                (file, result)
            })
            .collect();

        // Completions are folded one at a time, in the order they settle.
        let mut batch = Batch::default();
        while let Some((file, result)) = pending.next().await {
            match result {
                Ok(upload) => {
                    info!(
                        "{}: {} term(s), {} definition(s)",
                        file.name,
                        upload.terms.len(),
                        upload.definitions.len()
                    );
                    let _ = events.send(SubmissionEvent::FileUploaded {
                        file_name: file.name.clone(),
                        terms: upload.terms.len(),
                        definitions: upload.definitions.len(),
                    });
                    batch.absorb(upload);
                }
                Err(e) => {
                    let message = e.to_string();
                    error!(status = ?e.status(), "Upload of {} failed: {}", file.name, message);
                    let _ = events.send(SubmissionEvent::FileFailed {
                        file_name: file.name.clone(),
                        message: message.clone(),
                    });
                    batch.fail(SubmissionError::Upload {
                        file_name: file.name.clone(),
                        message,
                    });
                }
            }
        }

        let filename = selection.selection().display_name().unwrap_or_default();
        let payload = batch.finish(filename)?;
        info!(
            "Creating question set {:?} with {} term(s)",
            payload.filename,
            payload.terms.len()
        );

        match self.limited(self.api.create_question_set(&payload)).await {
            Ok(link) => Ok(link.url),
            Err(e) => {
                let message = e.to_string();
                error!(status = ?e.status(), "Question set creation failed: {}", message);
                let _ = events.send(SubmissionEvent::ArtifactFailed {
                    message: message.clone(),
                });
                Err(SubmissionError::Artifact(message))
            }
        }
    }

    async fn limited<T>(
        &self,
        request: impl Future<Output = Result<T, ApiError>>,
    ) -> Result<T, ApiError> {
        match self.config.request_timeout {
            Some(limit) => tokio::time::timeout(limit, request)
                .await
                .unwrap_or_else(|_| Err(ApiError::Timeout(limit))),
            None => request.await,
        }
    }
}

#[derive(Default)]
struct Batch {
    terms: Vec<String>,
    definitions: Vec<String>,
    failure: Option<SubmissionError>,
}

impl Batch {
    fn absorb(&mut self, upload: UploadResult) {
        self.terms.extend(upload.terms);
        self.definitions.extend(upload.definitions);
    }

    /// Only the first failure is kept; the flag is never cleared.
    fn fail(&mut self, error: SubmissionError) {
        self.failure.get_or_insert(error);
    }

    fn finish(self, filename: String) -> Result<AggregatedResult, SubmissionError> {
        match self.failure {
            Some(error) => Err(error),
            None => Ok(AggregatedResult {
                terms: self.terms,
                definitions: self.definitions,
                filename,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::{validate, FileSelection, SelectedFile};
    use crate::upload::types::ArtifactLink;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{mpsc, Mutex};

    /// Scripted server: each file name maps to a delay and a response.
    #[derive(Default)]
    struct FakeApi {
        uploads: HashMap<String, (u64, Result<UploadResult, String>)>,
        artifact: Option<Result<String, String>>,
        upload_calls: AtomicUsize,
        artifact_calls: AtomicUsize,
        num_files_seen: Mutex<Vec<usize>>,
        payload: Mutex<Option<AggregatedResult>>,
    }

    impl FakeApi {
        fn file(mut self, name: &str, delay_ms: u64, terms: &[&str]) -> Self {
            let result = UploadResult {
                terms: terms.iter().map(|t| t.to_string()).collect(),
                definitions: terms.iter().map(|t| format!("{} def", t)).collect(),
            };
            self.uploads.insert(name.into(), (delay_ms, Ok(result)));
            self
        }

        fn failing_file(mut self, name: &str, delay_ms: u64, message: &str) -> Self {
            self.uploads
                .insert(name.into(), (delay_ms, Err(message.to_string())));
            self
        }

        fn artifact(mut self, result: Result<&str, &str>) -> Self {
            self.artifact = Some(result.map(String::from).map_err(String::from));
            self
        }
    }

    impl QuestionSetApi for FakeApi {
        async fn upload(
            &self,
            file: &SelectedFile,
            num_files: usize,
        ) -> Result<UploadResult, ApiError> {
            self.upload_calls.fetch_add(1, Ordering::SeqCst);
            self.num_files_seen.lock().unwrap().push(num_files);
            let (delay, result) = self.uploads[&file.name].clone();
            tokio::time::sleep(Duration::from_millis(delay)).await;
            result.map_err(|body| ApiError::Status { status: 500, body })
        }

        async fn create_question_set(
            &self,
            payload: &AggregatedResult,
        ) -> Result<ArtifactLink, ApiError> {
            self.artifact_calls.fetch_add(1, Ordering::SeqCst);
            *self.payload.lock().unwrap() = Some(payload.clone());
            match self.artifact.clone().unwrap_or(Ok("https://sets.example/1".into())) {
                Ok(url) => Ok(ArtifactLink { url }),
                Err(body) => Err(ApiError::Status { status: 502, body }),
            }
        }
    }

    fn selection(names: &[&str]) -> ValidSelection {
        let files = names
            .iter()
            .map(|n| SelectedFile::new(*n, format!("/tmp/{}", n), 1))
            .collect();
        validate(&FileSelection::new(files)).unwrap()
    }

    async fn run(
        api: FakeApi,
        config: OrchestratorConfig,
        names: &[&str],
    ) -> (Orchestrator<FakeApi>, SubmissionOutcome, Vec<SubmissionEvent>) {
        let orchestrator = Orchestrator::new(api, config);
        let (tx, rx) = mpsc::channel();
        let outcome = orchestrator.submit(&selection(names), &tx).await;
        let events = rx.try_iter().collect();
        (orchestrator, outcome, events)
    }

    #[tokio::test]
    async fn all_uploads_succeed_and_artifact_is_created_once() {
        let api = FakeApi::default()
            .file("a.png", 5, &["t1", "t2"])
            .file("b.png", 5, &["t3"])
            .file("c.pdf", 5, &["t4", "t5", "t6"]);

        let (orchestrator, outcome, events) =
            run(api, OrchestratorConfig::default(), &["a.png", "b.png", "c.pdf"]).await;

        assert_eq!(
            outcome,
            SubmissionOutcome::Succeeded("https://sets.example/1".into())
        );
        let api = orchestrator.api();
        assert_eq!(api.upload_calls.load(Ordering::SeqCst), 3);
        assert_eq!(api.artifact_calls.load(Ordering::SeqCst), 1);
        assert_eq!(*api.num_files_seen.lock().unwrap(), vec![3, 3, 3]);

        let payload = api.payload.lock().unwrap().clone().unwrap();
        assert_eq!(payload.terms.len(), 6);
        assert_eq!(payload.definitions.len(), 6);
        assert_eq!(payload.filename, "a.png + 2 file(s)");

        assert_eq!(
            events.last(),
            Some(&SubmissionEvent::Finished(outcome.clone()))
        );
        assert_eq!(
            events
                .iter()
                .filter(|e| matches!(e, SubmissionEvent::Finished(_)))
                .count(),
            1
        );
    }

    #[tokio::test]
    async fn aggregation_follows_completion_order() {
        let api = FakeApi::default()
            .file("slow.png", 80, &["slow1", "slow2"])
            .file("fast.png", 5, &["fast1"]);

        let (orchestrator, _, events) =
            run(api, OrchestratorConfig::default(), &["slow.png", "fast.png"]).await;

        let payload = orchestrator.api().payload.lock().unwrap().clone().unwrap();
        assert_eq!(payload.terms, vec!["fast1", "slow1", "slow2"]);
        assert_eq!(
            payload.definitions,
            vec!["fast1 def", "slow1 def", "slow2 def"]
        );
        assert!(matches!(
            &events[0],
            SubmissionEvent::FileUploaded { file_name, .. } if file_name == "fast.png"
        ));
    }

    #[tokio::test]
    async fn one_failure_skips_artifact_but_waits_for_siblings() {
        let api = FakeApi::default()
            .failing_file("bad.jpg", 5, "Could not read image")
            .file("good.png", 60, &["t1"]);

        let (orchestrator, outcome, events) =
            run(api, OrchestratorConfig::default(), &["bad.jpg", "good.png"]).await;

        assert_eq!(
            outcome,
            SubmissionOutcome::Failed("Could not read image; for bad.jpg".into())
        );
        assert_eq!(orchestrator.api().upload_calls.load(Ordering::SeqCst), 2);
        assert_eq!(orchestrator.api().artifact_calls.load(Ordering::SeqCst), 0);

        // Failure is reported first, the slower sibling still settles before Finished.
        assert_eq!(
            events,
            vec![
                SubmissionEvent::FileFailed {
                    file_name: "bad.jpg".into(),
                    message: "Could not read image".into(),
                },
                SubmissionEvent::FileUploaded {
                    file_name: "good.png".into(),
                    terms: 1,
                    definitions: 1,
                },
                SubmissionEvent::Finished(outcome),
            ]
        );
    }

    #[tokio::test]
    async fn first_failure_by_completion_wins() {
        let api = FakeApi::default()
            .failing_file("first.png", 70, "late error")
            .failing_file("second.png", 5, "early error");

        let (_, outcome, events) =
            run(api, OrchestratorConfig::default(), &["first.png", "second.png"]).await;

        assert_eq!(
            outcome,
            SubmissionOutcome::Failed("early error; for second.png".into())
        );
        let failures = events
            .iter()
            .filter(|e| matches!(e, SubmissionEvent::FileFailed { .. }))
            .count();
        assert_eq!(failures, 2);
    }

    #[tokio::test]
    async fn artifact_failure_is_reported() {
        let api = FakeApi::default()
            .file("a.png", 1, &["t1"])
            .artifact(Err("Quizlet is down"));

        let (orchestrator, outcome, events) =
            run(api, OrchestratorConfig::default(), &["a.png"]).await;

        assert_eq!(outcome, SubmissionOutcome::Failed("Quizlet is down".into()));
        assert_eq!(orchestrator.api().artifact_calls.load(Ordering::SeqCst), 1);
        assert!(events.contains(&SubmissionEvent::ArtifactFailed {
            message: "Quizlet is down".into()
        }));
    }

    #[tokio::test]
    async fn hung_request_fails_when_timeout_is_set() {
        let api = FakeApi::default()
            .file("hung.pdf", 5_000, &["never"])
            .file("ok.png", 1, &["t1"]);
        let config = OrchestratorConfig {
            request_timeout: Some(Duration::from_millis(50)),
        };

        let (orchestrator, outcome, _) = run(api, config, &["hung.pdf", "ok.png"]).await;

        assert_eq!(
            outcome,
            SubmissionOutcome::Failed("Request timed out after 50ms; for hung.pdf".into())
        );
        assert_eq!(orchestrator.api().artifact_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn long_selection_name_is_truncated_in_payload() {
        let api = FakeApi::default().file("exam_notes_final_version_2023_week12.pdf", 1, &["t"]);

        let (orchestrator, _, _) = run(
            api,
            OrchestratorConfig::default(),
            &["exam_notes_final_version_2023_week12.pdf"],
        )
        .await;

        let payload = orchestrator.api().payload.lock().unwrap().clone().unwrap();
        assert_eq!(payload.filename, "exam_notes_fina...sion_2023_week12.pdf");
    }
}
