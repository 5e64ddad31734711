mod state;
mod ui;

use crate::config::{parse_server_url, AppConfig};
use crate::error::ValidationError;
use crate::selection::{validate, FileSelection};
use crate::upload::{HttpApi, Orchestrator, SubmissionEvent, SubmissionOutcome};
use derivative::Derivative;
use eframe::{egui, App};
use rfd::FileDialog;
use std::collections::VecDeque;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use tracing::{error, info, warn};

pub use state::{Controls, UiController, UiPhase};

/// Picker filter; the server also accepts gif and txt.
pub const PICKER_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "pdf"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileStatus {
    Uploaded { terms: usize, definitions: usize },
    Failed(String),
}

#[derive(Derivative)]
#[derivative(Debug)]
pub struct QuestionSetUploader {
    config: AppConfig,
    server_url: String,
    selection: FileSelection,
    ui: UiController,
    outcome: SubmissionOutcome,
    file_statuses: Vec<(String, FileStatus)>,
    show_details: bool,
    /// Messages waiting for the user to acknowledge, oldest first.
    alerts: VecDeque<String>,
    #[derivative(Debug = "ignore")]
    events: Option<Receiver<SubmissionEvent>>,
}

impl QuestionSetUploader {
    pub fn new(_cc: &eframe::CreationContext<'_>, config: AppConfig) -> Self {
        info!("Initializing question set uploader against {}", config.server_url);
        Self::with_config(config)
    }

    pub fn with_config(config: AppConfig) -> Self {
        Self {
            server_url: config.server_url.to_string(),
            config,
            selection: FileSelection::default(),
            ui: UiController::default(),
            outcome: SubmissionOutcome::Pending,
            file_statuses: Vec::new(),
            show_details: false,
            alerts: VecDeque::new(),
            events: None,
        }
    }

    pub fn controls(&self) -> &Controls {
        self.ui.controls()
    }

    pub fn phase(&self) -> UiPhase {
        self.ui.phase()
    }

    pub fn outcome(&self) -> &SubmissionOutcome {
        &self.outcome
    }

    pub fn alerts(&self) -> &VecDeque<String> {
        &self.alerts
    }

    fn alert(&mut self, message: impl Into<String>) {
        self.alerts.push_back(message.into());
    }

    pub fn pick_files(&mut self) {
        let Some(paths) = FileDialog::new()
            .add_filter("Images and PDFs", &PICKER_EXTENSIONS[..])
            .pick_files()
        else {
            return;
        };
        self.select_files(FileSelection::from_paths(&paths));
    }

    pub fn select_files(&mut self, selection: FileSelection) {
        match self.ui.select(&selection) {
            Ok(()) if !selection.is_empty() => {
                info!("Selected {} file(s)", selection.len());
                self.selection = selection;
            }
            Ok(()) => {}
            Err(e) => warn!("Ignoring file selection: {}", e),
        }
    }

    /// Validates, enters `Busy` and starts the uploads on a background runtime.
    pub fn submit(&mut self) {
        let valid = match validate(&self.selection) {
            Ok(valid) => valid,
            Err(e) => {
                match &e {
                    ValidationError::TooManyFiles { count, max } => {
                        warn!("Selection rejected: {} files picked, at most {}", count, max)
                    }
                    ValidationError::NoFiles => warn!("Selection rejected: {}", e.reason()),
                }
                self.alert(e.to_string());
                return;
            }
        };

        let server_url = match parse_server_url(&self.server_url) {
            Ok(url) => url,
            Err(e) => {
                self.alert(e.to_string());
                return;
            }
        };

        if let Err(e) = self.ui.begin_submit() {
            warn!("Submit ignored: {}", e);
            return;
        }

        self.outcome = SubmissionOutcome::Pending;
        self.file_statuses.clear();

        let (sender, receiver) = mpsc::channel();
        self.events = Some(receiver);

        let orchestrator = Orchestrator::new(HttpApi::new(server_url), self.config.orchestrator());
        std::thread::spawn(move || {
            let runtime = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(runtime) => runtime,
                Err(e) => {
                    error!("Failed to start runtime: {}", e);
                    let _ = sender.send(SubmissionEvent::Finished(SubmissionOutcome::Failed(
                        format!("Failed to start upload: {}", e),
                    )));
                    return;
                }
            };
            runtime.block_on(orchestrator.submit(&valid, &sender));
        });
    }

    pub fn clear(&mut self) {
        if !self.ui.controls().clear_enabled {
            return;
        }
        match self.ui.clear() {
            Ok(()) => {
                self.selection = FileSelection::default();
                self.file_statuses.clear();
            }
            Err(e) => warn!("Clear ignored: {}", e),
        }
    }

    pub fn open_artifact(&self) {
        if let Some(url) = &self.ui.controls().artifact_url {
            if let Err(e) = open::that(url) {
                error!("Failed to open {}: {}", url, e);
            }
        }
    }

    /// Applies everything the running submission reported so far.
    /// Returns true when anything changed.
    pub fn drain_events(&mut self) -> bool {
        let mut changed = false;
        while let Some(receiver) = &self.events {
            match receiver.try_recv() {
                Ok(event) => {
                    changed = true;
                    self.handle_event(event);
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    // The worker died without reporting an outcome.
                    self.events = None;
                    if self.ui.phase() == UiPhase::Busy {
                        self.handle_event(SubmissionEvent::Finished(SubmissionOutcome::Failed(
                            "Upload stopped unexpectedly".to_string(),
                        )));
                        changed = true;
                    }
                }
            }
        }
        changed
    }

    fn handle_event(&mut self, event: SubmissionEvent) {
        match event {
            SubmissionEvent::FileUploaded {
                file_name,
                terms,
                definitions,
            } => {
                self.file_statuses
                    .push((file_name, FileStatus::Uploaded { terms, definitions }));
            }
            SubmissionEvent::FileFailed { file_name, message } => {
                self.alert(format!("{}; for {}", message, file_name));
                self.file_statuses
                    .push((file_name, FileStatus::Failed(message)));
            }
            SubmissionEvent::ArtifactFailed { message } => {
                self.alert(message);
            }
            SubmissionEvent::Finished(outcome) => {
                self.events = None;
                let transition = match &outcome {
                    SubmissionOutcome::Succeeded(url) => {
                        self.alert("Success!");
                        self.ui.complete(url.clone())
                    }
                    SubmissionOutcome::Failed(_) => self.ui.fail(),
                    SubmissionOutcome::Pending => Ok(()),
                };
                if let Err(e) = transition {
                    warn!("Dropped submission outcome: {}", e);
                }
                self.outcome = outcome;
            }
        }
    }

    pub fn update_state(&mut self, ctx: &egui::Context) {
        if self.drain_events() {
            ctx.request_repaint();
        }
        if self.events.is_some() {
            // keep polling while a submission is in flight
            ctx.request_repaint_after(std::time::Duration::from_millis(100));
        }
    }
}

impl App for QuestionSetUploader {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.update_state(ctx);
        self.render(ctx);
    }
}
