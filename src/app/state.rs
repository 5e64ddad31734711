use crate::error::TransitionError;
use crate::selection::FileSelection;
use tracing::debug;

/// Label shown when nothing is selected.
pub const DEFAULT_PROMPT: &str = "JPG, JPEG, PNG, and PDFs only";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UiPhase {
    #[default]
    Idle,
    Selected,
    Busy,
    Recoverable,
    Completed,
}

/// What each control currently looks like. Rendering reads this; only
/// [`UiController`] writes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Controls {
    pub file_picker_enabled: bool,
    pub submit_enabled: bool,
    pub clear_enabled: bool,
    pub clear_visible: bool,
    pub loader_visible: bool,
    /// Target of the "open question set" control; enabled when bound.
    pub artifact_url: Option<String>,
    pub selection_label: String,
}

impl Default for Controls {
    fn default() -> Self {
        Self {
            file_picker_enabled: true,
            submit_enabled: true,
            clear_enabled: true,
            clear_visible: false,
            loader_visible: false,
            artifact_url: None,
            selection_label: DEFAULT_PROMPT.to_string(),
        }
    }
}

impl Controls {
    pub fn artifact_enabled(&self) -> bool {
        self.artifact_url.is_some()
    }

    fn set_inputs_enabled(&mut self, enabled: bool) {
        self.file_picker_enabled = enabled;
        self.submit_enabled = enabled;
    }
}

#[derive(Debug, Default)]
pub struct UiController {
    phase: UiPhase,
    controls: Controls,
}

impl UiController {
    pub fn phase(&self) -> UiPhase {
        self.phase
    }

    pub fn controls(&self) -> &Controls {
        &self.controls
    }

    /// File picker changed. An empty pick leaves everything as it was.
    pub fn select(&mut self, selection: &FileSelection) -> Result<(), TransitionError> {
        self.require(
            "select files",
            &[UiPhase::Idle, UiPhase::Selected, UiPhase::Recoverable],
        )?;
        let Some(label) = selection.display_name() else {
            return Ok(());
        };

        self.controls.selection_label = label;
        self.controls.clear_visible = true;
        self.enter(UiPhase::Selected);
        Ok(())
    }

    pub fn begin_submit(&mut self) -> Result<(), TransitionError> {
        self.require("submit", &[UiPhase::Selected, UiPhase::Recoverable])?;

        self.controls.set_inputs_enabled(false);
        self.controls.clear_enabled = false;
        self.controls.loader_visible = true;
        self.enter(UiPhase::Busy);
        Ok(())
    }

    pub fn fail(&mut self) -> Result<(), TransitionError> {
        self.require("report a failure", &[UiPhase::Busy])?;

        self.controls.set_inputs_enabled(true);
        self.controls.loader_visible = false;
        self.controls.clear_enabled = true;
        self.enter(UiPhase::Recoverable);
        Ok(())
    }

    pub fn complete(&mut self, artifact_url: String) -> Result<(), TransitionError> {
        self.require("complete", &[UiPhase::Busy])?;

        self.controls.loader_visible = false;
        self.controls.clear_enabled = true;
        self.controls.artifact_url = Some(artifact_url);
        self.enter(UiPhase::Completed);
        Ok(())
    }

    /// Back to `Idle`. The artifact binding survives a clear.
    pub fn clear(&mut self) -> Result<(), TransitionError> {
        match self.phase {
            UiPhase::Busy => Err(TransitionError {
                from: self.phase,
                event: "clear",
            }),
            UiPhase::Idle => Ok(()),
            _ => {
                self.controls.selection_label = DEFAULT_PROMPT.to_string();
                self.controls.clear_visible = false;
                self.controls.clear_enabled = true;
                self.controls.set_inputs_enabled(true);
                self.enter(UiPhase::Idle);
                Ok(())
            }
        }
    }

    fn require(&self, event: &'static str, allowed: &[UiPhase]) -> Result<(), TransitionError> {
        if allowed.contains(&self.phase) {
            Ok(())
        } else {
            Err(TransitionError {
                from: self.phase,
                event,
            })
        }
    }

    fn enter(&mut self, phase: UiPhase) {
        debug!("UI {:?} -> {:?}", self.phase, phase);
        self.phase = phase;
    }
}
