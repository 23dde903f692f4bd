//! The crop-session controller.
//!
//! One controller owns the lifecycle of one active crop session: file
//! intake, editing-instance binding, mode application, extraction and
//! the open/close transitions. At most one session is open at a time,
//! and the controller serializes its own method calls, so operations on
//! a session are applied strictly in call order.
//!
//! State machine:
//!
//! ```text
//! Idle -> FileSelected -> Open -> Extracted -> Publishing -> Published
//!                                                        \-> Failed
//! ```
//!
//! Closing the session from any non-Idle state returns to `Idle`.

use thiserror::Error;

use crate::extract::{self, ExtractConstraints, ExtractError, ImageBlob};
use crate::instance::{CropperConfig, EditingInstance, InstanceFactory};
use crate::mode::CropMode;
use crate::source::{DecodeError, SourceFile};

/// Lifecycle state of the crop session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// No file selected, nothing bound.
    #[default]
    Idle,
    /// A file is loaded in memory as a previewable source.
    FileSelected,
    /// An editing instance is bound; live editing is possible.
    Open,
    /// A blob has been extracted from the current crop rectangle.
    Extracted,
    /// A publish is in flight.
    Publishing,
    /// The extracted blob was published.
    Published,
    /// The last publish attempt was rejected; the blob is retained.
    Failed,
}

impl SessionState {
    /// Whether an editing instance is bound in this state.
    pub fn is_open(self) -> bool {
        !matches!(self, SessionState::Idle | SessionState::FileSelected)
    }
}

/// Errors surfaced by session operations.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The selected source could not be decoded when opening the session.
    #[error("Failed to decode source image")]
    Decode(#[from] DecodeError),
}

/// Controller owning one active crop session.
///
/// Generic over the instance factory so the interactive widget and the
/// in-process software cropper are interchangeable.
pub struct CropSessionController<F: InstanceFactory> {
    factory: F,
    config: CropperConfig,
    state: SessionState,
    source: Option<SourceFile>,
    preview: Option<String>,
    instance: Option<F::Instance>,
    mode: CropMode,
    pending_mode: Option<CropMode>,
    blob: Option<ImageBlob>,
}

impl<F: InstanceFactory> CropSessionController<F> {
    /// Create an idle controller.
    pub fn new(factory: F, config: CropperConfig) -> Self {
        Self {
            factory,
            config,
            state: SessionState::Idle,
            source: None,
            preview: None,
            instance: None,
            mode: CropMode::default(),
            pending_mode: None,
            blob: None,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Currently selected crop mode.
    pub fn mode(&self) -> CropMode {
        self.mode
    }

    /// Data-URL preview of the selected source, if any.
    pub fn preview(&self) -> Option<&str> {
        self.preview.as_deref()
    }

    /// The selected source file, if any.
    pub fn source(&self) -> Option<&SourceFile> {
        self.source.as_ref()
    }

    /// The most recently extracted blob, if any.
    pub fn blob(&self) -> Option<&ImageBlob> {
        self.blob.as_ref()
    }

    /// The bound editing instance, if a session is open.
    pub fn instance(&self) -> Option<&F::Instance> {
        self.instance.as_ref()
    }

    /// Select or clear the source file.
    ///
    /// A file failing the `image/*` intake filter is ignored (input
    /// errors are no-ops). Selecting a new file while a session is open
    /// closes the session first; selecting `None` clears the preview and
    /// returns to `Idle`.
    pub fn select_file(&mut self, file: Option<SourceFile>) {
        match file {
            Some(file) if file.is_image() => {
                if self.state.is_open() {
                    self.close_session();
                }
                self.preview = Some(file.to_data_url());
                self.source = Some(file);
                self.blob = None;
                self.state = SessionState::FileSelected;
            }
            Some(_) => {
                // Not an image; keep whatever was selected before.
            }
            None => {
                if self.state.is_open() {
                    self.close_session();
                }
                self.source = None;
                self.preview = None;
                self.blob = None;
                self.state = SessionState::Idle;
            }
        }
    }

    /// Open the session: decode the source and bind an editing instance.
    ///
    /// Valid only from `FileSelected`. Returns `Ok(true)` when a session
    /// is open after the call. Opening while already open is a no-op that
    /// keeps the existing session; opening with no file selected is a
    /// no-op returning `Ok(false)`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Decode`] when the source bytes cannot be
    /// decoded; the controller stays in `FileSelected`.
    pub fn open_session(&mut self) -> Result<bool, SessionError> {
        if self.instance.is_some() {
            return Ok(true);
        }
        let source = match &self.source {
            Some(source) => source,
            None => return Ok(false),
        };

        let canvas = source.decode()?;
        let instance = self.factory.bind(&canvas, &self.config);
        self.instance = Some(instance);
        self.state = SessionState::Open;

        // Apply the current mode now, or defer until the instance
        // signals readiness.
        self.apply_mode(self.mode);
        Ok(true)
    }

    /// Set the crop mode and apply its aspect ratio to the bound instance.
    ///
    /// Valid while a session is open; otherwise a no-op. If the instance
    /// has not finished initializing, the assignment is deferred and
    /// re-applied exactly once on [`notify_instance_ready`]
    /// (the last-set mode wins).
    ///
    /// [`notify_instance_ready`]: Self::notify_instance_ready
    pub fn set_mode(&mut self, mode: CropMode) {
        if !self.state.is_open() {
            return;
        }
        self.mode = mode;
        self.apply_mode(mode);
    }

    fn apply_mode(&mut self, mode: CropMode) {
        match &mut self.instance {
            Some(instance) if instance.is_ready() => {
                instance.set_aspect_ratio(mode.aspect_ratio());
                self.pending_mode = None;
            }
            Some(_) => {
                // Deferred; overwrites any earlier pending assignment.
                self.pending_mode = Some(mode);
            }
            None => {
                // No instance bound: the ratio is discarded, not queued.
            }
        }
    }

    /// Signal that the bound instance finished initializing.
    ///
    /// Applies a deferred mode assignment exactly once.
    pub fn notify_instance_ready(&mut self) {
        if let (Some(instance), Some(mode)) = (&mut self.instance, self.pending_mode.take()) {
            instance.set_aspect_ratio(mode.aspect_ratio());
        }
    }

    /// Set the zoom level (clamped to `[0, 1]`); no state transition.
    pub fn adjust_zoom(&mut self, level: f64) {
        if let Some(instance) = &mut self.instance {
            instance.zoom_to(level.clamp(0.0, 1.0));
        }
    }

    /// Rotate the backing image; no state transition.
    pub fn rotate(&mut self, degrees: f64) {
        if let Some(instance) = &mut self.instance {
            instance.rotate(degrees);
        }
    }

    /// Extract the current crop rectangle as an encoded blob.
    ///
    /// Returns `Ok(None)` without changing state when no ready instance
    /// is bound or a publish is in flight. On success the blob is stored
    /// and the session transitions to `Extracted`.
    pub fn extract(
        &mut self,
        constraints: &ExtractConstraints,
    ) -> Result<Option<&ImageBlob>, ExtractError> {
        if self.state == SessionState::Publishing {
            return Ok(None);
        }
        let instance = match &self.instance {
            Some(instance) => instance,
            None => return Ok(None),
        };

        match extract::extract(instance, constraints)? {
            Some(blob) => {
                self.blob = Some(blob);
                self.state = SessionState::Extracted;
                Ok(self.blob.as_ref())
            }
            None => Ok(None),
        }
    }

    /// Close the session and return to `Idle`.
    ///
    /// The instance is disposed before its handle is dropped so the
    /// underlying rendering resources are released, and the derived blob
    /// and source references are cleared.
    pub fn close_session(&mut self) {
        if let Some(mut instance) = self.instance.take() {
            instance.dispose();
        }
        self.pending_mode = None;
        self.blob = None;
        self.source = None;
        self.preview = None;
        self.state = SessionState::Idle;
    }

    /// Mark a publish as in flight. Valid from `Extracted` or `Failed`
    /// (retry); returns whether the transition happened.
    pub fn begin_publish(&mut self) -> bool {
        if matches!(self.state, SessionState::Extracted | SessionState::Failed)
            && self.blob.is_some()
        {
            self.state = SessionState::Publishing;
            true
        } else {
            false
        }
    }

    /// Record a successful publish.
    pub fn complete_publish(&mut self) {
        if self.state == SessionState::Publishing {
            self.state = SessionState::Published;
        }
    }

    /// Record a rejected publish. The blob is retained so the user can
    /// retry; nothing was published as far as the caller is concerned.
    pub fn fail_publish(&mut self) {
        if self.state == SessionState::Publishing {
            self.state = SessionState::Failed;
        }
    }
}
