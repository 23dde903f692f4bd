//! Cropkit Core - Crop-session orchestration
//!
//! This crate provides the synchronous heart of cropkit: the crop-session
//! state machine, the aspect-ratio policy, the editing-instance seam with
//! an in-process software implementation, and canvas extraction to an
//! encoded image blob.
//!
//! The async publish side (remote asset store, upload gateway) lives in
//! the `cropkit-publish` crate.

pub mod extract;
pub mod instance;
pub mod mode;
pub mod session;
pub mod source;
pub mod transform;

pub use extract::{artifact_file_name, extract, ExtractConstraints, ExtractError, ImageBlob};
pub use instance::{
    CanvasOptions, CropRect, CropperConfig, EditingInstance, InstanceFactory, SoftwareCropper,
    SoftwareCropperFactory,
};
pub use mode::{CropMode, FREE_FORM};
pub use session::{CropSessionController, SessionError, SessionState};
pub use source::{Canvas, DecodeError, SourceFile};
