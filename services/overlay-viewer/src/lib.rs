//! Mask overlay viewer.
//!
//! Steps through an image stack, loads each frame's segmentation mask and
//! presents either the recolored fill or the contour overlay.

pub mod assembler;
pub mod config;
pub mod events;
pub mod loader;
pub mod snapshot;

pub use assembler::{
    AdvanceOutcome, AssemblerSettings, AssemblerState, FrameStats, FrameTicket, OverlayAssembler,
};
pub use config::ViewerConfig;
pub use events::{drive, DriveSummary, FrameEvent};
pub use loader::DirectoryLoader;
pub use snapshot::SnapshotSink;
