//! Frame-advance events.
//!
//! The viewer's navigation feeds `FrameEvent`s into a channel. Each event is
//! registered with the assembler as soon as it is received, which fixes its
//! place in the request order, and then completes in its own task so a slow
//! frame never blocks the next one.

use std::sync::Arc;

use overlay_common::{OverlaySink, RasterLoader};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{error, info};

use crate::assembler::{AdvanceOutcome, OverlayAssembler};

/// Request to show the overlay for one frame of the image stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameEvent {
    pub frame_index: u32,
}

/// Counts of advance outcomes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DriveSummary {
    pub applied: usize,
    pub superseded: usize,
    pub no_overlay: usize,
}

impl DriveSummary {
    pub fn record(&mut self, outcome: AdvanceOutcome) {
        match outcome {
            AdvanceOutcome::Applied => self.applied += 1,
            AdvanceOutcome::Superseded => self.superseded += 1,
            AdvanceOutcome::NoOverlay => self.no_overlay += 1,
        }
    }
}

/// Consume events until the channel closes, then wait for in-flight frames.
pub async fn drive<L, S>(
    assembler: Arc<OverlayAssembler<L, S>>,
    mut events: mpsc::Receiver<FrameEvent>,
) -> DriveSummary
where
    L: RasterLoader + 'static,
    S: OverlaySink + 'static,
{
    let mut tasks = JoinSet::new();
    let mut summary = DriveSummary::default();

    while let Some(event) = events.recv().await {
        let ticket = assembler.begin(event.frame_index).await;
        let assembler = assembler.clone();
        tasks.spawn(async move { assembler.complete(ticket).await });
    }

    while let Some(done) = tasks.join_next().await {
        match done {
            Ok(outcome) => summary.record(outcome),
            Err(e) => error!(error = %e, "Frame task failed"),
        }
    }

    info!(
        applied = summary.applied,
        superseded = summary.superseded,
        no_overlay = summary.no_overlay,
        "Frame events drained"
    );

    summary
}
