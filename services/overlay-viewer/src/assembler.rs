//! Per-frame overlay assembly.
//!
//! For every frame advance the assembler loads the frame's mask, computes the
//! recolored fill and the contour set in parallel on the blocking pool, and
//! hands the result to the sink. Requests are numbered when they are made
//! (`begin`); a result is presented only if no later request has been
//! presented already, so a slow load for an old frame can never overwrite a
//! newer overlay.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Instant;

use metrics::{counter, histogram};
use overlay_common::{
    OverlayError, OverlayFrame, OverlayResult, OverlaySink, OverlayVisibility, RasterImage,
    RasterLoader,
};
use overlay_renderer::contour::{trace_with_options, TraceOptions};
use overlay_renderer::field::{extract_with, SampleChannel};
use overlay_renderer::remap::remap;
use overlay_renderer::style::ThresholdSpec;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::config::ViewerConfig;

/// Everything the assembler needs to turn a mask into an overlay frame.
#[derive(Debug, Clone)]
pub struct AssemblerSettings {
    pub key_prefix: String,
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub alpha_multiplier: f32,
    pub stroke_width: f32,
    pub thresholds: ThresholdSpec,
    pub trace_options: TraceOptions,
    pub sampling: SampleChannel,
}

impl AssemblerSettings {
    pub fn from_config(config: &ViewerConfig) -> OverlayResult<Self> {
        Ok(Self {
            key_prefix: config.frames.key_prefix.clone(),
            canvas_width: config.canvas.width,
            canvas_height: config.canvas.height,
            alpha_multiplier: config.fill.alpha_multiplier,
            stroke_width: config.contours.stroke_width,
            thresholds: config.contours.thresholds.clone(),
            trace_options: config.contours.trace_options()?,
            sampling: config.sampling,
        })
    }

    /// Resource key for a frame index.
    pub fn key_for(&self, frame_index: u32) -> String {
        format!("{}{}", self.key_prefix, frame_index)
    }
}

/// Observable assembler state.
#[derive(Debug, Clone, PartialEq)]
pub enum AssemblerState {
    Idle,
    Loading(u32),
    Ready(Arc<OverlayFrame>),
}

/// What happened to one `advance` request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceOutcome {
    /// The frame's overlay is now presented
    Applied,
    /// A later request was presented first; this result was discarded
    Superseded,
    /// The frame has no usable mask; the overlay was cleared
    NoOverlay,
}

/// A frame request numbered in the order it was made.
///
/// Obtained from [`OverlayAssembler::begin`] and redeemed with
/// [`OverlayAssembler::complete`]. Requests are ordered by when `begin`
/// ran, not by when `complete` gets scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameTicket {
    pub frame_index: u32,
    seq: u64,
}

/// Running totals of frame outcomes, mirrored into `metrics`.
#[derive(Debug, Default)]
struct FrameCounters {
    applied: AtomicU64,
    superseded: AtomicU64,
    failed: AtomicU64,
    rejected: AtomicU64,
}

/// Snapshot of [`FrameCounters`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub applied: u64,
    pub superseded: u64,
    /// Masks that could not be loaded or decoded
    pub failed: u64,
    /// Masks that loaded but broke a precondition (shape, canvas size)
    pub rejected: u64,
}

/// Presentation bookkeeping, only touched under the mutex.
struct Presentation {
    visibility: OverlayVisibility,
    state: AssemblerState,
    current: Option<Arc<OverlayFrame>>,
    latest_requested: u64,
    last_applied: u64,
}

/// Assembles and presents overlays for one viewer.
///
/// The presentation mutex is held until the sink has finished drawing, so
/// draws reach the sink in the same order as the supersession checks. The
/// drawing itself runs on the blocking pool.
pub struct OverlayAssembler<L, S> {
    loader: L,
    settings: Arc<AssemblerSettings>,
    sink: Arc<StdMutex<S>>,
    presentation: Mutex<Presentation>,
    counters: FrameCounters,
}

impl<L, S> OverlayAssembler<L, S>
where
    L: RasterLoader + 'static,
    S: OverlaySink + 'static,
{
    pub fn new(loader: L, sink: S, settings: AssemblerSettings) -> Self {
        Self::with_visibility(loader, sink, settings, OverlayVisibility::default())
    }

    pub fn with_visibility(
        loader: L,
        sink: S,
        settings: AssemblerSettings,
        visibility: OverlayVisibility,
    ) -> Self {
        Self {
            loader,
            settings: Arc::new(settings),
            sink: Arc::new(StdMutex::new(sink)),
            presentation: Mutex::new(Presentation {
                visibility,
                state: AssemblerState::Idle,
                current: None,
                latest_requested: 0,
                last_applied: 0,
            }),
            counters: FrameCounters::default(),
        }
    }

    pub fn settings(&self) -> &AssemblerSettings {
        &self.settings
    }

    /// Load, compute and present the overlay for `frame_index`.
    pub async fn advance(&self, frame_index: u32) -> AdvanceOutcome {
        let ticket = self.begin(frame_index).await;
        self.complete(ticket).await
    }

    /// Register a request for `frame_index`, making it the newest one.
    pub async fn begin(&self, frame_index: u32) -> FrameTicket {
        let mut p = self.presentation.lock().await;
        p.latest_requested += 1;
        p.state = AssemblerState::Loading(frame_index);
        FrameTicket {
            frame_index,
            seq: p.latest_requested,
        }
    }

    /// Load and compute the ticket's frame, then present it unless a later
    /// request has been presented already.
    pub async fn complete(&self, ticket: FrameTicket) -> AdvanceOutcome {
        let FrameTicket { frame_index, seq } = ticket;
        let key = self.settings.key_for(frame_index);

        debug!(frame_index, seq, key = %key, "Loading overlay mask");

        let start = Instant::now();
        let result = match self.loader.load(&key).await {
            Ok(raster) => self.compute(frame_index, raster).await,
            Err(e) => Err(e),
        };

        let mut p = self.presentation.lock().await;

        if seq <= p.last_applied {
            counter!("overlay_frames_superseded_total").increment(1);
            self.counters.superseded.fetch_add(1, Ordering::Relaxed);
            debug!(frame_index, seq, last_applied = p.last_applied, "Discarding superseded overlay");
            return AdvanceOutcome::Superseded;
        }
        p.last_applied = seq;
        let newest = seq == p.latest_requested;

        match result {
            Ok(frame) => {
                histogram!("overlay_frame_compute_seconds").record(start.elapsed().as_secs_f64());
                counter!("overlay_frames_applied_total").increment(1);
                self.counters.applied.fetch_add(1, Ordering::Relaxed);

                info!(
                    frame_index,
                    paths = frame.contours.len(),
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "Overlay frame ready"
                );

                let frame = Arc::new(frame);
                p.current = Some(frame.clone());
                if newest {
                    p.state = AssemblerState::Ready(frame.clone());
                }
                self.redraw(Some(frame), p.visibility).await;
                AdvanceOutcome::Applied
            }
            Err(e) => {
                if e.is_recoverable() {
                    counter!("overlay_frames_failed_total").increment(1);
                    self.counters.failed.fetch_add(1, Ordering::Relaxed);
                    warn!(frame_index, key = %key, error = %e, "No overlay for frame");
                } else {
                    counter!("overlay_frames_rejected_total").increment(1);
                    self.counters.rejected.fetch_add(1, Ordering::Relaxed);
                    error!(frame_index, key = %key, error = %e, "Rejected overlay mask");
                }

                p.current = None;
                if newest {
                    p.state = AssemblerState::Idle;
                }
                self.redraw(None, p.visibility).await;
                AdvanceOutcome::NoOverlay
            }
        }
    }

    /// Remap and trace concurrently off the async executor.
    async fn compute(&self, frame_index: u32, raster: RasterImage) -> OverlayResult<OverlayFrame> {
        let settings = self.settings.clone();

        let joined = tokio::task::spawn_blocking(move || -> OverlayResult<OverlayFrame> {
            let (recolored, contours) = rayon::join(
                || remap(&raster),
                || {
                    let field = extract_with(&raster, settings.sampling);
                    let levels = settings.thresholds.resolve(&field);
                    trace_with_options(
                        &field,
                        settings.canvas_width,
                        settings.canvas_height,
                        &levels,
                        &settings.trace_options,
                    )
                },
            );
            Ok(OverlayFrame {
                frame_index,
                recolored,
                contours: contours?,
            })
        })
        .await;

        match joined {
            Ok(result) => result,
            Err(e) => Err(OverlayError::Compute(e.to_string())),
        }
    }

    /// Clear the sink and draw the visible layer of `frame`, if any.
    ///
    /// Callers hold the presentation lock for the whole call.
    async fn redraw(&self, frame: Option<Arc<OverlayFrame>>, visibility: OverlayVisibility) {
        let sink = self.sink.clone();
        let settings = self.settings.clone();

        let joined = tokio::task::spawn_blocking(move || -> OverlayResult<()> {
            let mut sink = sink
                .lock()
                .map_err(|_| OverlayError::Compute("overlay sink lock poisoned".to_string()))?;
            sink.clear()?;
            match (frame.as_deref(), visibility) {
                (Some(frame), OverlayVisibility::Fill) => {
                    sink.draw_fill(frame.frame_index, &frame.recolored, settings.alpha_multiplier)
                }
                (Some(frame), OverlayVisibility::Contours) => sink.draw_contours(
                    frame.frame_index,
                    &frame.contours,
                    settings.canvas_width,
                    settings.canvas_height,
                    settings.stroke_width,
                ),
                _ => Ok(()),
            }
        })
        .await;

        let result = match joined {
            Ok(result) => result,
            Err(e) => Err(OverlayError::Compute(e.to_string())),
        };
        if let Err(e) = result {
            error!(error = %e, visibility = visibility.as_str(), "Failed to present overlay");
        }
    }

    /// Show the recolored fill and hide contours.
    pub async fn enable_fill_overlay(&self) {
        self.set_visibility(OverlayVisibility::Fill).await;
    }

    /// Show contours and hide the fill.
    pub async fn enable_contour_overlay(&self) {
        self.set_visibility(OverlayVisibility::Contours).await;
    }

    /// Hide both layers.
    pub async fn disable_overlays(&self) {
        self.set_visibility(OverlayVisibility::Hidden).await;
    }

    /// Switch the visible layer and re-present the current frame.
    pub async fn set_visibility(&self, visibility: OverlayVisibility) {
        let mut p = self.presentation.lock().await;
        p.visibility = visibility;
        debug!(visibility = visibility.as_str(), "Overlay visibility changed");
        self.redraw(p.current.clone(), visibility).await;
    }

    pub async fn visibility(&self) -> OverlayVisibility {
        self.presentation.lock().await.visibility
    }

    pub async fn state(&self) -> AssemblerState {
        self.presentation.lock().await.state.clone()
    }

    /// The frame currently presented, if any.
    pub async fn current_frame(&self) -> Option<Arc<OverlayFrame>> {
        self.presentation.lock().await.current.clone()
    }

    pub fn stats(&self) -> FrameStats {
        FrameStats {
            applied: self.counters.applied.load(Ordering::Relaxed),
            superseded: self.counters.superseded.load(Ordering::Relaxed),
            failed: self.counters.failed.load(Ordering::Relaxed),
            rejected: self.counters.rejected.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_for_frame() {
        let settings = AssemblerSettings::from_config(&ViewerConfig::default()).unwrap();
        assert_eq!(settings.key_for(0), "overlay_0");
        assert_eq!(settings.key_for(17), "overlay_17");
    }

    #[test]
    fn test_settings_from_config() {
        let mut config = ViewerConfig::default();
        config.canvas.width = 64;
        config.contours.smoothing_passes = 2;

        let settings = AssemblerSettings::from_config(&config).unwrap();
        assert_eq!(settings.canvas_width, 64);
        assert_eq!(settings.trace_options.smoothing_passes, 2);
        assert_eq!(settings.alpha_multiplier, 0.7);
    }
}
