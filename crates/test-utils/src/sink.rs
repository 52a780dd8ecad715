//! Overlay sink that records calls instead of drawing.

use std::sync::{Arc, Mutex};

use overlay_common::{ContourSet, OverlayResult, OverlaySink, RasterImage};

/// One call made against a [`RecordingSink`].
#[derive(Debug, Clone, PartialEq)]
pub enum SinkEvent {
    Clear,
    Fill {
        frame_index: u32,
        width: u32,
        height: u32,
        alpha_multiplier: f32,
    },
    Contours {
        frame_index: u32,
        paths: usize,
        output_width: u32,
        output_height: u32,
        stroke_width: f32,
    },
}

impl SinkEvent {
    /// Frame shown by a draw event, `None` for clears.
    pub fn frame_index(&self) -> Option<u32> {
        match self {
            SinkEvent::Clear => None,
            SinkEvent::Fill { frame_index, .. } | SinkEvent::Contours { frame_index, .. } => {
                Some(*frame_index)
            }
        }
    }
}

/// Records every sink call; clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    events: Arc<Mutex<Vec<SinkEvent>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all events so far.
    pub fn events(&self) -> Vec<SinkEvent> {
        self.events.lock().expect("sink log poisoned").clone()
    }

    /// Draw events only, in call order.
    pub fn draws(&self) -> Vec<SinkEvent> {
        self.events()
            .into_iter()
            .filter(|e| !matches!(e, SinkEvent::Clear))
            .collect()
    }

    /// The last draw event, if any.
    pub fn last_draw(&self) -> Option<SinkEvent> {
        self.draws().pop()
    }

    pub fn clear_log(&self) {
        self.events.lock().expect("sink log poisoned").clear();
    }

    fn push(&self, event: SinkEvent) {
        self.events.lock().expect("sink log poisoned").push(event);
    }
}

impl OverlaySink for RecordingSink {
    fn clear(&mut self) -> OverlayResult<()> {
        self.push(SinkEvent::Clear);
        Ok(())
    }

    fn draw_fill(
        &mut self,
        frame_index: u32,
        buffer: &RasterImage,
        alpha_multiplier: f32,
    ) -> OverlayResult<()> {
        self.push(SinkEvent::Fill {
            frame_index,
            width: buffer.width(),
            height: buffer.height(),
            alpha_multiplier,
        });
        Ok(())
    }

    fn draw_contours(
        &mut self,
        frame_index: u32,
        contours: &ContourSet,
        output_width: u32,
        output_height: u32,
        stroke_width: f32,
    ) -> OverlayResult<()> {
        self.push(SinkEvent::Contours {
            frame_index,
            paths: contours.len(),
            output_width,
            output_height,
            stroke_width,
        });
        Ok(())
    }
}
