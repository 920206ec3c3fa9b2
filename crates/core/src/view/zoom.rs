//! Horizontal pan/zoom state for a timeline viewport.
//!
//! The mapping is `x = (t - window.start) * scale + translate`, with
//! `scale` in pixels per millisecond. After every mutation the state is
//! clamped so the viewport never shows time outside the window and
//! `scale` stays between "whole window fits exactly" and `max_scale`.

use serde::{Deserialize, Serialize};

use super::frame::FrameSlot;

pub const MS_PER_DAY: f64 = 86_400_000.0;

/// Edge tolerance when deciding whether the view is pinned.
const PINNED_EPSILON: f64 = 1e-6;
const MIN_PINCH_DISTANCE: f64 = 1.0;

/// The time range the viewport may show, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: f64,
    pub end: f64,
}

impl TimeWindow {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    pub fn span(&self) -> f64 {
        (self.end - self.start).max(0.0)
    }

    pub fn midpoint(&self) -> f64 {
        self.start + self.span() / 2.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ZoomConfig {
    /// Pixels per millisecond. Raised to the fit-to-window scale when that is larger.
    pub min_scale: f64,
    pub max_scale: f64,
    /// Plain wheel zooms instead of panning.
    pub always_zoom: bool,
    /// Exponent per wheel delta unit.
    pub wheel_sensitivity: f64,
    /// Days visible on first layout; `None` fits the whole window.
    pub initial_span_days: Option<f64>,
    /// Time to center on first layout; defaults to the window midpoint.
    pub initial_center: Option<f64>,
}

impl Default for ZoomConfig {
    fn default() -> Self {
        Self {
            min_scale: 1e-9,
            max_scale: 0.01,
            always_zoom: false,
            wheel_sensitivity: 0.002,
            initial_span_days: None,
            initial_center: None,
        }
    }
}

/// One wheel event, in the host's pixel units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WheelInput {
    pub delta_x: f64,
    pub delta_y: f64,
    /// Cursor position relative to the viewport's left edge.
    pub cursor_x: f64,
    pub ctrl_key: bool,
}

#[derive(Debug, Clone, Copy)]
struct Drag {
    pointer_id: i32,
    anchor_x: f64,
    anchor_translate: f64,
}

#[derive(Debug, Clone, Copy)]
struct Pinch {
    distance: f64,
    scale: f64,
    anchor_time: f64,
}

#[derive(Debug, Clone)]
pub struct TimeZoom {
    window: TimeWindow,
    viewport_width: f64,
    config: ZoomConfig,
    scale: f64,
    translate: f64,
    drag: Option<Drag>,
    pinch: Option<Pinch>,
    moves: FrameSlot<f64>,
}

impl TimeZoom {
    /// Build the initial view: `initial_span_days` wide (never wider than
    /// the window) centered on `initial_center`, or the whole window.
    pub fn new(window: TimeWindow, viewport_width: f64, config: ZoomConfig) -> Self {
        let mut zoom = Self {
            window,
            viewport_width: sanitize_width(viewport_width),
            config,
            scale: 0.0,
            translate: 0.0,
            drag: None,
            pinch: None,
            moves: FrameSlot::new(),
        };

        let (min_scale, _) = zoom.scale_bounds();
        match zoom.config.initial_span_days {
            Some(days) if days > 0.0 && days.is_finite() => {
                zoom.scale = zoom.viewport_width / (days * MS_PER_DAY);
                let center = zoom
                    .config
                    .initial_center
                    .unwrap_or_else(|| window.midpoint());
                let (scale, _) = zoom.clamp(zoom.scale, 0.0);
                zoom.scale = scale;
                zoom.translate = zoom.viewport_width / 2.0 - (center - window.start) * scale;
            }
            _ => {
                zoom.scale = min_scale;
                zoom.translate = 0.0;
            }
        }
        zoom.enforce_invariants();

        tracing::debug!(
            scale = zoom.scale,
            translate = zoom.translate,
            "time zoom initialized"
        );
        zoom
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn translate(&self) -> f64 {
        self.translate
    }

    pub fn window(&self) -> TimeWindow {
        self.window
    }

    pub fn viewport_width(&self) -> f64 {
        self.viewport_width
    }

    pub fn config(&self) -> &ZoomConfig {
        &self.config
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn is_pinching(&self) -> bool {
        self.pinch.is_some()
    }

    /// Time to pixel.
    pub fn to_x(&self, t: f64) -> f64 {
        (t - self.window.start) * self.scale + self.translate
    }

    /// Pixel to time.
    pub fn to_t(&self, x: f64) -> f64 {
        (x - self.translate) / self.scale + self.window.start
    }

    /// The time range currently under the viewport.
    pub fn visible_range(&self) -> TimeWindow {
        TimeWindow::new(self.to_t(0.0), self.to_t(self.viewport_width))
    }

    /// `(min, max)` allowed scale. The minimum never lets the window
    /// shrink below the viewport width.
    pub fn scale_bounds(&self) -> (f64, f64) {
        let configured = if self.config.min_scale.is_finite() && self.config.min_scale > 0.0 {
            self.config.min_scale
        } else {
            f64::MIN_POSITIVE
        };
        let span = self.window.span();
        let fit = if span > 0.0 {
            self.viewport_width / span
        } else {
            0.0
        };
        let min = configured.max(fit);
        (min, self.config.max_scale.max(min))
    }

    fn translate_bounds(&self, scale: f64) -> (f64, f64) {
        let lower = (self.viewport_width - self.window.span() * scale).min(0.0);
        (lower, 0.0)
    }

    /// Clamp a candidate `(scale, translate)` pair into the valid range.
    /// Valid input comes back unchanged.
    pub fn clamp(&self, scale: f64, translate: f64) -> (f64, f64) {
        let (min, max) = self.scale_bounds();
        let scale = if scale.is_finite() {
            scale.clamp(min, max)
        } else {
            min
        };
        let (lower, upper) = self.translate_bounds(scale);
        let translate = if translate.is_finite() {
            translate.clamp(lower, upper)
        } else {
            upper
        };
        (scale, translate)
    }

    /// Re-clamp the current state. Writes only when clamping changed
    /// something; returns whether it did.
    pub fn enforce_invariants(&mut self) -> bool {
        let (scale, translate) = self.clamp(self.scale, self.translate);
        if scale == self.scale && translate == self.translate {
            return false;
        }
        tracing::trace!(
            from_scale = self.scale,
            from_translate = self.translate,
            scale,
            translate,
            "clamped view"
        );
        self.scale = scale;
        self.translate = translate;
        true
    }

    /// Apply a new viewport width and re-clamp.
    pub fn set_viewport_width(&mut self, width: f64) -> bool {
        let width = sanitize_width(width);
        if width == self.viewport_width {
            return false;
        }
        self.viewport_width = width;
        self.enforce_invariants();
        true
    }

    /// Zoom to `scale` keeping the time under `anchor_x` fixed, unless
    /// clamping has to move it.
    pub fn zoom_at(&mut self, anchor_x: f64, scale: f64) -> bool {
        let (clamped, _) = self.clamp(scale, self.translate);
        if clamped == self.scale {
            return false;
        }
        let anchor_time = self.to_t(anchor_x);
        self.zoom_around(anchor_x, anchor_time, scale)
    }

    fn zoom_around(&mut self, anchor_x: f64, anchor_time: f64, scale: f64) -> bool {
        let (scale, _) = self.clamp(scale, self.translate);
        let translate = anchor_x - (anchor_time - self.window.start) * scale;
        self.set(scale, translate)
    }

    /// Zoom around the cursor when ctrl is held or `always_zoom` is set,
    /// pan otherwise. Returns whether the view changed; an unchanged view
    /// means the host may let the event through.
    pub fn on_wheel(&mut self, input: WheelInput) -> bool {
        if input.ctrl_key || self.config.always_zoom {
            let delta = if input.delta_y != 0.0 {
                input.delta_y
            } else {
                input.delta_x
            };
            if delta == 0.0 {
                return false;
            }
            let factor = (-delta * self.config.wheel_sensitivity).exp();
            return self.zoom_at(input.cursor_x, self.scale * factor);
        }

        let delta = if input.delta_x.abs() > input.delta_y.abs() {
            input.delta_x
        } else {
            input.delta_y
        };
        if delta == 0.0 {
            return false;
        }

        let target = self.translate - delta;
        if self.pushes_past_edge(target) {
            return false;
        }
        self.set(self.scale, target)
    }

    /// Start a drag. A second pointer while dragging is ignored.
    pub fn pointer_down(&mut self, pointer_id: i32, x: f64) {
        if self.drag.is_some() || self.pinch.is_some() {
            return;
        }
        self.moves.cancel();
        self.drag = Some(Drag {
            pointer_id,
            anchor_x: x,
            anchor_translate: self.translate,
        });
    }

    /// Queue a drag move for the next frame. Returns `true` when the host
    /// must request a frame and then call [`TimeZoom::on_frame`].
    pub fn pointer_move(&mut self, pointer_id: i32, x: f64) -> bool {
        match self.drag {
            Some(drag) if drag.pointer_id == pointer_id => self.moves.schedule(x),
            _ => false,
        }
    }

    /// Apply the latest queued drag move.
    pub fn on_frame(&mut self) -> bool {
        match self.moves.take() {
            Some(x) => self.apply_drag(x),
            None => false,
        }
    }

    /// End a drag, applying any move still waiting for a frame.
    pub fn pointer_up(&mut self, pointer_id: i32) -> bool {
        if !self.drag.is_some_and(|d| d.pointer_id == pointer_id) {
            return false;
        }
        let changed = self.on_frame();
        self.drag = None;
        changed
    }

    fn apply_drag(&mut self, x: f64) -> bool {
        let Some(mut drag) = self.drag else {
            return false;
        };
        let target = drag.anchor_translate + (x - drag.anchor_x);
        let (lower, upper) = self.translate_bounds(self.scale);
        let clamped = target.clamp(lower, upper);
        if clamped != target {
            // Re-anchor at the edge so reversing direction moves the view
            // immediately instead of first unwinding the overshoot.
            drag.anchor_x = x;
            drag.anchor_translate = clamped;
            self.drag = Some(drag);
        }
        self.set(self.scale, clamped)
    }

    /// Begin a two-finger pinch. Cancels any drag in progress.
    pub fn pinch_start(&mut self, x1: f64, x2: f64) {
        self.drag = None;
        self.moves.cancel();
        let mid = (x1 + x2) / 2.0;
        self.pinch = Some(Pinch {
            distance: (x2 - x1).abs(),
            scale: self.scale,
            anchor_time: self.to_t(mid),
        });
    }

    /// Scale by the change in finger distance, keeping the starting
    /// midpoint's time under the current midpoint.
    pub fn pinch_move(&mut self, x1: f64, x2: f64) -> bool {
        let Some(pinch) = self.pinch else {
            return false;
        };
        let distance = (x2 - x1).abs();
        if pinch.distance < MIN_PINCH_DISTANCE || distance < MIN_PINCH_DISTANCE {
            return false;
        }
        let scale = pinch.scale * distance / pinch.distance;
        self.zoom_around((x1 + x2) / 2.0, pinch.anchor_time, scale)
    }

    pub fn pinch_end(&mut self) {
        self.pinch = None;
    }

    fn pushes_past_edge(&self, target: f64) -> bool {
        let (lower, upper) = self.translate_bounds(self.scale);
        let at_upper = self.translate >= upper - PINNED_EPSILON;
        let at_lower = self.translate <= lower + PINNED_EPSILON;
        (at_upper && target > self.translate) || (at_lower && target < self.translate)
    }

    fn set(&mut self, scale: f64, translate: f64) -> bool {
        let (scale, translate) = self.clamp(scale, translate);
        if scale == self.scale && translate == self.translate {
            return false;
        }
        self.scale = scale;
        self.translate = translate;
        true
    }
}

fn sanitize_width(width: f64) -> f64 {
    if width.is_finite() { width.max(0.0) } else { 0.0 }
}
