//! Browser bridge for the timeline engine.
//!
//! Plain data crosses the boundary as JSON strings using the dashboard's
//! camelCase field names. Each export is a thin wrapper over a private
//! function returning `anyhow::Result`, converted to `JsError` only here.

use std::collections::HashMap;

use anyhow::{Context, Result};
use chronolane_core::{
    EngineConfig, Rejection, RouteOptions, TimeWindow, TimeZoom, TimelineLayout, WheelInput,
};
use chronolane_protocol::{Attachment, Dependency, Rect, SharedStr};
use serde::Serialize;
use serde::de::DeserializeOwned;
use wasm_bindgen::prelude::*;

fn parse<T: DeserializeOwned>(json: &str, what: &str) -> Result<T> {
    serde_json::from_str(json).with_context(|| format!("invalid {what} JSON"))
}

fn engine_config(json: Option<&str>) -> Result<EngineConfig> {
    match json {
        Some(json) => EngineConfig::from_json(json).context("invalid engine config"),
        None => Ok(EngineConfig::default()),
    }
}

fn to_js(err: anyhow::Error) -> JsError {
    JsError::new(&format!("{err:#}"))
}

/// Assign lanes. Returns `{"laneOf": {id: lane}, "laneCount": n}`.
#[wasm_bindgen]
pub fn pack_attachments(attachments: &str) -> Result<String, JsError> {
    pack_json(attachments).map_err(to_js)
}

fn pack_json(attachments: &str) -> Result<String> {
    let attachments: Vec<Attachment> = parse(attachments, "attachments")?;
    let packed = chronolane_core::pack_attachments(&attachments);
    Ok(serde_json::to_string(&packed)?)
}

#[derive(Debug, Serialize)]
struct Verdict {
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<Rejection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

/// Check a proposed dependency. Returns `{"ok": true}` or
/// `{"ok": false, "reason": "...", "message": "..."}`.
///
/// `existing` (a JSON array of dependencies) enables the full cycle check.
/// Without it only the candidate edge is considered; run `critical_path`
/// over the final edge set before saving either way.
#[wasm_bindgen]
pub fn validate_dependency(
    dependency: &str,
    attachments: &str,
    existing: Option<String>,
) -> Result<String, JsError> {
    validate_json(dependency, attachments, existing.as_deref()).map_err(to_js)
}

fn validate_json(dependency: &str, attachments: &str, existing: Option<&str>) -> Result<String> {
    let dependency: Dependency = parse(dependency, "dependency")?;
    let attachments: Vec<Attachment> = parse(attachments, "attachments")?;
    let existing: Vec<Dependency> = match existing {
        Some(json) => parse(json, "existing dependencies")?,
        None => Vec::new(),
    };
    let index: HashMap<SharedStr, Attachment> = attachments
        .into_iter()
        .map(|a| (a.id.clone(), a))
        .collect();

    let verdict = match chronolane_core::validate_dependency_against(&dependency, &index, &existing) {
        Ok(()) => Verdict {
            ok: true,
            reason: None,
            message: None,
        },
        Err(rejection) => Verdict {
            ok: false,
            reason: Some(rejection),
            message: Some(rejection.to_string()),
        },
    };
    Ok(serde_json::to_string(&verdict)?)
}

/// Longest chain through the dependency graph. Returns
/// `{"ids": [...], "totalDuration": ms}`; throws on a cycle.
#[wasm_bindgen]
pub fn critical_path(attachments: &str, dependencies: &str) -> Result<String, JsError> {
    critical_path_json(attachments, dependencies).map_err(to_js)
}

fn critical_path_json(attachments: &str, dependencies: &str) -> Result<String> {
    let attachments: Vec<Attachment> = parse(attachments, "attachments")?;
    let dependencies: Vec<Dependency> = parse(dependencies, "dependencies")?;
    let path = chronolane_core::critical_path(&attachments, &dependencies)?;
    Ok(serde_json::to_string(&path)?)
}

/// SVG path data for one connector between two boxes.
#[wasm_bindgen]
pub fn route_edge(
    from: &str,
    to: &str,
    obstacles: &str,
    options: Option<String>,
) -> Result<String, JsError> {
    route_json(from, to, obstacles, options.as_deref()).map_err(to_js)
}

fn route_json(from: &str, to: &str, obstacles: &str, options: Option<&str>) -> Result<String> {
    let from: Rect = parse(from, "source rect")?;
    let to: Rect = parse(to, "target rect")?;
    let obstacles: Vec<Rect> = parse(obstacles, "obstacles")?;
    let options: RouteOptions = match options {
        Some(json) => parse(json, "route options")?,
        None => RouteOptions::default(),
    };
    Ok(chronolane_core::route_edge(from, to, &options, &obstacles, None))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LayoutResponse<'a> {
    #[serde(flatten)]
    layout: &'a TimelineLayout,
    edges: Vec<chronolane_core::RoutedEdge>,
}

/// Lay out a timeline for the given view transform and route its
/// dependencies in one pass. Returns
/// `{"lanes": {...}, "rects": {id: {x,y,w,h}}, "height": px, "edges": [{id, path}]}`.
#[wasm_bindgen]
pub fn layout_timeline(
    attachments: &str,
    dependencies: &str,
    window_start: f64,
    scale: f64,
    translate: f64,
    config: Option<String>,
) -> Result<String, JsError> {
    layout_json(
        attachments,
        dependencies,
        (window_start, scale, translate),
        config.as_deref(),
    )
    .map_err(to_js)
}

fn layout_json(
    attachments: &str,
    dependencies: &str,
    (window_start, scale, translate): (f64, f64, f64),
    config: Option<&str>,
) -> Result<String> {
    let attachments: Vec<Attachment> = parse(attachments, "attachments")?;
    let dependencies: Vec<Dependency> = parse(dependencies, "dependencies")?;
    let config = engine_config(config)?;

    let layout = TimelineLayout::compute(&attachments, &config.layout, |t| {
        (t - window_start) * scale + translate
    });
    let edges = layout.route_dependencies(&dependencies, &config.routing);
    Ok(serde_json::to_string(&LayoutResponse {
        layout: &layout,
        edges,
    })?)
}

/// Pan/zoom state owned by one timeline view. Wire the DOM handlers to the
/// matching methods; methods returning `true` mean the view changed and
/// the host should re-render (or, for `pointerMove`, request an animation
/// frame and call `onFrame` from it).
#[wasm_bindgen]
pub struct TimeZoomHandle {
    inner: TimeZoom,
}

#[wasm_bindgen]
impl TimeZoomHandle {
    #[wasm_bindgen(constructor)]
    pub fn new(
        window_start: f64,
        window_end: f64,
        viewport_width: f64,
        config: Option<String>,
    ) -> Result<TimeZoomHandle, JsError> {
        let config = engine_config(config.as_deref()).map_err(to_js)?;
        Ok(Self {
            inner: TimeZoom::new(
                TimeWindow::new(window_start, window_end),
                viewport_width,
                config.zoom,
            ),
        })
    }

    #[wasm_bindgen(getter)]
    pub fn scale(&self) -> f64 {
        self.inner.scale()
    }

    #[wasm_bindgen(getter)]
    pub fn translate(&self) -> f64 {
        self.inner.translate()
    }

    #[wasm_bindgen(js_name = toX)]
    pub fn to_x(&self, t: f64) -> f64 {
        self.inner.to_x(t)
    }

    #[wasm_bindgen(js_name = toT)]
    pub fn to_t(&self, x: f64) -> f64 {
        self.inner.to_t(x)
    }

    /// `[start, end]` of the visible time range.
    #[wasm_bindgen(js_name = visibleRange)]
    pub fn visible_range(&self) -> Vec<f64> {
        let range = self.inner.visible_range();
        vec![range.start, range.end]
    }

    #[wasm_bindgen(js_name = onWheel)]
    pub fn on_wheel(&mut self, delta_x: f64, delta_y: f64, cursor_x: f64, ctrl_key: bool) -> bool {
        self.inner.on_wheel(WheelInput {
            delta_x,
            delta_y,
            cursor_x,
            ctrl_key,
        })
    }

    #[wasm_bindgen(js_name = pointerDown)]
    pub fn pointer_down(&mut self, pointer_id: i32, x: f64) {
        self.inner.pointer_down(pointer_id, x);
    }

    #[wasm_bindgen(js_name = pointerMove)]
    pub fn pointer_move(&mut self, pointer_id: i32, x: f64) -> bool {
        self.inner.pointer_move(pointer_id, x)
    }

    #[wasm_bindgen(js_name = onFrame)]
    pub fn on_frame(&mut self) -> bool {
        self.inner.on_frame()
    }

    #[wasm_bindgen(js_name = pointerUp)]
    pub fn pointer_up(&mut self, pointer_id: i32) -> bool {
        self.inner.pointer_up(pointer_id)
    }

    #[wasm_bindgen(js_name = pinchStart)]
    pub fn pinch_start(&mut self, x1: f64, x2: f64) {
        self.inner.pinch_start(x1, x2);
    }

    #[wasm_bindgen(js_name = pinchMove)]
    pub fn pinch_move(&mut self, x1: f64, x2: f64) -> bool {
        self.inner.pinch_move(x1, x2)
    }

    #[wasm_bindgen(js_name = pinchEnd)]
    pub fn pinch_end(&mut self) {
        self.inner.pinch_end();
    }

    pub fn resize(&mut self, viewport_width: f64) -> bool {
        self.inner.set_viewport_width(viewport_width)
    }
}

// `JsError` needs a JS host, so tests drive the `anyhow` layer directly.
#[cfg(test)]
mod tests {
    use super::*;

    const ATTACHMENTS: &str = r#"[
        {"id":"a","timelineId":"t","projectId":"p1","start":0,"end":10},
        {"id":"b","timelineId":"t","projectId":"p2","start":0,"end":5},
        {"id":"c","timelineId":"t","projectId":"p3","start":5,"end":10},
        {"id":"d","timelineId":"t","projectId":"p4","start":10,"end":15}
    ]"#;

    fn value(json: &str) -> serde_json::Value {
        serde_json::from_str(json).unwrap_or_default()
    }

    #[test]
    fn packs_from_host_json() {
        let out = value(&pack_json(ATTACHMENTS).unwrap_or_default());
        assert_eq!(out["laneCount"], 2);
        assert_eq!(out["laneOf"]["b"], 1);
        assert_eq!(out["laneOf"]["d"], 0);
    }

    #[test]
    fn reports_rejection_reason() {
        let dep = r#"{"id":"x","fromAttachmentId":"a","toAttachmentId":"a"}"#;
        let out = value(&validate_json(dep, ATTACHMENTS, None).unwrap_or_default());
        assert_eq!(out["ok"], false);
        assert_eq!(out["reason"], "self");
    }

    #[test]
    fn accepts_valid_dependency() {
        let dep = r#"{"id":"x","fromAttachmentId":"b","toAttachmentId":"c"}"#;
        let out = validate_json(dep, ATTACHMENTS, None).unwrap_or_default();
        assert_eq!(out, r#"{"ok":true}"#);
    }

    #[test]
    fn existing_edges_enable_cycle_check() {
        let dep = r#"{"id":"x","fromAttachmentId":"c","toAttachmentId":"b","type":"ss"}"#;
        let existing = r#"[{"id":"y","fromAttachmentId":"b","toAttachmentId":"c"}]"#;
        let out = value(&validate_json(dep, ATTACHMENTS, Some(existing)).unwrap_or_default());
        assert_eq!(out["reason"], "cycle");
    }

    #[test]
    fn critical_path_cycle_is_an_error() {
        let deps = r#"[
            {"id":"1","fromAttachmentId":"a","toAttachmentId":"d"},
            {"id":"2","fromAttachmentId":"d","toAttachmentId":"a"}
        ]"#;
        let err = critical_path_json(ATTACHMENTS, deps).map(|_| ()).unwrap_err();
        assert!(err.to_string().contains("cycle"), "{err:#}");
    }

    #[test]
    fn critical_path_json_shape() {
        let deps = r#"[{"id":"1","fromAttachmentId":"a","toAttachmentId":"d"}]"#;
        let out = value(&critical_path_json(ATTACHMENTS, deps).unwrap_or_default());
        assert_eq!(out["ids"], serde_json::json!(["a", "d"]));
        assert_eq!(out["totalDuration"], 15);
    }

    #[test]
    fn bad_input_names_the_argument() {
        let err = pack_json("{not json").map(|_| ()).unwrap_err();
        assert!(format!("{err:#}").starts_with("invalid attachments JSON"));
    }

    #[test]
    fn routes_a_straight_edge() {
        let from = r#"{"x":0,"y":0,"w":50,"h":20}"#;
        let to = r#"{"x":200,"y":0,"w":50,"h":20}"#;
        let path = route_json(from, to, "[]", None).unwrap_or_default();
        assert_eq!(path, "M 50 10 L 200 10");
    }

    #[test]
    fn layout_includes_rects_and_edges() {
        let deps = r#"[{"id":"e1","fromAttachmentId":"a","toAttachmentId":"d"}]"#;
        let config = r#"{"layout":{"rowHeight":20,"rowGap":4}}"#;
        let out = value(&layout_json(ATTACHMENTS, deps, (0.0, 10.0, 0.0), Some(config)).unwrap_or_default());
        assert_eq!(out["rects"]["c"]["y"], 24.0);
        assert_eq!(out["rects"]["d"]["x"], 100.0);
        assert_eq!(out["lanes"]["laneCount"], 2);
        assert_eq!(out["height"], 44.0);
        assert_eq!(out["edges"][0]["path"], "M 100 10 L 100 10");
    }
}
