use elbow_router::Document;
use elbow_router::config::RoutingConfig;
use elbow_router::routing::RouteOptions;
use serde::Deserialize;
use wasm_bindgen::prelude::*;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SceneRouteOptions {
    gap: Option<f64>,
    routing: Option<RoutingConfig>,
    pretty: Option<bool>,
}

fn build_route_options(options: &SceneRouteOptions) -> RouteOptions {
    let mut route_options = RouteOptions::new(options.routing.clone().unwrap_or_default());
    if let Some(gap) = options.gap {
        route_options = route_options.with_gap(gap);
    }
    route_options
}

fn route_scene(scene_json: &str, options: SceneRouteOptions) -> Result<String, String> {
    let mut document = Document::from_json(scene_json).map_err(|error| error.to_string())?;
    document.reroute_all(&build_route_options(&options));
    document
        .to_json(options.pretty.unwrap_or(false))
        .map_err(|error| error.to_string())
}

/// Re-routes every elbowed arrow in a scene document and returns the updated
/// document.
#[wasm_bindgen]
pub fn route_scene_json(scene_json: &str, options_json: Option<String>) -> Result<String, JsValue> {
    let options = if let Some(raw_options) = options_json {
        serde_json::from_str::<SceneRouteOptions>(&raw_options)
            .map_err(|error| JsValue::from_str(&error.to_string()))?
    } else {
        SceneRouteOptions::default()
    };

    route_scene(scene_json, options).map_err(|error| JsValue::from_str(&error))
}
