use axum::{
    extract::Host,
    http::header,
    response::{Html, IntoResponse},
    routing::get,
    Router,
};

use super::AppState;

const OPENAPI_SPEC: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/docs/openapi.yaml"));

pub async fn openapi_yaml() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/yaml; charset=utf-8")], OPENAPI_SPEC)
}

/// Scalar reference page, with `servers` pointed at whoever answered.
pub async fn docs_html(Host(host): Host) -> Html<String> {
    let mut document: serde_json::Value = serde_yaml::from_str(OPENAPI_SPEC).unwrap_or_default();

    if let Some(obj) = document.as_object_mut() {
        obj.insert(
            "servers".to_string(),
            serde_json::json!([{ "url": format!("http://{host}"), "description": "This portal" }]),
        );
    }

    let spec_content = serde_json::to_string(&document).unwrap_or_default();

    Html(format!(
        r#"<!doctype html>
<html>
<head>
  <title>Publications portal API</title>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <style>body {{ margin: 0; }}</style>
</head>
<body>
  <script id="api-reference" type="application/json">
    {spec_content}
  </script>
  <script src="https://cdn.jsdelivr.net/npm/@scalar/api-reference"></script>
</body>
</html>
"#
    ))
}

pub fn routes_docs() -> Router<AppState> {
    Router::<AppState>::new()
        .route("/docs", get(docs_html))
        .route("/docs/openapi.yaml", get(openapi_yaml))
}
