use axum::extract::RawQuery;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use scholar_portal::api;
use scholar_portal::config::Config;
use scholar_portal::search::SearchService;
use scholar_portal::solr::SolrClient;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;

async fn serve(app: Router) -> (String, oneshot::Sender<()>) {
    let listener = tokio::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
        .await
        .unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = oneshot::channel();

    tokio::spawn(async move {
        let _ = axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = rx.await;
            })
            .await;
    });

    (format!("http://{}", addr), tx)
}

fn items() -> Vec<Value> {
    vec![
        json!({
            "search.resourceid": "item-1",
            "dc.title": ["Deep learning for rivers"],
            "dc.contributor.author": ["Quispe, Ana", "Rojas, Luis"],
            "dateIssued.year": [2023],
            "dc.type": ["Article"],
            "location.coll": ["coll-eng", "tgt"],
            "dc.language.iso": ["en"],
            "dc.source": ["Water Journal"]
        }),
        json!({
            "search.resourceid": "item-2",
            "dc.title": ["Say \"hi\" to sediments"],
            "dc.contributor.author": ["Rojas, Luis"],
            "dateIssued.year": [2021],
            "dc.type": ["Thesis"],
            "location.coll": ["tgt"]
        }),
        json!({
            "search.resourceid": "item-3",
            "dc.title": ["Andean glaciers"],
            "dc.contributor.author": ["Mamani, Rosa"],
            "dateIssued.year": [2020],
            "dc.type": ["Article"],
            "location.coll": ["coll-eng", "tgt"]
        }),
    ]
}

fn param<'a>(pairs: &'a [(String, String)], key: &str) -> Option<&'a str> {
    pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
}

async fn solr_select(RawQuery(raw): RawQuery) -> Json<Value> {
    let pairs: Vec<(String, String)> = url::form_urlencoded::parse(raw.unwrap_or_default().as_bytes())
        .into_owned()
        .collect();
    let q = param(&pairs, "q").unwrap_or("*:*");

    if q.starts_with("search.resourcetype:Community") {
        return Json(json!({"response": {"numFound": 1, "docs": [
            {"search.resourceid": "comm-eng", "dc.title": ["Engineering"]}
        ]}}));
    }
    if q == "search.resourcetype:Collection" {
        return Json(json!({"response": {"numFound": 1, "docs": [
            {"search.resourceid": "coll-eng", "dc.title": ["Engineering papers"], "location.comm": ["comm-eng"]}
        ]}}));
    }

    let fq = param(&pairs, "fq").unwrap_or_default();
    let matching: Vec<Value> = if q.contains("nomatch") {
        Vec::new()
    } else if fq.contains("dc.type_facet:\"Thesis\"") {
        items().into_iter().filter(|doc| doc["dc.type"][0] == "Thesis").collect()
    } else {
        items()
    };

    let start: usize = param(&pairs, "start").and_then(|v| v.parse().ok()).unwrap_or(0);
    let rows: usize = param(&pairs, "rows").and_then(|v| v.parse().ok()).unwrap_or(10);
    let docs: Vec<Value> = matching.iter().skip(start).take(rows).cloned().collect();

    let mut body = json!({"response": {"numFound": matching.len(), "docs": docs}});
    if param(&pairs, "facet") == Some("true") {
        body["facet_counts"] = json!({"facet_fields": {
            "dateIssued.year": ["2023", 1, "2021", 1, "2020", 1],
            "dc.type_facet": ["Article", 2, "Thesis", 1],
            "location.coll": ["tgt", 3, "coll-eng", 2],
            "language_keyword": ["en", 1],
            "author_facet": ["rojas, luis\n|||\nRojas, Luis", 2, "quispe, ana\n|||\nQuispe, Ana", 1]
        }});
    }
    if q == "rivers" {
        body["highlighting"] = json!({"item-1": {"dc.title": ["Deep learning for <mark>rivers</mark>"]}});
    }
    Json(body)
}

async fn start_solr() -> (String, oneshot::Sender<()>) {
    serve(Router::new().route("/solr/search/select", get(solr_select))).await
}

async fn start_broken_solr() -> (String, oneshot::Sender<()>) {
    serve(Router::new().route(
        "/solr/search/select",
        get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
    ))
    .await
}

/// Rejects `rows=0` count queries and otherwise reports 100 matches.
async fn counts_unavailable_select(RawQuery(raw): RawQuery) -> axum::response::Response {
    use axum::response::IntoResponse;

    let query = raw.unwrap_or_default();
    let pairs: Vec<(String, String)> = url::form_urlencoded::parse(query.as_bytes()).into_owned().collect();
    if param(&pairs, "rows") == Some("0") {
        return (StatusCode::SERVICE_UNAVAILABLE, "count disabled").into_response();
    }
    let q = param(&pairs, "q").unwrap_or("*:*");
    if q.starts_with("search.resourcetype:") {
        return solr_select(RawQuery(Some(query))).await.into_response();
    }

    let total = 100usize;
    let start: usize = param(&pairs, "start").and_then(|v| v.parse().ok()).unwrap_or(0);
    let rows: usize = param(&pairs, "rows").and_then(|v| v.parse().ok()).unwrap_or(10);
    let docs: Vec<Value> = (start..total.min(start.saturating_add(rows)))
        .map(|n| {
            json!({
                "search.resourceid": format!("bulk-{n}"),
                "dc.title": [format!("Bulk record {n}")],
                "dateIssued.year": [2020],
                "location.coll": ["tgt"]
            })
        })
        .collect();
    Json(json!({"response": {"numFound": total, "docs": docs}})).into_response()
}

async fn start_solr_without_counts() -> (String, oneshot::Sender<()>) {
    serve(Router::new().route("/solr/search/select", get(counts_unavailable_select))).await
}

fn test_config(solr_base: &str) -> Config {
    Config {
        port: 0,
        bind_addr: "127.0.0.1".parse().unwrap(),
        solr_url: format!("{solr_base}/solr/search/select"),
        root_community_id: "root".to_string(),
        excluded_community_id: None,
        target_collection_id: "tgt".to_string(),
        researchers_collection_id: None,
        repository_item_url: "https://repo.example/items/".to_string(),
        solr_timeout_secs: 5,
        request_timeout_secs: 10,
        export_default_rows: 100,
        export_max_rows: 1000,
        export_batch_rows: 2,
        cors_allowed_origins: None,
    }
}

async fn start_portal(solr_base: &str) -> (String, oneshot::Sender<()>) {
    let config = test_config(solr_base);
    let client = SolrClient::new(&config.solr_url, Duration::from_secs(config.solr_timeout_secs)).unwrap();
    let service = SearchService::new(client, Arc::new(config));
    serve(api::router(service)).await
}

#[tokio::test]
async fn health_reports_ok() {
    let (solr, _solr_stop) = start_solr().await;
    let (base, _stop) = start_portal(&solr).await;

    let body: Value = reqwest::get(format!("{base}/health"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn page_renders_cards_facets_and_security_headers() {
    let (solr, _solr_stop) = start_solr().await;
    let (base, _stop) = start_portal(&solr).await;

    let resp = reqwest::get(format!("{base}/publications")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let headers = resp.headers().clone();
    assert!(headers["content-type"].to_str().unwrap().starts_with("text/html"));
    assert_eq!(headers["x-frame-options"], "SAMEORIGIN");
    assert_eq!(headers["x-content-type-options"], "nosniff");
    assert!(headers["cache-control"].to_str().unwrap().contains("no-store"));

    let html = resp.text().await.unwrap();
    assert!(html.contains("Deep learning for rivers"));
    assert!(html.contains("Andean glaciers"));
    assert!(html.contains("Showing <strong>1</strong> to <strong>3</strong> of <strong>3</strong> results"));
    assert!(html.contains("Engineering"));
    // Attribute values go through the template escaper, slashes included.
    assert!(html.contains("href=\"https:&#x2f;&#x2f;repo.example&#x2f;items&#x2f;item-1\""));
}

#[tokio::test]
async fn page_without_matches_says_so() {
    let (solr, _solr_stop) = start_solr().await;
    let (base, _stop) = start_portal(&solr).await;

    let html = reqwest::get(format!("{base}/publications?q=nomatch"))
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(html.contains("You searched for"));
    assert!(html.contains("No results found"));
}

#[tokio::test]
async fn api_search_returns_envelope_with_highlights() {
    let (solr, _solr_stop) = start_solr().await;
    let (base, _stop) = start_portal(&solr).await;

    let resp = reqwest::get(format!("{base}/api/publications?q=rivers&per_page=25"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();

    assert_eq!(body["error"], false);
    let data = &body["data"];
    assert_eq!(data["pagination"]["total"], 3);
    assert_eq!(data["pagination"]["current_page"], 1);
    assert_eq!(data["pagination"]["per_page"], 25);
    assert_eq!(data["pagination"]["total_pages"], 1);

    let results = data["results"].as_array().unwrap();
    assert_eq!(results.len(), 3);
    assert_eq!(results[0]["id"], "item-1");
    assert!(results[0]["title"].as_str().unwrap().contains("<mark>rivers</mark>"));
    assert_eq!(results[0]["title_plain"], "Deep learning for rivers");
    assert_eq!(results[1]["title"], "Say &quot;hi&quot; to sediments");

    assert_eq!(data["facets"]["years"]["2023"], 1);
    assert_eq!(data["facets"]["types"]["Article"], 2);
    assert_eq!(data["facets"]["departments"]["Engineering"], 2);
}

#[tokio::test]
async fn api_type_filter_narrows_results() {
    let (solr, _solr_stop) = start_solr().await;
    let (base, _stop) = start_portal(&solr).await;

    let body: Value = reqwest::get(format!("{base}/api/publications?type[]=Thesis"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["data"]["pagination"]["total"], 1);
    assert_eq!(body["data"]["results"][0]["id"], "item-2");
}

#[tokio::test]
async fn api_facets_action_returns_only_facets() {
    let (solr, _solr_stop) = start_solr().await;
    let (base, _stop) = start_portal(&solr).await;

    let body: Value = reqwest::get(format!("{base}/api/publications?action=facets"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["error"], false);
    assert_eq!(body["data"]["facets"]["types"]["Thesis"], 1);
    assert_eq!(body["data"]["facets"]["authors"]["Rojas, Luis"], 2);
    assert!(body["data"].get("results").is_none());
}

#[tokio::test]
async fn api_unknown_action_is_rejected() {
    let (solr, _solr_stop) = start_solr().await;
    let (base, _stop) = start_portal(&solr).await;

    let resp = reqwest::get(format!("{base}/api/publications?action=drop")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], true);
    assert_eq!(body["code"], "invalid_argument");
}

#[tokio::test]
async fn export_count_matches_exported_csv_rows() {
    let (solr, _solr_stop) = start_solr().await;
    let (base, _stop) = start_portal(&solr).await;

    let count: Value = reqwest::get(format!("{base}/export?action=export_count"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(count["count"], 3);

    let resp = reqwest::get(format!("{base}/export?action=export&format=csv"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers()["content-type"].to_str().unwrap().starts_with("text/csv"));
    let disposition = resp.headers()["content-disposition"].to_str().unwrap().to_string();
    assert!(disposition.starts_with("attachment; filename=\"publications_export_"));
    assert!(disposition.ends_with("_3.csv\""));

    let bytes = resp.bytes().await.unwrap();
    assert!(bytes.starts_with(b"\xEF\xBB\xBF"));

    let mut reader = csv::Reader::from_reader(&bytes[3..]);
    let headers = reader.headers().unwrap().clone();
    let title_idx = headers.iter().position(|h| h == "Title").unwrap();
    let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 3);
    assert_eq!(&rows[1][title_idx], "Say \"hi\" to sediments");
}

#[tokio::test]
async fn export_json_honours_row_limit() {
    let (solr, _solr_stop) = start_solr().await;
    let (base, _stop) = start_portal(&solr).await;

    let resp = reqwest::get(format!("{base}/export?action=export&format=json&rows=2"))
        .await
        .unwrap();
    assert!(resp.headers()["content-type"].to_str().unwrap().starts_with("application/json"));
    let body: Value = resp.json().await.unwrap();
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["Title"], "Deep learning for rivers");
    assert_eq!(rows[0]["Authors"], "Quispe, Ana and Rojas, Luis");
    assert_eq!(rows[0]["Resource ID"], "item-1");
}

#[tokio::test]
async fn export_json_without_matches_is_empty_array() {
    let (solr, _solr_stop) = start_solr().await;
    let (base, _stop) = start_portal(&solr).await;

    let body: Value = reqwest::get(format!("{base}/export?action=export&format=json&q=nomatch"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn export_text_is_tab_separated_with_rule() {
    let (solr, _solr_stop) = start_solr().await;
    let (base, _stop) = start_portal(&solr).await;

    let text = reqwest::get(format!("{base}/export?action=export&format=txt"))
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert!(lines[0].starts_with("ID\tResource ID\t"));
    assert_eq!(lines[1], "-".repeat(200));
    assert_eq!(lines.len(), 5);
    assert!(lines[2].contains("Deep learning for rivers"));
}

#[tokio::test]
async fn export_unknown_action_is_rejected() {
    let (solr, _solr_stop) = start_solr().await;
    let (base, _stop) = start_portal(&solr).await;

    let resp = reqwest::get(format!("{base}/export?action=purge")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn upstream_failure_surfaces_everywhere() {
    let (solr, _solr_stop) = start_broken_solr().await;
    let (base, _stop) = start_portal(&solr).await;

    let page = reqwest::get(format!("{base}/publications")).await.unwrap();
    assert_eq!(page.status(), StatusCode::OK);
    assert!(page.text().await.unwrap().contains("class=\"error-message\""));

    let api = reqwest::get(format!("{base}/api/publications")).await.unwrap();
    assert_eq!(api.status(), StatusCode::BAD_GATEWAY);
    let body: Value = api.json().await.unwrap();
    assert_eq!(body["error"], true);

    let count = reqwest::get(format!("{base}/export?action=export_count")).await.unwrap();
    assert_eq!(count.status(), StatusCode::BAD_GATEWAY);

    let export = reqwest::get(format!("{base}/export?action=export&format=csv")).await.unwrap();
    assert_eq!(export.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn pages_past_the_end_are_clamped_when_the_count_fails() {
    let (solr, _solr_stop) = start_solr_without_counts().await;
    let (base, _stop) = start_portal(&solr).await;

    let resp = reqwest::get(format!("{base}/publications?page=10")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let html = resp.text().await.unwrap();
    assert!(html.contains("Page 4 of 4"));
    assert!(html.contains("Showing <strong>76</strong> to <strong>100</strong> of <strong>100</strong> results"));
    assert!(html.contains("Bulk record 99"));

    let resp = reqwest::get(format!(
        "{base}/api/publications?page=90000000000000000&per_page=500"
    ))
    .await
    .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["pagination"]["current_page"], 1);
    assert_eq!(body["data"]["pagination"]["total_pages"], 1);
    assert_eq!(body["data"]["results"].as_array().unwrap().len(), 100);
}

#[tokio::test]
async fn assets_and_docs_are_served() {
    let (solr, _solr_stop) = start_solr().await;
    let (base, _stop) = start_portal(&solr).await;

    let css = reqwest::get(format!("{base}/assets/portal.css")).await.unwrap();
    assert_eq!(css.status(), StatusCode::OK);
    assert!(css.headers()["content-type"].to_str().unwrap().starts_with("text/css"));

    let missing = reqwest::get(format!("{base}/assets/nope.js")).await.unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);

    let yaml = reqwest::get(format!("{base}/docs/openapi.yaml")).await.unwrap().text().await.unwrap();
    assert!(yaml.starts_with("openapi:"));
}

#[tokio::test]
async fn export_streams_in_batches_and_survives_early_disconnect() {
    use futures_util::StreamExt;

    let (solr, _solr_stop) = start_solr().await;
    let (base, _stop) = start_portal(&solr).await;

    let mut body = reqwest::get(format!("{base}/export?action=export&format=csv"))
        .await
        .unwrap()
        .bytes_stream();
    let mut collected = Vec::new();
    while let Some(chunk) = body.next().await {
        collected.extend_from_slice(&chunk.unwrap());
    }
    let text = String::from_utf8(collected).unwrap();
    assert_eq!(text.lines().count(), 4);

    let mut partial = reqwest::get(format!("{base}/export?action=export&format=json"))
        .await
        .unwrap()
        .bytes_stream();
    let first = partial.next().await.unwrap().unwrap();
    assert!(first.starts_with(b"["));
    drop(partial);

    let count: Value = reqwest::get(format!("{base}/export?action=export_count"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(count["count"], 3);
}
