//! Shared helpers for integration tests
#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Request, Response},
};
use tower::ServiceExt; // for `oneshot`

/// Send a GET through the router and return the response
pub async fn get(app: &Router, uri: &str) -> Response<Body> {
    app.clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

/// Read a whole response body as text
pub async fn body_text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Read a whole response body as JSON
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_str(&body_text(response).await).unwrap()
}

/// Sum every sample of `metric` whose label set contains all of `labels`
///
/// Works on Prometheus text output; `labels` are written as `key="value"`.
pub fn sample_sum(exposition: &str, metric: &str, labels: &[&str]) -> f64 {
    let prefix = format!("{}{{", metric);
    exposition
        .lines()
        .filter(|line| line.starts_with(&prefix))
        .filter(|line| labels.iter().all(|label| line.contains(label)))
        .map(|line| line.rsplit(' ').next().unwrap().parse::<f64>().unwrap())
        .sum()
}

/// `(le, cumulative count)` pairs of one histogram series, in output order
pub fn buckets(exposition: &str, metric: &str, labels: &[&str]) -> Vec<(f64, u64)> {
    let prefix = format!("{}_bucket{{", metric);
    exposition
        .lines()
        .filter(|line| line.starts_with(&prefix))
        .filter(|line| labels.iter().all(|label| line.contains(label)))
        .map(|line| {
            let le_start = line.find("le=\"").unwrap() + 4;
            let le_end = le_start + line[le_start..].find('"').unwrap();
            let le = match &line[le_start..le_end] {
                "+Inf" => f64::INFINITY,
                bound => bound.parse().unwrap(),
            };
            let count = line.rsplit(' ').next().unwrap().parse().unwrap();
            (le, count)
        })
        .collect()
}
