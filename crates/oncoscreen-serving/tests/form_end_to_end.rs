use axum::body::{to_bytes, Body};
use axum::http::{header::{CONTENT_LENGTH, CONTENT_TYPE}, Request, StatusCode};
use oncoscreen_serving::features::SAMPLE_BULK_INPUT;
use oncoscreen_serving::inference::{Activation, MlpSpec, ModelSpec, OutputActivation};
use oncoscreen_serving::{Artifacts, Diagnosis, Screener, Server, ServerConfig, FEATURE_COUNT};
use std::collections::HashMap;
use std::path::Path;
use tempfile::tempdir;
use tower::ServiceExt;

/// Logistic model on the first feature: p(class 1) = sigmoid(mean radius - 15).
fn write_radius_artifacts(dir: &Path) {
    std::fs::create_dir_all(dir.join("dense")).unwrap();
    std::fs::write(
        dir.join("scaler.json"),
        serde_json::json!({
            "mean": vec![15.0; FEATURE_COUNT],
            "scale": vec![1.0; FEATURE_COUNT],
        })
        .to_string(),
    )
    .unwrap();

    let spec = ModelSpec::Mlp(MlpSpec {
        input_dim: FEATURE_COUNT,
        hidden_dims: vec![],
        output_dim: 1,
        activation: Activation::Relu,
        output_activation: OutputActivation::Sigmoid,
    });
    std::fs::write(
        dir.join("model_spec.json"),
        serde_json::to_string(&spec).unwrap(),
    )
    .unwrap();

    let mut weight = vec![0.0f32; FEATURE_COUNT];
    weight[0] = 1.0;
    let mut params: HashMap<String, Vec<f32>> = HashMap::new();
    params.insert("mlp.layers.0.weight".to_string(), weight);
    params.insert("mlp.layers.0.bias".to_string(), vec![0.0]);
    std::fs::write(
        dir.join("dense").join("params.json"),
        serde_json::to_string(&params).unwrap(),
    )
    .unwrap();
}

fn csv_with_radius(radius: f64) -> String {
    let mut values = vec!["1.0".to_string(); FEATURE_COUNT];
    values[0] = radius.to_string();
    values.join(",")
}

#[test]
fn test_sample_input_is_screened() {
    let dir = tempdir().unwrap();
    write_radius_artifacts(dir.path());
    let screener = Screener::from_artifacts(&Artifacts::load(dir.path()).unwrap());

    // Mean radius 11.76 sits below the decision boundary.
    let verdict = screener.screen_bulk(SAMPLE_BULK_INPUT).unwrap();
    assert_eq!(verdict.label, 0);
    assert_eq!(verdict.diagnosis, Diagnosis::Malignant);
    let expected = 100.0 * (1.0 - 1.0 / (1.0 + (15.0f64 - 11.76).exp()));
    assert!((verdict.confidence - expected).abs() < 1e-3);
}

#[test]
fn test_large_radius_is_label_one() {
    let dir = tempdir().unwrap();
    write_radius_artifacts(dir.path());
    let screener = Screener::from_artifacts(&Artifacts::load(dir.path()).unwrap());

    let verdict = screener.screen_bulk(&csv_with_radius(25.0)).unwrap();
    assert_eq!(verdict.label, 1);
    assert_eq!(verdict.diagnosis, Diagnosis::Benign);
    assert_eq!(verdict.confidence_display(), "100.00%");
}

#[tokio::test]
async fn test_form_round_trip_through_router() {
    let dir = tempdir().unwrap();
    write_radius_artifacts(dir.path());
    let server = Server::new(ServerConfig::builder().artifacts_dir(dir.path()).build()).unwrap();

    let body = format!("features={}", csv_with_radius(30.0).replace(',', "%2C"));
    let response = server
        .router()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/predict")
                .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let html = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(html.contains("Tumor is Benign"));
    assert!(html.contains("Confidence: 100.00%"));
}

#[tokio::test]
async fn test_oversized_body_rejected() {
    let dir = tempdir().unwrap();
    write_radius_artifacts(dir.path());
    let config = ServerConfig::builder()
        .artifacts_dir(dir.path())
        .max_body_bytes(16)
        .build();
    let server = Server::new(config).unwrap();

    let body = format!("features={}", "1".repeat(64));
    let response = server
        .router()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/predict")
                .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
                .header(CONTENT_LENGTH, body.len())
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}
