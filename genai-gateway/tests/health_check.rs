//! Integration tests against a spawned gateway.
//!
//! The gateway runs without a Groq credential, the way a misconfigured
//! deployment would.

use genai_gateway::config::{GatewayConfig, GroqConfig};
use genai_gateway::startup::Application;
use reqwest::Client;
use service_core::config::Config as CoreConfig;
use std::time::Duration;

/// Spawn the application on a random port and return the port number.
async fn spawn_app() -> u16 {
    let config = GatewayConfig {
        common: CoreConfig {
            port: 0,
            ..CoreConfig::default()
        },
        groq: GroqConfig::default(),
    };

    let app = Application::build(config)
        .await
        .expect("Failed to build application");

    let port = app.port();

    tokio::spawn(async move {
        let _ = app.run_until_stopped().await;
    });

    // Wait for the server to accept connections
    let client = Client::new();
    let health_url = format!("http://127.0.0.1:{}/generative-ai/health", port);
    for _ in 0..50 {
        if client.get(&health_url).send().await.is_ok() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    port
}

#[tokio::test]
async fn health_check_returns_ok_without_credential() {
    let port = spawn_app().await;
    let client = Client::new();

    let response = client
        .get(format!("http://127.0.0.1:{}/generative-ai/health", port))
        .timeout(Duration::from_secs(5))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status().as_u16(), 200);

    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body, serde_json::json!({ "status": "OK Generative AI" }));
}

#[tokio::test]
async fn generate_fails_with_500_without_credential() {
    let port = spawn_app().await;
    let client = Client::new();

    let response = client
        .post(format!("http://127.0.0.1:{}/generative-ai/generate", port))
        .json(&serde_json::json!({ "prompt": "Test prompt" }))
        .timeout(Duration::from_secs(5))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status().as_u16(), 500);

    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert!(body["details"]
        .as_str()
        .unwrap()
        .contains("Error generating response"));
    assert_eq!(body["version"], "1.0");
}

#[tokio::test]
async fn validation_errors_are_400_over_the_wire() {
    let port = spawn_app().await;
    let client = Client::new();

    let response = client
        .post(format!("http://127.0.0.1:{}/generative-ai/generate", port))
        .json(&serde_json::json!({}))
        .timeout(Duration::from_secs(5))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status().as_u16(), 400);

    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["message"], "Validation Error");
    assert_eq!(body["details"][0]["location"][1], "prompt");
}
