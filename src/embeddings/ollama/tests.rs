use super::*;
use crate::config::OllamaConfig;

fn config_with_ollama(ollama: OllamaConfig) -> Config {
    Config {
        ollama,
        ..Config::default()
    }
}

#[test]
fn client_configuration() {
    let config = config_with_ollama(OllamaConfig {
        protocol: "http".to_string(),
        host: "test-host".to_string(),
        port: 1234,
        model: "test-model".to_string(),
        batch_size: 128,
        embedding_dimension: 512,
    });
    let client = OllamaClient::new(&config).expect("Failed to create client");

    assert_eq!(client.model, "test-model");
    assert_eq!(client.batch_size, 128);
    assert_eq!(client.embedding_dimension(), 512);
    assert_eq!(client.base_url.host_str(), Some("test-host"));
    assert_eq!(client.base_url.port(), Some(1234));
    assert_eq!(client.retry_attempts, DEFAULT_RETRY_ATTEMPTS);
}

#[test]
fn default_dimension_matches_nomic_embed_text() {
    let config = Config::default();
    let client = OllamaClient::new(&config).expect("Failed to create client");

    assert_eq!(client.embedding_dimension(), DEFAULT_EMBEDDING_DIMENSION);
}

#[test]
fn client_builder_methods() {
    let config = Config::default();
    let client = OllamaClient::new(&config)
        .expect("Failed to create client")
        .with_timeout(Duration::from_secs(60))
        .with_retry_attempts(5);

    // Note: timeout is now part of the agent configuration
    assert_eq!(client.retry_attempts, 5);
}

#[test]
fn batch_of_nothing_skips_the_server() {
    let config = Config::default();
    let client = OllamaClient::new(&config).expect("Failed to create client");

    let embeddings = client
        .generate_embeddings_batch(&[])
        .expect("Empty batch should not error");
    assert!(embeddings.is_empty());
}
