use serde::{Deserialize, Serialize};

/// Ollama embedding request
#[derive(Debug, Clone, Serialize)]
pub struct EmbedRequest {
    /// Model name (e.g., "all-minilm", "nomic-embed-text")
    pub model: String,

    /// Text to embed
    pub prompt: String,
}

/// Ollama embedding response
#[derive(Debug, Clone, Deserialize)]
pub struct EmbedResponse {
    /// Embedding vector
    #[serde(default)]
    pub embedding: Vec<f32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_shape() {
        let request = EmbedRequest {
            model: "all-minilm".to_string(),
            prompt: "hello".to_string(),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json, serde_json::json!({"model": "all-minilm", "prompt": "hello"}));
    }

    #[test]
    fn test_response_missing_embedding_is_empty() {
        let response: EmbedResponse = serde_json::from_str("{}").unwrap();
        assert!(response.embedding.is_empty());
    }
}
