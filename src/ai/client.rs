use super::ImageGenerationService;
use crate::models::{Config, TextToImageRequest, TextToImageResponse};
use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::Client;

const TEXT_TO_IMAGE_PATH: &str = "/v1/text-to-image/base";

pub struct BriaImageClient {
    client: Client,
    api_token: String,
    base_url: String,
    model_version: String,
}

impl BriaImageClient {
    /// Build a client from config. No timeout is applied unless configured.
    pub fn new(config: &Config) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self::new_with_client(config, builder.build()?))
    }

    pub fn new_with_client(config: &Config, client: Client) -> Self {
        Self {
            client,
            api_token: config.api_token.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model_version: config.model_version.clone(),
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}{}/{}",
            self.base_url, TEXT_TO_IMAGE_PATH, self.model_version
        )
    }

    async fn text_to_image(&self, request: &TextToImageRequest) -> Result<TextToImageResponse> {
        let url = self.endpoint();
        tracing::debug!("Sending text-to-image request to {}", url);

        let response = self
            .client
            .post(&url)
            .header("api_token", &self.api_token)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to send text-to-image request: {}", e);
                e
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!(
                "Text-to-image API error (status {}): {}",
                status,
                error_text
            );
            return Err(Error::GenerationFailed {
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::error!("Failed to parse text-to-image response: {}\nBody: {}", e, body);
            Error::Serialization(e)
        })
    }
}

#[async_trait]
impl ImageGenerationService for BriaImageClient {
    async fn generate_image(&self, prompt: &str) -> Result<String> {
        let request = TextToImageRequest::single(prompt);
        let response = self.text_to_image(&request).await?;

        response
            .first_image_url()
            .map(str::to_string)
            .ok_or(Error::MissingImage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> BriaImageClient {
        let mut config = Config::with_token("test-token".to_string());
        config.base_url = server.uri();
        BriaImageClient::new(&config).unwrap()
    }

    #[tokio::test]
    async fn test_generate_image_sends_expected_request() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/text-to-image/base/2.3"))
            .and(header("api_token", "test-token"))
            .and(header("content-type", "application/json"))
            .and(body_json(serde_json::json!({
                "prompt": "a red fox in snow",
                "num_results": 1,
                "sync": true
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "result": [{ "urls": ["https://x/img.png"], "seed": 1, "uuid": "u1" }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let url = client_for(&server)
            .generate_image("a red fox in snow")
            .await
            .unwrap();
        assert_eq!(url, "https://x/img.png");
    }

    #[tokio::test]
    async fn test_generate_image_status_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(500).set_body_json(serde_json::json!({
                    "result": [{ "urls": ["https://x/ignored.png"] }]
                })),
            )
            .mount(&server)
            .await;

        let err = client_for(&server).generate_image("a dream").await.unwrap_err();
        assert!(matches!(err, Error::GenerationFailed { status: 500 }));
    }

    #[tokio::test]
    async fn test_generate_image_empty_result() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "result": []
            })))
            .mount(&server)
            .await;

        let err = client_for(&server).generate_image("a dream").await.unwrap_err();
        assert!(matches!(err, Error::MissingImage));
    }

    #[tokio::test]
    async fn test_generate_image_malformed_body() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let err = client_for(&server).generate_image("a dream").await.unwrap_err();
        assert!(matches!(err, Error::Serialization(_)));
    }

    #[test]
    fn test_endpoint_embeds_model_version() {
        let mut config = Config::with_token("t".to_string());
        config.base_url = "https://example.test/".to_string();
        config.model_version = "3.0".to_string();

        let client = BriaImageClient::new(&config).unwrap();
        assert_eq!(
            client.endpoint(),
            "https://example.test/v1/text-to-image/base/3.0"
        );
    }
}
