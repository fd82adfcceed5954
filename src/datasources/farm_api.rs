use crate::config::ApiConfig;
use crate::error::{FieldOpsError, Result};
use crate::models::{
    Feedback, PredictionRequest, PredictionResponse, ValveOverride, ValveStatus, ValveToggle,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

/// Client for the external prediction and valve-control service.
///
/// Calls are single-shot: failures are reported to the caller and never
/// retried here.
pub struct FarmApiClient {
    client: reqwest::Client,
    config: ApiConfig,
}

impl FarmApiClient {
    pub fn new(config: ApiConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client, config })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.url.trim_end_matches('/'), path)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if self.config.token.is_empty() {
            request
        } else {
            request.header("Authorization", format!("Bearer {}", self.config.token))
        }
    }

    async fn send_raw(
        &self,
        endpoint: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response> {
        let response = self
            .authorize(request)
            .header("Content-Type", "application/json")
            .send()
            .await
            .map_err(|e| FieldOpsError::ApiUnavailable(format!("{}: {}", endpoint, e)))?;

        if !response.status().is_success() {
            return Err(FieldOpsError::ApiUnavailable(format!(
                "{} returned {}",
                endpoint,
                response.status()
            )));
        }

        Ok(response)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<T> {
        let response = self.send_raw(endpoint, request).await?;
        response.json::<T>().await.map_err(|e| {
            FieldOpsError::ApiUnavailable(format!("Failed to parse {} response: {}", endpoint, e))
        })
    }

    async fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        let request = self.client.post(self.url(path)).json(body);
        self.send(path, request).await
    }

    pub async fn predict(&self, request: &PredictionRequest) -> Result<PredictionResponse> {
        tracing::debug!(?request, "Requesting irrigation prediction");
        self.post("/predict", request).await
    }

    pub async fn send_feedback(&self, feedback: &Feedback) -> Result<()> {
        let request = self.client.post(self.url("/feedback")).json(feedback);
        self.send_raw("/feedback", request).await?;
        Ok(())
    }

    pub async fn list_valves(&self, crop_id: i64) -> Result<Vec<ValveStatus>> {
        let url = format!("{}?crop_id={}", self.url("/valves"), crop_id);
        self.send("/valves", self.client.get(url)).await
    }

    pub async fn toggle_valve(&self, toggle: &ValveToggle) -> Result<ValveStatus> {
        self.post("/valves/toggle", toggle).await
    }

    pub async fn override_valve(&self, valve_override: &ValveOverride) -> Result<ValveStatus> {
        self.post("/valves/override", valve_override).await
    }

    pub async fn test_connection(&self) -> Result<bool> {
        let response = self
            .authorize(self.client.get(self.url("/")))
            .send()
            .await
            .map_err(|e| FieldOpsError::ApiUnavailable(format!("Farm API: {}", e)))?;

        Ok(!response.status().is_server_error())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_config() -> ApiConfig {
        ApiConfig {
            url: "http://localhost:8000/".to_string(),
            token: String::new(),
            timeout_secs: 5,
            enabled: true,
        }
    }

    #[test]
    fn url_joins_without_double_slash() {
        let client = FarmApiClient::new(sample_config()).unwrap();
        assert_eq!(client.url("/predict"), "http://localhost:8000/predict");
    }

    #[tokio::test]
    async fn unreachable_server_maps_to_api_unavailable() {
        let client = FarmApiClient::new(ApiConfig {
            url: "http://127.0.0.1:9".to_string(),
            timeout_secs: 1,
            ..sample_config()
        })
        .unwrap();

        let request = PredictionRequest {
            soil_moisture: 20.0,
            temperature: 30.0,
            humidity: 50.0,
            rain_forecast: false,
        };
        assert!(matches!(
            client.predict(&request).await,
            Err(FieldOpsError::ApiUnavailable(_))
        ));
    }
}
