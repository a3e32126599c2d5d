use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::ServiceError;
use crate::models::{DiagnosisResult, PredictResponse, SymptomQuery};

/// The external service that maps free text to diseases
#[async_trait]
pub trait DiagnosisService: Send + Sync {
    /// `POST /diagnose`, used by the chat screen
    async fn diagnose(&self, query: &SymptomQuery) -> Result<DiagnosisResult, ServiceError>;

    /// `POST /predict`, used by the analyze screen
    async fn predict(&self, query: &SymptomQuery) -> Result<DiagnosisResult, ServiceError>;
}

#[derive(Serialize)]
struct DiagnoseRequest<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct PredictRequest<'a> {
    message: &'a str,
}

#[derive(Clone)]
pub struct DiagnosisClient {
    client: Client,
    base_url: String,
}

impl DiagnosisClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn post<B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<reqwest::Response, ServiceError> {
        let url = format!("{}{}", self.base_url, path);
        info!(%url, "sending symptom query");

        let response = self.client.post(&url).json(body).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ServiceError::Status { status, body });
        }

        Ok(response)
    }
}

#[async_trait]
impl DiagnosisService for DiagnosisClient {
    async fn diagnose(&self, query: &SymptomQuery) -> Result<DiagnosisResult, ServiceError> {
        let request = DiagnoseRequest {
            text: query.as_str(),
        };
        let response = self.post("/diagnose", &request).await?;
        let result: DiagnosisResult = response.json().await?;
        debug!(disease = %result.disease_info.disease, symptoms = ?result.symptoms, "diagnosis received");
        Ok(result)
    }

    async fn predict(&self, query: &SymptomQuery) -> Result<DiagnosisResult, ServiceError> {
        let request = PredictRequest {
            message: query.as_str(),
        };
        let response = self.post("/predict", &request).await?;
        let prediction: PredictResponse = response.json().await?;
        debug!(matches = prediction.top_diseases.len(), "prediction received");
        Ok(prediction.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::StubServer;

    fn query(text: &str) -> SymptomQuery {
        SymptomQuery::parse(text).unwrap()
    }

    #[test]
    fn test_base_url_trailing_slash_is_dropped() {
        let client = DiagnosisClient::new("http://localhost:8000/");
        assert_eq!(client.base_url, "http://localhost:8000");
    }

    #[test]
    fn test_request_bodies_use_endpoint_field_names() {
        let diagnose = serde_json::to_value(DiagnoseRequest { text: "fever" }).unwrap();
        assert_eq!(diagnose, serde_json::json!({ "text": "fever" }));

        let predict = serde_json::to_value(PredictRequest { message: "fever" }).unwrap();
        assert_eq!(predict, serde_json::json!({ "message": "fever" }));
    }

    #[tokio::test]
    async fn test_diagnose_decodes_success_body() {
        let body = r#"{
            "symptoms": ["fever", "headache"],
            "disease_info": {"disease": "Influenza", "description": "Flu"},
            "additional_info": "Rest"
        }"#;
        let server = StubServer::start("200 OK", body).await;
        let client = DiagnosisClient::new(&server.base_url);

        let result = client.diagnose(&query("fever")).await.unwrap();
        assert_eq!(result.disease_info.disease, "Influenza");
        assert_eq!(result.symptoms, vec!["fever", "headache"]);
        assert!(result.top_diseases.is_empty());
    }

    #[tokio::test]
    async fn test_non_success_status_keeps_body() {
        let server = StubServer::start("500 Internal Server Error", "boom").await;
        let client = DiagnosisClient::new(&server.base_url);

        let err = client.diagnose(&query("fever")).await.unwrap_err();
        assert_eq!(
            err,
            ServiceError::Status {
                status: 500,
                body: "boom".into()
            }
        );
    }

    #[tokio::test]
    async fn test_malformed_body_is_decode_error() {
        let server = StubServer::start("200 OK", "{not json").await;
        let client = DiagnosisClient::new(&server.base_url);

        let err = client.diagnose(&query("fever")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Decode(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn test_missing_disease_info_is_decode_error() {
        let server = StubServer::start("200 OK", r#"{"symptoms": ["fever"]}"#).await;
        let client = DiagnosisClient::new(&server.base_url);

        let err = client.diagnose(&query("fever")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Decode(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn test_connection_refused_is_network_error() {
        let client = DiagnosisClient::new(&StubServer::refused_url().await);

        let err = client.predict(&query("fever")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Network(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn test_predict_adapts_top_match() {
        let body = r#"{
            "symptoms": ["itching"],
            "top_diseases": [
                {"disease": "Fungal infection", "similarity": 0.91,
                 "workouts": ["Keep skin dry"], "precautions": ["Bath twice"]}
            ]
        }"#;
        let server = StubServer::start("200 OK", body).await;
        let client = DiagnosisClient::new(&format!("{}/", server.base_url));

        let result = client.predict(&query("itching")).await.unwrap();
        assert_eq!(result.disease_info.disease, "Fungal infection");
        assert_eq!(result.disease_info.precautions.as_deref(), Some("Bath twice"));
        assert_eq!(result.top_diseases.len(), 1);
    }
}
