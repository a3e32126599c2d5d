//! Mock service implementations for tests
//!
//! Responses are queued up front and every request is recorded, so tests
//! can assert on exactly which calls were issued. `StubServer` answers real
//! HTTP on a local port for tests of the reqwest clients themselves.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use crate::error::{EnrichmentError, ServiceError};
use crate::models::{DiagnosisResult, DiseaseInfo, DiseaseMatch, SymptomQuery};
use crate::service::DiagnosisService;
use crate::wikipedia::ImageLookup;

pub fn sample_diagnosis(disease: &str) -> DiagnosisResult {
    DiagnosisResult {
        symptoms: vec!["fever".into(), "headache".into()],
        disease_info: DiseaseInfo {
            disease: disease.into(),
            description: Some(format!("{disease} is a common illness")),
            workout: None,
            precautions: Some("Rest\nDrink fluids".into()),
            diet: Some("Light meals".into()),
        },
        additional_info: format!("Additional information about {disease}"),
        wikipedia_image: None,
        top_diseases: Vec::new(),
    }
}

pub fn sample_prediction() -> DiagnosisResult {
    let top = vec![
        DiseaseMatch {
            disease: "Fungal infection".into(),
            similarity: 0.91,
            workouts: vec!["Keep skin dry".into()],
            precautions: vec!["Bath twice".into(), "Use clean cloths".into()],
        },
        DiseaseMatch {
            disease: "Allergy".into(),
            similarity: 0.44,
            workouts: vec![],
            precautions: vec!["Apply calamine".into()],
        },
    ];
    crate::models::PredictResponse {
        symptoms: vec!["itching".into(), "skin_rash".into()],
        top_diseases: top,
    }
    .into()
}

pub struct MockDiagnosisService {
    diagnoses: Mutex<VecDeque<Result<DiagnosisResult, ServiceError>>>,
    predictions: Mutex<VecDeque<Result<DiagnosisResult, ServiceError>>>,
    diagnose_queries: Mutex<Vec<String>>,
    predict_queries: Mutex<Vec<String>>,
}

impl MockDiagnosisService {
    pub fn new() -> Self {
        Self {
            diagnoses: Mutex::new(VecDeque::new()),
            predictions: Mutex::new(VecDeque::new()),
            diagnose_queries: Mutex::new(Vec::new()),
            predict_queries: Mutex::new(Vec::new()),
        }
    }

    pub fn queue_diagnosis(&self, result: Result<DiagnosisResult, ServiceError>) {
        self.diagnoses.lock().unwrap().push_back(result);
    }

    pub fn queue_prediction(&self, result: Result<DiagnosisResult, ServiceError>) {
        self.predictions.lock().unwrap().push_back(result);
    }

    pub fn recorded_diagnose_queries(&self) -> Vec<String> {
        self.diagnose_queries.lock().unwrap().clone()
    }

    pub fn recorded_predict_queries(&self) -> Vec<String> {
        self.predict_queries.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.diagnose_queries.lock().unwrap().len() + self.predict_queries.lock().unwrap().len()
    }
}

#[async_trait]
impl DiagnosisService for MockDiagnosisService {
    async fn diagnose(&self, query: &SymptomQuery) -> Result<DiagnosisResult, ServiceError> {
        self.diagnose_queries.lock().unwrap().push(query.as_str().to_string());
        self.diagnoses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ServiceError::Network("no mock response queued".into())))
    }

    async fn predict(&self, query: &SymptomQuery) -> Result<DiagnosisResult, ServiceError> {
        self.predict_queries.lock().unwrap().push(query.as_str().to_string());
        self.predictions
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ServiceError::Network("no mock response queued".into())))
    }
}

pub struct MockImageLookup {
    responses: Mutex<VecDeque<Result<Option<String>, EnrichmentError>>>,
    titles: Mutex<Vec<String>>,
}

impl MockImageLookup {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            titles: Mutex::new(Vec::new()),
        }
    }

    pub fn queue(&self, response: Result<Option<String>, EnrichmentError>) {
        self.responses.lock().unwrap().push_back(response);
    }

    pub fn recorded_titles(&self) -> Vec<String> {
        self.titles.lock().unwrap().clone()
    }
}

#[async_trait]
impl ImageLookup for MockImageLookup {
    async fn thumbnail(&self, title: &str) -> Result<Option<String>, EnrichmentError> {
        self.titles.lock().unwrap().push(title.to_string());
        // Unqueued lookups behave like a page with no image
        self.responses.lock().unwrap().pop_front().unwrap_or(Ok(None))
    }
}

/// Local HTTP server that answers every request with one canned response
pub struct StubServer {
    pub base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl StubServer {
    /// `status` is the status line tail, e.g. "500 Internal Server Error"
    pub async fn start(status: &str, body: &str) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let response = format!(
            "HTTP/1.1 {}\r\n\
             Content-Type: application/json\r\n\
             Content-Length: {}\r\n\
             Connection: close\r\n\
             \r\n\
             {}",
            status,
            body.len(),
            body
        );

        let handle = tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let response = response.clone();
                tokio::spawn(async move {
                    read_request(&mut socket).await;
                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.shutdown().await;
                });
            }
        });

        Self {
            base_url: format!("http://{}", addr),
            handle,
        }
    }

    /// A base URL nothing listens on
    pub async fn refused_url() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{}", addr)
    }
}

impl Drop for StubServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Consume the request head and its body so the client sees a clean reply
async fn read_request(socket: &mut TcpStream) {
    let mut data = Vec::new();
    let mut buf = [0u8; 1024];
    loop {
        let n = match socket.read(&mut buf).await {
            Ok(0) | Err(_) => return,
            Ok(n) => n,
        };
        data.extend_from_slice(&buf[..n]);

        let Some(head_end) = data.windows(4).position(|w| w == b"\r\n\r\n") else {
            continue;
        };
        let head = String::from_utf8_lossy(&data[..head_end]).to_ascii_lowercase();
        let content_length = head
            .lines()
            .find_map(|line| line.strip_prefix("content-length:"))
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(0);
        if data.len() >= head_end + 4 + content_length {
            return;
        }
    }
}
