//! Ordered request stages: primary diagnosis call, then image enrichment
//!
//! Each stage returns a typed result. The enrichment stage's policy is to
//! absorb its own failure, so callers only ever see a `ServiceError` from
//! the primary call.

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::error::{EnrichmentError, ServiceError};
use crate::models::{DiagnosisResult, SymptomQuery};
use crate::service::DiagnosisService;
use crate::wikipedia::ImageLookup;

/// Which front-end a controller serves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    /// Conversation log, `/diagnose`, image enrichment
    Chat,
    /// One current result, `/predict`, no enrichment
    SingleShot,
}

#[derive(Clone)]
pub struct Pipeline {
    service: Arc<dyn DiagnosisService>,
    images: Option<Arc<dyn ImageLookup>>,
}

impl Pipeline {
    pub fn new(service: Arc<dyn DiagnosisService>, images: Arc<dyn ImageLookup>) -> Self {
        Self {
            service,
            images: Some(images),
        }
    }

    /// A pipeline whose chat runs never enrich
    pub fn without_images(service: Arc<dyn DiagnosisService>) -> Self {
        Self {
            service,
            images: None,
        }
    }

    pub async fn run(
        &self,
        query: &SymptomQuery,
        variant: Variant,
    ) -> Result<DiagnosisResult, ServiceError> {
        match variant {
            Variant::Chat => {
                let diagnosis = self.primary(query, variant).await?;
                Ok(self.enrich(diagnosis).await)
            }
            Variant::SingleShot => self.primary(query, variant).await,
        }
    }

    async fn primary(
        &self,
        query: &SymptomQuery,
        variant: Variant,
    ) -> Result<DiagnosisResult, ServiceError> {
        let result = match variant {
            Variant::Chat => self.service.diagnose(query).await,
            Variant::SingleShot => self.service.predict(query).await,
        };
        if let Err(e) = &result {
            error!(error = %e, "diagnosis request failed");
        }
        result
    }

    /// Attach an image if one can be found. Always yields the diagnosis.
    async fn enrich(&self, mut diagnosis: DiagnosisResult) -> DiagnosisResult {
        let Some(images) = self.images.as_ref().filter(|_| diagnosis.has_match()) else {
            return diagnosis;
        };

        let lookup: Result<Option<String>, EnrichmentError> =
            images.thumbnail(&diagnosis.disease_info.disease).await;

        match lookup {
            Ok(Some(url)) => {
                info!(disease = %diagnosis.disease_info.disease, "image attached");
                diagnosis.wikipedia_image = Some(url);
            }
            Ok(None) => {
                info!(disease = %diagnosis.disease_info.disease, "no image available");
            }
            Err(e) => {
                warn!(error = %e, disease = %diagnosis.disease_info.disease, "image enrichment skipped");
            }
        }
        diagnosis
    }
}
