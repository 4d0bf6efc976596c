use std::env;
use std::time::Duration;

use reqwest::Client;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;

use quiz_core::model::{DataUri, Question, RawRow};
use quiz_core::normalize::RowNormalizer;

use crate::error::IngestError;

/// Endpoint of the spreadsheet processing service.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:5000/process_excel";

const UPLOAD_TIMEOUT: Duration = Duration::from_millis(10_000);

#[derive(Clone, Debug)]
pub struct IngestConfig {
    pub endpoint: String,
    pub timeout: Duration,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: UPLOAD_TIMEOUT,
        }
    }
}

impl IngestConfig {
    /// Reads `QUIZ_INGEST_URL` if set; everything else keeps its default.
    #[must_use]
    pub fn from_env() -> Self {
        let endpoint = env::var("QUIZ_INGEST_URL").unwrap_or_else(|_| DEFAULT_ENDPOINT.into());
        Self {
            endpoint,
            ..Self::default()
        }
    }
}

/// One record of the processing service's response, already normalized
/// server-side.
#[derive(Debug, Deserialize)]
struct QuestionRecord {
    name: String,
    image: String,
}

/// Uploads one spreadsheet and turns the response into questions.
///
/// Two ingestion paths are supported: this service's upload (rows are
/// normalized server-side and arrive as `{name, image}` records), and the
/// local path where a spreadsheet decoder produces [`RawRow`]s that go
/// through [`RowNormalizer`] here.
#[derive(Clone)]
pub struct IngestService {
    client: Client,
    config: IngestConfig,
}

impl IngestService {
    #[must_use]
    pub fn new(config: IngestConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    #[must_use]
    pub fn from_env() -> Self {
        Self::new(IngestConfig::from_env())
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.config.endpoint
    }

    /// Uploads the file as one multipart form and decodes the response.
    ///
    /// The request is bounded by the configured deadline; timeouts and
    /// connection failures map to distinct, recoverable error kinds.
    ///
    /// # Errors
    ///
    /// Returns `IngestError` for transport failures, non-success statuses,
    /// undecodable bodies, and records that fail question validation.
    pub async fn upload(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<Vec<Question>, IngestError> {
        let part = Part::bytes(bytes).file_name(file_name.to_string());
        let form = Form::new().part("file", part);

        let response = self
            .client
            .post(&self.config.endpoint)
            .multipart(form)
            .timeout(self.config.timeout)
            .send()
            .await
            .map_err(classify_transport)?;

        if !response.status().is_success() {
            return Err(IngestError::HttpStatus(response.status()));
        }

        let records: Vec<QuestionRecord> = response.json().await.map_err(classify_transport)?;
        questions_from_records(records)
    }

    /// Local path: normalize decoder-produced rows into questions.
    ///
    /// # Errors
    ///
    /// Propagates `NormalizeError` per the normalizer's policy.
    pub fn normalize_rows(
        &self,
        rows: &[RawRow],
        normalizer: &RowNormalizer,
    ) -> Result<Vec<Question>, IngestError> {
        Ok(normalizer.normalize(rows)?)
    }
}

fn classify_transport(err: reqwest::Error) -> IngestError {
    if err.is_timeout() {
        IngestError::Timeout
    } else if err.is_connect() {
        IngestError::Connect
    } else {
        IngestError::Http(err)
    }
}

fn questions_from_records(records: Vec<QuestionRecord>) -> Result<Vec<Question>, IngestError> {
    records
        .into_iter()
        .map(|record| {
            let image = DataUri::parse(&record.image)?;
            Ok(Question::new(record.name, image)?)
        })
        .collect()
}
