use std::fmt;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tracing::{debug, warn};

use crate::config::DadataConfig;

/// Anything that can resolve an INN into a [`LookupOutcome`].
#[async_trait]
pub trait CompanyLookup: Send + Sync {
    async fn lookup(&self, inn: &str) -> LookupOutcome;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeKind {
    Found,
    NotFound,
    Malformed,
    HttpStatus,
    Transport,
}

/// Result of a single registry lookup. Renders to exactly one newline-terminated line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    Found {
        inn: String,
        name: Option<String>,
        address: Option<String>,
    },
    /// Successful response with no suggestions.
    NotFound { inn: String },
    /// Successful response whose body could not be parsed.
    Malformed { inn: String, reason: String },
    HttpStatus { inn: String, status: u16 },
    Transport { inn: String, reason: String },
}

impl LookupOutcome {
    pub fn kind(&self) -> OutcomeKind {
        match self {
            LookupOutcome::Found { .. } => OutcomeKind::Found,
            LookupOutcome::NotFound { .. } => OutcomeKind::NotFound,
            LookupOutcome::Malformed { .. } => OutcomeKind::Malformed,
            LookupOutcome::HttpStatus { .. } => OutcomeKind::HttpStatus,
            LookupOutcome::Transport { .. } => OutcomeKind::Transport,
        }
    }

    pub fn inn(&self) -> &str {
        match self {
            LookupOutcome::Found { inn, .. }
            | LookupOutcome::NotFound { inn }
            | LookupOutcome::Malformed { inn, .. }
            | LookupOutcome::HttpStatus { inn, .. }
            | LookupOutcome::Transport { inn, .. } => inn,
        }
    }
}

impl fmt::Display for LookupOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupOutcome::Found {
                inn,
                name,
                address,
            } => writeln!(
                f,
                "Информация по ИНН {}: Название: {}, Адрес: {}",
                inn,
                name.as_deref().unwrap_or_default(),
                address.as_deref().unwrap_or_default()
            ),
            LookupOutcome::NotFound { inn } | LookupOutcome::Malformed { inn, .. } => {
                writeln!(f, "Не удалось получить корректные данные по ИНН {}", inn)
            }
            LookupOutcome::HttpStatus { inn, status } => writeln!(
                f,
                "Не удалось получить данные по ИНН {}. Код ошибки: {}",
                inn, status
            ),
            LookupOutcome::Transport { inn, reason } => writeln!(
                f,
                "Ошибка при обращении к API DaData для ИНН {}: {}",
                inn, reason
            ),
        }
    }
}

#[derive(Debug, Serialize)]
struct FindPartyRequest<'a> {
    query: &'a str,
}

#[derive(Debug, Deserialize)]
struct FindPartyResponse {
    #[serde(default)]
    suggestions: Option<Vec<Suggestion>>,
}

#[derive(Debug, Deserialize)]
struct Suggestion {
    #[serde(default)]
    data: Option<PartyData>,
}

#[derive(Debug, Deserialize)]
struct PartyData {
    #[serde(default)]
    name: Option<PartyName>,
    #[serde(default)]
    address: Option<PartyAddress>,
}

#[derive(Debug, Deserialize)]
struct PartyName {
    #[serde(default)]
    short_with_opf: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PartyAddress {
    #[serde(default)]
    value: Option<String>,
}

/// Maps a 2xx response body onto an outcome.
fn parse_party_body(inn: &str, body: &str) -> LookupOutcome {
    let parsed: FindPartyResponse = match serde_json::from_str(body) {
        Ok(parsed) => parsed,
        Err(e) => {
            return LookupOutcome::Malformed {
                inn: inn.to_string(),
                reason: e.to_string(),
            }
        }
    };

    let first = parsed
        .suggestions
        .and_then(|suggestions| suggestions.into_iter().next());

    match first {
        Some(suggestion) => {
            let data = suggestion.data;
            let name = data
                .as_ref()
                .and_then(|d| d.name.as_ref())
                .and_then(|n| n.short_with_opf.clone());
            let address = data
                .as_ref()
                .and_then(|d| d.address.as_ref())
                .and_then(|a| a.value.clone());
            LookupOutcome::Found {
                inn: inn.to_string(),
                name,
                address,
            }
        }
        None => LookupOutcome::NotFound {
            inn: inn.to_string(),
        },
    }
}

/// DaData `findById/party` client. Holds one pooled HTTP client for the process.
pub struct DadataClient {
    client: reqwest::Client,
    config: DadataConfig,
    permits: Semaphore,
}

impl DadataClient {
    pub fn new(config: DadataConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build DaData HTTP client")?;
        let permits = Semaphore::new(config.max_concurrent_requests.max(1));
        Ok(Self {
            client,
            config,
            permits,
        })
    }

    async fn find_party(&self, inn: &str) -> LookupOutcome {
        let _permit = match self.permits.acquire().await {
            Ok(permit) => permit,
            Err(e) => {
                return LookupOutcome::Transport {
                    inn: inn.to_string(),
                    reason: e.to_string(),
                }
            }
        };

        let url = self.config.find_party_url();
        debug!("Sending request to DaData: {} (inn {})", url, inn);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Token {}", self.config.api_key))
            .header("X-Secret", &self.config.secret_key)
            .header("Accept", "application/json")
            .json(&FindPartyRequest { query: inn })
            .send()
            .await;

        let response = match response {
            Ok(response) => response,
            Err(e) => {
                return LookupOutcome::Transport {
                    inn: inn.to_string(),
                    reason: e.to_string(),
                }
            }
        };

        let status = response.status();
        if !status.is_success() {
            return LookupOutcome::HttpStatus {
                inn: inn.to_string(),
                status: status.as_u16(),
            };
        }

        match response.text().await {
            Ok(body) => parse_party_body(inn, &body),
            Err(e) => LookupOutcome::Transport {
                inn: inn.to_string(),
                reason: e.to_string(),
            },
        }
    }
}

#[async_trait]
impl CompanyLookup for DadataClient {
    async fn lookup(&self, inn: &str) -> LookupOutcome {
        let outcome = self.find_party(inn).await;
        match &outcome {
            LookupOutcome::Found { .. } | LookupOutcome::NotFound { .. } => {
                debug!("DaData lookup for {}: {:?}", outcome.inn(), outcome.kind());
            }
            LookupOutcome::Malformed { reason, .. } | LookupOutcome::Transport { reason, .. } => {
                warn!(
                    "DaData lookup for {} failed ({:?}): {}",
                    outcome.inn(),
                    outcome.kind(),
                    reason
                );
            }
            LookupOutcome::HttpStatus { status, .. } => {
                warn!("DaData lookup for {} returned HTTP {}", outcome.inn(), status);
            }
        }
        outcome
    }
}
