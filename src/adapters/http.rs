use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Deserialize;
use std::time::Duration;

use crate::core::orchestrator::ResolutionOrchestrator;
use crate::domain::model::{AdministrativeUnit, LeadTimeWindow, Level};
use crate::domain::ports::{
    LeadTimeError, LeadTimeRequest, LeadTimeSource, TaxonomyError, TaxonomySource,
};
use crate::utils::error::Result;

pub type HttpOrchestrator = ResolutionOrchestrator<HttpTaxonomy, HttpLeadTime>;

/// Codes arrive as strings from some endpoints and as numbers from others.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WireCode {
    Text(String),
    Number(i64),
}

impl WireCode {
    fn into_string(self) -> String {
        match self {
            WireCode::Text(code) => code,
            WireCode::Number(code) => code.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct WireUnit {
    code: WireCode,
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireLeadTime {
    leadtime_seconds: u64,
    eta_from: DateTime<Utc>,
    eta_to: DateTime<Utc>,
}

fn build_client(timeout: Duration) -> Result<Client> {
    Ok(Client::builder().timeout(timeout).build()?)
}

fn with_token(request: RequestBuilder, token: Option<&str>) -> RequestBuilder {
    match token {
        Some(token) => request.header("Token", token),
        None => request,
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path)
}

/// Taxonomy service over HTTP: `GET provinces`, `GET districts?provinceCode=`,
/// `GET wards?districtCode=`.
pub struct HttpTaxonomy {
    client: Client,
    endpoint: String,
    token: Option<String>,
}

impl HttpTaxonomy {
    pub fn new(endpoint: &str, token: Option<String>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: build_client(timeout)?,
            endpoint: endpoint.to_string(),
            token,
        })
    }

    async fn fetch(
        &self,
        level: Level,
        path: &str,
        query: &[(&str, &str)],
    ) -> std::result::Result<Vec<AdministrativeUnit>, TaxonomyError> {
        let url = join_url(&self.endpoint, path);
        tracing::debug!("Making taxonomy request to: {} {:?}", url, query);

        let request = with_token(self.client.get(&url).query(query), self.token.as_deref());
        let response = request.send().await.map_err(taxonomy_transport_error)?;

        tracing::debug!("Taxonomy response status: {}", response.status());
        if !response.status().is_success() {
            return Err(TaxonomyError::ServiceUnavailable {
                message: format!("{} returned HTTP {}", path, response.status()),
            });
        }

        let units: Vec<WireUnit> = response.json().await.map_err(taxonomy_transport_error)?;
        Ok(units
            .into_iter()
            .map(|unit| AdministrativeUnit::new(level, unit.code.into_string(), unit.name))
            .collect())
    }
}

fn taxonomy_transport_error(e: reqwest::Error) -> TaxonomyError {
    if e.is_timeout() {
        TaxonomyError::Timeout
    } else {
        TaxonomyError::ServiceUnavailable {
            message: e.to_string(),
        }
    }
}

#[async_trait]
impl TaxonomySource for HttpTaxonomy {
    async fn provinces(&self) -> std::result::Result<Vec<AdministrativeUnit>, TaxonomyError> {
        self.fetch(Level::Province, "provinces", &[]).await
    }

    async fn districts(
        &self,
        province_code: &str,
    ) -> std::result::Result<Vec<AdministrativeUnit>, TaxonomyError> {
        self.fetch(Level::District, "districts", &[("provinceCode", province_code)])
            .await
    }

    async fn wards(
        &self,
        district_code: &str,
    ) -> std::result::Result<Vec<AdministrativeUnit>, TaxonomyError> {
        self.fetch(Level::Ward, "wards", &[("districtCode", district_code)])
            .await
    }
}

/// Lead-time service over HTTP: one `POST` per route.
pub struct HttpLeadTime {
    client: Client,
    endpoint: String,
    token: Option<String>,
}

impl HttpLeadTime {
    pub fn new(endpoint: &str, token: Option<String>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: build_client(timeout)?,
            endpoint: endpoint.to_string(),
            token,
        })
    }
}

fn lead_time_transport_error(e: reqwest::Error) -> LeadTimeError {
    if e.is_timeout() {
        LeadTimeError::Timeout
    } else {
        LeadTimeError::ServiceUnavailable {
            message: e.to_string(),
        }
    }
}

#[async_trait]
impl LeadTimeSource for HttpLeadTime {
    async fn lead_time(
        &self,
        request: &LeadTimeRequest,
    ) -> std::result::Result<LeadTimeWindow, LeadTimeError> {
        tracing::debug!("Making lead-time request to: {}", self.endpoint);

        let response = with_token(self.client.post(&self.endpoint), self.token.as_deref())
            .json(request)
            .send()
            .await
            .map_err(lead_time_transport_error)?;

        let status = response.status();
        tracing::debug!("Lead-time response status: {}", status);

        match status {
            StatusCode::BAD_REQUEST | StatusCode::NOT_FOUND | StatusCode::UNPROCESSABLE_ENTITY => {
                let body = response.text().await.unwrap_or_default();
                Err(LeadTimeError::InvalidRoute {
                    message: format!("HTTP {}: {}", status, body.trim()),
                })
            }
            status if status.is_success() => {
                let wire: WireLeadTime =
                    response.json().await.map_err(lead_time_transport_error)?;
                Ok(LeadTimeWindow {
                    leadtime_seconds: wire.leadtime_seconds,
                    eta_from: wire.eta_from,
                    eta_to: wire.eta_to,
                })
            }
            status => Err(LeadTimeError::ServiceUnavailable {
                message: format!("HTTP {}", status),
            }),
        }
    }
}
