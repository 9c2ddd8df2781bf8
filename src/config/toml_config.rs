use crate::adapters::http::{HttpLeadTime, HttpOrchestrator, HttpTaxonomy};
use crate::core::lead_time::{LeadTimeClient, Origin};
use crate::core::orchestrator::ResolutionOrchestrator;
use crate::core::resolver::LocationResolver;
use crate::core::tables::ShippingTables;
use crate::utils::error::{QuoteError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

const DEFAULT_TIMEOUT_SECONDS: u64 = 10;
const DEFAULT_MAX_IN_FLIGHT: usize = 5;
const MAX_IN_FLIGHT_LIMIT: usize = 16;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub taxonomy: TaxonomyConfig,
    pub lead_time: LeadTimeConfig,
    pub origin: OriginConfig,
    pub tables: Option<TablesConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaxonomyConfig {
    pub endpoint: String,
    pub token: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeadTimeConfig {
    pub endpoint: String,
    pub token: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub service_id: u32,
    pub max_in_flight: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OriginConfig {
    pub district_code: String,
    pub ward_code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TablesConfig {
    pub path: String,
}

impl ServiceConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(QuoteError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| QuoteError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${LOGISTICS_TOKEN})，未設定的變數保留原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| QuoteError::ConfigValidationError {
            field: "environment".to_string(),
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validation::endpoint("taxonomy.endpoint", &self.taxonomy.endpoint)?;
        validation::endpoint("lead_time.endpoint", &self.lead_time.endpoint)?;

        for (field, timeout) in [
            ("taxonomy.timeout_seconds", self.taxonomy.timeout_seconds),
            ("lead_time.timeout_seconds", self.lead_time.timeout_seconds),
        ] {
            if let Some(seconds) = timeout {
                validation::at_least(field, seconds, 1)?;
            }
        }

        if let Some(max_in_flight) = self.lead_time.max_in_flight {
            validation::in_range("lead_time.max_in_flight", max_in_flight, 1..=MAX_IN_FLIGHT_LIMIT)?;
        }

        for (field, token) in [
            ("taxonomy.token", &self.taxonomy.token),
            ("lead_time.token", &self.lead_time.token),
        ] {
            if token.as_deref().is_some_and(|t| t.contains("${")) {
                return Err(QuoteError::MissingConfigError {
                    field: format!("{} (environment variable not set)", field),
                });
            }
        }

        validation::non_blank("origin.district_code", &self.origin.district_code)?;
        validation::non_blank("origin.ward_code", &self.origin.ward_code)?;

        if let Some(tables) = &self.tables {
            validation::file_path("tables.path", &tables.path, "toml")?;
        }

        Ok(())
    }

    pub fn taxonomy_timeout(&self) -> Duration {
        Duration::from_secs(self.taxonomy.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS))
    }

    pub fn lead_time_timeout(&self) -> Duration {
        Duration::from_secs(self.lead_time.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS))
    }

    pub fn max_in_flight(&self) -> usize {
        self.lead_time.max_in_flight.unwrap_or(DEFAULT_MAX_IN_FLIGHT)
    }

    pub fn origin(&self) -> Origin {
        Origin {
            district_code: self.origin.district_code.clone(),
            ward_code: self.origin.ward_code.clone(),
        }
    }

    /// 載入費率表：設定檔指定的檔案，否則使用內建表
    pub fn load_tables(&self) -> Result<ShippingTables> {
        match &self.tables {
            Some(tables) => {
                tracing::info!("📁 Loading shipping tables from: {}", tables.path);
                ShippingTables::from_file(&tables.path)
            }
            None => ShippingTables::builtin(),
        }
    }

    /// 建立以 HTTP 服務為後端的 orchestrator
    pub fn build_orchestrator(&self) -> Result<HttpOrchestrator> {
        let tables = Arc::new(self.load_tables()?);
        tracing::info!("Using shipping tables v{}", tables.version());

        let taxonomy = HttpTaxonomy::new(
            &self.taxonomy.endpoint,
            self.taxonomy.token.clone(),
            self.taxonomy_timeout(),
        )?;
        let lead_time = HttpLeadTime::new(
            &self.lead_time.endpoint,
            self.lead_time.token.clone(),
            self.lead_time_timeout(),
        )?;

        let resolver = LocationResolver::new(taxonomy, tables, self.taxonomy_timeout());
        let client = LeadTimeClient::new(
            lead_time,
            self.origin(),
            self.lead_time.service_id,
            self.lead_time_timeout(),
            self.max_in_flight(),
        );

        Ok(ResolutionOrchestrator::new(resolver, client))
    }
}

impl Validate for ServiceConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
