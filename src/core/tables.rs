use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::alias::AliasTable;
use crate::core::fee::FeeEstimator;
use crate::utils::error::{QuoteError, Result};

/// 內建的省份費率與別名表（編譯時包含）
const BUILTIN_TABLES: &str = include_str!("../../data/shipping_tables.toml");

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableFile {
    pub version: String,
    pub provinces: Vec<ProvinceEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvinceEntry {
    pub name: String,
    pub fee: u64,
    #[serde(default)]
    pub aliases: Vec<String>,
}

/// Immutable alias + fee configuration, built once at startup and shared by
/// every resolution.
#[derive(Debug, Clone)]
pub struct ShippingTables {
    version: String,
    aliases: AliasTable,
    fees: FeeEstimator,
}

impl ShippingTables {
    /// 載入內建表
    pub fn builtin() -> Result<Self> {
        Self::from_toml_str(BUILTIN_TABLES)
    }

    /// 從 TOML 檔案載入表（覆蓋內建表）
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: TableFile = toml::from_str(content).map_err(|e| QuoteError::TableError {
            message: format!("TOML parsing error: {}", e),
        })?;
        Self::from_table_file(file)
    }

    pub fn from_table_file(file: TableFile) -> Result<Self> {
        if file.provinces.is_empty() {
            return Err(QuoteError::TableError {
                message: "table contains no provinces".to_string(),
            });
        }

        let mut aliases = AliasTable::new();
        let mut fees = FeeEstimator::new();

        for entry in &file.provinces {
            if entry.name.trim().is_empty() {
                return Err(QuoteError::TableError {
                    message: "province with empty name".to_string(),
                });
            }
            if fees.insert(&entry.name, entry.fee).is_some() {
                return Err(QuoteError::TableError {
                    message: format!("duplicate province '{}'", entry.name),
                });
            }
            aliases
                .insert(&entry.name, entry.aliases.iter().map(String::as_str))
                .map_err(|conflict| QuoteError::TableError {
                    message: conflict.to_string(),
                })?;
        }

        tracing::debug!(
            "Loaded shipping tables v{}: {} provinces, {} spellings",
            file.version,
            fees.len(),
            aliases.len()
        );

        Ok(Self {
            version: file.version,
            aliases,
            fees,
        })
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn aliases(&self) -> &AliasTable {
        &self.aliases
    }

    pub fn fees(&self) -> &FeeEstimator {
        &self.fees
    }
}
