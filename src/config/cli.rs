use crate::domain::model::Address;
use crate::utils::error::{QuoteError, Result};
use crate::utils::validation::{self, Validate};
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "shipquote")]
#[command(about = "Resolve Vietnamese addresses to logistics codes and quote shipping")]
pub struct CliConfig {
    /// Path to TOML service configuration
    #[arg(short, long, default_value = "shipquote.toml")]
    pub config: String,

    #[arg(long, requires_all = ["district", "ward"], conflicts_with = "batch")]
    pub province: Option<String>,

    #[arg(long)]
    pub district: Option<String>,

    #[arg(long)]
    pub ward: Option<String>,

    #[arg(long, default_value = "")]
    pub street: String,

    /// JSON file holding an array of addresses, resolved concurrently
    #[arg(long)]
    pub batch: Option<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,
}

impl CliConfig {
    pub fn addresses(&self) -> Result<Vec<Address>> {
        if let Some(batch) = &self.batch {
            let content = std::fs::read_to_string(batch)?;
            let addresses: Vec<Address> = serde_json::from_str(&content)?;
            tracing::info!("📁 Loaded {} addresses from {}", addresses.len(), batch);
            return Ok(addresses);
        }

        match (&self.province, &self.district, &self.ward) {
            (Some(province), Some(district), Some(ward)) => {
                Ok(vec![Address::new("cli", province.as_str(), district.as_str(), ward.as_str())
                    .with_street_line(self.street.as_str())])
            }
            _ => Err(QuoteError::MissingConfigError {
                field: "--province/--district/--ward or --batch".to_string(),
            }),
        }
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::file_path("config", &self.config, "toml")?;
        if let Some(batch) = &self.batch {
            validation::file_path("batch", batch, "json")?;
        } else if self.province.is_none() {
            return Err(QuoteError::MissingConfigError {
                field: "--province/--district/--ward or --batch".to_string(),
            });
        }
        Ok(())
    }
}
