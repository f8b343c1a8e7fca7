use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("scenario file I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("scenario file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// The form fields a client saves alongside a scenario name. Stored
/// verbatim so the UI can re-apply a saved scenario into the form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScenarioDraft {
    pub name: String,
    pub purchase_price: f64,
    pub own_money: f64,
    pub extra_costs: f64,
    pub has_loan: bool,
    pub loan_amount: f64,
    pub loan_annual_rate: f64,
    pub loan_years: u32,
    pub use_manual_loan_payment: bool,
    pub loan_monthly_payment: f64,
    pub rent_per_month: f64,
    pub monthly_expenses: f64,
    pub years: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredScenario {
    pub id: String,
    pub client_id: String,
    pub created_at: String,
    #[serde(flatten)]
    pub draft: ScenarioDraft,
}

/// Flat JSON file holding every client's saved scenarios. Each call is a
/// full read-modify-write; callers serialize mutations (the HTTP layer
/// keeps the store behind a mutex), and the last write wins.
#[derive(Debug)]
pub struct ScenarioStore {
    path: PathBuf,
}

impl ScenarioStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn list(&self, client_id: &str) -> Result<Vec<StoredScenario>, StoreError> {
        let scenarios = self.read_all().await?;
        Ok(scenarios
            .into_iter()
            .filter(|scenario| scenario.client_id == client_id)
            .collect())
    }

    pub async fn insert(
        &self,
        client_id: &str,
        draft: ScenarioDraft,
    ) -> Result<StoredScenario, StoreError> {
        let mut scenarios = self.read_all().await?;

        let now = Utc::now();
        // Millisecond ids collide when two saves land in the same tick;
        // bump until the id is free within the file.
        let mut id_millis = now.timestamp_millis();
        while scenarios
            .iter()
            .any(|scenario| scenario.id == id_millis.to_string())
        {
            id_millis += 1;
        }

        let stored = StoredScenario {
            id: id_millis.to_string(),
            client_id: client_id.to_string(),
            created_at: now.to_rfc3339(),
            draft,
        };
        scenarios.push(stored.clone());
        self.write_all(&scenarios).await?;
        Ok(stored)
    }

    /// Deletes a scenario only when it belongs to the given client.
    /// Returns whether anything was removed.
    pub async fn remove(&self, id: &str, client_id: &str) -> Result<bool, StoreError> {
        let mut scenarios = self.read_all().await?;
        let before = scenarios.len();
        scenarios.retain(|scenario| !(scenario.id == id && scenario.client_id == client_id));
        if scenarios.len() == before {
            return Ok(false);
        }
        self.write_all(&scenarios).await?;
        Ok(true)
    }

    async fn read_all(&self) -> Result<Vec<StoredScenario>, StoreError> {
        let raw = match tokio::fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };
        Ok(serde_json::from_slice(&raw)?)
    }

    async fn write_all(&self, scenarios: &[StoredScenario]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let raw = serde_json::to_vec_pretty(scenarios)?;
        tokio::fs::write(&self.path, raw).await?;
        Ok(())
    }
}
