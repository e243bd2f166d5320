use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid demand '{demand_id}': {reason}")]
    InvalidDemand { demand_id: String, reason: String },

    #[error("supply item '{supply_id}' is not available")]
    SupplyUnavailable { supply_id: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn invalid_demand(demand_id: &str, reason: impl Into<String>) -> Self {
        Error::InvalidDemand {
            demand_id: demand_id.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
