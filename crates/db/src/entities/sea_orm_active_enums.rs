//! Database-backed enums.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use kassa_core::transfer::TransferStatus as DomainTransferStatus;

/// Transfer record status, stored as a string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum TransferStatus {
    #[sea_orm(string_value = "PENDING")]
    Pending,
    #[sea_orm(string_value = "SUCCESS")]
    Success,
    #[sea_orm(string_value = "FAILED")]
    Failed,
}

impl From<TransferStatus> for DomainTransferStatus {
    fn from(status: TransferStatus) -> Self {
        match status {
            TransferStatus::Pending => Self::Pending,
            TransferStatus::Success => Self::Success,
            TransferStatus::Failed => Self::Failed,
        }
    }
}

impl From<DomainTransferStatus> for TransferStatus {
    fn from(status: DomainTransferStatus) -> Self {
        match status {
            DomainTransferStatus::Pending => Self::Pending,
            DomainTransferStatus::Success => Self::Success,
            DomainTransferStatus::Failed => Self::Failed,
        }
    }
}
