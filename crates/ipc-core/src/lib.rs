//! # IPC Core
//!
//! 核心資料模型與類型定義（BOQ、合約付款條款、期中計價 IPC、變更單、審批歷史）

pub mod boq;
pub mod claim;
pub mod contract;
pub mod history;
pub mod variation;
pub mod work_detail;

// Re-export 主要類型
pub use boq::{BoqColumn, BoqImportRow, BoqItem};
pub use claim::{FinancialSummary, InterimPaymentClaim, IpcStatus};
pub use contract::{AdvanceRule, PaymentContract};
pub use history::WorkflowEntry;
pub use variation::{Variation, VariationKind, VariationStatus};
pub use work_detail::WorkDetail;

/// IPC 錯誤類型
#[derive(Debug, thiserror::Error)]
pub enum IpcError {
    #[error("欄位驗證失敗 [{field}]: {message}")]
    Validation { field: String, message: String },

    #[error("BOQ 層級結構錯誤: {0}")]
    MalformedHierarchy(String),

    #[error("不允許的狀態轉換 [{action}]: {from:?} → {to:?}")]
    InvalidTransition {
        action: String,
        from: claim::IpcStatus,
        to: claim::IpcStatus,
    },

    #[error("找不到 BOQ 項目: {0}")]
    UnknownItem(uuid::Uuid),

    #[error("找不到變更單: {0}")]
    UnknownVariation(uuid::Uuid),

    #[error("版本衝突: 預期 {expected}，實際 {actual}")]
    VersionConflict { expected: u64, actual: u64 },

    #[error("持久層錯誤: {0}")]
    Gateway(String),

    #[error("計算錯誤: {0}")]
    CalculationError(String),
}

impl IpcError {
    /// 建立欄位驗證錯誤
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, IpcError>;
