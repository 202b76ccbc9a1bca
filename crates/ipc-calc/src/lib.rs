//! # IPC Calculation Engine
//!
//! 期中計價核心計算引擎：BOQ 樹匯總、工作明細台帳、變更單台帳、財務推導

pub mod calculator;
pub mod financial;
pub mod ledger;
pub mod tree;
pub mod variations;

// Re-export 主要類型
pub use calculator::{ContractAggregates, IpcCalculator};
pub use financial::{FinancialCalculator, FinancialInputs};
pub use ledger::{PriorPeriod, WorkDetailLedger};
pub use tree::{BoqTree, NodeValue};
pub use variations::{AttributionWindow, VariationLedger};

/// 財務推導結果
#[derive(Debug, Clone)]
pub struct DerivationResult {
    /// 財務摘要
    pub summary: ipc_core::FinancialSummary,

    /// 非致命警告（超量、負值歸零、前期資料缺失）
    pub warnings: Vec<ComputationWarning>,

    /// 計算耗時（毫秒）
    pub calculation_time_ms: Option<u128>,
}

impl DerivationResult {
    /// 創建空的推導結果
    pub fn empty() -> Self {
        Self {
            summary: ipc_core::FinancialSummary::zero(),
            warnings: Vec::new(),
            calculation_time_ms: None,
        }
    }

    /// 添加警告
    pub fn add_warning(&mut self, warning: ComputationWarning) {
        self.warnings.push(warning);
    }
}

/// 計算警告（不中斷計算，附在成功結果上由呼叫端呈現）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComputationWarning {
    /// 警告類型
    pub kind: WarningKind,

    /// 相關 BOQ 項目（若適用）
    pub boq_item_id: Option<uuid::Uuid>,

    /// 說明
    pub message: String,
}

impl ComputationWarning {
    pub fn new(kind: WarningKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            boq_item_id: None,
            message: message.into(),
        }
    }

    /// 關聯到特定 BOQ 項目的警告
    pub fn for_item(kind: WarningKind, boq_item_id: uuid::Uuid, message: impl Into<String>) -> Self {
        Self {
            kind,
            boq_item_id: Some(boq_item_id),
            message: message.into(),
        }
    }
}

/// 警告類型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    /// 累計完成超過合約數量
    OverQuantity,
    /// 推導出負值，已歸零
    NegativeClamped,
    /// 前期資料缺失，前期累計以 0 計
    MissingPriorPeriod,
}
