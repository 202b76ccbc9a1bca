//! 變更單（Change Order）模型

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 變更單類型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VariationKind {
    /// 數量變更
    QuantityChange,
    /// 材料/規格變更
    MaterialChange,
    /// 新增項目
    NewItem,
}

/// 變更單狀態（決議後不可重開）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VariationStatus {
    /// 待審批
    Pending,
    /// 已批准
    Approved,
    /// 已拒絕
    Rejected,
}

/// 變更單
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Variation {
    /// 變更單ID
    pub id: Uuid,

    /// 所屬付款合約ID
    pub contract_id: Uuid,

    /// 關聯 BOQ 項目（全新範圍的變更為 None）
    pub boq_item_id: Option<Uuid>,

    /// 變更單編號
    pub code: String,

    /// 變更類型
    pub kind: VariationKind,

    /// 變更內容描述
    pub description: String,

    /// 申報金額
    pub proposed_amount: Decimal,

    /// 批准金額（批准時設置，可與申報金額不同）
    pub approved_amount: Option<Decimal>,

    /// 狀態
    pub status: VariationStatus,

    /// 批准日期（計入 IPC 週期的歸屬依據）
    pub approved_on: Option<NaiveDate>,

    /// 指定計入的 IPC（明確掛帳時使用，覆蓋按批准日歸屬）
    pub target_ipc_id: Option<Uuid>,
}

impl Variation {
    /// 創建新的變更單（初始狀態 Pending）
    pub fn new(
        contract_id: Uuid,
        code: impl Into<String>,
        kind: VariationKind,
        description: impl Into<String>,
        proposed_amount: Decimal,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            contract_id,
            boq_item_id: None,
            code: code.into(),
            kind,
            description: description.into(),
            proposed_amount,
            approved_amount: None,
            status: VariationStatus::Pending,
            approved_on: None,
            target_ipc_id: None,
        }
    }

    /// 建構器模式：關聯 BOQ 項目
    pub fn with_boq_item(mut self, boq_item_id: Uuid) -> Self {
        self.boq_item_id = Some(boq_item_id);
        self
    }

    /// 建構器模式：指定計入的 IPC
    pub fn with_target_ipc(mut self, ipc_id: Uuid) -> Self {
        self.target_ipc_id = Some(ipc_id);
        self
    }

    /// 是否已決議（批准或拒絕）
    pub fn is_decided(&self) -> bool {
        !matches!(self.status, VariationStatus::Pending)
    }
}
