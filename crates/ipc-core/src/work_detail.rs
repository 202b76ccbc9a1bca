//! 工作明細模型（單一 IPC 週期內、單一 BOQ 葉節點的完成量）

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 工作明細
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkDetail {
    /// 所屬 IPC ID
    pub ipc_id: Uuid,

    /// BOQ 葉節點ID
    pub boq_item_id: Uuid,

    /// 本期完成數量（≥ 0）
    pub current_qty: Decimal,

    /// 累計完成數量（= 前期已核定累計 + 本期數量，推導值）
    pub cumulative_qty: Decimal,
}

impl WorkDetail {
    /// 創建新的工作明細
    pub fn new(ipc_id: Uuid, boq_item_id: Uuid, current_qty: Decimal, prior_qty: Decimal) -> Self {
        Self {
            ipc_id,
            boq_item_id,
            current_qty,
            cumulative_qty: prior_qty + current_qty,
        }
    }

    /// 是否超量（累計完成超過合約數量）
    pub fn is_over_quantity(&self, contract_qty: Decimal) -> bool {
        self.cumulative_qty > contract_qty
    }
}
