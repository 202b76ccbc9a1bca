//! 工作明細台帳（單一 IPC 的本期數量輸入與驗證）

use std::collections::HashMap;

use ipc_core::{IpcError, Result, WorkDetail};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::tree::BoqTree;
use crate::{ComputationWarning, WarningKind};

/// 前期累計資料（取自同合約最近一期已核定/已提交的 IPC）
#[derive(Debug, Clone, Default)]
pub struct PriorPeriod {
    /// 每個 BOQ 葉節點的前期累計數量
    pub cumulative_by_item: HashMap<Uuid, Decimal>,
}

impl PriorPeriod {
    /// 首期 IPC：無前期資料
    pub fn none() -> Self {
        Self::default()
    }

    /// 從前期工作明細建立
    pub fn from_details(details: &[WorkDetail]) -> Self {
        Self {
            cumulative_by_item: details
                .iter()
                .map(|d| (d.boq_item_id, d.cumulative_qty))
                .collect(),
        }
    }
}

/// 工作明細台帳
///
/// 數量只允許記在葉節點上；累計 = 前期累計 + 本期數量，為推導值。
/// 前期資料缺失時以 0 計並附警告（首次匯入不因此失敗）。
#[derive(Debug, Clone)]
pub struct WorkDetailLedger {
    ipc_id: Uuid,
    prior: PriorPeriod,
    prior_missing: bool,
    entries: HashMap<Uuid, WorkDetail>,
    warnings: Vec<ComputationWarning>,
}

impl WorkDetailLedger {
    /// 創建台帳
    ///
    /// `prior`：前期累計；`prior_missing` 為 true 表示前期資料讀取失敗，
    /// 已降級為全零並記一條警告。
    pub fn new(ipc_id: Uuid, prior: PriorPeriod, prior_missing: bool) -> Self {
        let mut warnings = Vec::new();
        if prior_missing {
            warnings.push(ComputationWarning::new(
                WarningKind::MissingPriorPeriod,
                "前期累計資料缺失，前期累計以 0 計",
            ));
        }

        Self {
            ipc_id,
            prior,
            prior_missing,
            entries: HashMap::new(),
            warnings,
        }
    }

    /// 設置某 BOQ 葉節點的本期完成數量
    ///
    /// 失敗條件：數量為負、項目不在樹中、項目為容器節點。
    /// 超量（累計 > 合約數量）不擋，記警告。
    pub fn set_current_quantity(
        &mut self,
        tree: &BoqTree,
        boq_item_id: Uuid,
        qty: Decimal,
    ) -> Result<()> {
        if qty < Decimal::ZERO {
            return Err(IpcError::validation("current_qty", "本期數量不可為負"));
        }

        let item = tree.get(boq_item_id)?;
        if !tree.is_leaf(boq_item_id) {
            return Err(IpcError::validation(
                "boq_item_id",
                format!("項目 {} 為容器節點，數量只能記在葉節點", item.code),
            ));
        }

        let prior_qty = self
            .prior
            .cumulative_by_item
            .get(&boq_item_id)
            .copied()
            .unwrap_or(Decimal::ZERO);

        let detail = WorkDetail::new(self.ipc_id, boq_item_id, qty, prior_qty);

        // 舊警告以新輸入為準重記
        self.warnings.retain(|w| w.boq_item_id != Some(boq_item_id));
        if detail.is_over_quantity(item.contract_qty) {
            self.warnings.push(ComputationWarning::for_item(
                WarningKind::OverQuantity,
                boq_item_id,
                format!(
                    "項目 {} 累計完成 {} 超過合約數量 {}",
                    item.code, detail.cumulative_qty, item.contract_qty
                ),
            ));
        }

        self.entries.insert(boq_item_id, detail);
        Ok(())
    }

    /// 所屬 IPC
    pub fn ipc_id(&self) -> Uuid {
        self.ipc_id
    }

    /// 是否有至少一筆非零明細（送審門檻）
    pub fn has_nonzero_detail(&self) -> bool {
        self.entries.values().any(|d| d.current_qty > Decimal::ZERO)
    }

    /// 明細清單（依 BOQ 項目編號排序，作為財務推導輸入）
    pub fn details(&self, tree: &BoqTree) -> Vec<WorkDetail> {
        let mut details: Vec<WorkDetail> = self.entries.values().cloned().collect();
        details.sort_by(|a, b| {
            let code_a = tree.get(a.boq_item_id).map(|i| i.code.as_str()).unwrap_or("");
            let code_b = tree.get(b.boq_item_id).map(|i| i.code.as_str()).unwrap_or("");
            code_a.cmp(code_b)
        });
        details
    }

    /// 台帳警告
    pub fn warnings(&self) -> &[ComputationWarning] {
        &self.warnings
    }

    /// 前期資料是否缺失
    pub fn prior_missing(&self) -> bool {
        self.prior_missing
    }
}
