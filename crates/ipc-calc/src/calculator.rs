//! IPC 主計算器（匯總 → 歸屬 → 財務推導的編排）

use chrono::NaiveDate;
use ipc_core::{InterimPaymentClaim, PaymentContract, Result};
use rust_decimal::Decimal;

use crate::financial::{FinancialCalculator, FinancialInputs};
use crate::ledger::WorkDetailLedger;
use crate::tree::BoqTree;
use crate::variations::{AttributionWindow, VariationLedger};
use crate::DerivationResult;

/// 合約層級的既往累計（取自前期已核定的 IPC）
#[derive(Debug, Clone, Default)]
pub struct ContractAggregates {
    /// 既往各期已扣保留金累計
    pub cumulative_retention: Decimal,

    /// 既往各期已扣回預付款累計
    pub advance_repaid: Decimal,

    /// 上一期核定日（變更單歸屬窗口的下界；首期為 None）
    pub last_certified_on: Option<NaiveDate>,
}

/// IPC 計算器
pub struct IpcCalculator {
    /// BOQ 樹
    tree: BoqTree,

    /// 付款條款
    contract: PaymentContract,
}

impl IpcCalculator {
    /// 創建新的 IPC 計算器（條款先驗證）
    pub fn new(tree: BoqTree, contract: PaymentContract) -> Result<Self> {
        contract.validate()?;
        Ok(Self { tree, contract })
    }

    /// 主計算入口：推導一期 IPC 的財務摘要
    ///
    /// 純計算，不落庫；提交時呼叫一次，稽核重算時可重複呼叫，
    /// 相同輸入必得相同摘要。
    pub fn compute(
        &self,
        claim: &InterimPaymentClaim,
        ledger: &WorkDetailLedger,
        variations: &VariationLedger,
        aggregates: &ContractAggregates,
    ) -> Result<DerivationResult> {
        tracing::info!(
            "開始 IPC 財務推導：{}，明細 {} 筆",
            claim.number,
            ledger.details(&self.tree).len()
        );

        let start_time = std::time::Instant::now();
        let details = ledger.details(&self.tree);

        // Step 1: BOQ 匯總（本期完成款與累計完成款）
        tracing::debug!("Step 1: BOQ 匯總");
        let mut works_executed = Decimal::ZERO;
        let mut cumulative_value = Decimal::ZERO;
        for root in self.tree.roots() {
            let value = self.tree.node_value(root.id, &details)?;
            works_executed += value.current_amount;
            cumulative_value += value.cumulative_amount;
        }
        tracing::debug!("本期完成款: {}", works_executed);

        // Step 2: 合約累計進度（合約總價為 0 時視為 0）
        tracing::debug!("Step 2: 累計進度");
        let total_contract_value = self.tree.total_contract_value();
        let progress_percent = if total_contract_value > Decimal::ZERO {
            cumulative_value / total_contract_value * Decimal::from(100)
        } else {
            Decimal::ZERO
        };
        tracing::debug!("累計進度: {}%", progress_percent);

        // Step 3: 變更單歸屬（上一期核定日之後批准的計入本期）
        tracing::debug!("Step 3: 變更單歸屬");
        let window = AttributionWindow {
            since: aggregates.last_certified_on,
            until: claim.period_end,
        };
        let variation_amount = variations.approved_amount_for(claim.id, window);
        tracing::debug!("本期變更款: {}", variation_amount);

        // Step 4: 財務推導
        tracing::debug!("Step 4: 財務推導");
        let mut result = FinancialCalculator::derive(&FinancialInputs {
            contract: &self.contract,
            works_executed,
            variations: variation_amount,
            materials_on_site: claim.materials_on_site,
            cumulative_retention: aggregates.cumulative_retention,
            advance_repaid: aggregates.advance_repaid,
            progress_percent,
        });

        // 台帳警告（超量、前期缺失）併入推導警告
        result.warnings.extend(ledger.warnings().iter().cloned());
        result.calculation_time_ms = Some(start_time.elapsed().as_millis());

        tracing::info!(
            "IPC 財務推導完成：{}，含稅應付 {}，警告 {} 條，耗時 {:?}",
            claim.number,
            result.summary.total_with_vat,
            result.warnings.len(),
            start_time.elapsed()
        );

        Ok(result)
    }

    /// 獲取 BOQ 樹引用
    pub fn tree(&self) -> &BoqTree {
        &self.tree
    }

    /// 獲取付款條款引用
    pub fn contract(&self) -> &PaymentContract {
        &self.contract
    }
}
