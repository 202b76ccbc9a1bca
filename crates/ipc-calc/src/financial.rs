//! 財務推導引擎
//!
//! 由完成數量、合約條款與已批准變更推導付款證書上的全部金額。
//! 純函數：相同輸入必得相同輸出，可重算、可稽核。

use ipc_core::{AdvanceRule, FinancialSummary, PaymentContract};
use rust_decimal::Decimal;

use crate::{ComputationWarning, DerivationResult, WarningKind};

/// 財務推導輸入（全部來自已儲存的快照，無隱藏狀態）
#[derive(Debug, Clone)]
pub struct FinancialInputs<'a> {
    /// 付款條款
    pub contract: &'a PaymentContract,

    /// 本期完成工程款（BOQ 樹匯總的輸出）
    pub works_executed: Decimal,

    /// 本期計入的已批准變更金額
    pub variations: Decimal,

    /// 現場材料款
    pub materials_on_site: Decimal,

    /// 既往各期已扣保留金累計
    pub cumulative_retention: Decimal,

    /// 既往各期已扣回預付款累計
    pub advance_repaid: Decimal,

    /// 合約累計進度（0–100，累計完成金額 ÷ 合約總價）
    pub progress_percent: Decimal,
}

/// 財務推導計算器
pub struct FinancialCalculator;

impl FinancialCalculator {
    /// 推導財務摘要
    ///
    /// 計算順序：完成款 → 變更款 → 本期合計 → 保留金 → 預付款扣回
    /// → 應付淨額 → VAT → 含稅合計。負的推導值歸零並記警告。
    pub fn derive(inputs: &FinancialInputs<'_>) -> DerivationResult {
        let mut result = DerivationResult::empty();
        let hundred = Decimal::from(100);

        // Step 1–3: 本期合計
        let mut gross_total = inputs.works_executed + inputs.variations + inputs.materials_on_site;
        if gross_total < Decimal::ZERO {
            result.add_warning(ComputationWarning::new(
                WarningKind::NegativeClamped,
                format!("本期合計為負（{gross_total}），已歸零"),
            ));
            gross_total = Decimal::ZERO;
        }

        // Step 4: 保留金（比例為 0 時無條件為 0；有上限時按累計扣減封頂）
        let retention = Self::retention(inputs.contract, gross_total, inputs.cumulative_retention);

        // Step 5: 預付款扣回（不可超過尚未扣回的餘額）
        let advance_repayment = Self::advance_repayment(
            inputs.contract,
            inputs.progress_percent,
            inputs.advance_repaid,
        );

        // Step 6: 應付淨額
        let mut net_payment = gross_total - retention - advance_repayment;
        if net_payment < Decimal::ZERO {
            result.add_warning(ComputationWarning::new(
                WarningKind::NegativeClamped,
                format!("應付淨額為負（{net_payment}），已歸零"),
            ));
            net_payment = Decimal::ZERO;
        }

        // Step 7–8: VAT 與含稅合計
        let vat = net_payment * inputs.contract.vat_percent / hundred;
        let total_with_vat = net_payment + vat;

        result.summary = FinancialSummary {
            works_executed: inputs.works_executed,
            variations: inputs.variations,
            materials_on_site: inputs.materials_on_site,
            gross_total,
            retention,
            advance_repayment,
            net_payment,
            vat,
            total_with_vat,
        };
        result
    }

    /// 本期保留金
    fn retention(
        contract: &PaymentContract,
        gross_total: Decimal,
        cumulative_retention: Decimal,
    ) -> Decimal {
        if contract.retention_percent == Decimal::ZERO {
            return Decimal::ZERO;
        }

        let period = gross_total * contract.retention_percent / Decimal::from(100);
        if contract.retention_limit <= Decimal::ZERO {
            return period;
        }

        // 累計保留金永不超過上限
        let remaining = (contract.retention_limit - cumulative_retention).max(Decimal::ZERO);
        period.min(remaining)
    }

    /// 本期預付款扣回
    ///
    /// Progressive 規則：進度低於起點不扣；起點與終點之間按
    /// (進度 − 起點) / (終點 − 起點) 線性推進目標累計扣回額；
    /// 達到終點扣回全部餘額。本期扣回 = 目標累計 − 已扣累計，下限 0。
    fn advance_repayment(
        contract: &PaymentContract,
        progress_percent: Decimal,
        advance_repaid: Decimal,
    ) -> Decimal {
        let outstanding = (contract.advance_payment - advance_repaid).max(Decimal::ZERO);
        if outstanding == Decimal::ZERO {
            return Decimal::ZERO;
        }

        match contract.advance_rule {
            AdvanceRule::None => Decimal::ZERO,
            AdvanceRule::Progressive {
                start_percent,
                end_percent,
            } => {
                let target_cumulative = if progress_percent <= start_percent {
                    Decimal::ZERO
                } else if progress_percent >= end_percent {
                    contract.advance_payment
                } else {
                    contract.advance_payment * (progress_percent - start_percent)
                        / (end_percent - start_percent)
                };

                (target_cumulative - advance_repaid)
                    .max(Decimal::ZERO)
                    .min(outstanding)
            }
        }
    }
}
