//! 期中計價（IPC）模型與審批狀態

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{IpcError, Result};

/// IPC 審批狀態
///
/// 合法轉換：Draft → InternalReview → Submitted → Certified → Invoiced；
/// InternalReview / Submitted 可駁回為 Rejected；Rejected 可重開為 Draft。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IpcStatus {
    /// 草稿（可編輯工作明細）
    Draft,
    /// 內部審核中
    InternalReview,
    /// 已提交業主
    Submitted,
    /// 已核定（金額凍結）
    Certified,
    /// 已駁回
    Rejected,
    /// 已開票（終態）
    Invoiced,
}

impl IpcStatus {
    /// 狀態轉換表（窮舉匹配，非法組合一律拒絕）
    pub fn can_transition(self, to: IpcStatus) -> bool {
        use IpcStatus::*;
        matches!(
            (self, to),
            (Draft, InternalReview)
                | (InternalReview, Submitted)
                | (InternalReview, Rejected)
                | (Submitted, Certified)
                | (Submitted, Rejected)
                | (Certified, Invoiced)
                | (Rejected, Draft)
        )
    }

    /// 是否為終態（Invoiced；Rejected 可重開，不算終態）
    pub fn is_terminal(self) -> bool {
        matches!(self, IpcStatus::Invoiced)
    }

    /// 是否允許編輯工作明細
    pub fn is_editable(self) -> bool {
        matches!(self, IpcStatus::Draft | IpcStatus::InternalReview)
    }
}

/// 財務摘要（財務推導引擎的輸出，核定後凍結）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinancialSummary {
    /// 本期完成工程款
    pub works_executed: Decimal,

    /// 本期計入的變更單金額
    pub variations: Decimal,

    /// 現場材料款
    pub materials_on_site: Decimal,

    /// 本期合計（完成 + 變更 + 材料）
    pub gross_total: Decimal,

    /// 本期保留金
    pub retention: Decimal,

    /// 本期預付款扣回
    pub advance_repayment: Decimal,

    /// 本期應付（合計 − 保留金 − 預付款扣回）
    pub net_payment: Decimal,

    /// VAT 金額
    pub vat: Decimal,

    /// 含稅應付
    pub total_with_vat: Decimal,
}

impl FinancialSummary {
    /// 全零摘要（零工作量的 IPC 仍可推導）
    pub fn zero() -> Self {
        Self {
            works_executed: Decimal::ZERO,
            variations: Decimal::ZERO,
            materials_on_site: Decimal::ZERO,
            gross_total: Decimal::ZERO,
            retention: Decimal::ZERO,
            advance_repayment: Decimal::ZERO,
            net_payment: Decimal::ZERO,
            vat: Decimal::ZERO,
            total_with_vat: Decimal::ZERO,
        }
    }
}

/// 期中計價申請（一個付款週期）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterimPaymentClaim {
    /// IPC ID
    pub id: Uuid,

    /// 所屬付款合約ID
    pub contract_id: Uuid,

    /// IPC 編號（同一合約內唯一，如 "IPC-03"）
    pub number: String,

    /// 計價週期起
    pub period_start: NaiveDate,

    /// 計價週期迄
    pub period_end: NaiveDate,

    /// 現場材料款
    pub materials_on_site: Decimal,

    /// 審批狀態
    pub status: IpcStatus,

    /// 財務摘要（送審時計算並附加）
    pub financials: Option<FinancialSummary>,

    /// 建立人
    pub created_by: String,

    /// 核定金額（核定前為 None；可與計算淨額不同）
    pub certified_amount: Option<Decimal>,
}

impl InterimPaymentClaim {
    /// 創建新的 IPC（初始狀態 Draft）
    ///
    /// `prev_period_end`：同合約上一期的週期迄，用於強制週期順序遞增。
    pub fn new(
        contract_id: Uuid,
        number: impl Into<String>,
        period_start: NaiveDate,
        period_end: NaiveDate,
        prev_period_end: Option<NaiveDate>,
        created_by: impl Into<String>,
    ) -> Result<Self> {
        if period_end < period_start {
            return Err(IpcError::validation(
                "period_end",
                "週期迄不可早於週期起",
            ));
        }
        if let Some(prev_end) = prev_period_end {
            if period_end < prev_end {
                return Err(IpcError::validation(
                    "period_end",
                    "週期迄不可早於同合約上一期的週期迄",
                ));
            }
        }

        Ok(Self {
            id: Uuid::new_v4(),
            contract_id,
            number: number.into(),
            period_start,
            period_end,
            materials_on_site: Decimal::ZERO,
            status: IpcStatus::Draft,
            financials: None,
            created_by: created_by.into(),
            certified_amount: None,
        })
    }

    /// 建構器模式：設置現場材料款
    pub fn with_materials_on_site(mut self, amount: Decimal) -> Self {
        self.materials_on_site = amount;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_transition_table_happy_path() {
        use IpcStatus::*;
        assert!(Draft.can_transition(InternalReview));
        assert!(InternalReview.can_transition(Submitted));
        assert!(Submitted.can_transition(Certified));
        assert!(Certified.can_transition(Invoiced));
        assert!(Rejected.can_transition(Draft));
    }

    #[test]
    fn test_transition_table_rejects_skips() {
        use IpcStatus::*;
        assert!(!Draft.can_transition(Certified));
        assert!(!Draft.can_transition(Submitted));
        assert!(!Draft.can_transition(Rejected));
        assert!(!Submitted.can_transition(Invoiced));
        assert!(!Invoiced.can_transition(Draft));
        assert!(!Certified.can_transition(Rejected));
    }

    #[test]
    fn test_terminal_and_editable() {
        assert!(IpcStatus::Invoiced.is_terminal());
        assert!(!IpcStatus::Rejected.is_terminal());
        assert!(IpcStatus::Draft.is_editable());
        assert!(IpcStatus::InternalReview.is_editable());
        assert!(!IpcStatus::Submitted.is_editable());
    }

    #[test]
    fn test_new_claim_period_validation() {
        let contract_id = Uuid::new_v4();

        // 週期迄早於週期起
        let bad = InterimPaymentClaim::new(
            contract_id,
            "IPC-01",
            date(2026, 3, 1),
            date(2026, 2, 1),
            None,
            "pm",
        );
        assert!(bad.is_err());

        // 早於上一期的週期迄
        let out_of_order = InterimPaymentClaim::new(
            contract_id,
            "IPC-02",
            date(2026, 1, 1),
            date(2026, 1, 31),
            Some(date(2026, 2, 28)),
            "pm",
        );
        assert!(out_of_order.is_err());

        let ok = InterimPaymentClaim::new(
            contract_id,
            "IPC-02",
            date(2026, 3, 1),
            date(2026, 3, 31),
            Some(date(2026, 2, 28)),
            "pm",
        )
        .unwrap();
        assert_eq!(ok.status, IpcStatus::Draft);
        assert!(ok.financials.is_none());
    }
}
