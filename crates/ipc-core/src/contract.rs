//! 合約付款條款模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{IpcError, Result};

/// 預付款回收規則
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdvanceRule {
    /// 無預付款回收
    None,

    /// 線性回收：從起始進度到結束進度之間按比例扣回
    /// 進度低於 start_percent 不扣回；達到 end_percent 扣回全部餘額
    Progressive {
        start_percent: Decimal,
        end_percent: Decimal,
    },
}

/// 付款條款（疊加在基礎合約上的 1:1 擴展）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentContract {
    /// 基礎合約ID
    pub contract_id: uuid::Uuid,

    /// 保留金比例（0–100）
    pub retention_percent: Decimal,

    /// 保留金上限（累計絕對值；0 表示不設上限）
    pub retention_limit: Decimal,

    /// 預付款金額
    pub advance_payment: Decimal,

    /// 預付款回收規則
    pub advance_rule: AdvanceRule,

    /// VAT 比例（0–100）
    pub vat_percent: Decimal,
}

impl PaymentContract {
    /// 創建新的付款條款（預設：無保留金、無預付款、無 VAT）
    pub fn new(contract_id: uuid::Uuid) -> Self {
        Self {
            contract_id,
            retention_percent: Decimal::ZERO,
            retention_limit: Decimal::ZERO,
            advance_payment: Decimal::ZERO,
            advance_rule: AdvanceRule::None,
            vat_percent: Decimal::ZERO,
        }
    }

    /// 建構器模式：設置保留金比例
    pub fn with_retention_percent(mut self, percent: Decimal) -> Self {
        self.retention_percent = percent;
        self
    }

    /// 建構器模式：設置保留金上限
    pub fn with_retention_limit(mut self, limit: Decimal) -> Self {
        self.retention_limit = limit;
        self
    }

    /// 建構器模式：設置預付款金額與回收規則
    pub fn with_advance(mut self, amount: Decimal, rule: AdvanceRule) -> Self {
        self.advance_payment = amount;
        self.advance_rule = rule;
        self
    }

    /// 建構器模式：設置 VAT 比例
    pub fn with_vat_percent(mut self, percent: Decimal) -> Self {
        self.vat_percent = percent;
        self
    }

    /// 驗證條款欄位範圍
    pub fn validate(&self) -> Result<()> {
        let hundred = Decimal::from(100);

        if self.retention_percent < Decimal::ZERO || self.retention_percent > hundred {
            return Err(IpcError::validation(
                "retention_percent",
                "保留金比例必須介於 0 與 100 之間",
            ));
        }
        if self.vat_percent < Decimal::ZERO || self.vat_percent > hundred {
            return Err(IpcError::validation(
                "vat_percent",
                "VAT 比例必須介於 0 與 100 之間",
            ));
        }
        if self.retention_limit < Decimal::ZERO {
            return Err(IpcError::validation("retention_limit", "保留金上限不可為負"));
        }
        if self.advance_payment < Decimal::ZERO {
            return Err(IpcError::validation("advance_payment", "預付款金額不可為負"));
        }

        if let AdvanceRule::Progressive {
            start_percent,
            end_percent,
        } = self.advance_rule
        {
            if start_percent < Decimal::ZERO || end_percent > hundred {
                return Err(IpcError::validation(
                    "advance_rule",
                    "回收進度門檻必須介於 0 與 100 之間",
                ));
            }
            if start_percent >= end_percent {
                return Err(IpcError::validation(
                    "advance_rule",
                    "回收起始進度必須小於結束進度",
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_contract_builder() {
        let contract = PaymentContract::new(Uuid::new_v4())
            .with_retention_percent(Decimal::from(5))
            .with_retention_limit(Decimal::from(100_000))
            .with_advance(
                Decimal::from(200_000),
                AdvanceRule::Progressive {
                    start_percent: Decimal::from(20),
                    end_percent: Decimal::from(80),
                },
            )
            .with_vat_percent(Decimal::from(10));

        assert!(contract.validate().is_ok());
        assert_eq!(contract.retention_percent, Decimal::from(5));
        assert_eq!(contract.vat_percent, Decimal::from(10));
    }

    #[test]
    fn test_validate_rejects_bad_percent() {
        let contract =
            PaymentContract::new(Uuid::new_v4()).with_retention_percent(Decimal::from(120));

        assert!(matches!(
            contract.validate(),
            Err(IpcError::Validation { field, .. }) if field == "retention_percent"
        ));
    }

    #[test]
    fn test_validate_rejects_inverted_thresholds() {
        let contract = PaymentContract::new(Uuid::new_v4()).with_advance(
            Decimal::from(1000),
            AdvanceRule::Progressive {
                start_percent: Decimal::from(80),
                end_percent: Decimal::from(20),
            },
        );

        assert!(matches!(
            contract.validate(),
            Err(IpcError::Validation { field, .. }) if field == "advance_rule"
        ));
    }
}
