//! 變更單台帳（提出 / 批准 / 拒絕，與 IPC 週期歸屬）

use chrono::NaiveDate;
use ipc_core::{IpcError, Result, Variation, VariationStatus};
use rust_decimal::Decimal;
use uuid::Uuid;

/// 變更單歸屬窗口（按批准日計入 IPC）
///
/// 未明確指定 IPC 的變更單，按「上一期核定日之後、本期週期迄之前批准」計入本期。
#[derive(Debug, Clone, Copy)]
pub struct AttributionWindow {
    /// 窗口起（上一期核定日；首期為 None，表示不設下界）
    pub since: Option<NaiveDate>,

    /// 窗口迄（本期週期迄，含當日）
    pub until: NaiveDate,
}

/// 變更單台帳
#[derive(Debug, Clone, Default)]
pub struct VariationLedger {
    variations: Vec<Variation>,
}

impl VariationLedger {
    /// 創建空台帳
    pub fn new() -> Self {
        Self::default()
    }

    /// 從既有變更單建立
    pub fn from_variations(variations: Vec<Variation>) -> Self {
        Self { variations }
    }

    /// 提出變更單（狀態 Pending）
    pub fn propose(&mut self, variation: Variation) -> Uuid {
        let id = variation.id;
        tracing::debug!("提出變更單 {} ({})", variation.code, id);
        self.variations.push(variation);
        id
    }

    /// 批准變更單，設定批准金額與批准日
    ///
    /// 決議是終局的：已批准/已拒絕的變更單不可再決議
    pub fn approve(&mut self, id: Uuid, approved_amount: Decimal, approved_on: NaiveDate) -> Result<()> {
        if approved_amount < Decimal::ZERO {
            return Err(IpcError::validation("approved_amount", "批准金額不可為負"));
        }

        let variation = self.find_mut(id)?;
        if variation.is_decided() {
            return Err(IpcError::validation(
                "status",
                format!("變更單 {} 已決議，不可再批准", variation.code),
            ));
        }

        variation.status = VariationStatus::Approved;
        variation.approved_amount = Some(approved_amount);
        variation.approved_on = Some(approved_on);
        tracing::debug!("批准變更單 {}：金額 {}", variation.code, approved_amount);
        Ok(())
    }

    /// 拒絕變更單（終局）
    pub fn reject(&mut self, id: Uuid) -> Result<()> {
        let variation = self.find_mut(id)?;
        if variation.is_decided() {
            return Err(IpcError::validation(
                "status",
                format!("變更單 {} 已決議，不可再拒絕", variation.code),
            ));
        }

        variation.status = VariationStatus::Rejected;
        tracing::debug!("拒絕變更單 {}", variation.code);
        Ok(())
    }

    /// 所有變更單
    pub fn variations(&self) -> &[Variation] {
        &self.variations
    }

    /// 取得單一變更單
    pub fn get(&self, id: Uuid) -> Result<&Variation> {
        self.variations
            .iter()
            .find(|v| v.id == id)
            .ok_or(IpcError::UnknownVariation(id))
    }

    /// 計入某 IPC 的已批准變更金額
    ///
    /// 明確掛帳到該 IPC 的一律計入；未掛帳的按批准日落在窗口內計入。
    pub fn approved_amount_for(&self, ipc_id: Uuid, window: AttributionWindow) -> Decimal {
        self.variations
            .iter()
            .filter(|v| v.status == VariationStatus::Approved)
            .filter(|v| match v.target_ipc_id {
                Some(target) => target == ipc_id,
                None => match v.approved_on {
                    Some(on) => {
                        window.since.map_or(true, |since| on > since) && on <= window.until
                    }
                    None => false,
                },
            })
            .map(|v| v.approved_amount.unwrap_or(Decimal::ZERO))
            .sum()
    }

    fn find_mut(&mut self, id: Uuid) -> Result<&mut Variation> {
        self.variations
            .iter_mut()
            .find(|v| v.id == id)
            .ok_or(IpcError::UnknownVariation(id))
    }
}
