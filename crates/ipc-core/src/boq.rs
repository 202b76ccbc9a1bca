//! BOQ（工程量清單）項目模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// BOQ 項目（清單中的一個節點）
///
/// 父子結構由 `ipc-calc` 的 `BoqTree` 持有；此處只保存扁平儲存形式。
/// 葉節點帶合約數量與單價；容器節點只做匯總，不直接計價。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoqItem {
    /// 項目ID
    pub id: Uuid,

    /// 父項目ID（頂層為 None）
    pub parent_id: Option<Uuid>,

    /// 項目編號（層級式、可排序，如 "1.2.3"）
    pub code: String,

    /// 工作內容描述
    pub description: String,

    /// 計量單位
    pub unit: String,

    /// 合約數量
    pub contract_qty: Decimal,

    /// 合約單價
    pub unit_rate: Decimal,
}

impl BoqItem {
    /// 創建新的 BOQ 項目
    pub fn new(
        code: impl Into<String>,
        description: impl Into<String>,
        unit: impl Into<String>,
        contract_qty: Decimal,
        unit_rate: Decimal,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            parent_id: None,
            code: code.into(),
            description: description.into(),
            unit: unit.into(),
            contract_qty,
            unit_rate,
        }
    }

    /// 建構器模式：設置父項目
    pub fn with_parent(mut self, parent_id: Uuid) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    /// 合約金額 = 合約數量 × 單價（僅對葉節點有意義）
    pub fn contract_value(&self) -> Decimal {
        self.contract_qty * self.unit_rate
    }
}

/// BOQ 匯入列（Excel 匯入 / 人工輸入的邊界格式）
///
/// 以編號（而非 ID）表達父子關係，由樹建構時解析。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoqImportRow {
    /// 項目編號
    pub code: String,

    /// 父項目編號（頂層為 None）
    pub parent_code: Option<String>,

    /// 工作內容描述
    pub description: String,

    /// 計量單位
    pub unit: String,

    /// 合約數量
    pub contract_qty: Decimal,

    /// 合約單價
    pub unit_rate: Decimal,
}

/// BOQ 匯入欄位角色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoqColumn {
    /// 項目編號
    Code,
    /// 描述
    Description,
    /// 單位
    Unit,
    /// 數量
    Quantity,
    /// 單價
    Rate,
}

impl BoqColumn {
    /// 識別匯入表頭的欄位角色（接受越南文或英文表頭）
    pub fn from_header(header: &str) -> Option<Self> {
        match header.trim().to_lowercase().as_str() {
            "mã hiệu" | "code" => Some(Self::Code),
            "mô tả" | "description" => Some(Self::Description),
            "đơn vị" | "unit" => Some(Self::Unit),
            "khối lượng" | "qty" | "quantity" => Some(Self::Quantity),
            "đơn giá" | "rate" | "unit rate" => Some(Self::Rate),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contract_value() {
        let item = BoqItem::new(
            "1.1",
            "Đào móng",
            "m3",
            Decimal::from(10),
            Decimal::from(100),
        );

        assert_eq!(item.contract_value(), Decimal::from(1000));
        assert!(item.parent_id.is_none());
    }

    #[test]
    fn test_with_parent() {
        let parent = BoqItem::new("1", "Phần móng", "", Decimal::ZERO, Decimal::ZERO);
        let child = BoqItem::new("1.1", "Đào móng", "m3", Decimal::from(5), Decimal::from(20))
            .with_parent(parent.id);

        assert_eq!(child.parent_id, Some(parent.id));
    }

    #[test]
    fn test_header_mapping_vietnamese_and_english() {
        assert_eq!(BoqColumn::from_header("Mã hiệu"), Some(BoqColumn::Code));
        assert_eq!(BoqColumn::from_header("Code"), Some(BoqColumn::Code));
        assert_eq!(BoqColumn::from_header("Mô tả"), Some(BoqColumn::Description));
        assert_eq!(
            BoqColumn::from_header("Khối lượng"),
            Some(BoqColumn::Quantity)
        );
        assert_eq!(BoqColumn::from_header("Đơn giá"), Some(BoqColumn::Rate));
        assert_eq!(BoqColumn::from_header(" unit "), Some(BoqColumn::Unit));
        assert_eq!(BoqColumn::from_header("Ghi chú"), None);
    }
}
