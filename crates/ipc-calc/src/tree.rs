//! BOQ 樹模型（工程量清單的層級結構與匯總）

use std::collections::{HashMap, HashSet};

use ipc_core::{BoqImportRow, BoqItem, IpcError, Result, WorkDetail};
use rust_decimal::Decimal;
use uuid::Uuid;

/// 節點金額（本期 / 累計）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeValue {
    /// 本期完成金額
    pub current_amount: Decimal,

    /// 累計完成金額
    pub cumulative_amount: Decimal,
}

impl NodeValue {
    fn zero() -> Self {
        Self {
            current_amount: Decimal::ZERO,
            cumulative_amount: Decimal::ZERO,
        }
    }
}

/// BOQ 樹
///
/// 由扁平項目清單建構；匯入資料不可信，建構時檢查懸空父引用與環，
/// 所有遍歷均使用顯式堆疊（不做無界遞迴）。
#[derive(Debug, Clone)]
pub struct BoqTree {
    items: HashMap<Uuid, BoqItem>,
    children: HashMap<Uuid, Vec<Uuid>>,
    roots: Vec<Uuid>,
}

impl BoqTree {
    /// 從扁平項目清單建構 BOQ 樹
    ///
    /// 失敗條件：父引用指向不存在的項目、父引用成環
    pub fn build(flat_items: Vec<BoqItem>) -> Result<Self> {
        let mut items: HashMap<Uuid, BoqItem> = HashMap::with_capacity(flat_items.len());
        for item in flat_items {
            if items.insert(item.id, item).is_some() {
                return Err(IpcError::MalformedHierarchy(
                    "項目ID重複".to_string(),
                ));
            }
        }

        // 懸空父引用檢查
        for item in items.values() {
            if let Some(parent_id) = item.parent_id {
                if !items.contains_key(&parent_id) {
                    return Err(IpcError::MalformedHierarchy(format!(
                        "項目 {} 的父引用 {} 不存在",
                        item.code, parent_id
                    )));
                }
            }
        }

        // 環檢查：沿父鏈上行，已確認無環的節點不重走
        let mut acyclic: HashSet<Uuid> = HashSet::with_capacity(items.len());
        for item in items.values() {
            let mut path: Vec<Uuid> = Vec::new();
            let mut on_path: HashSet<Uuid> = HashSet::new();
            let mut cursor = item.id;

            loop {
                if acyclic.contains(&cursor) {
                    break;
                }
                if !on_path.insert(cursor) {
                    return Err(IpcError::MalformedHierarchy(format!(
                        "項目 {} 的父鏈成環",
                        item.code
                    )));
                }
                path.push(cursor);

                match items[&cursor].parent_id {
                    Some(parent_id) => cursor = parent_id,
                    None => break,
                }
            }

            acyclic.extend(path);
        }

        // 建立父 → 子索引，依項目編號排序
        let mut children: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
        let mut roots: Vec<Uuid> = Vec::new();
        for item in items.values() {
            match item.parent_id {
                Some(parent_id) => children.entry(parent_id).or_default().push(item.id),
                None => roots.push(item.id),
            }
        }
        let by_code = |items: &HashMap<Uuid, BoqItem>, a: &Uuid, b: &Uuid| {
            items[a].code.cmp(&items[b].code)
        };
        roots.sort_by(|a, b| by_code(&items, a, b));
        for child_ids in children.values_mut() {
            child_ids.sort_by(|a, b| by_code(&items, a, b));
        }

        Ok(Self {
            items,
            children,
            roots,
        })
    }

    /// 從匯入列建構（以編號解析父子關係）
    pub fn build_from_rows(rows: Vec<BoqImportRow>) -> Result<Self> {
        let mut id_by_code: HashMap<String, Uuid> = HashMap::with_capacity(rows.len());
        let mut items: Vec<BoqItem> = Vec::with_capacity(rows.len());

        for row in &rows {
            let item = BoqItem::new(
                row.code.clone(),
                row.description.clone(),
                row.unit.clone(),
                row.contract_qty,
                row.unit_rate,
            );
            if id_by_code.insert(row.code.clone(), item.id).is_some() {
                return Err(IpcError::MalformedHierarchy(format!(
                    "項目編號重複: {}",
                    row.code
                )));
            }
            items.push(item);
        }

        for (item, row) in items.iter_mut().zip(&rows) {
            if let Some(parent_code) = &row.parent_code {
                let parent_id = id_by_code.get(parent_code).ok_or_else(|| {
                    IpcError::MalformedHierarchy(format!(
                        "項目 {} 的父編號 {} 不存在",
                        row.code, parent_code
                    ))
                })?;
                item.parent_id = Some(*parent_id);
            }
        }

        Self::build(items)
    }

    /// 取得項目
    pub fn get(&self, item_id: Uuid) -> Result<&BoqItem> {
        self.items.get(&item_id).ok_or(IpcError::UnknownItem(item_id))
    }

    /// 是否為葉節點
    pub fn is_leaf(&self, item_id: Uuid) -> bool {
        !self.children.contains_key(&item_id)
    }

    /// 頂層項目（依編號排序）
    pub fn roots(&self) -> Vec<&BoqItem> {
        self.roots.iter().map(|id| &self.items[id]).collect()
    }

    /// 所有葉節點（依編號排序）
    pub fn leaves(&self) -> Vec<&BoqItem> {
        let mut leaves: Vec<&BoqItem> = self
            .items
            .values()
            .filter(|item| self.is_leaf(item.id))
            .collect();
        leaves.sort_by(|a, b| a.code.cmp(&b.code));
        leaves
    }

    /// 節點數量
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// 是否為空樹
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// 合約總價 = 所有葉節點的合約金額之和
    pub fn total_contract_value(&self) -> Decimal {
        self.leaves().iter().map(|item| item.contract_value()).sum()
    }

    /// 計算節點金額
    ///
    /// 葉節點：本期金額 = 本期數量 × 單價，累計金額 = 累計數量 × 單價；
    /// 容器節點：對所有後代葉節點求和。顯式堆疊遍歷，深樹不會爆棧。
    pub fn node_value(&self, item_id: Uuid, details: &[WorkDetail]) -> Result<NodeValue> {
        self.get(item_id)?;

        let detail_by_item: HashMap<Uuid, &WorkDetail> =
            details.iter().map(|d| (d.boq_item_id, d)).collect();

        let mut value = NodeValue::zero();
        let mut stack = vec![item_id];
        while let Some(id) = stack.pop() {
            match self.children.get(&id) {
                Some(child_ids) => stack.extend(child_ids.iter().copied()),
                None => {
                    let item = &self.items[&id];
                    if let Some(detail) = detail_by_item.get(&id) {
                        value.current_amount += detail.current_qty * item.unit_rate;
                        value.cumulative_amount += detail.cumulative_qty * item.unit_rate;
                    }
                }
            }
        }

        Ok(value)
    }

    /// 超量檢測：葉節點累計完成是否超過合約數量
    pub fn detect_over_quantity(&self, item_id: Uuid, detail: &WorkDetail) -> Result<bool> {
        let item = self.get(item_id)?;
        Ok(detail.is_over_quantity(item.contract_qty))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn leaf(code: &str, qty: i64, rate: i64) -> BoqItem {
        BoqItem::new(code, format!("item {code}"), "m3", Decimal::from(qty), Decimal::from(rate))
    }

    fn container(code: &str) -> BoqItem {
        BoqItem::new(code, format!("group {code}"), "", Decimal::ZERO, Decimal::ZERO)
    }

    fn detail(item: &BoqItem, current: i64, prior: i64) -> WorkDetail {
        WorkDetail::new(Uuid::new_v4(), item.id, Decimal::from(current), Decimal::from(prior))
    }

    #[test]
    fn test_basic_rollup() {
        // 場景：一個容器下兩個葉節點，10×100 + 5×200 = 2000
        let root = container("1");
        let a = leaf("1.1", 10, 100).with_parent(root.id);
        let b = leaf("1.2", 5, 200).with_parent(root.id);

        let details = vec![detail(&a, 10, 0), detail(&b, 5, 0)];
        let root_id = root.id;
        let tree = BoqTree::build(vec![root, a, b]).unwrap();

        let value = tree.node_value(root_id, &details).unwrap();
        assert_eq!(value.current_amount, Decimal::from(2000));
        assert_eq!(value.cumulative_amount, Decimal::from(2000));
    }

    #[test]
    fn test_cumulative_uses_prior_quantity() {
        let item = leaf("1", 100, 10);
        let details = vec![detail(&item, 20, 30)];
        let item_id = item.id;
        let tree = BoqTree::build(vec![item]).unwrap();

        let value = tree.node_value(item_id, &details).unwrap();
        assert_eq!(value.current_amount, Decimal::from(200));
        assert_eq!(value.cumulative_amount, Decimal::from(500)); // (30+20)×10
    }

    #[test]
    fn test_dangling_parent_rejected() {
        let orphan = leaf("1.1", 1, 1).with_parent(Uuid::new_v4());

        let result = BoqTree::build(vec![orphan]);
        assert!(matches!(result, Err(IpcError::MalformedHierarchy(_))));
    }

    #[test]
    fn test_cycle_rejected() {
        let mut a = container("1");
        let mut b = container("1.1");
        a.parent_id = Some(b.id);
        b.parent_id = Some(a.id);

        let result = BoqTree::build(vec![a, b]);
        assert!(matches!(result, Err(IpcError::MalformedHierarchy(_))));
    }

    #[test]
    fn test_deep_chain_does_not_overflow() {
        // 病態匯入：一條 10000 層深的鏈
        let mut items = Vec::new();
        let mut parent: Option<Uuid> = None;
        for i in 0..10_000 {
            let mut item = if i == 9_999 {
                leaf(&format!("{i}"), 2, 3)
            } else {
                container(&format!("{i}"))
            };
            item.parent_id = parent;
            parent = Some(item.id);
            items.push(item);
        }

        let deepest = items.last().unwrap().clone();
        let root_id = items[0].id;
        let details = vec![detail(&deepest, 2, 0)];
        let tree = BoqTree::build(items).unwrap();

        let value = tree.node_value(root_id, &details).unwrap();
        assert_eq!(value.current_amount, Decimal::from(6));
    }

    #[test]
    fn test_build_from_rows_resolves_parent_codes() {
        let rows = vec![
            BoqImportRow {
                code: "1".to_string(),
                parent_code: None,
                description: "Phần móng".to_string(),
                unit: String::new(),
                contract_qty: Decimal::ZERO,
                unit_rate: Decimal::ZERO,
            },
            BoqImportRow {
                code: "1.1".to_string(),
                parent_code: Some("1".to_string()),
                description: "Đào móng".to_string(),
                unit: "m3".to_string(),
                contract_qty: Decimal::from(10),
                unit_rate: Decimal::from(100),
            },
        ];

        let tree = BoqTree::build_from_rows(rows).unwrap();
        assert_eq!(tree.len(), 2);
        assert_eq!(tree.roots().len(), 1);
        assert_eq!(tree.leaves().len(), 1);
        assert_eq!(tree.total_contract_value(), Decimal::from(1000));
    }

    #[test]
    fn test_build_from_rows_dangling_parent_code() {
        let rows = vec![BoqImportRow {
            code: "2.1".to_string(),
            parent_code: Some("2".to_string()),
            description: String::new(),
            unit: String::new(),
            contract_qty: Decimal::ONE,
            unit_rate: Decimal::ONE,
        }];

        assert!(matches!(
            BoqTree::build_from_rows(rows),
            Err(IpcError::MalformedHierarchy(_))
        ));
    }

    #[test]
    fn test_detect_over_quantity() {
        let item = leaf("1", 100, 10);
        let over = detail(&item, 50, 70); // 累計 120 > 100
        let within = detail(&item, 10, 70); // 累計 80

        let item_id = item.id;
        let tree = BoqTree::build(vec![item]).unwrap();

        assert!(tree.detect_over_quantity(item_id, &over).unwrap());
        assert!(!tree.detect_over_quantity(item_id, &within).unwrap());
    }

    proptest! {
        /// 結構不變量：根節點金額 = 全部葉節點金額之和（任意形狀的樹）
        #[test]
        fn prop_root_value_equals_leaf_sum(
            leaf_specs in prop::collection::vec((1u32..500, 1u32..1000, 0u32..200), 1..40),
            fanout in 1usize..5,
        ) {
            // 依扇出參數把葉節點掛到一層容器下，再掛到單一根
            let root = container("0");
            let mut items = vec![root.clone()];
            let mut groups: Vec<BoqItem> = Vec::new();
            let mut leaves_built: Vec<BoqItem> = Vec::new();

            for (i, (qty, rate, done)) in leaf_specs.iter().enumerate() {
                if i % fanout == 0 {
                    let group = container(&format!("0.{}", groups.len() + 1))
                        .with_parent(root.id);
                    groups.push(group.clone());
                    items.push(group);
                }
                let group = groups.last().unwrap();
                let mut item = leaf(
                    &format!("{}.{}", group.code, i + 1),
                    *qty as i64,
                    *rate as i64,
                );
                item.parent_id = Some(group.id);
                leaves_built.push(item.clone());
                items.push(item);

                let _ = done; // 數量見下方 details
            }

            let details: Vec<WorkDetail> = leaves_built
                .iter()
                .zip(leaf_specs.iter())
                .map(|(item, (_, _, done))| detail(item, *done as i64, 0))
                .collect();

            let root_id = root.id;
            let tree = BoqTree::build(items).unwrap();

            let root_value = tree.node_value(root_id, &details).unwrap();
            let leaf_sum: Decimal = tree
                .leaves()
                .iter()
                .map(|item| tree.node_value(item.id, &details).unwrap().current_amount)
                .sum();

            prop_assert_eq!(root_value.current_amount, leaf_sum);
        }
    }
}
