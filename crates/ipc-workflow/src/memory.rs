//! 記憶體網關（測試與範例用的參考實現）

use std::collections::HashMap;

use ipc_core::{
    BoqItem, FinancialSummary, IpcError, IpcStatus, PaymentContract, Result, Variation,
    VariationStatus, WorkDetail, WorkflowEntry,
};
use uuid::Uuid;

use crate::gateway::PersistenceGateway;

/// 記憶體網關
///
/// 版本號語義即網關契約的參考：每次整批替換遞增，
/// 預期版本不符時拒絕寫入。
#[derive(Debug, Default)]
pub struct MemoryGateway {
    boq_items: HashMap<Uuid, Vec<BoqItem>>,
    contracts: HashMap<Uuid, PaymentContract>,
    variations: HashMap<Uuid, Vec<Variation>>,
    work_details: HashMap<Uuid, Vec<WorkDetail>>,
    detail_versions: HashMap<Uuid, u64>,
    history: Vec<WorkflowEntry>,
    statuses: HashMap<Uuid, (IpcStatus, Option<FinancialSummary>)>,
}

impl MemoryGateway {
    /// 創建空網關
    pub fn new() -> Self {
        Self::default()
    }

    /// 預載合約資料（BOQ 與付款條款）
    pub fn seed_contract(&mut self, contract: PaymentContract, boq_items: Vec<BoqItem>) {
        self.boq_items.insert(contract.contract_id, boq_items);
        self.contracts.insert(contract.contract_id, contract);
    }

    /// 預載變更單
    pub fn seed_variations(&mut self, contract_id: Uuid, variations: Vec<Variation>) {
        self.variations.insert(contract_id, variations);
    }

    /// 目前的明細版本號（未寫入過為 0）
    pub fn detail_version(&self, ipc_id: Uuid) -> u64 {
        self.detail_versions.get(&ipc_id).copied().unwrap_or(0)
    }

    /// 全部審批歷史（依寫入順序）
    pub fn history(&self) -> &[WorkflowEntry] {
        &self.history
    }

    /// 某 IPC 的審批歷史
    pub fn history_for(&self, ipc_id: Uuid) -> Vec<&WorkflowEntry> {
        self.history.iter().filter(|e| e.ipc_id == ipc_id).collect()
    }

    /// 已持久化的狀態
    pub fn status_of(&self, ipc_id: Uuid) -> Option<IpcStatus> {
        self.statuses.get(&ipc_id).map(|(status, _)| *status)
    }
}

impl PersistenceGateway for MemoryGateway {
    fn load_boq_items(&self, contract_id: Uuid) -> Result<Vec<BoqItem>> {
        self.boq_items
            .get(&contract_id)
            .cloned()
            .ok_or_else(|| IpcError::Gateway(format!("合約 {contract_id} 無 BOQ 資料")))
    }

    fn load_work_details(&self, ipc_id: Uuid) -> Result<Vec<WorkDetail>> {
        Ok(self.work_details.get(&ipc_id).cloned().unwrap_or_default())
    }

    fn replace_work_details(
        &mut self,
        ipc_id: Uuid,
        details: &[WorkDetail],
        expected_version: u64,
    ) -> Result<u64> {
        let current = self.detail_version(ipc_id);
        if current != expected_version {
            return Err(IpcError::VersionConflict {
                expected: expected_version,
                actual: current,
            });
        }

        let new_version = current + 1;
        self.work_details.insert(ipc_id, details.to_vec());
        self.detail_versions.insert(ipc_id, new_version);
        Ok(new_version)
    }

    fn load_payment_contract(&self, contract_id: Uuid) -> Result<PaymentContract> {
        self.contracts
            .get(&contract_id)
            .cloned()
            .ok_or_else(|| IpcError::Gateway(format!("合約 {contract_id} 無付款條款")))
    }

    fn load_approved_variations(&self, contract_id: Uuid) -> Result<Vec<Variation>> {
        Ok(self
            .variations
            .get(&contract_id)
            .map(|all| {
                all.iter()
                    .filter(|v| v.status == VariationStatus::Approved)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn append_history(&mut self, entry: WorkflowEntry) -> Result<()> {
        self.history.push(entry);
        Ok(())
    }

    fn update_status(
        &mut self,
        ipc_id: Uuid,
        status: IpcStatus,
        financials: Option<&FinancialSummary>,
    ) -> Result<()> {
        self.statuses.insert(ipc_id, (status, financials.cloned()));
        Ok(())
    }
}
