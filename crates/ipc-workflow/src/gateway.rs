//! 持久層網關與通知出口抽象
//!
//! 核心不直接連資料庫；一切讀寫經由網關的單請求操作。
//! 瞬時失敗以 `IpcError::Gateway` 上拋，重試責任在呼叫端。

use ipc_core::{
    BoqItem, FinancialSummary, IpcStatus, PaymentContract, Result, Variation, WorkDetail,
    WorkflowEntry,
};
use uuid::Uuid;

/// 持久層網關
///
/// `replace_work_details` 是原子的「整批替換」而非逐列 upsert——
/// 部分寫入不可被同一 IPC 的並發讀取觀察到。替換須帶版本號，
/// 版本不符即失敗（`IpcError::VersionConflict`），不做靜默覆蓋。
pub trait PersistenceGateway {
    /// 載入合約的 BOQ 扁平項目清單
    fn load_boq_items(&self, contract_id: Uuid) -> Result<Vec<BoqItem>>;

    /// 載入某 IPC 的工作明細
    fn load_work_details(&self, ipc_id: Uuid) -> Result<Vec<WorkDetail>>;

    /// 原子替換某 IPC 的全部工作明細，返回新版本號
    fn replace_work_details(
        &mut self,
        ipc_id: Uuid,
        details: &[WorkDetail],
        expected_version: u64,
    ) -> Result<u64>;

    /// 載入付款條款
    fn load_payment_contract(&self, contract_id: Uuid) -> Result<PaymentContract>;

    /// 載入合約的已批准變更單
    fn load_approved_variations(&self, contract_id: Uuid) -> Result<Vec<Variation>>;

    /// 追加一條審批歷史（只增不改）
    fn append_history(&mut self, entry: WorkflowEntry) -> Result<()>;

    /// 更新 IPC 狀態與計算後的財務欄位
    fn update_status(
        &mut self,
        ipc_id: Uuid,
        status: IpcStatus,
        financials: Option<&FinancialSummary>,
    ) -> Result<()>;
}

/// 狀態轉換事件（供通知鈴鐺等外部介面渲染）
#[derive(Debug, Clone)]
pub struct WorkflowEvent {
    /// IPC ID
    pub ipc_id: Uuid,

    /// 合約ID
    pub contract_id: Uuid,

    /// IPC 編號
    pub ipc_number: String,

    /// 轉換前狀態
    pub from_status: IpcStatus,

    /// 轉換後狀態
    pub to_status: IpcStatus,

    /// 操作人
    pub actor: String,
}

/// 通知出口（射後不理：失敗不影響狀態轉換）
pub trait NotificationSink {
    fn notify(&self, event: WorkflowEvent);
}

/// 不發通知的出口
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl NotificationSink for NullSink {
    fn notify(&self, _event: WorkflowEvent) {}
}
