//! 審批歷史模型（只增不改的審計軌跡）

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::claim::IpcStatus;

/// 審批歷史記錄（每次狀態轉換恰好產生一條）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowEntry {
    /// 記錄ID
    pub id: Uuid,

    /// 所屬 IPC ID
    pub ipc_id: Uuid,

    /// 操作人
    pub actor: String,

    /// 轉換前狀態
    pub from_status: IpcStatus,

    /// 轉換後狀態
    pub to_status: IpcStatus,

    /// 備註（駁回時必填）
    pub comment: Option<String>,

    /// 操作時間
    pub acted_at: DateTime<Utc>,
}

impl WorkflowEntry {
    /// 創建新的歷史記錄（時間取當下）
    pub fn new(
        ipc_id: Uuid,
        actor: impl Into<String>,
        from_status: IpcStatus,
        to_status: IpcStatus,
        comment: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            ipc_id,
            actor: actor.into(),
            from_status,
            to_status,
            comment,
            acted_at: Utc::now(),
        }
    }
}
