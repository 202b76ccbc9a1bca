//! # IPC Engine
//!
//! 期中計價（Interim Payment Claim）計算與審批引擎：
//! BOQ 樹匯總、工作明細台帳、變更單台帳、財務推導與審批狀態機。
//!
//! 各子 crate 的分工：
//! - [`ipc_core`]：資料模型、狀態列舉、錯誤類型
//! - [`ipc_calc`]：純計算（樹匯總、台帳、財務推導）
//! - [`ipc_workflow`]：審批狀態機與持久層網關抽象

pub use ipc_calc::{
    AttributionWindow, BoqTree, ComputationWarning, ContractAggregates, DerivationResult,
    FinancialCalculator, FinancialInputs, IpcCalculator, NodeValue, PriorPeriod, VariationLedger,
    WarningKind, WorkDetailLedger,
};
pub use ipc_core::{
    AdvanceRule, BoqColumn, BoqImportRow, BoqItem, FinancialSummary, InterimPaymentClaim,
    IpcError, IpcStatus, PaymentContract, Result, Variation, VariationKind, VariationStatus,
    WorkDetail, WorkflowEntry,
};
pub use ipc_workflow::{
    MemoryGateway, NotificationSink, NullSink, PersistenceGateway, WorkflowEngine, WorkflowEvent,
};
