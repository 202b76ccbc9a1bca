//! # IPC Workflow
//!
//! 審批狀態機、持久層網關抽象與通知出口

pub mod engine;
pub mod gateway;
pub mod memory;

// Re-export 主要類型
pub use engine::WorkflowEngine;
pub use gateway::{NotificationSink, NullSink, PersistenceGateway, WorkflowEvent};
pub use memory::MemoryGateway;
