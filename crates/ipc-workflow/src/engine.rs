//! IPC 審批狀態機
//!
//! Draft → InternalReview → Submitted → Certified → Invoiced；
//! InternalReview / Submitted 可駁回，Rejected 可重開回 Draft。
//! 每次轉換恰好追加一條審批歷史，並向通知出口發事件（射後不理）。
//! 操作人一律由參數傳入，不讀任何全域「當前使用者」。

use ipc_calc::{ContractAggregates, DerivationResult, IpcCalculator, VariationLedger, WorkDetailLedger};
use ipc_core::{
    InterimPaymentClaim, IpcError, IpcStatus, Result, WorkflowEntry,
};
use rust_decimal::Decimal;

use crate::gateway::{NotificationSink, PersistenceGateway, WorkflowEvent};

/// 審批狀態機
pub struct WorkflowEngine<G, N> {
    gateway: G,
    sink: N,
}

impl<G: PersistenceGateway, N: NotificationSink> WorkflowEngine<G, N> {
    /// 創建狀態機
    pub fn new(gateway: G, sink: N) -> Self {
        Self { gateway, sink }
    }

    /// 送內部審核（Draft → InternalReview）
    ///
    /// 守衛：至少一筆非零工作明細；財務推導必須成功並附加到 IPC。
    /// 明細先經網關整批替換（帶版本號）落庫，推導跑在落庫後的快照上。
    pub fn submit_for_review(
        &mut self,
        claim: &mut InterimPaymentClaim,
        calculator: &IpcCalculator,
        ledger: &WorkDetailLedger,
        variations: &VariationLedger,
        aggregates: &ContractAggregates,
        expected_version: u64,
        actor: &str,
    ) -> Result<DerivationResult> {
        self.guard("review", claim.status, IpcStatus::InternalReview)?;

        if !ledger.has_nonzero_detail() {
            return Err(IpcError::validation(
                "work_details",
                "送審需要至少一筆非零工作明細",
            ));
        }

        let details = ledger.details(calculator.tree());
        self.gateway
            .replace_work_details(claim.id, &details, expected_version)?;

        let result = calculator.compute(claim, ledger, variations, aggregates)?;
        claim.financials = Some(result.summary.clone());

        self.transition(claim, "review", IpcStatus::InternalReview, actor, None)?;
        Ok(result)
    }

    /// 提交業主（InternalReview → Submitted），提交人記入歷史
    pub fn submit(&mut self, claim: &mut InterimPaymentClaim, actor: &str) -> Result<()> {
        self.guard("submit", claim.status, IpcStatus::Submitted)?;
        self.transition(claim, "submit", IpcStatus::Submitted, actor, None)
    }

    /// 核定（Submitted → Certified）
    ///
    /// `certified_amount` 成為付款依據的凍結金額，可與計算淨額不同
    /// （審批人改額）；差額可由歷史與摘要推得。
    pub fn certify(
        &mut self,
        claim: &mut InterimPaymentClaim,
        certified_amount: Decimal,
        actor: &str,
    ) -> Result<()> {
        self.guard("certify", claim.status, IpcStatus::Certified)?;

        if certified_amount < Decimal::ZERO {
            return Err(IpcError::validation("certified_amount", "核定金額不可為負"));
        }

        claim.certified_amount = Some(certified_amount);
        self.transition(
            claim,
            "certify",
            IpcStatus::Certified,
            actor,
            Some(format!("核定金額 {certified_amount}")),
        )
    }

    /// 駁回（InternalReview / Submitted → Rejected），理由必填
    pub fn reject(
        &mut self,
        claim: &mut InterimPaymentClaim,
        actor: &str,
        comment: &str,
    ) -> Result<()> {
        self.guard("reject", claim.status, IpcStatus::Rejected)?;

        if comment.trim().is_empty() {
            return Err(IpcError::validation("comment", "駁回必須填寫理由"));
        }

        self.transition(
            claim,
            "reject",
            IpcStatus::Rejected,
            actor,
            Some(comment.trim().to_string()),
        )
    }

    /// 開票（Certified → Invoiced，終態），發票號記入歷史
    pub fn invoice(
        &mut self,
        claim: &mut InterimPaymentClaim,
        invoice_ref: &str,
        actor: &str,
    ) -> Result<()> {
        self.guard("invoice", claim.status, IpcStatus::Invoiced)?;

        if invoice_ref.trim().is_empty() {
            return Err(IpcError::validation("invoice_ref", "發票號不可為空"));
        }

        self.transition(
            claim,
            "invoice",
            IpcStatus::Invoiced,
            actor,
            Some(format!("發票 {}", invoice_ref.trim())),
        )
    }

    /// 重開（Rejected → Draft，修訂迴圈；同一實體，非新建）
    ///
    /// 財務欄位與核定金額清空，待修訂後重新推導。
    pub fn reopen(&mut self, claim: &mut InterimPaymentClaim, actor: &str) -> Result<()> {
        self.guard("reopen", claim.status, IpcStatus::Draft)?;

        claim.financials = None;
        claim.certified_amount = None;
        self.transition(claim, "reopen", IpcStatus::Draft, actor, None)
    }

    /// 獲取網關引用
    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// 獲取網關可變引用
    pub fn gateway_mut(&mut self) -> &mut G {
        &mut self.gateway
    }

    /// 轉換守衛（守衛失敗時不落庫、不追加歷史、不改狀態）
    fn guard(&self, action: &str, from: IpcStatus, to: IpcStatus) -> Result<()> {
        if !from.can_transition(to) {
            return Err(IpcError::InvalidTransition {
                action: action.to_string(),
                from,
                to,
            });
        }
        Ok(())
    }

    /// 執行轉換：落庫 → 歷史 → 更新實體 → 通知
    fn transition(
        &mut self,
        claim: &mut InterimPaymentClaim,
        action: &str,
        to: IpcStatus,
        actor: &str,
        comment: Option<String>,
    ) -> Result<()> {
        let from = claim.status;

        self.gateway
            .update_status(claim.id, to, claim.financials.as_ref())?;
        self.gateway.append_history(WorkflowEntry::new(
            claim.id,
            actor,
            from,
            to,
            comment,
        ))?;

        claim.status = to;
        tracing::info!(
            "IPC {} [{}]：{:?} → {:?}，操作人 {}",
            claim.number,
            action,
            from,
            to,
            actor
        );

        self.sink.notify(WorkflowEvent {
            ipc_id: claim.id,
            contract_id: claim.contract_id,
            ipc_number: claim.number.clone(),
            from_status: from,
            to_status: to,
            actor: actor.to_string(),
        });

        Ok(())
    }
}
