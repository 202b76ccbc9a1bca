//! # 期中計價（IPC）完整範例
//!
//! 這個範例展示完整的期中計價流程：
//! - 合約：土方與混凝土兩個 BOQ 葉節點
//! - 條款：保留金 5%、預付款線性扣回、VAT 10%
//! - 流程：填報明細 → 送審 → 提交 → 核定 → 開票

use chrono::NaiveDate;
use ipc_calc::{BoqTree, ContractAggregates, IpcCalculator, PriorPeriod, VariationLedger, WorkDetailLedger};
use ipc_core::*;
use ipc_workflow::{MemoryGateway, NullSink, WorkflowEngine};
use rust_decimal::Decimal;

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    println!("🏗  ===== 期中計價（IPC）範例 =====");
    println!();

    // ========== 1. 匯入 BOQ（越南文表頭亦可識別） ==========
    println!("📋 步驟 1: 建立 BOQ 樹");
    assert_eq!(BoqColumn::from_header("Khối lượng"), Some(BoqColumn::Quantity));

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
            contract_qty: Decimal::from(10_000),
            unit_rate: Decimal::from(100),
        },
        BoqImportRow {
            code: "1.2".to_string(),
            parent_code: Some("1".to_string()),
            description: "Bê tông móng".to_string(),
            unit: "m3".to_string(),
            contract_qty: Decimal::from(5_000),
            unit_rate: Decimal::from(200),
        },
    ];
    let tree = BoqTree::build_from_rows(rows)?;
    println!("   ✓ 節點數: {}，合約總價: {}", tree.len(), tree.total_contract_value());
    println!();

    // ========== 2. 付款條款 ==========
    println!("⚙️  步驟 2: 付款條款");
    let contract = PaymentContract::new(uuid::Uuid::new_v4())
        .with_retention_percent(Decimal::from(5))
        .with_retention_limit(Decimal::from(60_000))
        .with_advance(
            Decimal::from(100_000),
            AdvanceRule::Progressive {
                start_percent: Decimal::from(10),
                end_percent: Decimal::from(50),
            },
        )
        .with_vat_percent(Decimal::from(10));
    let contract_id = contract.contract_id;
    println!("   ✓ 保留金 5%（上限 60,000），預付款 100,000，VAT 10%");
    println!();

    let leaf_id = tree.leaves()[0].id;
    let calculator = IpcCalculator::new(tree, contract)?;
    let mut engine = WorkflowEngine::new(MemoryGateway::new(), NullSink);

    // ========== 3. 第一期 IPC：填報與送審 ==========
    println!("📝 步驟 3: 第一期 IPC");
    let mut claim = InterimPaymentClaim::new(
        contract_id,
        "IPC-01",
        NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
        NaiveDate::from_ymd_opt(2026, 1, 31).unwrap(),
        None,
        "pm.nguyen",
    )?;

    let mut ledger = WorkDetailLedger::new(claim.id, PriorPeriod::none(), false);
    ledger.set_current_quantity(calculator.tree(), leaf_id, Decimal::from(4_000))?;

    let result = engine.submit_for_review(
        &mut claim,
        &calculator,
        &ledger,
        &VariationLedger::new(),
        &ContractAggregates::default(),
        0,
        "pm.nguyen",
    )?;

    println!("   本期完成款:   {}", result.summary.works_executed);
    println!("   保留金:       {}", result.summary.retention);
    println!("   預付款扣回:   {}", result.summary.advance_repayment);
    println!("   應付淨額:     {}", result.summary.net_payment);
    println!("   含稅應付:     {}", result.summary.total_with_vat);
    for warning in &result.warnings {
        println!("   ⚠ {}", warning.message);
    }
    println!();

    // ========== 4. 審批鏈 ==========
    println!("✅ 步驟 4: 提交 → 核定 → 開票");
    engine.submit(&mut claim, "reviewer.tran")?;
    engine.certify(&mut claim, result.summary.net_payment, "engineer.le")?;
    engine.invoice(&mut claim, "INV-2026-001", "accounting.pham")?;
    println!("   最終狀態: {:?}", claim.status);
    println!();

    println!("🧾 審批歷史:");
    for entry in engine.gateway().history_for(claim.id) {
        println!(
            "   {:?} → {:?}  ({}){}",
            entry.from_status,
            entry.to_status,
            entry.actor,
            entry
                .comment
                .as_deref()
                .map(|c| format!("  [{c}]"))
                .unwrap_or_default()
        );
    }

    Ok(())
}
