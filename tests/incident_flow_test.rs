// ==========================================
// 异常申报流程集成测试
// ==========================================
// 测试范围:
// 1. 短装核销后单行立即完成
// 2. 退回核销的有效应收剔除
// 3. 串货仅核销应收行,到货品种留审计
// 4. 多货开票确认 + 口令闸口
// 5. 校验失败不留任何台账变更
// ==========================================


use chrono::{TimeZone, Utc};
use test_helpers::{build_document, build_session, TEST_SUPERVISOR_CODE};
use wms_scan_recon::config::ReconciliationConfig;
use wms_scan_recon::domain::line::Line;
use wms_scan_recon::domain::types::{IncidentType, WorkflowKind};
use wms_scan_recon::engine::incident::IncidentInput;
use wms_scan_recon::engine::session::ScanOutcome;

fn at(secs: i64) -> chrono::DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
}

#[test]
fn test_missing_incident_completes_line_immediately() {
    let document = build_document(
        "REC-010",
        WorkflowKind::Receiving,
        vec![Line::new("A100", 5), Line::new("B200", 2)],
    );
    let mut session = build_session(document, ReconciliationConfig::strict());

    session.begin_incident(IncidentType::Missing).unwrap();
    session
        .submit_incident(
            IncidentInput {
                code: "A100".to_string(),
                quantity: 2,
                notes: Some("供应商少发".to_string()),
                ..Default::default()
            },
            at(0),
        )
        .unwrap();

    let line = &session.document().lines[0];
    assert_eq!((line.required, line.scanned, line.packed), (2, 2, 2));
    assert!(session.line_complete(0));
    assert!(!session.completion().is_complete()); // B200 还没扫

    // 扫完 B200 整单完成
    session.process_scan("B200", at(1));
    session.process_scan("B200", at(2));
    assert!(session.completion().is_complete());
}

#[test]
fn test_missing_zero_quantity_entire_line_absent() {
    let document = build_document("REC-011", WorkflowKind::Receiving, vec![Line::new("A100", 5)]);
    let mut session = build_session(document, ReconciliationConfig::strict());

    session.begin_incident(IncidentType::Missing).unwrap();
    session
        .submit_incident(
            IncidentInput {
                code: "A100".to_string(),
                quantity: 0, // 整行未到
                ..Default::default()
            },
            at(0),
        )
        .unwrap();

    assert!(session.completion().is_complete());
    let line = &session.document().lines[0];
    assert_eq!(line.required, 0);
    assert!(line.note.as_deref().unwrap().contains("required=5"));
}

#[test]
fn test_return_incident_requires_rescan_of_remainder() {
    let document = build_document("REC-012", WorkflowKind::Receiving, vec![Line::new("A100", 5)]);
    let mut session = build_session(document, ReconciliationConfig::strict());

    for i in 0..5 {
        session.process_scan("A100", at(i));
    }
    assert!(session.completion().is_complete());

    // 退回 2 件: 扫描清零,有效应收 3
    session.begin_incident(IncidentType::Return).unwrap();
    session
        .submit_incident(
            IncidentInput {
                code: "A100".to_string(),
                quantity: 2,
                ..Default::default()
            },
            at(10),
        )
        .unwrap();

    assert_eq!(session.document().lines[0].scanned, 0);
    assert!(!session.completion().is_complete());

    // 重扫 3 件后整单完成
    for i in 0..3 {
        match session.process_scan("A100", at(20 + i)) {
            ScanOutcome::Accepted { .. } => {}
            other => panic!("expected Accepted, got {:?}", other),
        }
    }
    assert!(session.completion().is_complete());

    // 台账上限仍是原应收 5: 第 4 件被接受,
    // 但合计校验捕捉到 4 ≠ 有效应收 3,整单回到未完成
    assert!(matches!(
        session.process_scan("A100", at(30)),
        ScanOutcome::Accepted { .. }
    ));
    let completion = session.completion();
    assert!(completion.all_lines_complete);
    assert!(!completion.sums_match);
    assert!(!completion.is_complete());
}

#[test]
fn test_changed_incident_audits_arrival_without_new_line() {
    let document = build_document(
        "REC-013",
        WorkflowKind::Receiving,
        vec![Line::new("A100", 4)],
    );
    let mut session = build_session(document, ReconciliationConfig::strict());

    session.begin_incident(IncidentType::Changed).unwrap();
    let incident = session
        .submit_incident(
            IncidentInput {
                code: "X777".to_string(), // 实际到货
                quantity: 4,
                expected_code: Some("A-100".to_string()), // 录入码经归一化
                ..Default::default()
            },
            at(0),
        )
        .unwrap();

    // 到货品种不建行,数量不参与对账
    assert_eq!(session.document().line_count(), 1);
    assert_eq!(incident.target_code(), "A100");

    let line = &session.document().lines[0];
    assert_eq!(line.scanned, 4); // 应收行按原数量视为满足
    assert!(line.note.as_deref().unwrap().contains("arrived=X777"));
    assert!(session.completion().is_complete());
}

#[test]
fn test_extra_incident_gate_and_audit_only() {
    let document = build_document("REC-014", WorkflowKind::Receiving, vec![Line::new("A100", 1)]);
    let mut session = build_session(document, ReconciliationConfig::strict());

    // 已开票路径: 必须过口令闸口
    session.begin_incident(IncidentType::Extra).unwrap();
    session.confirm_incident_billing(true).unwrap();
    assert!(session.authorize_incident("wrong").is_err());
    session.authorize_incident(TEST_SUPERVISOR_CODE).unwrap();

    let incident = session
        .submit_incident(
            IncidentInput {
                code: "Z900".to_string(),
                quantity: 3,
                notes: Some("多到一箱".to_string()),
                ..Default::default()
            },
            at(0),
        )
        .unwrap();

    assert_eq!(incident.invoiced, Some(true));
    // 纯审计: 台账零变更,完成判定不受影响
    assert_eq!(session.document().lines[0].scanned, 0);
    assert!(!session.completion().is_complete());
    assert_eq!(session.incidents().len(), 1);
}

#[test]
fn test_abandoned_flow_leaves_no_trace() {
    let document = build_document("REC-015", WorkflowKind::Receiving, vec![Line::new("A100", 2)]);
    let mut session = build_session(document, ReconciliationConfig::strict());

    session.begin_incident(IncidentType::Missing).unwrap();
    session.cancel_incident();

    assert!(session.incidents().is_empty());
    let line = &session.document().lines[0];
    assert_eq!((line.required, line.scanned, line.packed), (2, 0, 0));

    // 放弃后可重新发起
    session.begin_incident(IncidentType::Return).unwrap();
    session.cancel_incident();
}

#[test]
fn test_validation_failures_are_local() {
    let document = build_document("REC-016", WorkflowKind::Receiving, vec![Line::new("A100", 2)]);
    let mut session = build_session(document, ReconciliationConfig::strict());

    // 串货缺应收码
    session.begin_incident(IncidentType::Changed).unwrap();
    assert!(session
        .submit_incident(
            IncidentInput {
                code: "X1".to_string(),
                quantity: 1,
                ..Default::default()
            },
            at(0),
        )
        .is_err());
    assert!(session.incidents().is_empty());

    // 同一流程内补全后提交成功
    let incident = session
        .submit_incident(
            IncidentInput {
                code: "X1".to_string(),
                quantity: 1,
                expected_code: Some("A100".to_string()),
                ..Default::default()
            },
            at(1),
        )
        .unwrap();
    assert_eq!(incident.incident_type, IncidentType::Changed);
}
