// ==========================================
// BlendApi 集成测试
// ==========================================
// 测试目标: 配置装配、保存载荷、报表与错误转换
// ==========================================


use cotton_blend::api::{ApiError, BlendApi};
use cotton_blend::config::{config_keys, ConfigManager, EngineConfig};
use test_helpers::{create_test_db, plan, standard_snapshot};

fn en_api() -> BlendApi {
    BlendApi::new(EngineConfig {
        locale: "en".to_string(),
        ..EngineConfig::default()
    })
    .expect("default config should be valid")
}

fn has_at_most_two_decimals(value: f64) -> bool {
    ((value * 100.0).round() - value * 100.0).abs() < 1e-6
}

#[test]
fn test_finalize_plan_payload() {
    let api = en_api();
    let snapshot = standard_snapshot();

    let payload = api.finalize_plan(&snapshot, "P1").unwrap();

    assert_eq!(payload.plan_id, "P1");
    assert_eq!(payload.unit_name, "Unit-1");
    assert_eq!(payload.blend.len(), 2);
    for entry in &payload.blend {
        assert!(has_at_most_two_decimals(entry.calculated_bales));
    }
    let json = serde_json::to_value(&payload).unwrap();
    assert!(json["blend"][0].get("variety_name").is_some());
    assert!(json["blend"][0].get("percentage").is_some());
    assert!(json["blend"][0].get("calculated_bales").is_some());
}

#[test]
fn test_finalize_rejects_sum_97() {
    // 场景B: 提示包含车间名称与 "97"
    let api = en_api();
    let mut snapshot = standard_snapshot();
    snapshot.plans.push(plan(
        "P9",
        "Ring Frame 9",
        4.0,
        250.0,
        &[("MCU-5", 57.0), ("Giza-86", 40.0)],
    ));

    let err = api.finalize_plan(&snapshot, "P9").unwrap_err();
    match err {
        ApiError::BlendRejected {
            unit_name, message, ..
        } => {
            assert_eq!(unit_name, "Ring Frame 9");
            assert!(message.contains("Ring Frame 9"));
            assert!(message.contains("97"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn test_unknown_plan_is_not_found() {
    let api = en_api();
    let err = api.unit_detail(&standard_snapshot(), "missing").unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
}

#[test]
fn test_validate_roster_reports_each_offender() {
    let api = en_api();
    let mut snapshot = standard_snapshot();
    snapshot
        .plans
        .push(plan("P8", "Unit-8", 1.0, 100.0, &[("MCU-5", 50.0)]));

    let issues = api.validate_roster(&snapshot.plans);
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].plan_id, "P8");
    assert!(issues[0].message.contains("Unit-8"));
    assert!(issues[0].message.contains("50.00"));
}

#[test]
fn test_build_report_response() {
    let api = en_api();
    let response = api.build_report(&standard_snapshot());

    assert_eq!(response.report.plan_count, 3);
    assert_eq!(response.config.locale, "en");
    let last = response.report.variety_rows.last().unwrap();
    assert_eq!(last.variety_name, "Grand Total");
    assert_eq!(last.percentage, 100.0);
}

#[test]
fn test_grand_total_label_localized_by_default() {
    let api = BlendApi::new(EngineConfig::default()).unwrap();
    let report = api.build_report(&standard_snapshot()).report;

    assert_eq!(report.variety_rows.last().unwrap().variety_name, "总计");
    assert_eq!(report.group_rows.last().unwrap().group_name, "总计");
}

#[test]
fn test_unit_detail_and_fallback_weight() {
    let api = en_api();
    let detail = api.unit_detail(&standard_snapshot(), "P2").unwrap();

    assert_eq!(detail.unit_name, "Unit-2");
    assert_eq!(detail.fallback_varieties, vec!["Pima".to_string()]);
    let pct_sum: f64 = detail.rows.iter().map(|r| r.weight_percentage).sum();
    assert!((pct_sum - 100.0).abs() < 1e-9);
}

#[test]
fn test_api_from_config_database() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let config_manager = ConfigManager::new(&db_path).unwrap();
    config_manager
        .set_config_value(config_keys::GRAND_TOTAL_LABEL, "Total")
        .unwrap();
    config_manager
        .set_config_value(config_keys::DEFAULT_BALE_WEIGHT, "200")
        .unwrap();

    let api = BlendApi::from_config_reader(&config_manager).unwrap();
    let allocation = api.allocate_plan(&standard_snapshot(), "P2").unwrap();
    let pima = allocation
        .entries
        .iter()
        .find(|e| e.variety_name == "Pima")
        .unwrap();
    assert_eq!(pima.avg_bale_weight, 200.0);

    let report = api.build_report(&standard_snapshot()).report;
    assert_eq!(report.group_rows.last().unwrap().group_name, "Total");
}

#[test]
fn test_invalid_config_rejected() {
    let result = BlendApi::new(EngineConfig {
        percentage_tolerance: -1.0,
        ..EngineConfig::default()
    });
    assert!(matches!(result, Err(ApiError::ConfigError(_))));
}
