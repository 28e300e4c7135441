// ==========================================
// ConfigManager 集成测试
// ==========================================
// 测试目标: 验证 config_kv 读取、缺省值、快照恢复
// ==========================================


use cotton_blend::config::{config_keys, ConfigManager, EngineConfig, EngineConfigReader};
use test_helpers::create_test_db;

#[test]
fn test_config_manager_creation() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");

    let config_manager = ConfigManager::new(&db_path);
    assert!(
        config_manager.is_ok(),
        "ConfigManager should be created successfully"
    );
}

#[test]
fn test_defaults_when_config_missing() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let config_manager = ConfigManager::new(&db_path).expect("Failed to create ConfigManager");

    let config = config_manager
        .load_engine_config()
        .expect("Should load engine config");
    assert_eq!(config, EngineConfig::default());
}

#[test]
fn test_overrides_are_read() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let config_manager = ConfigManager::new(&db_path).expect("Failed to create ConfigManager");

    config_manager
        .set_config_value(config_keys::DEFAULT_BALE_WEIGHT, "180")
        .unwrap();
    config_manager
        .set_config_value(config_keys::PERCENTAGE_TOLERANCE, "0.05")
        .unwrap();
    config_manager
        .set_config_value(config_keys::IMPORT_GROUP_KEYWORD, "foreign")
        .unwrap();
    config_manager
        .set_config_value(config_keys::LOCALE, "en")
        .unwrap();

    // 重新打开,确认已落库
    let reopened = ConfigManager::new(&db_path).expect("Failed to reopen ConfigManager");
    let config = reopened.load_engine_config().unwrap();

    assert_eq!(config.default_bale_weight, 180.0);
    assert_eq!(config.percentage_tolerance, 0.05);
    assert_eq!(config.import_group_keyword, "foreign");
    assert_eq!(config.locale, "en");
    assert_eq!(config.rounding_decimals, 2);
}

#[test]
fn test_malformed_values_fall_back_to_defaults() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let config_manager = ConfigManager::new(&db_path).expect("Failed to create ConfigManager");

    config_manager
        .set_config_value(config_keys::ROUNDING_DECIMALS, "two")
        .unwrap();
    config_manager
        .set_config_value(config_keys::FALLBACK_GROUP_NAME, "   ")
        .unwrap();

    assert_eq!(config_manager.get_rounding_decimals().unwrap(), 2);
    assert_eq!(config_manager.get_fallback_group_name().unwrap(), "Ungrouped");
}

#[test]
fn test_out_of_range_value_rejected() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let config_manager = ConfigManager::new(&db_path).expect("Failed to create ConfigManager");

    config_manager
        .set_config_value(config_keys::DEFAULT_BALE_WEIGHT, "-10")
        .unwrap();

    assert!(config_manager.load_engine_config().is_err());
}

#[test]
fn test_update_rejects_invalid_value_without_writing() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let config_manager = ConfigManager::new(&db_path).expect("Failed to create ConfigManager");

    assert!(config_manager
        .update_config_value(config_keys::DEFAULT_BALE_WEIGHT, "-5")
        .is_err());
    assert!(config_manager
        .update_config_value(config_keys::PERCENTAGE_TOLERANCE, "abc")
        .is_err());

    // 库中仍为缺省配置
    let config = config_manager.load_engine_config().unwrap();
    assert_eq!(config, EngineConfig::default());

    let updated = config_manager
        .update_config_value(config_keys::DEFAULT_BALE_WEIGHT, "180")
        .unwrap();
    assert_eq!(updated.default_bale_weight, 180.0);
    assert_eq!(config_manager.get_default_bale_weight().unwrap(), 180.0);
}

#[test]
fn test_update_repairs_previously_invalid_row() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let config_manager = ConfigManager::new(&db_path).expect("Failed to create ConfigManager");
    config_manager
        .set_config_value(config_keys::DEFAULT_BALE_WEIGHT, "-10")
        .unwrap();

    config_manager
        .update_config_value(config_keys::DEFAULT_BALE_WEIGHT, "165")
        .unwrap();
    assert!(config_manager.load_engine_config().is_ok());
}

#[test]
fn test_snapshot_and_restore() {
    let (_source_file, source_path) = create_test_db().expect("Failed to create test db");
    let source = ConfigManager::new(&source_path).unwrap();
    source
        .set_config_value(config_keys::DEFAULT_BALE_WEIGHT, "175")
        .unwrap();
    source
        .set_config_value(config_keys::GRAND_TOTAL_LABEL, "Total")
        .unwrap();

    let snapshot = source.get_config_snapshot().unwrap();

    let (_target_file, target_path) = create_test_db().expect("Failed to create test db");
    let target = ConfigManager::new(&target_path).unwrap();
    let restored = target.restore_config_from_snapshot(&snapshot).unwrap();

    assert_eq!(restored, 2);
    assert_eq!(target.get_default_bale_weight().unwrap(), 175.0);
    assert_eq!(
        target.get_grand_total_label().unwrap().as_deref(),
        Some("Total")
    );
}
