// ==========================================
// 配棉计算引擎 - 命令行入口
// ==========================================
// 读取 JSON 快照 (品种目录 + 车间计划),输出 JSON 结果
// 日志写入 stderr,结果写入 stdout
// ==========================================

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use cotton_blend::api::BlendApi;
use cotton_blend::config::{get_default_db_path, ConfigManager, EngineConfigReader};
use cotton_blend::domain::BlendSnapshot;
use cotton_blend::{i18n, logging};
use serde::Serialize;

#[derive(Parser)]
#[command(name = "cotton-blend")]
#[command(version, about = "Cotton blend allocation and summary reports")]
struct Args {
    /// Path to the JSON snapshot ({"varieties": [...], "plans": [...]})
    #[arg(short, long, global = true, default_value = "snapshot.json")]
    snapshot: String,

    /// Path to the SQLite config database (defaults to COTTON_BLEND_DB_PATH or the user data dir)
    #[arg(long, global = true)]
    db: Option<String>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_log: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build the variety-wise and group-wise summary report
    Report,
    /// Show the detail view of a single unit
    Unit { plan_id: String },
    /// Validate every plan's blend percentages
    Validate,
    /// Produce the rounded save payload for a plan
    Finalize { plan_id: String },
    /// Show the effective engine configuration
    ShowConfig,
    /// Set one engine configuration value
    SetConfig { key: String, value: String },
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn load_snapshot(path: &str) -> Result<BlendSnapshot> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read snapshot file '{}'", path))?;
    let snapshot: BlendSnapshot = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse snapshot file '{}'", path))?;

    tracing::info!(
        path = %path,
        varieties = snapshot.varieties.len(),
        plans = snapshot.plans.len(),
        "快照加载完成"
    );
    Ok(snapshot)
}

fn run(args: Args) -> Result<bool> {
    let Args {
        snapshot, db, command, ..
    } = args;

    let db_path = db.unwrap_or_else(get_default_db_path);
    tracing::info!("使用配置库: {}", db_path);
    let config_manager = ConfigManager::new(&db_path)
        .with_context(|| format!("failed to open config database '{}'", db_path))?;

    let prepare = || -> Result<(BlendApi, BlendSnapshot)> {
        let api = BlendApi::from_config_reader(&config_manager)?;
        i18n::set_locale(&api.config().locale);
        Ok((api, load_snapshot(&snapshot)?))
    };

    match command {
        Command::Report => {
            let (api, snapshot) = prepare()?;
            print_json(&api.build_report(&snapshot))?;
        }
        Command::Unit { plan_id } => {
            let (api, snapshot) = prepare()?;
            print_json(&api.unit_detail(&snapshot, &plan_id)?)?;
        }
        Command::Finalize { plan_id } => {
            let (api, snapshot) = prepare()?;
            print_json(&api.finalize_plan(&snapshot, &plan_id)?)?;
        }
        Command::Validate => {
            let (api, snapshot) = prepare()?;
            let issues = api.validate_roster(&snapshot.plans);
            print_json(&issues)?;
            return Ok(issues.is_empty());
        }
        Command::ShowConfig => {
            print_json(&config_manager.load_engine_config()?)?;
        }
        Command::SetConfig { key, value } => {
            let config = config_manager
                .update_config_value(&key, &value)
                .with_context(|| format!("failed to set '{}'", key))?;
            print_json(&config)?;
        }
    }

    Ok(true)
}

fn main() {
    let args = Args::parse();
    logging::init_with_format(args.json_log);

    tracing::info!("{} v{}", cotton_blend::APP_NAME, cotton_blend::VERSION);

    match run(args) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            tracing::error!("执行失败: {:#}", e);
            eprintln!("❌ {:#}", e);
            std::process::exit(1);
        }
    }
}
