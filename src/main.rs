// ==========================================
// 仓库扫描对账系统 - 控制台演示入口
// ==========================================
// 用途: 播种内存后端 + 标准输入模拟扫描枪,演示完整对账流程
// 说明: 扫描枪经通道喂入,消费端单执行者顺序处理
// ==========================================

use std::sync::Arc;
use wms_scan_recon::api::{ApiError, ScanSessionApi};
use wms_scan_recon::backend::traits::{DocumentRecord, LineRecord};
use wms_scan_recon::backend::InMemoryBackend;
use wms_scan_recon::config::ConfigManager;
use wms_scan_recon::domain::container::ContainerType;
use wms_scan_recon::domain::types::WorkflowKind;
use wms_scan_recon::engine::matcher::PackContent;
use wms_scan_recon::engine::runner::{scan_channel, ScanMessage};
use wms_scan_recon::logging;

const DEMO_FOLIO: &str = "REC-000042";

/// 播种演示数据: 一张收货单 + 内包装索引 + 容器类型
fn seed_backend() -> Arc<InMemoryBackend> {
    let backend = InMemoryBackend::new();
    backend.insert_document(DocumentRecord {
        folio: DEMO_FOLIO.to_string(),
        workflow: WorkflowKind::Receiving,
        origin: Some("供应商A".to_string()),
        destination: Some("一号仓".to_string()),
        operator: Some("demo".to_string()),
        lines: vec![
            LineRecord {
                code: "A-100".to_string(),
                alternate_code: Some("7501001".to_string()),
                required: 3,
                unit: Some("PZ".to_string()),
                description: Some("白色T恤 M码".to_string()),
            },
            LineRecord {
                code: "B-200".to_string(),
                alternate_code: None,
                required: 12,
                unit: Some("PZ".to_string()),
                description: Some("牛仔裤 32".to_string()),
            },
        ],
    });
    backend.insert_pack(
        "PKB200X6",
        PackContent {
            article_code: "B200".to_string(),
            multiplier: 6,
        },
    );
    backend.add_container_type(ContainerType::new("BOX", "纸箱"));
    backend.add_container_type(ContainerType::new("PALLET", "托盘"));
    Arc::new(backend)
}

fn print_summary(api: &ScanSessionApi) {
    let summary = api.summary();
    println!(
        "---- {} [{}] {}/{} ----",
        summary.folio,
        summary.workflow,
        summary.measured_total,
        summary.effective_required_total
    );
    for line in &summary.lines {
        println!(
            "  {} {} 应收{} 已扫{} 已放{} {}",
            if line.complete { "✔" } else { " " },
            line.code,
            line.required,
            line.scanned,
            line.packed,
            line.description.as_deref().unwrap_or("")
        );
    }
    println!(
        "  容器: {}  异常: {}  耗时: {}s",
        summary.container_count, summary.incident_count, summary.elapsed_seconds
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();

    tracing::info!("==================================================");
    tracing::info!("{}", wms_scan_recon::APP_NAME);
    tracing::info!("系统版本: {}", wms_scan_recon::VERSION);
    tracing::info!("==================================================");

    let backend = seed_backend();
    let manager = ConfigManager::load_default();
    let mut api = ScanSessionApi::open(backend, DEMO_FOLIO, &manager).await?;

    println!("演示单据 {} 已装载。", DEMO_FOLIO);
    println!("直接输入条码模拟扫描(如 BOX / A-100 / PKB200X6)。");
    println!("命令: :sum 汇总  :fin 定稿  :quit 退出");

    // 扫描枪 = 通道上的生产者: 独立任务读取标准输入
    let (tx, mut rx) = scan_channel(64);
    tokio::spawn(async move {
        use tokio::io::{AsyncBufReadExt, BufReader};
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if tx
                .send(ScanMessage::new(line, chrono::Utc::now()))
                .await
                .is_err()
            {
                break;
            }
        }
    });

    // 单执行者消费端: 顺序处理每条输入
    while let Some(message) = rx.recv().await {
        let input = message.raw.trim();
        match input {
            "" => continue,
            ":quit" => break,
            ":sum" => print_summary(&api),
            ":fin" => match api.finalize().await {
                Ok(outcome) => {
                    println!(
                        "定稿成功: 回执 {} / 耗时 {}s / {}",
                        outcome.receipt.submission_id,
                        outcome.elapsed_seconds,
                        outcome.performance_caption
                    );
                    break;
                }
                Err(ApiError::IncompleteDocument { deficit }) => {
                    println!("{} (缺口 {} 件)", wms_scan_recon::i18n::t("submit.incomplete"), deficit);
                }
                Err(err) => println!("{}: {}", wms_scan_recon::i18n::t("submit.failed"), err),
            },
            raw => {
                let response = api.scan(raw);
                println!("[{:?}] {}", response.status, response.message);
            }
        }
    }

    Ok(())
}
