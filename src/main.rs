//! Однократный прогон: обучение на CSV и прогноз для одного клиента

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use car_purchase_ml::{data::Table, pipeline, PipelineConfig};

fn main() -> anyhow::Result<()> {
    // Инициализация логирования
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // Единственный необязательный аргумент: путь к JSON-конфигу
    let config = match std::env::args().nth(1) {
        Some(path) => PipelineConfig::from_json_path(&path)
            .with_context(|| format!("Failed to load config {}", path))?,
        None => PipelineConfig::default(),
    };
    config.validate()?;

    let table = Table::from_csv_path(&config.data_path, config.encoding)
        .with_context(|| format!("Failed to load data {}", config.data_path.display()))?;

    let trained = pipeline::train(&table, &config)?;

    // История пишется до проверки на расхождение, чтобы её можно было посмотреть
    if let Some(path) = &config.history_output {
        let json = serde_json::to_string_pretty(&trained.history)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write history {}", path.display()))?;
        tracing::info!("Training history written to {}", path.display());
    }

    let report = trained.report(&config.sample)?;
    println!("Expected Purchase amount {:.2}", report.prediction.amount);

    Ok(())
}
