mod bootstrap;

use anyhow::Result;
use serde::Serialize;
use usage_core::query::{ExportRequest, FilterQuery};
use usage_core::settings::{Command, Settings};
use usage_runtime::service::AnalyticsService;

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::load();

    bootstrap::setup_logging(&settings.log_level)?;

    tracing::info!("Usage dashboard v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::debug!("Data path: {}", settings.data_path.display());

    if settings.command == Command::Health {
        return print_json(&AnalyticsService::default().health());
    }

    // CSV parsing is blocking file I/O; keep it off the async workers.
    let data_path = settings.data_path.clone();
    let service = tokio::task::spawn_blocking(move || AnalyticsService::load(&data_path)).await??;

    tracing::info!("Loaded {} events", service.store().len());

    match settings.command {
        Command::Summary => print_json(&service.dashboard_summary()),

        Command::Search(args) => {
            let params = FilterQuery::from(args).into_params()?;
            print_json(&service.search_events(&params))
        }

        Command::Export(args) => {
            let request = ExportRequest {
                format: args.format,
                filters: args.filters.into(),
            };
            let file = service.export_data(&request)?;
            let path = bootstrap::write_export(&args.output_dir, &file.filename, &file.bytes)?;

            tracing::info!("Wrote {} bytes to {}", file.bytes.len(), path.display());

            print_json(&serde_json::json!({
                "filename": file.filename,
                "path": path,
                "content_type": file.content_type,
                "bytes": file.bytes.len(),
            }))
        }

        Command::Health => print_json(&service.health()),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
