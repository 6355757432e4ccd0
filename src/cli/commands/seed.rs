use anyhow::Context;

use crate::cli::OutputFormat;
use crate::config::AppConfig;
use crate::database::DatabaseManager;
use crate::seed::seed_sample;

pub async fn handle(config: AppConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    let db = DatabaseManager::connect(&config.database).await;
    if !db.is_connected() {
        anyhow::bail!("database not available; check DATABASE_URL and DATABASE_NAME");
    }

    let report = seed_sample(&db).await.context("seeding sample content")?;

    match output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => {
            println!("Chapter:  {} ({})", report.chapter_id, report.chapter_title.as_deref().unwrap_or("-"));
            println!("Existing: {}", report.existing_questions);
            println!("Inserted: {}", report.inserted);
            println!("Total:    {}", report.total_now);
        }
    }
    Ok(())
}
