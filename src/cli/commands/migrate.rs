use crate::cli::{utils, OutputFormat};
use crate::config;
use crate::database::DatabaseManager;

pub async fn handle(output_format: OutputFormat) -> anyhow::Result<()> {
    let store = utils::connect_store(config::config()).await?;
    let pool = store.pool().clone();

    DatabaseManager::close(pool).await;
    utils::output_success(&output_format, "Migrations applied", None)
}
