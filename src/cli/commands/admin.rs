use std::sync::Arc;

use clap::Args;
use serde_json::json;

use crate::cli::{utils, OutputFormat};
use crate::config;
use crate::database::DatabaseManager;
use crate::services::AccountService;

#[derive(Args, Debug)]
pub struct CreateAdminArgs {
    #[arg(long, help = "Display name")]
    pub name: String,

    #[arg(long, help = "Login email")]
    pub email: String,

    #[arg(long, help = "Contact phone")]
    pub phone: String,

    #[arg(long, help = "Initial password (at least 6 characters)")]
    pub password: String,
}

pub async fn handle(args: CreateAdminArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let config = config::config();
    let store = utils::connect_store(config).await?;
    let pool = store.pool().clone();

    let accounts = AccountService::new(Arc::new(store), Arc::new(config.clone()));
    let result = accounts
        .create_admin(&args.name, &args.email, &args.phone, &args.password)
        .await;
    DatabaseManager::close(pool).await;

    match result {
        Ok(admin) => utils::output_success(
            &output_format,
            &format!("Admin '{}' created", admin.email),
            Some(json!({ "id": admin.id, "email": admin.email })),
        ),
        Err(e) => {
            utils::output_error(&output_format, &e.to_string(), Some("CREATE_ADMIN_FAILED"))?;
            Err(e.into())
        }
    }
}
