use sea_orm_migration::prelude::*;
use std::env;

use coopbook_migration::Migrator;

#[tokio::main]
async fn main() -> Result<(), DbErr> {
    dotenvy::dotenv().ok();

    let args: Vec<String> = env::args().collect();
    let command = args.get(1).map(|s| s.as_str()).unwrap_or("cli");

    match command {
        "up" => {
            println!("Running migrations up...");
            let db = connect().await?;
            Migrator::up(&db, None).await?;
            println!("Completed migrations up.");
        }
        "down" => {
            println!("Running migrations down...");
            let db = connect().await?;
            Migrator::down(&db, None).await?;
            println!("Completed migrations down.");
        }
        "fresh" => {
            println!("Refreshing database (down then up)...");
            let db = connect().await?;
            Migrator::down(&db, None).await?;
            Migrator::up(&db, None).await?;
            println!("Database refresh completed.");
        }
        "status" => {
            let db = connect().await?;
            Migrator::status(&db).await?;
        }
        _ => {
            cli::run_cli(Migrator).await;
        }
    }
    Ok(())
}

async fn connect() -> Result<sea_orm_migration::sea_orm::DatabaseConnection, DbErr> {
    let database_url = env::var("DATABASE_URL")
        .map_err(|_| DbErr::Custom("DATABASE_URL environment variable must be set".to_string()))?;
    sea_orm_migration::sea_orm::Database::connect(&database_url).await
}
