use crate::book::SalesBook;
use crate::errors::AppError;
use std::{env, path::Path, path::PathBuf};
use tokio::fs;
use tracing::error;

pub fn resolve_data_path() -> Result<PathBuf, std::io::Error> {
    if let Ok(path) = env::var("APP_DATA_PATH") {
        return Ok(PathBuf::from(path));
    }

    Ok(PathBuf::from("data/iptv_sales.json"))
}

pub async fn load_data(path: &Path) -> SalesBook {
    match fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice(&bytes) {
            Ok(book) => book,
            Err(err) => {
                error!("failed to parse sales file: {err}");
                SalesBook::default()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => SalesBook::default(),
        Err(err) => {
            error!("failed to read sales file: {err}");
            SalesBook::default()
        }
    }
}

pub async fn persist_data(path: &Path, book: &SalesBook) -> Result<(), AppError> {
    let payload = serde_json::to_vec_pretty(book).map_err(AppError::internal)?;
    fs::write(path, payload).await.map_err(AppError::internal)?;
    Ok(())
}
