use crate::book::SalesBook;
use crate::clock::Clock;
use chrono::NaiveDateTime;
use std::{path::PathBuf, sync::Arc};
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct AppState {
    pub data_path: PathBuf,
    pub book: Arc<Mutex<SalesBook>>,
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    pub fn new(data_path: PathBuf, book: SalesBook, clock: Arc<dyn Clock>) -> Self {
        Self {
            data_path,
            book: Arc::new(Mutex::new(book)),
            clock,
        }
    }

    pub fn now(&self) -> NaiveDateTime {
        self.clock.now()
    }
}
