pub mod app;
pub mod book;
pub mod clock;
pub mod errors;
pub mod format;
pub mod handlers;
pub mod models;
pub mod notify;
pub mod schedule;
pub mod state;
pub mod stats;
pub mod storage;
pub mod ui;

pub use app::router;
pub use book::SalesBook;
pub use clock::{Clock, FixedClock, SystemClock};
pub use state::AppState;
pub use storage::{load_data, resolve_data_path};
