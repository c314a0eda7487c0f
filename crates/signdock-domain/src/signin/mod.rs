mod query;
mod repository;
mod result;
mod transport;

pub use query::{
    LogStatus, Page, Pagination, SigninLogQuery, SigninLogStats, DEFAULT_PAGE_LIMIT,
    MAX_PAGE_LIMIT,
};
pub use repository::SigninLogRepository;
pub use result::{BatchSummary, SigninLog, SigninResult};
pub use transport::{SigninRequest, SigninResponse, SigninTransport};
