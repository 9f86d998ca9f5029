pub mod error;
pub mod extract;
pub mod fetch;
pub mod filter;
pub mod record;
pub mod table;
pub mod traversal;
pub mod urls;

pub use error::CrawlError;
pub use fetch::{FetchAdapter, FetchBackend, FetchConfig, HeadProbe, build_adapter};
pub use filter::FilterPolicy;
pub use record::{ErrorInfo, LinkRecord, PageMeta, PageRecord, VisitStatus};
pub use table::{DepthFrontier, LinkTable, RecordFilter};
pub use traversal::{ProgressCallback, Traversal, traverse};
