// Include handlers module directly from handlers.rs
#[path = "handlers.rs"]
pub mod handlers;

// Re-export commonly used handler functions for convenience
pub use handlers::{
    load_urls_from_file,
    load_urls_from_source,
    parse_url_line,
};

// Re-export traversal functionality from gridmap-core
pub use gridmap_core::run::{
    TraverseOptions, TraverseSummary, RunProgressCallback,
    execute_traverse, extract_url_path,
};
