// Resume parsing API.
// Uploads are decoded on the blocking pool, then run through the shared ResumeParser.
// Batch requests fan out per file, bounded by AppState::parse_permits.

pub mod handlers;
pub mod models;
