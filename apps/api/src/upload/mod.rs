// Résumé upload: PDF storage, text extraction, listing.

pub mod handlers;
pub mod pdf;
pub mod storage;
