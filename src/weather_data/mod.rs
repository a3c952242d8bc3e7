pub mod error;
pub mod frame_fetcher;
pub mod frame_writer;
pub mod page_loader;
pub mod table_extractor;
