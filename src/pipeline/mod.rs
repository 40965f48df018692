pub mod cube;
pub mod formats;
pub mod import;
pub mod notation;
pub mod replay;
pub mod storage;
pub mod transcript;
