pub mod cleanup;

pub use cleanup::UploadSweeper;
