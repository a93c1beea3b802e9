pub mod backends;
pub mod batch;
pub mod caption;
pub mod entity;
pub mod error;
pub mod extract;
pub mod file_collect;
pub mod fs_rename;
pub mod model;
pub mod path_norm;
pub mod ranker;
pub mod sanitize;
pub mod settings;
pub mod tagging;

pub use crate::backends::Backends;
pub use crate::batch::BatchOrchestrator;
pub use crate::entity::FileEntity;
pub use crate::error::AppError;
pub use crate::model::{AppSettings, FileStatus, NamingMode};
