// Infrastructure layer modules
pub mod config;
pub mod in_memory_repository;
pub mod logging;
pub mod procedure_item;
pub mod procedure_repository;

// Re-exports
pub use config::{ConfigError, ProceduresConfig};
pub use in_memory_repository::InMemoryProcedureRepository;
pub use logging::init_logging;
pub use procedure_repository::{DynamoProcedureRepository, ProcedureRepository, RepositoryError};
