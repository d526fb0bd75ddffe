// Domain layer modules
pub mod price;
pub mod procedure;
pub mod procedure_validator;
pub mod scan_limit;

// Re-exports
pub use price::Price;
pub use procedure::{Procedure, ProcedureKey, ProcedurePatch};
pub use procedure_validator::{ProcedureValidator, ValidationError};
pub use scan_limit::{DEFAULT_SCAN_LIMIT, MAX_SCAN_LIMIT, ScanLimit};
