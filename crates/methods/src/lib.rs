pub mod dtw;
pub mod entropy;
pub mod geweke;
pub mod granger;
pub mod regression;
pub mod runner;
pub mod summary;
pub mod traits;

// Re-export the built-in tests
pub use entropy::{TransferEntropyTest, VlTransferEntropyTest};
pub use geweke::GewekeTest;
pub use granger::{GrangerTest, VlGrangerTest};

// Re-export the runner and report types
pub use runner::{run_isolated, MethodSuite};
pub use summary::{render_table, Agreement, AgreementVerdict, ComparisonReport};
pub use traits::{CausalityTest, MethodSettings};
