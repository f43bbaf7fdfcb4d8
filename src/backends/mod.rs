#[cfg(feature = "xlsx")]
pub mod xlsx;

#[cfg(feature = "xlsx")]
pub use xlsx::{XlsxError, XlsxReader};
