mod error;
mod status;

pub use error::ErrorKind;
pub use status::Status;

/// The result type of `netblock_lib`
pub type Result<T> = std::result::Result<T, ErrorKind>;
