pub mod error;
pub mod report;
pub mod risk;
pub mod settings;
pub mod types;

pub use error::{CoreError, Result};
pub use settings::Settings;
pub use types::Validate;
