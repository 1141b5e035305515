pub mod document;
pub mod error;
pub mod generate;
pub mod model;
pub mod persist;
pub mod prompt;
pub mod starter;
pub mod store;
pub mod transfer;

pub use document::{Metadata, StructuredDocument};
pub use error::{PromptForgeError, Result};
pub use model::{Collection, RootState, Template};
pub use store::{Operation, Store};
