pub mod frame;
pub mod query;
pub mod settings;

pub use frame::*;
pub use query::*;
pub use settings::*;
