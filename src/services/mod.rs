pub mod datasource;
pub mod lake; // Lake transport and HTTP client
pub mod query_composer;
pub mod result_fetcher;
pub mod schema_prober;
pub mod table_builder;
pub mod template; // Dashboard variable substitution
pub mod type_classifier;

pub use datasource::*;
pub use lake::{HttpLakeClient, LakeTransport, LakeVersion};
pub use query_composer::*;
pub use result_fetcher::*;
pub use schema_prober::*;
pub use table_builder::*;
pub use template::*;
pub use type_classifier::*;
