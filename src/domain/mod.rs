pub mod models;
pub mod store;
pub mod schema;
pub mod validation;
pub mod errors;

pub use models::*;
pub use store::*;
pub use schema::*;
pub use validation::*;
pub use errors::*;
