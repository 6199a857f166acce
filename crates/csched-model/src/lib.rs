mod domain;
pub use domain::*;

mod kind;
pub use kind::*;

mod error;
pub use error::ModelError;
