pub mod application;
pub mod payment;
pub mod tuition;
pub mod user;

pub use application::*;
pub use payment::*;
pub use tuition::*;
pub use user::*;
