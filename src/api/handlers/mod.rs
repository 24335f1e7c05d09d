pub mod applications;
pub mod payments;
pub mod root;
pub mod tuitions;
pub mod users;
