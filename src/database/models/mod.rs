pub mod branch;
pub mod patient;
pub mod tenant;
pub mod user;

pub use branch::Branch;
pub use patient::Patient;
pub use tenant::Tenant;
pub use user::{User, UserBranch};
