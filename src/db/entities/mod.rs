//! Database entities

pub mod repository;
pub mod block;
pub mod topic;

pub use repository::Entity as Repository;
pub use block::Entity as Block;
// Only the schema tests query topics so far
#[allow(unused_imports)]
pub use topic::Entity as Topic;
