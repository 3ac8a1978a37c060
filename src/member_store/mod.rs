mod models;
mod schema;
mod store;
mod trait_def;

pub use models::{Member, MergeStats, Skill, StoreStats};
pub use store::SqliteMemberStore;
pub use trait_def::MemberStore;
