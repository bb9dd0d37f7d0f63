//! SeaORM entities for the `blogs` and `profiles` tables.

pub mod blog;
pub mod profile;
