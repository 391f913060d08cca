pub mod affixes;
pub mod profile;
