pub mod local;
pub mod observed;
