pub mod batch;
pub mod listing;
pub mod rekey;
