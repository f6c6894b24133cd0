pub mod leads;
pub mod payload;
