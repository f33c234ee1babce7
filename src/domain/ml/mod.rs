// Model input/output contract
pub mod features;
