pub mod audit_record;
pub mod donation;
pub mod participation;
pub mod quiz;
pub mod vendor;
