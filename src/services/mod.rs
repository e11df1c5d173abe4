pub mod donation_service;
pub mod history_service;
pub mod quiz_service;
pub mod vendor_service;
