pub mod owner;
pub mod owner_detail;
pub mod owner_session;
