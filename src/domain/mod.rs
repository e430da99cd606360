pub mod credentials;
pub mod device;
pub mod notification;
