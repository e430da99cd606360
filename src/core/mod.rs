pub mod assertion;
pub mod device_service;
pub mod dispatch_service;
pub mod fanout;
pub mod health_service;
