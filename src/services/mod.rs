pub mod account_service;
pub mod booking_service;
pub mod dashboard_service;
pub mod format;
pub mod image_service;
pub mod report_service;
pub mod settings_service;
pub mod statistics_service;
pub mod tour_service;
pub mod user_service;
