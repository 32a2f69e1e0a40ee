pub mod activity_service;
pub mod admin_auth_service;
pub mod admin_setup_service;
pub mod availability_service;
pub mod export_service;
pub mod form_fields;
pub mod identity_service;
pub mod login_flow_service;
pub mod pin_service;
pub mod player_admin_service;
pub mod profile_service;
pub mod session_service;
