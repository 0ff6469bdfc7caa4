// Request/response round trips through the full router

pub mod api_endpoints_test;
pub mod auth_integration_test;
