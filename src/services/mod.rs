pub mod cache_service;
pub mod category_icons;
pub mod edit_session;
pub mod generation_service;
pub mod normalizer;
pub mod prompt_templates;
pub mod time_grid;
pub mod validator;
