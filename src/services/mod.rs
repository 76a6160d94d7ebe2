pub mod entry_service;
pub mod glossary_service;
pub mod rank;
pub mod search_service;
pub mod submission_service;
pub mod suggest_service;
