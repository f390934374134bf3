pub mod collector;
pub mod entity_builder;
pub mod event_manager;
pub mod member_chunking;

#[cfg(test)]
mod event_manager_test;
