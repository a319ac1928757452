pub mod aggregate;
pub mod analytics;
pub mod catalog;
pub mod health;
pub mod track;
