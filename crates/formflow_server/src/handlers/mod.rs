pub mod conversations;
pub mod health;
pub mod objects;
pub mod templates;
