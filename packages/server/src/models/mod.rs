pub mod card;
pub mod cleanup;
pub mod health;
pub mod occasion;
