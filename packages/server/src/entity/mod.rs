pub mod card;
pub mod occasion;
