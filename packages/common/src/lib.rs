pub mod card_status;
pub mod config;
pub mod retry;
pub mod storage;
pub mod vibe;

pub use card_status::CardStatus;
pub use vibe::Vibe;
