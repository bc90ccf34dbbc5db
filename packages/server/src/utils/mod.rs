pub mod cover_key;
pub mod hash;
pub mod slug;
