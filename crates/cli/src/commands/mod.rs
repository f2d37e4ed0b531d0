pub mod chat;
pub mod knowledge;
pub mod serve;
pub mod status;
pub mod sync;
