//! Built-in resource handlers.

pub mod array_file;
pub mod msg_file;
pub mod user_singleton;

pub use array_file::ArrayFileHandler;
pub use msg_file::MsgFileHandler;
pub use user_singleton::UserSingletonHandler;
