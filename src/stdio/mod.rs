pub mod metadata;
pub mod server;

pub use server::{EksMcpServer, SERVER_NAME};
