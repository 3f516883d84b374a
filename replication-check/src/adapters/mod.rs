pub mod mysql;

pub use mysql::{MySqlConnector, MySqlSession};
