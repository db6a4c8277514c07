pub mod connection;
pub mod maintenance;
pub mod password;
pub mod report;
pub mod schema;
pub mod seed;
pub mod structure;
pub mod users;

pub use connection::*;
pub use maintenance::*;
pub use password::*;
pub use report::*;
pub use schema::*;
pub use seed::*;
pub use structure::*;
pub use users::*;
