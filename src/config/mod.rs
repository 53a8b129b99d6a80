mod server;

pub use server::{
    DEFAULT_CORS_ORIGINS, DEFAULT_DATABASE_URI, DatabaseLocation, ServerConfig, parse_origins,
};
