/// Chart-of-accounts seeding configuration from TOML
pub mod accounts;

/// Database configuration and connection management
pub mod database;
