use anyhow::Result;
use std::env;

pub struct AppConfig {
    pub port: u16,
    pub database: DatabaseConfig,
    pub venue: VenueConfig,
}

impl AppConfig {
    pub fn new() -> Result<Self> {
        let port = env::var("PORT").unwrap_or_else(|_| "8080".into()).parse()?;
        let database = DatabaseConfig {
            host: env::var("DATABASE_HOST").unwrap_or_else(|_| "localhost".into()),
            port: env::var("DATABASE_PORT")
                .unwrap_or_else(|_| "5432".into())
                .parse()?,
            username: env::var("DATABASE_USERNAME").unwrap_or_else(|_| "app".into()),
            password: env::var("DATABASE_PASSWORD").unwrap_or_else(|_| "passwd".into()),
            database: env::var("DATABASE_NAME").unwrap_or_else(|_| "app".into()),
        };
        // 会場のローカル時刻は固定オフセットで扱う（既定は JST）
        let venue = VenueConfig {
            utc_offset_hours: env::var("VENUE_UTC_OFFSET_HOURS")
                .unwrap_or_else(|_| "9".into())
                .parse()?,
        };
        Ok(Self {
            port,
            database,
            venue,
        })
    }
}

pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub database: String,
}

pub struct VenueConfig {
    pub utc_offset_hours: i32,
}
