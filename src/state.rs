use std::sync::Arc;

use surrealdb::{
    Surreal,
    engine::any::{self, Any},
    opt::auth::Root,
};

use crate::{errors::Result, identity::IdentityProvider};

#[derive(Debug)]
pub struct Config {
    pub db_addr: String,
    pub db_user: String,
    pub db_pass: String,
    pub db_namespace: String,
    pub db_database: String,
    pub jwt_secret: String,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            db_addr: env_or("CAMPUSMEET_DB_ADDR", "ws://localhost:8050"),
            db_user: env_or("CAMPUSMEET_DB_USER", "root"),
            db_pass: env_or("CAMPUSMEET_DB_PASS", "secret"),
            db_namespace: env_or("CAMPUSMEET_DB_NS", "campusmeet"),
            db_database: env_or("CAMPUSMEET_DB_NAME", "main"),
            jwt_secret: env_or("CAMPUSMEET_JWT_SECRET", "development-secret"),
            port: env_or("CAMPUSMEET_PORT", "3587").parse().unwrap_or(3587),
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub db: Surreal<Any>,
    pub identity: IdentityProvider,
    pub config: Arc<Config>,
}

impl AppState {
    pub async fn init(config: Config) -> Result<Self> {
        let db = any::connect(config.db_addr.as_str()).await?;
        db.signin(Root {
            username: config.db_user.as_str(),
            password: config.db_pass.as_str(),
        })
        .await?;
        db.use_ns(config.db_namespace.as_str())
            .use_db(config.db_database.as_str())
            .await?;

        Ok(Self {
            identity: IdentityProvider::new(db.clone()),
            db,
            config: Arc::new(config),
        })
    }
}

#[cfg(test)]
pub async fn memory_state() -> AppState {
    let db = any::connect("mem://").await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();

    AppState {
        identity: IdentityProvider::new(db.clone()),
        db,
        config: Arc::new(Config {
            db_addr: "mem://".into(),
            db_user: String::new(),
            db_pass: String::new(),
            db_namespace: "test".into(),
            db_database: "test".into(),
            jwt_secret: "test-secret".into(),
            port: 0,
        }),
    }
}
