use std::sync::Arc;

use crate::{config::JwtConfig, db::OrmConn};

#[derive(Clone)]
pub struct AppState {
    pub orm: Arc<OrmConn>,
    pub jwt: JwtConfig,
}

impl AppState {
    pub fn new(orm: OrmConn, jwt: JwtConfig) -> Self {
        Self {
            orm: Arc::new(orm),
            jwt,
        }
    }

    pub fn db(&self) -> &OrmConn {
        &self.orm
    }
}
