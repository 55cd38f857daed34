use crate::{
    db::{DbPool, OrmConn, orm_from_pool},
    services::token_service::TokenService,
};

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub orm: OrmConn,
    pub tokens: TokenService,
}

impl AppState {
    pub fn new(pool: DbPool, tokens: TokenService) -> Self {
        let orm = orm_from_pool(&pool);
        Self { pool, orm, tokens }
    }
}
