mod media_store_postgres;
mod sea_orm_entity;

pub use media_store_postgres::MediaStorePostgres;
