use hopewell_status::Status;

pub mod database {
    pub mod client;
    pub mod store;
}
pub mod models {
    pub mod donation;
    pub mod donation_order;
    pub mod event;
}
pub mod page_token;
pub mod postgres {
    pub mod client;
    pub mod store;
}
pub mod stores {
    pub mod donation;
    pub mod donation_order;
    pub mod event;
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    // Error occurred when executing some SQL operation.
    #[error("sql failed: {0:?}")]
    Sql(#[from] sqlx::Error),

    // Error occurred when running migrations.
    #[error("migration failed: {0:?}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    // Page token serialization/deserialization failed.
    #[error(transparent)]
    PageToken(anyhow::Error),

    // Some other/unexpected error occurred.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<Error> for Status {
    fn from(error: Error) -> Self {
        Status::internal(format!("storage error: {:?}", error))
    }
}
