use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EtlError {
    #[error("cannot read source file {}: {source}", .path.display())]
    Source {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("database error: {0}")]
    Db(#[from] sea_orm::DbErr),
}

pub type AppResult<T> = Result<T, EtlError>;
