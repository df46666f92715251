pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {message}")]
    Config { path: String, message: String },

    #[error("Config section \"{section}\" not found")]
    MissingConfigSection { section: String },

    #[error("Invalid store file {path}: {message}")]
    Store { path: String, message: String },

    #[error("No person with id {id}")]
    UnknownPerson { id: u32 },

    #[error("Person {id} is excluded as a spurious record")]
    SpuriousConnection { id: u32 },

    #[error("Invalid date {value:?} for person {id}: {message}")]
    InvalidDate {
        id: u32,
        value: String,
        message: String,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
