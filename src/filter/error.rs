use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    #[error("Query parameter must include {0}, please adjust your query.")]
    InvalidKey(&'static str),

    #[error("{0} must be less than {1}.")]
    InvalidRange(&'static str, &'static str),

    #[error("Query must start with name.")]
    MustStartWithName,

    #[error("Too many query parameters, please update.")]
    TooManyParameters,

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("Query returned no results. Please try again.")]
    NoResults,

    #[error("No data")]
    NoData,
}
