#[derive(thiserror::Error, Debug, serde::Deserialize, serde::Serialize)]
#[allow(clippy::enum_variant_names)]
pub enum Error {
    #[error("Could not extract text from {path}: {reason}")]
    Extraction { path: String, reason: String },

    #[error("Could not write output: {0}")]
    Output(String),

    #[error("Invalid answer: {0}")]
    Prompt(String),
}
