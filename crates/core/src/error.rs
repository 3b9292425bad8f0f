/// Errors surfaced by the engine and its configuration.
///
/// Unknown quantities and unmapped category/severity pairs are not errors;
/// they resolve to defaults inside the classifier and action table.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("{entity} '{id}' does not exist")]
    NotFound { entity: &'static str, id: String },

    #[error("invalid configuration: {0}")]
    Validation(String),

    #[error("engine failure: {0}")]
    Internal(String),
}
