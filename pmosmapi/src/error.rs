//! Erreurs de la façade SMAPI et leur traduction en SOAP faults

use pmolibrary::LibraryError;
use thiserror::Error;

/// Codes de fault SMAPI (préfixés par le namespace SOAP `s:`)
pub mod fault_codes {
    pub const CLIENT: &str = "s:Client";
    pub const ITEM_NOT_FOUND: &str = "s:Client.ItemNotFound";
    pub const INVALID_ARGUMENTS: &str = "s:Client.InvalidArguments";
    pub const UNSUPPORTED_OPERATION: &str = "s:Client.UnsupportedOperation";
    pub const SERVICE_UNKNOWN_ERROR: &str = "s:Server.ServiceUnknownError";
}

#[derive(Debug, Error)]
pub enum SmapiError {
    #[error("Invalid identifier: '{0}'")]
    InvalidId(String),

    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("Invalid value for argument '{name}': '{value}'")]
    InvalidArgument { name: String, value: String },

    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    #[error(transparent)]
    Library(#[from] LibraryError),
}

impl SmapiError {
    /// Code de fault SOAP correspondant à l'erreur
    pub fn fault_code(&self) -> &'static str {
        match self {
            SmapiError::InvalidId(_) | SmapiError::NotFound { .. } => fault_codes::ITEM_NOT_FOUND,
            SmapiError::Library(LibraryError::NotFound { .. }) => fault_codes::ITEM_NOT_FOUND,
            SmapiError::InvalidArgument { .. } => fault_codes::INVALID_ARGUMENTS,
            SmapiError::UnsupportedOperation(_) => fault_codes::UNSUPPORTED_OPERATION,
            SmapiError::Library(_) => fault_codes::SERVICE_UNKNOWN_ERROR,
        }
    }

    /// Vrai si l'erreur vient de la requête du contrôleur
    pub fn is_client_error(&self) -> bool {
        self.fault_code().starts_with("s:Client")
    }
}

pub type Result<T> = std::result::Result<T, SmapiError>;
