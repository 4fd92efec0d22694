use thiserror::Error;

/// Failures talking to the listings API.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("Server returned HTTP {status}: {body}")]
    Server { status: u16, body: String },
    #[error("Unexpected data shape: {0}")]
    DataShape(String),
    #[error("Invalid endpoint: {0}")]
    Endpoint(String),
}

impl ApiError {
    /// Message shown in the grid's inline error banner.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Network(_) => {
                "Não foi possível conectar ao servidor. Verifique sua conexão.".to_string()
            }
            ApiError::Server { status, .. } if *status == 401 || *status == 403 => {
                "Sua sessão expirou. Entre novamente para continuar.".to_string()
            }
            ApiError::Server { status, .. } => {
                format!("Erro ao carregar imóveis (HTTP {status}). Tente novamente.")
            }
            ApiError::DataShape(_) | ApiError::Endpoint(_) => {
                "Resposta inesperada do servidor ao carregar imóveis.".to_string()
            }
        }
    }
}
