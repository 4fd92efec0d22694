/// Caller identity handed to the API client explicitly.
///
/// The browser keeps its bearer token in the `token` cookie; the router lifts
/// it into a `Session` so nothing below the HTTP layer reads ambient state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    token: Option<String>,
}

impl Session {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        let token = token.into();
        if token.trim().is_empty() {
            return Self::anonymous();
        }
        Self { token: Some(token) }
    }

    pub fn bearer(&self) -> Option<&str> {
        self.token.as_deref()
    }
}
