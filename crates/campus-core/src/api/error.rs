use thiserror::Error;

use crate::config::Language;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Unauthorized - token may be expired")]
    Unauthorized,

    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Rate limited - please wait before retrying")]
    RateLimited,

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("No refresh token stored - login required")]
    MissingRefreshToken,
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            return body.to_string();
        }
        let mut end = MAX_ERROR_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
    }

    /// Pull the human-readable part out of a JSON error body.
    /// Falls back to the raw body when it isn't JSON or has no message field.
    pub(crate) fn detail(body: &str) -> String {
        let parsed = serde_json::from_str::<serde_json::Value>(body).ok();
        let message = parsed.as_ref().and_then(|v| {
            ["message", "error"]
                .iter()
                .find_map(|key| v.get(*key).and_then(|m| m.as_str()))
        });
        Self::truncate_body(message.unwrap_or(body))
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let detail = Self::detail(body);
        match status.as_u16() {
            400 | 422 => ApiError::Validation(detail),
            401 => ApiError::Unauthorized,
            403 => ApiError::AccessDenied(detail),
            404 => ApiError::NotFound(detail),
            409 => ApiError::Conflict(detail),
            429 => ApiError::RateLimited,
            500..=599 => ApiError::ServerError(detail),
            _ => ApiError::InvalidResponse(format!("Status {}: {}", status, detail)),
        }
    }

    /// Message suitable for showing to an end user in the chosen language.
    pub fn user_message(&self, lang: Language) -> String {
        match (self, lang) {
            (ApiError::AccessDenied(_), Language::En) => {
                "You do not have permission to do that.".to_string()
            }
            (ApiError::AccessDenied(_), Language::Tr) => {
                "Bu işlem için yetkiniz yok.".to_string()
            }
            (ApiError::Unauthorized | ApiError::MissingRefreshToken, Language::En) => {
                "Your session has expired. Please log in again.".to_string()
            }
            (ApiError::Unauthorized | ApiError::MissingRefreshToken, Language::Tr) => {
                "Oturumunuzun süresi doldu. Lütfen tekrar giriş yapın.".to_string()
            }
            (ApiError::NotFound(_), Language::En) => "The requested item was not found.".to_string(),
            (ApiError::NotFound(_), Language::Tr) => "İstenen kayıt bulunamadı.".to_string(),
            (
                ApiError::Validation(detail)
                | ApiError::Conflict(detail)
                | ApiError::InvalidCredentials(detail),
                _,
            ) if !detail.trim().is_empty() => detail.clone(),
            (ApiError::InvalidCredentials(_), Language::En) => {
                "Email or password is incorrect.".to_string()
            }
            (ApiError::InvalidCredentials(_), Language::Tr) => {
                "E-posta veya şifre hatalı.".to_string()
            }
            (ApiError::Validation(_), Language::En) => {
                "The request was rejected. Check the entered values.".to_string()
            }
            (ApiError::Validation(_), Language::Tr) => {
                "İstek reddedildi. Girilen değerleri kontrol edin.".to_string()
            }
            (ApiError::Conflict(_), Language::En) => {
                "This conflicts with an existing record.".to_string()
            }
            (ApiError::Conflict(_), Language::Tr) => {
                "Bu işlem mevcut bir kayıtla çakışıyor.".to_string()
            }
            (ApiError::RateLimited, Language::En) => {
                "Too many requests. Please wait a moment and try again.".to_string()
            }
            (ApiError::RateLimited, Language::Tr) => {
                "Çok fazla istek gönderildi. Lütfen biraz bekleyip tekrar deneyin.".to_string()
            }
            (ApiError::ServerError(_), Language::En) => {
                "The server encountered an error. Please try again later.".to_string()
            }
            (ApiError::ServerError(_), Language::Tr) => {
                "Sunucu hatası oluştu. Lütfen daha sonra tekrar deneyin.".to_string()
            }
            (ApiError::NetworkError(_), Language::En) => {
                "Could not reach the server. Check your connection.".to_string()
            }
            (ApiError::NetworkError(_), Language::Tr) => {
                "Sunucuya ulaşılamadı. Bağlantınızı kontrol edin.".to_string()
            }
            (ApiError::InvalidResponse(_), Language::En) => {
                "The server sent an unexpected response.".to_string()
            }
            (ApiError::InvalidResponse(_), Language::Tr) => {
                "Sunucudan beklenmeyen bir yanıt alındı.".to_string()
            }
        }
    }
}
