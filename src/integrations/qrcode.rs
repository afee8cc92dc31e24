use ::qrcode::QrCode;
use ::qrcode::render::svg;

use crate::app::response::ApiError;

#[derive(Debug, thiserror::Error)]
pub enum QrError {
    #[error("text to encode must not be empty")]
    Empty,

    #[error("cannot encode text: {0}")]
    Encode(String),
}

impl From<QrError> for ApiError {
    fn from(err: QrError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

/// Renders text as an SVG QR code.
#[derive(Clone, Copy, Debug)]
pub struct QrGenerator {
    min_size: u32,
}

impl Default for QrGenerator {
    fn default() -> Self {
        QrGenerator { min_size: 200 }
    }
}

impl QrGenerator {
    pub fn svg(&self, text: &str) -> Result<String, QrError> {
        if text.is_empty() {
            return Err(QrError::Empty);
        }

        let code = QrCode::new(text.as_bytes()).map_err(|err| QrError::Encode(err.to_string()))?;

        Ok(code
            .render::<svg::Color>()
            .min_dimensions(self.min_size, self.min_size)
            .build())
    }
}
