//! Error types for the I/O edges of the crate.
//!
//! Rendering and color sampling never fail; they substitute fallbacks
//! instead. Errors only surface when loading settings or exporting pixels.

pub type Result<T> = std::result::Result<T, AuraError>;

#[derive(thiserror::Error, Debug)]
pub enum AuraError {
    #[error("drawing surface is not attached")]
    SurfaceDetached,

    #[error("image encoding error: {0}")]
    Encode(#[from] image::ImageError),

    #[error("settings error: {0}")]
    Settings(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_are_stable() {
        assert!(
            AuraError::SurfaceDetached
                .to_string()
                .contains("not attached")
        );

        let json_err = serde_json::from_str::<u32>("nope").unwrap_err();
        assert!(
            AuraError::from(json_err)
                .to_string()
                .starts_with("settings error:")
        );
    }

    #[test]
    fn io_preserves_source() {
        let base = std::io::Error::other("boom");
        let err = AuraError::from(base);
        assert!(err.to_string().contains("boom"));
    }
}
