use thiserror::Error;

/// Errors produced while decoding or loading a mesh.
///
/// None of these is fatal: the caller keeps the previous mesh.
#[derive(Error, Debug)]
pub enum MeshError {
    /// Bad magic, missing chunk/accessor, out-of-range read.
    #[error("Format invalide : {0}")]
    Format(String),

    /// Decoding succeeded but produced zero vertices.
    #[error("Maillage vide : aucun sommet décodé")]
    Empty,

    /// File extension or content not recognised as OBJ or GLB.
    #[error("Format non supporté : {0}")]
    UnsupportedFormat(String),

    /// File could not be read.
    #[error("Impossible de lire {path} : {source}")]
    Io {
        /// Path that failed.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The decode job was cancelled before delivering a result.
    #[error("Décodage annulé")]
    Cancelled,
}

impl MeshError {
    /// Raccourci pour `MeshError::Format`.
    pub(crate) fn format(msg: impl Into<String>) -> Self {
        Self::Format(msg.into())
    }
}
