use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque handle to a question's artwork: a URL or an asset identifier.
///
/// The engine never decodes images; resolving the handle to pixels is a
/// presentation concern.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageRef(String);

impl ImageRef {
    #[must_use]
    pub fn new(handle: impl Into<String>) -> Self {
        Self(handle.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ImageRef").field(&self.0).finish()
    }
}

/// One yes/no question served to the player. Immutable once issued.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizQuestion {
    image: ImageRef,
    text: String,
    correct_answer: bool,
}

impl QuizQuestion {
    #[must_use]
    pub fn new(image: ImageRef, text: impl Into<String>, correct_answer: bool) -> Self {
        Self {
            image,
            text: text.into(),
            correct_answer,
        }
    }

    #[must_use]
    pub fn image(&self) -> &ImageRef {
        &self.image
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Ground truth for scoring the player's answer.
    #[must_use]
    pub fn correct_answer(&self) -> bool {
        self.correct_answer
    }
}
