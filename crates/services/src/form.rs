//! # Form State Controller
//!
//! Owns the transient form draft: field values, progressive disclosure of
//! the optional sections, and submit-time validation. The draft is never
//! persisted; it is cleared only after a successful submission and left
//! intact after a failed one so the user can retry without re-typing.

use thiserror::Error;

/// Form fields that can fail required-field validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Title,
    Topic,
}

impl FormField {
    pub fn label(self) -> &'static str {
        match self {
            FormField::Title => "title",
            FormField::Topic => "topic",
        }
    }
}

/// A field-specific validation failure, surfaced inline before any remote
/// call is made.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("a {} is required", field.label())]
pub struct ValidationError {
    pub field: FormField,
}

/// Validated field values handed to the orchestrator at submit time.
/// Empty optional fields are already mapped to `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitRequest {
    pub title: String,
    pub body: Option<String>,
    pub image: Option<String>,
    pub topic: String,
}

/// The client-owned form draft.
///
/// A form instance may be scoped to a fixed target topic (posting from
/// inside a category page), in which case the topic override field is
/// hidden entirely and never read.
#[derive(Debug, Clone, Default)]
pub struct PostForm {
    fixed_topic: Option<String>,
    title: String,
    body: String,
    image: String,
    topic: String,
    image_box_open: bool,
}

impl PostForm {
    /// An unscoped form: the user must name a topic before submitting.
    pub fn new() -> Self {
        Self::default()
    }

    /// A form bound to a fixed target topic.
    pub fn scoped(topic: impl Into<String>) -> Self {
        Self {
            fixed_topic: Some(topic.into()),
            ..Self::default()
        }
    }

    pub fn fixed_topic(&self) -> Option<&str> {
        self.fixed_topic.as_deref()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn image(&self) -> &str {
        &self.image
    }

    pub fn topic_override(&self) -> &str {
        &self.topic
    }

    pub fn set_title(&mut self, value: impl Into<String>) {
        self.title = value.into();
    }

    pub fn set_body(&mut self, value: impl Into<String>) {
        self.body = value.into();
    }

    pub fn set_image(&mut self, value: impl Into<String>) {
        self.image = value.into();
    }

    pub fn set_topic_override(&mut self, value: impl Into<String>) {
        self.topic = value.into();
    }

    /// Toggles the image URL sub-field open or closed. Closing it does not
    /// clear a value the user already typed.
    pub fn toggle_image_box(&mut self) {
        self.image_box_open = !self.image_box_open;
    }

    /// Progressive disclosure: the optional sections stay hidden until the
    /// title field becomes non-empty.
    pub fn expanded(&self) -> bool {
        !self.title.is_empty()
    }

    /// The topic override field is shown only on an expanded, unscoped form.
    pub fn shows_topic_field(&self) -> bool {
        self.expanded() && self.fixed_topic.is_none()
    }

    pub fn shows_image_field(&self) -> bool {
        self.expanded() && self.image_box_open
    }

    /// The topic the submission will target: the fixed topic when scoped,
    /// otherwise the user-entered override. Passed through literally, with
    /// no case or whitespace normalization.
    pub fn effective_topic(&self) -> &str {
        self.fixed_topic.as_deref().unwrap_or(&self.topic)
    }

    /// Submit-time validation. Title is always required; the topic override
    /// is required only when the form is not scoped to a fixed topic.
    pub fn validate(&self) -> Result<SubmitRequest, ValidationError> {
        if self.title.is_empty() {
            return Err(ValidationError {
                field: FormField::Title,
            });
        }
        if self.fixed_topic.is_none() && self.topic.is_empty() {
            return Err(ValidationError {
                field: FormField::Topic,
            });
        }

        let none_if_empty = |s: &str| {
            if s.is_empty() {
                None
            } else {
                Some(s.to_string())
            }
        };

        Ok(SubmitRequest {
            title: self.title.clone(),
            body: none_if_empty(&self.body),
            image: none_if_empty(&self.image),
            topic: self.effective_topic().to_string(),
        })
    }

    /// Clears every field back to the empty string and collapses the
    /// optional sections. The fixed topic binding survives a reset.
    pub fn reset(&mut self) {
        self.title.clear();
        self.body.clear();
        self.image.clear();
        self.topic.clear();
        self.image_box_open = false;
    }
}
