//! Translation seam used to build translated chapter abstracts.

/// Translates paragraph text into the language of the other edition.
///
/// Implementations must not fail: an empty string means "no translation"
/// and simply leaves the paragraph without a translated form.
pub trait Translator {
    fn translate(&self, text: &str) -> String;
}

impl<F> Translator for F
where
    F: Fn(&str) -> String,
{
    fn translate(&self, text: &str) -> String {
        self(text)
    }
}

/// Translator that never translates.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTranslation;

impl Translator for NoTranslation {
    fn translate(&self, _text: &str) -> String {
        String::new()
    }
}
