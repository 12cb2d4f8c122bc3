//! Fake text and placeholder image URLs.

use fake::Fake;
use fake::faker::lorem::en::{Paragraph, Sentence, Word};
use fake::faker::name::en::Name;
use rand::Rng;
use uuid::Uuid;

/// Generates English fake names and lorem text.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContentFaker;

impl ContentFaker {
    pub fn new() -> Self {
        Self
    }

    /// A person's full name.
    pub fn name(&self, rng: &mut impl Rng) -> String {
        Name().fake_with_rng(rng)
    }

    pub fn word(&self, rng: &mut impl Rng) -> String {
        Word().fake_with_rng(rng)
    }

    /// A sentence of exactly `words` words.
    pub fn sentence(&self, words: usize, rng: &mut impl Rng) -> String {
        let words = words.max(1);
        Sentence(words..words + 1).fake_with_rng(rng)
    }

    /// A paragraph of exactly `sentences` sentences.
    pub fn paragraph(&self, sentences: usize, rng: &mut impl Rng) -> String {
        let sentences = sentences.max(1);
        Paragraph(sentences..sentences + 1).fake_with_rng(rng)
    }

    /// Whole sentences accumulated up to `max_chars` characters.
    ///
    /// Always returns at least one sentence, cut on a char boundary if the
    /// first sentence alone exceeds the cap.
    pub fn text(&self, max_chars: usize, rng: &mut impl Rng) -> String {
        let mut text = String::new();
        let mut len = 0;

        loop {
            let sentence: String = Sentence(3..10).fake_with_rng(rng);
            let sentence_len = sentence.chars().count();
            let separator = usize::from(!text.is_empty());

            if len + separator + sentence_len > max_chars {
                if text.is_empty() {
                    text = sentence.chars().take(max_chars).collect();
                }
                break;
            }

            if separator == 1 {
                text.push(' ');
            }
            text.push_str(&sentence);
            len += separator + sentence_len;
        }

        text
    }
}

/// Uniqueness token drawn from the run's RNG, so seeded runs are reproducible.
pub fn token(rng: &mut impl Rng) -> Uuid {
    uuid::Builder::from_random_bytes(rng.r#gen()).into_uuid()
}

/// Random placeholder image of the given size.
pub fn picsum_url(width: u32, height: u32, token: Uuid) -> String {
    format!("https://picsum.photos/{width}/{height}?random={token}")
}

/// Placeholder avatar.
pub fn avatar_url(token: Uuid) -> String {
    format!("https://i.pravatar.cc/150?u={token}")
}
