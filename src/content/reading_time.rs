//! Reading-time estimate for a post

use std::fmt;

use super::richtext::RichTextRenderer;
use super::Section;

/// Words read per minute when nothing else is configured
pub const DEFAULT_WORDS_PER_MINUTE: u32 = 200;

/// Estimated time to read a post
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadingTime {
    /// Under a minute
    Quick,
    /// Between 1 and 59 minutes
    Minutes(u64),
    /// Whole hours, fractional part dropped
    Hours(u64),
}

impl ReadingTime {
    pub fn from_minutes(minutes: u64) -> Self {
        if minutes < 1 {
            ReadingTime::Quick
        } else if minutes < 60 {
            ReadingTime::Minutes(minutes)
        } else {
            ReadingTime::Hours(minutes / 60)
        }
    }
}

impl fmt::Display for ReadingTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReadingTime::Quick => write!(f, "quick read"),
            ReadingTime::Minutes(m) => write!(f, "{} min", m),
            ReadingTime::Hours(1) => write!(f, "1 hour"),
            ReadingTime::Hours(h) => write!(f, "{} hours", h),
        }
    }
}

/// Count whitespace-delimited tokens
pub fn count_words(text: &str) -> u64 {
    text.split_whitespace().count() as u64
}

/// Total words across headings and bodies
pub fn total_words<R: RichTextRenderer + ?Sized>(sections: &[Section], renderer: &R) -> u64 {
    let heading_words: u64 = sections.iter().map(|s| count_words(&s.heading)).sum();
    let body_words: u64 = sections
        .iter()
        .map(|s| count_words(&renderer.as_text(&s.body)))
        .sum();
    heading_words + body_words
}

/// Estimate how long the given sections take to read
pub fn estimate<R: RichTextRenderer + ?Sized>(
    sections: &[Section],
    renderer: &R,
    words_per_minute: u32,
) -> ReadingTime {
    let words = total_words(sections, renderer);
    let wpm = u64::from(words_per_minute.max(1));
    ReadingTime::from_minutes(words.div_ceil(wpm))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::richtext::{RichTextBlock, StructuredText};

    fn section_with_words(heading: &str, body_words: usize) -> Section {
        let text = vec!["word"; body_words].join(" ");
        Section {
            heading: heading.to_string(),
            body: vec![RichTextBlock::paragraph(text)],
        }
    }

    fn estimate_default(sections: &[Section]) -> ReadingTime {
        estimate(sections, &StructuredText, DEFAULT_WORDS_PER_MINUTE)
    }

    #[test]
    fn test_empty_is_quick_read() {
        assert_eq!(estimate_default(&[]), ReadingTime::Quick);
        assert_eq!(estimate_default(&[]).to_string(), "quick read");
    }

    #[test]
    fn test_sub_200_words_rounds_up_to_one_minute() {
        // 2 heading words + 48 body words
        let sections = vec![section_with_words("Two words", 48)];
        assert_eq!(total_words(&sections, &StructuredText), 50);
        assert_eq!(estimate_default(&sections), ReadingTime::Minutes(1));

        let sections = vec![section_with_words("Heading", 98), section_with_words("", 1)];
        assert_eq!(total_words(&sections, &StructuredText), 100);
        assert_eq!(estimate_default(&sections).to_string(), "1 min");

        let sections = vec![section_with_words("", 199)];
        assert_eq!(estimate_default(&sections), ReadingTime::Minutes(1));
    }

    #[test]
    fn test_minutes_boundary() {
        let sections = vec![section_with_words("", 201)];
        assert_eq!(estimate_default(&sections), ReadingTime::Minutes(2));

        let sections = vec![section_with_words("", 11_800)];
        assert_eq!(estimate_default(&sections), ReadingTime::Minutes(59));
    }

    #[test]
    fn test_hours_branch() {
        let sections = vec![section_with_words("", 12_000)];
        assert_eq!(estimate_default(&sections), ReadingTime::Hours(1));
        assert_eq!(estimate_default(&sections).to_string(), "1 hour");

        // 119 minutes is still one whole hour
        let sections = vec![section_with_words("", 23_800)];
        assert_eq!(estimate_default(&sections), ReadingTime::Hours(1));

        let sections = vec![section_with_words("", 24_000)];
        assert_eq!(estimate_default(&sections).to_string(), "2 hours");
    }

    #[test]
    fn test_whitespace_runs_count_once() {
        assert_eq!(count_words("  a \t b\n\nc  "), 3);
        assert_eq!(count_words(""), 0);
        assert_eq!(count_words("   "), 0);
    }

    #[test]
    fn test_custom_words_per_minute() {
        let sections = vec![section_with_words("", 300)];
        assert_eq!(
            estimate(&sections, &StructuredText, 100),
            ReadingTime::Minutes(3)
        );
    }
}
