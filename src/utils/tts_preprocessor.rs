/// Which decorations to drop before text is spoken.
#[derive(Debug, Clone, Copy)]
pub struct SpeechFilter {
    pub ignore_brackets: bool,
    pub ignore_parentheses: bool,
    pub ignore_asterisks: bool,
    pub ignore_angle_brackets: bool,
}

impl Default for SpeechFilter {
    fn default() -> Self {
        Self {
            ignore_brackets: true,
            ignore_parentheses: false,
            ignore_asterisks: true,
            ignore_angle_brackets: true,
        }
    }
}

/// Filter text for TTS processing
pub fn tts_filter(text: &str, filter: SpeechFilter) -> String {
    let mut result = text.to_string();

    if filter.ignore_asterisks {
        result = filter_pattern(&result, '*', '*');
    }

    if filter.ignore_brackets {
        result = filter_pattern(&result, '[', ']');
    }

    if filter.ignore_parentheses {
        result = filter_pattern(&result, '(', ')');
    }

    if filter.ignore_angle_brackets {
        result = filter_pattern(&result, '<', '>');
    }

    result.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Remove complete `start...end` spans. An opening marker that is never
/// closed is kept as literal text together with everything after it.
fn filter_pattern(text: &str, start: char, end: char) -> String {
    let mut result = String::with_capacity(text.len());
    let mut pending = String::new();
    let mut depth = 0usize;

    for ch in text.chars() {
        if depth > 0 {
            pending.push(ch);
        }
        if start == end {
            // symmetric markers such as *emphasis* toggle
            if ch == start {
                if depth == 0 {
                    depth = 1;
                    pending.push(ch);
                } else {
                    depth = 0;
                    pending.clear();
                }
            } else if depth == 0 {
                result.push(ch);
            }
        } else if ch == start {
            if depth == 0 {
                pending.push(ch);
            }
            depth += 1;
        } else if ch == end && depth > 0 {
            depth -= 1;
            if depth == 0 {
                pending.clear();
            }
        } else if depth == 0 {
            result.push(ch);
        }
    }

    result.push_str(&pending);
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_stage_directions() {
        let text = "*waves* Bonjour [smiles] tout le monde <break/>!";
        assert_eq!(tts_filter(text, SpeechFilter::default()), "Bonjour tout le monde !");
    }

    #[test]
    fn nested_brackets() {
        assert_eq!(filter_pattern("a [b [c] d] e", '[', ']'), "a  e");
    }

    #[test]
    fn parentheses_kept_by_default() {
        assert_eq!(tts_filter("Olá (mundo)", SpeechFilter::default()), "Olá (mundo)");
        let filter = SpeechFilter {
            ignore_parentheses: true,
            ..SpeechFilter::default()
        };
        assert_eq!(tts_filter("Olá (mundo)", filter), "Olá");
    }

    #[test]
    fn unclosed_markers_keep_the_rest_of_the_text() {
        assert_eq!(
            tts_filter("Il fait 2 < 3 degrés dehors aujourd'hui.", SpeechFilter::default()),
            "Il fait 2 < 3 degrés dehors aujourd'hui."
        );
        assert_eq!(
            tts_filter("Le prix est 5 * 3 euros, merci.", SpeechFilter::default()),
            "Le prix est 5 * 3 euros, merci."
        );
        assert_eq!(filter_pattern("a [b [c] d", '[', ']'), "a [b [c] d");
        assert_eq!(filter_pattern("*x* and * y", '*', '*'), " and * y");
    }

    #[test]
    fn stray_closing_marker_is_kept() {
        assert_eq!(filter_pattern("1 > 0", '<', '>'), "1 > 0");
    }
}
