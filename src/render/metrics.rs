//! Text-width metrics for the built-in Helvetica faces, used to center
//! titles and cells and to right-align the footer. Advance widths are the
//! standard Adobe AFM values in 1/1000 em for ASCII 32..=126;
//! Helvetica-Oblique shares the upright metrics.

const DEFAULT_WIDTH: u16 = 556;

#[rustfmt::skip]
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, // ' ' ! " # $ % & ' ( )
    389, 584, 278, 333, 278, 278, 556, 556, 556, 556, // * + , - . / 0 1 2 3
    556, 556, 556, 556, 556, 556, 278, 278, 584, 584, // 4 5 6 7 8 9 : ; < =
    584, 556, 1015, 667, 667, 722, 722, 667, 611, 778, // > ? @ A B C D E F G
    722, 278, 500, 667, 556, 833, 722, 778, 667, 778, // H I J K L M N O P Q
    722, 667, 611, 722, 667, 944, 667, 667, 611, 278, // R S T U V W X Y Z [
    278, 278, 469, 556, 333, 556, 556, 500, 556, 556, // \ ] ^ _ ` a b c d e
    278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // f g h i j k l m n o
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, // p q r s t u v w x y
    500, 334, 260, 334, 584,                          // z { | } ~
];

/// Width of `text` at `size` points.
pub fn text_width(text: &str, size: f64) -> f64 {
    let units: u32 = text
        .chars()
        .map(|c| {
            let code = c as u32;
            if (32..=126).contains(&code) {
                u32::from(HELVETICA_WIDTHS[(code - 32) as usize])
            } else {
                u32::from(DEFAULT_WIDTH)
            }
        })
        .sum();
    f64::from(units) * size / 1000.0
}

/// Greedy word wrap to `max_width` points. Words longer than the line are
/// emitted on their own line rather than split.
pub fn wrap_text(text: &str, size: f64, max_width: f64) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();

    for word in text.split_whitespace() {
        let candidate = if line.is_empty() {
            word.to_string()
        } else {
            format!("{line} {word}")
        };
        if text_width(&candidate, size) <= max_width || line.is_empty() {
            line = candidate;
        } else {
            lines.push(line);
            line = word.to_string();
        }
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn space_width_matches_afm() {
        assert!((text_width(" ", 1000.0) - 278.0).abs() < f64::EPSILON);
    }

    #[test]
    fn wider_text_measures_wider() {
        assert!(text_width("WWW", 12.0) > text_width("iii", 12.0));
    }

    #[test]
    fn wrap_keeps_words_whole() {
        let lines = wrap_text("alpha beta gamma", 12.0, text_width("alpha beta", 12.0));
        assert_eq!(lines, ["alpha beta", "gamma"]);
    }

    #[test]
    fn wrap_of_fitting_text_is_one_line() {
        assert_eq!(wrap_text("short", 12.0, 500.0), ["short"]);
    }
}
