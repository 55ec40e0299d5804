/// Indentation style used when serializing and classifying nested blocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndentStyle {
    /// Number of spaces per indent level.
    Spaces(usize),
    /// Tab characters.
    Tabs,
}

impl IndentStyle {
    /// One unit of indentation as literal text.
    pub fn unit(&self) -> String {
        match self {
            IndentStyle::Tabs => "\t".to_string(),
            IndentStyle::Spaces(n) => " ".repeat(*n),
        }
    }

    /// Convert a line's leading whitespace to a depth level.
    pub fn calculate_depth(&self, line: &str) -> usize {
        match self {
            IndentStyle::Tabs => line.chars().take_while(|&c| c == '\t').count(),
            IndentStyle::Spaces(per_level) => {
                let spaces = line.chars().take_while(|&c| c == ' ').count();
                if *per_level == 0 { 0 } else { spaces / per_level }
            }
        }
    }

    /// Detect the indent style from a document: the first non-zero
    /// indentation wins. Defaults to two spaces.
    pub fn detect(source: &str) -> IndentStyle {
        for line in source.lines() {
            if line.trim().is_empty() {
                continue;
            }
            if line.starts_with('\t') {
                return IndentStyle::Tabs;
            }
            let spaces = line.chars().take_while(|&c| c == ' ').count();
            if spaces > 0 {
                return IndentStyle::Spaces(spaces);
            }
        }
        IndentStyle::Spaces(2)
    }
}

impl Default for IndentStyle {
    fn default() -> Self {
        IndentStyle::Spaces(2)
    }
}

/// Runtime-wide configuration shared with extensions through the parse,
/// serialize and edit contexts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuntimeConfig {
    pub indent: IndentStyle,
}

impl RuntimeConfig {
    pub fn with_indent(indent: IndentStyle) -> Self {
        Self { indent }
    }

    /// Configuration matching the indentation already used in `source`.
    pub fn detect(source: &str) -> Self {
        Self {
            indent: IndentStyle::detect(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn detect_four_space_indent() {
        let style = IndentStyle::detect("- item\n    - nested\n");
        assert_eq!(style, IndentStyle::Spaces(4));
    }

    #[test]
    fn detect_first_indent_wins() {
        let style = IndentStyle::detect("- a\n  - two\n    - four\n");
        assert_eq!(style, IndentStyle::Spaces(2));
    }

    #[test]
    fn detect_tabs() {
        let style = IndentStyle::detect("- a\n\t- tabbed\n");
        assert_eq!(style, IndentStyle::Tabs);
    }

    #[test]
    fn detect_defaults_to_two_spaces() {
        assert_eq!(IndentStyle::detect("- a\n- b\n"), IndentStyle::Spaces(2));
        assert_eq!(IndentStyle::detect(""), IndentStyle::Spaces(2));
    }

    #[rstest]
    #[case(IndentStyle::Spaces(2), "- item", 0)]
    #[case(IndentStyle::Spaces(2), "  - item", 1)]
    #[case(IndentStyle::Spaces(2), "    - item", 2)]
    #[case(IndentStyle::Spaces(4), "    - item", 1)]
    #[case(IndentStyle::Tabs, "\t\t- item", 2)]
    fn depth_calculation(#[case] style: IndentStyle, #[case] line: &str, #[case] depth: usize) {
        assert_eq!(style.calculate_depth(line), depth);
    }
}
