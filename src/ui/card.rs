//! Card container.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardVariant {
    #[default]
    Default,
    Elevated,
    Outlined,
}

/// Box-drawing characters for a terminal card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Border {
    pub top_left: char,
    pub top_right: char,
    pub bottom_left: char,
    pub bottom_right: char,
    pub horizontal: char,
    pub vertical: char,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardStyle {
    /// Variant classes as the web client applied them.
    pub class: &'static str,
    /// `None` renders an unframed, indented block.
    pub border: Option<Border>,
}

const LIGHT: Border = Border {
    top_left: '┌',
    top_right: '┐',
    bottom_left: '└',
    bottom_right: '┘',
    horizontal: '─',
    vertical: '│',
};

const HEAVY: Border = Border {
    top_left: '┏',
    top_right: '┓',
    bottom_left: '┗',
    bottom_right: '┛',
    horizontal: '━',
    vertical: '┃',
};

impl CardVariant {
    #[must_use]
    pub fn style(self) -> CardStyle {
        match self {
            Self::Default => CardStyle { class: "bg-card", border: None },
            Self::Elevated => CardStyle { class: "bg-card shadow-lg shadow-black/5", border: Some(HEAVY) },
            Self::Outlined => CardStyle { class: "bg-transparent border border-border", border: Some(LIGHT) },
        }
    }
}

/// Render `title` and `body` as a block of text.
#[must_use]
pub fn render_card(title: &str, body: &str, variant: CardVariant) -> String {
    let mut lines: Vec<&str> = vec![title];
    if !body.is_empty() {
        lines.push("");
        lines.extend(body.lines());
    }

    let Some(border) = variant.style().border else {
        return lines
            .iter()
            .map(|line| if line.is_empty() { String::new() } else { format!("  {line}") })
            .collect::<Vec<_>>()
            .join("\n");
    };

    let width = lines.iter().map(|line| line.chars().count()).max().unwrap_or(0);
    let rule: String = std::iter::repeat_n(border.horizontal, width + 2).collect();
    let mut out = Vec::with_capacity(lines.len() + 2);
    out.push(format!("{}{rule}{}", border.top_left, border.top_right));
    for line in lines {
        let pad = width - line.chars().count();
        out.push(format!("{v} {line}{} {v}", " ".repeat(pad), v = border.vertical));
    }
    out.push(format!("{}{rule}{}", border.bottom_left, border.bottom_right));
    out.join("\n")
}

#[cfg(test)]
#[path = "card_test.rs"]
mod tests;
