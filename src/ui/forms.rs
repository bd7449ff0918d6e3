use anyhow::{anyhow, Result};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

/// Longest page input accepted. `u32::MAX` has ten digits.
const MAX_PAGE_DIGITS: usize = 10;

/// Input state for the "go to page" prompt.
#[derive(Default, Clone)]
pub(crate) struct PageForm {
    pub(crate) page: String,
    pub(crate) max_page: u32,
    pub(crate) error: Option<String>,
}

impl PageForm {
    /// Start an empty prompt that accepts pages `1..=max_page`.
    pub(crate) fn with_max(max_page: u32) -> Self {
        Self {
            max_page: max_page.max(1),
            ..Self::default()
        }
    }

    /// Append a digit. Anything else, or input past ten digits, is refused.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_ascii_digit() && self.page.len() < MAX_PAGE_DIGITS {
            self.page.push(ch);
            true
        } else {
            false
        }
    }

    pub(crate) fn backspace(&mut self) {
        self.page.pop();
    }

    /// Validate the input and return the requested 1-based page.
    pub(crate) fn parse_page(&self) -> Result<u32> {
        let raw = self.page.trim();
        if raw.is_empty() {
            return Err(anyhow!("Page number is required."));
        }
        let page = raw
            .parse::<u32>()
            .map_err(|_| anyhow!("Page number is too large."))?;
        if page == 0 || page > self.max_page {
            return Err(anyhow!("Page must be between 1 and {}.", self.max_page));
        }
        Ok(page)
    }

    pub(crate) fn build_line(&self) -> Line<'static> {
        let (display, style) = if self.page.is_empty() {
            (
                format!("1-{}", self.max_page),
                Style::default().fg(Color::DarkGray),
            )
        } else {
            (self.page.clone(), Style::default().fg(Color::Yellow))
        };
        Line::from(vec![Span::raw("Page: "), Span::styled(display, style)])
    }

    pub(crate) fn value_len(&self) -> usize {
        self.page.chars().count()
    }
}

/// State for confirming that every selection should be dropped.
pub(crate) struct ConfirmClearAll {
    pub(crate) count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::helpers::surface_error;

    #[test]
    fn only_digits_are_accepted() {
        let mut form = PageForm::with_max(12);
        assert!(form.push_char('1'));
        assert!(!form.push_char('x'));
        assert!(form.push_char('2'));
        assert_eq!(form.page, "12");
        assert_eq!(form.parse_page().expect("page in range"), 12);

        form.backspace();
        assert_eq!(form.parse_page().expect("page in range"), 1);
    }

    #[test]
    fn out_of_range_pages_are_rejected() {
        let mut form = PageForm::with_max(3);
        assert!(form.parse_page().is_err());

        form.push_char('0');
        assert!(form.parse_page().is_err());

        form.page = "4".to_string();
        assert!(form.parse_page().is_err());

        form.page = "99999999999".to_string();
        assert!(form.parse_page().is_err());
    }

    #[test]
    fn oversized_page_reports_a_readable_message() {
        let mut form = PageForm::with_max(3);
        form.page = "99999999999".to_string();
        let err = form.parse_page().expect_err("page does not fit");
        assert_eq!(surface_error(&err), "Page number is too large.");
    }

    #[test]
    fn input_is_capped_at_ten_digits() {
        let mut form = PageForm::with_max(u32::MAX);
        for _ in 0..10 {
            assert!(form.push_char('9'));
        }
        assert!(!form.push_char('9'));
        assert_eq!(form.value_len(), 10);
    }
}
