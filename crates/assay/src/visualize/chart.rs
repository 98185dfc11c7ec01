//! Horizontal text bar charts.

use serde::Serialize;

use crate::error::{AssayError, Result};

/// Narrowest bar area a chart can be drawn in.
pub const MIN_BAR_WIDTH: usize = 10;

/// Widest bar area a chart can be drawn in.
pub const MAX_BAR_WIDTH: usize = 200;

const BAR: &str = "█";

/// Layout settings for rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartStyle {
    /// Width of the longest bar, in characters.
    pub width: usize,
    /// Labels longer than this are truncated.
    pub label_width: usize,
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self {
            width: 40,
            label_width: 24,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bar {
    pub label: String,
    pub height: usize,
}

/// A labeled bar chart: one bar per value, height = frequency.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarChart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub bars: Vec<Bar>,
}

impl BarChart {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            x_label: "Value".to_string(),
            y_label: "Frequency".to_string(),
            bars: Vec::new(),
        }
    }

    pub fn with_bar(mut self, label: impl Into<String>, height: usize) -> Self {
        self.bars.push(Bar {
            label: label.into(),
            height,
        });
        self
    }

    /// Draw the chart as text.
    pub fn render(&self, style: ChartStyle) -> Result<String> {
        if self.bars.is_empty() {
            return Err(AssayError::Render(format!("'{}' has no values", self.title)));
        }
        if !(MIN_BAR_WIDTH..=MAX_BAR_WIDTH).contains(&style.width) {
            return Err(AssayError::Render(format!(
                "bar width {} is outside {}..={}",
                style.width, MIN_BAR_WIDTH, MAX_BAR_WIDTH
            )));
        }

        let labels: Vec<String> = self
            .bars
            .iter()
            .map(|bar| fit_label(&bar.label, style.label_width))
            .collect();
        let label_width = labels
            .iter()
            .map(|l| l.chars().count())
            .max()
            .unwrap_or(0)
            .max(self.x_label.chars().count());
        let tallest = self.bars.iter().map(|b| b.height).max().unwrap_or(0);

        let mut out = String::new();
        out.push_str(&self.title);
        out.push('\n');
        out.push_str(&format!(
            "{:<label_width$} | {}\n",
            self.x_label, self.y_label
        ));

        for (bar, label) in self.bars.iter().zip(&labels) {
            let length = if tallest == 0 {
                0
            } else {
                // every non-zero bar stays visible
                (bar.height as f64 * style.width as f64 / tallest as f64).round().max(1.0) as usize
            };
            let padding = label_width - label.chars().count();
            out.push_str(label);
            out.push_str(&" ".repeat(padding));
            out.push_str(" | ");
            out.push_str(&BAR.repeat(length));
            out.push_str(&format!(" {}\n", bar.height));
        }

        Ok(out)
    }
}

/// Replace control characters and cut the label to `max` characters.
fn fit_label(label: &str, max: usize) -> String {
    let cleaned: String = label
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect();
    let cleaned = if cleaned.trim().is_empty() && !label.is_empty() {
        "(blank)".to_string()
    } else {
        cleaned
    };

    if cleaned.chars().count() <= max {
        cleaned
    } else {
        let keep = max.saturating_sub(1);
        let mut cut: String = cleaned.chars().take(keep).collect();
        cut.push('…');
        cut
    }
}
