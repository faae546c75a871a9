//! PDF composition with `genpdf`.

use bytes::Bytes;
use genpdf::elements::{Break, Paragraph};
use genpdf::fonts::{FontData, FontFamily};
use genpdf::style::{Style, StyledString};
use tracing::debug;

use docreg_core::config::RenderConfig;
use docreg_core::error::AppError;
use docreg_core::result::AppResult;
use docreg_core::traits::pdf::PdfRenderer;
use docreg_core::types::RenderedContent;

/// Emphasis of a run of markup text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Emphasis {
    /// No emphasis.
    Regular,
    /// `<b>...</b>`.
    Bold,
    /// `<i>...</i>`.
    Italic,
}

/// Renders [`RenderedContent`] to PDF bytes.
///
/// Layout content is typeset line by line, keeping its line structure.
/// Markup content honours `<br>` line breaks and `<b>`/`<i>` emphasis.
#[derive(Debug, Clone)]
pub struct GenPdfRenderer {
    fonts: FontFamily<FontData>,
    title: String,
    font_size: u8,
    margins_mm: u8,
}

impl GenPdfRenderer {
    /// Load the configured font family from disk.
    pub fn new(config: &RenderConfig) -> AppResult<Self> {
        let fonts = genpdf::fonts::from_files(&config.font_dir, &config.font_family, None)
            .map_err(|e| {
                AppError::render(format!(
                    "Failed to load font family '{}' from {}: {e}",
                    config.font_family, config.font_dir
                ))
            })?;
        Ok(Self {
            fonts,
            title: config.title.clone(),
            font_size: config.font_size,
            margins_mm: config.margins_mm,
        })
    }

    fn document(&self) -> genpdf::Document {
        let mut doc = genpdf::Document::new(self.fonts.clone());
        doc.set_title(self.title.clone());
        doc.set_font_size(self.font_size);
        doc.set_line_spacing(1.2);

        let mut decorator = genpdf::SimplePageDecorator::new();
        decorator.set_margins(i32::from(self.margins_mm));
        doc.set_page_decorator(decorator);
        doc
    }
}

impl PdfRenderer for GenPdfRenderer {
    fn backend(&self) -> &str {
        "genpdf"
    }

    fn render(&self, content: &RenderedContent) -> AppResult<Bytes> {
        let mut doc = self.document();

        match content {
            RenderedContent::Layout { text, .. } => {
                for line in text.lines() {
                    if line.trim().is_empty() {
                        doc.push(Break::new(1));
                    } else {
                        doc.push(Paragraph::new(line));
                    }
                }
            }
            RenderedContent::Markup { text } => {
                for line in markup_lines(text) {
                    if line.trim().is_empty() {
                        doc.push(Break::new(1));
                        continue;
                    }
                    let mut paragraph = Paragraph::new("");
                    for (run, emphasis) in styled_runs(&line) {
                        let style = match emphasis {
                            Emphasis::Regular => Style::new(),
                            Emphasis::Bold => Style::new().bold(),
                            Emphasis::Italic => Style::new().italic(),
                        };
                        paragraph.push(StyledString::new(run, style));
                    }
                    doc.push(paragraph);
                }
            }
        }

        let mut buffer = Vec::new();
        doc.render(&mut buffer)
            .map_err(|e| AppError::render(format!("PDF composition failed: {e}")))?;
        debug!(bytes = buffer.len(), layout = content.is_layout(), "Composed PDF");
        Ok(Bytes::from(buffer))
    }
}

/// Split markup into lines on newlines and `<br>` tags.
pub fn markup_lines(text: &str) -> Vec<String> {
    text.replace("<br />", "\n")
        .replace("<br/>", "\n")
        .replace("<br>", "\n")
        .lines()
        .map(str::to_string)
        .collect()
}

/// Split one markup line into emphasis runs.
///
/// An opening tag without its closing tag is kept as literal text.
pub fn styled_runs(line: &str) -> Vec<(String, Emphasis)> {
    let mut runs = Vec::new();
    let mut rest = line;

    while let Some((start, open, close, emphasis)) = next_tag(rest) {
        let inner_start = start + open.len();
        let Some(len) = rest[inner_start..].find(close) else {
            break;
        };
        if start > 0 {
            runs.push((rest[..start].to_string(), Emphasis::Regular));
        }
        runs.push((rest[inner_start..inner_start + len].to_string(), emphasis));
        rest = &rest[inner_start + len + close.len()..];
    }

    if !rest.is_empty() {
        runs.push((rest.to_string(), Emphasis::Regular));
    }
    runs
}

fn next_tag(text: &str) -> Option<(usize, &'static str, &'static str, Emphasis)> {
    let bold = text.find("<b>").map(|i| (i, "<b>", "</b>", Emphasis::Bold));
    let italic = text.find("<i>").map(|i| (i, "<i>", "</i>", Emphasis::Italic));
    match (bold, italic) {
        (Some(b), Some(i)) => Some(if b.0 < i.0 { b } else { i }),
        (found, None) | (None, found) => found,
    }
}

#[cfg(test)]
mod tests {
    use docreg_core::error::ErrorKind;

    use super::*;

    #[test]
    fn test_markup_lines_split_on_br() {
        assert_eq!(
            markup_lines("Dear Ana,<br>Line two<br/>\nLast"),
            vec!["Dear Ana,", "Line two", "", "Last"]
        );
    }

    #[test]
    fn test_styled_runs() {
        assert_eq!(
            styled_runs("Re: <b>Budget</b> for <i>2024</i>."),
            vec![
                ("Re: ".to_string(), Emphasis::Regular),
                ("Budget".to_string(), Emphasis::Bold),
                (" for ".to_string(), Emphasis::Regular),
                ("2024".to_string(), Emphasis::Italic),
                (".".to_string(), Emphasis::Regular),
            ]
        );
    }

    #[test]
    fn test_unclosed_tag_is_literal() {
        assert_eq!(
            styled_runs("a <b>b"),
            vec![("a <b>b".to_string(), Emphasis::Regular)]
        );
    }

    #[test]
    fn test_missing_fonts_is_render_error() {
        let dir = std::env::temp_dir().join("docreg-no-fonts-here");
        let config = RenderConfig {
            font_dir: dir.to_string_lossy().into_owned(),
            ..RenderConfig::default()
        };
        let err = GenPdfRenderer::new(&config).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Render);
    }
}
