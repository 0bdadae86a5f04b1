//! Paginated PDF assembly from an ordered list of content blocks.

mod layout;
mod logo;
mod render;

pub use logo::{fetch_logo, DEFAULT_LOGO_URL};

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{DateTime, Local};
use log::info;
use serde::{Deserialize, Serialize};

use crate::error::{ReportError, Result};

pub(crate) const MM_PER_INCH: f32 = 25.4;
const MARGIN_INCHES: f32 = 0.5;
const TAB_WIDTH: usize = 4;
pub(crate) const NBSP: char = '\u{a0}';
#[cfg(unix)]
const REPORT_FILE_MODE: u32 = 0o644;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageSize {
    #[default]
    A4,
    Letter,
}

impl PageSize {
    /// (width, height) in millimetres
    pub fn dimensions_mm(&self) -> (f32, f32) {
        match self {
            PageSize::A4 => (210.0, 297.0),
            PageSize::Letter => (215.9, 279.4),
        }
    }
}

impl FromStr for PageSize {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "a4" => Ok(PageSize::A4),
            "letter" => Ok(PageSize::Letter),
            other => Err(ReportError::config(format!(
                "unknown page size '{}' (expected a4 or letter)",
                other
            ))),
        }
    }
}

impl fmt::Display for PageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageSize::A4 => write!(f, "a4"),
            PageSize::Letter => write!(f, "letter"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    Left,
    #[default]
    Center,
    Right,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ImageSource {
    File(PathBuf),
    Bytes(Vec<u8>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableStyle {
    /// Full grid, centred cells, shaded header row
    Grid,
    /// No border or shading
    Plain,
}

/// One renderable unit of the document
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Paragraph {
        lines: Vec<String>,
    },
    Image {
        source: ImageSource,
        align: Align,
        width_mm: f32,
        height_mm: f32,
    },
    Table {
        rows: Vec<Vec<String>>,
        style: TableStyle,
    },
    PageBreak,
}

impl Block {
    /// Paragraph text with line breaks restored
    pub fn text(&self) -> Option<String> {
        match self {
            Block::Paragraph { lines } => Some(lines.join("\n")),
            _ => None,
        }
    }

    pub fn is_image(&self) -> bool {
        matches!(self, Block::Image { .. })
    }

    pub fn is_table(&self) -> bool {
        matches!(self, Block::Table { .. })
    }
}

/// Template bound to one output file, page size and margins
///
/// `build` consumes the builder, so a template writes at most one document.
#[derive(Debug)]
pub struct DocumentBuilder {
    output_path: PathBuf,
    page_size: PageSize,
    margin_mm: f32,
}

impl DocumentBuilder {
    /// e.g. `Hardware_Report_01_08_2022_11_19_56.pdf` inside `output_dir`
    pub fn create_template(
        generated_at: &DateTime<Local>,
        page_size: PageSize,
        output_dir: &Path,
    ) -> Self {
        let file_name = format!(
            "Hardware_Report_{}.pdf",
            generated_at.format("%d_%m_%Y_%H_%M_%S")
        );
        Self {
            output_path: output_dir.join(file_name),
            page_size,
            margin_mm: MARGIN_INCHES * MM_PER_INCH,
        }
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// Page width less one inch of margin
    pub fn default_image_width_mm(&self) -> f32 {
        self.page_size.dimensions_mm().0 - MM_PER_INCH
    }

    /// Paragraph with `\n` as line breaks and `\t` as fixed-width indentation.
    ///
    /// Runs of ordinary whitespace collapse to one space and each line is
    /// trimmed, the way a paragraph renderer treats source text.
    pub fn format_text(text: &str) -> Block {
        let indent: String = std::iter::repeat(NBSP).take(TAB_WIDTH).collect();
        let lines = text
            .split('\n')
            .map(|line| {
                line.split(|c: char| c == ' ' || c == '\r')
                    .filter(|word| !word.is_empty())
                    .collect::<Vec<_>>()
                    .join(" ")
                    .replace('\t', &indent)
            })
            .collect();
        Block::Paragraph { lines }
    }

    /// Centred image at the default width, 8:12 aspect
    pub fn format_image(&self, path: impl Into<PathBuf>) -> Block {
        let width = self.default_image_width_mm();
        self.format_image_with(
            ImageSource::File(path.into()),
            Align::Center,
            width,
            width * (8.0 / 12.0),
        )
    }

    pub fn format_image_with(
        &self,
        source: ImageSource,
        align: Align,
        width_mm: f32,
        height_mm: f32,
    ) -> Block {
        Block::Image {
            source,
            align,
            width_mm,
            height_mm,
        }
    }

    pub fn format_table(rows: Vec<Vec<String>>) -> Block {
        Block::Table {
            rows,
            style: TableStyle::Grid,
        }
    }

    /// Table without grid or shading, for dense key/value listings
    pub fn unformatted_table(rows: Vec<Vec<String>>) -> Block {
        Block::Table {
            rows,
            style: TableStyle::Plain,
        }
    }

    pub fn page_break() -> Block {
        Block::PageBreak
    }

    /// Lay out `blocks` in order and write the PDF. The file only appears
    /// once the whole document has been produced.
    pub fn build(self, blocks: Vec<Block>) -> Result<PathBuf> {
        let geometry = layout::PageGeometry::new(self.page_size, self.margin_mm);
        let pages = layout::layout(&geometry, &blocks);
        let bytes = render::render_pdf(&geometry, &pages, &blocks, "Computer Hardware Report")?;

        let dir = match self.output_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let mut staging = tempfile::Builder::new();
        staging.prefix(".hwreport-").suffix(".pdf");
        // Staged files default to 0600; the report is an ordinary file
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            staging.permissions(std::fs::Permissions::from_mode(REPORT_FILE_MODE));
        }
        let mut staged = staging.tempfile_in(&dir)?;
        std::io::Write::write_all(&mut staged, &bytes)?;
        staged
            .persist(&self.output_path)
            .map_err(|e| ReportError::Io(e.error))?;

        info!(
            "Wrote {} ({} pages)",
            self.output_path.display(),
            pages.len()
        );
        Ok(self.output_path)
    }
}
