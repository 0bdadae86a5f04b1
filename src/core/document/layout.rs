use super::{Align, Block, PageSize, TableStyle, NBSP};

const PT_TO_MM: f32 = 25.4 / 72.0;
const BODY_FONT_PT: f32 = 10.0;
const LEADING_FACTOR: f32 = 1.2;
/// Average Helvetica advance as a fraction of the font size
const AVG_CHAR_EM: f32 = 0.5;
const CELL_PAD_X_MM: f32 = 1.5;
const CELL_PAD_Y_MM: f32 = 0.8;
const HEADER_GRAY: f32 = 0.5;

#[derive(Debug, Clone, Copy)]
pub(super) struct PageGeometry {
    pub width: f32,
    pub height: f32,
    pub margin: f32,
}

impl PageGeometry {
    pub fn new(page_size: PageSize, margin: f32) -> Self {
        let (width, height) = page_size.dimensions_mm();
        Self {
            width,
            height,
            margin,
        }
    }

    pub fn frame_width(&self) -> f32 {
        self.width - 2.0 * self.margin
    }

    pub fn frame_height(&self) -> f32 {
        self.height - 2.0 * self.margin
    }

    fn top(&self) -> f32 {
        self.height - self.margin
    }

    fn bottom(&self) -> f32 {
        self.margin
    }
}

/// Positioned drawing operation, coordinates in mm from the bottom-left
#[derive(Debug, Clone, PartialEq)]
pub(super) enum Op {
    Text {
        x: f32,
        y: f32,
        size_pt: f32,
        text: String,
    },
    Rule {
        from: (f32, f32),
        to: (f32, f32),
    },
    Fill {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        gray: f32,
    },
    Image {
        block: usize,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    },
}

#[derive(Debug, Clone, Default)]
pub(super) struct Page {
    pub ops: Vec<Op>,
}

fn char_width(size_pt: f32) -> f32 {
    size_pt * AVG_CHAR_EM * PT_TO_MM
}

fn leading(size_pt: f32) -> f32 {
    size_pt * LEADING_FACTOR * PT_TO_MM
}

fn text_width(text: &str, size_pt: f32) -> f32 {
    text.chars().count() as f32 * char_width(size_pt)
}

/// Flow cursor over a growing list of pages
struct Cursor<'g> {
    geometry: &'g PageGeometry,
    pages: Vec<Page>,
    y: f32,
}

impl<'g> Cursor<'g> {
    fn new(geometry: &'g PageGeometry) -> Self {
        Self {
            geometry,
            pages: vec![Page::default()],
            y: geometry.top(),
        }
    }

    fn at_page_top(&self) -> bool {
        (self.y - self.geometry.top()).abs() < f32::EPSILON
    }

    fn new_page(&mut self) {
        self.pages.push(Page::default());
        self.y = self.geometry.top();
    }

    /// Start a new page unless `height` still fits on this one
    fn reserve(&mut self, height: f32) {
        if self.y - height < self.geometry.bottom() && !self.at_page_top() {
            self.new_page();
        }
    }

    fn push(&mut self, op: Op) {
        if let Some(page) = self.pages.last_mut() {
            page.ops.push(op);
        }
    }
}

pub(super) fn layout(geometry: &PageGeometry, blocks: &[Block]) -> Vec<Page> {
    let mut cursor = Cursor::new(geometry);

    for (index, block) in blocks.iter().enumerate() {
        match block {
            Block::Paragraph { lines } => layout_paragraph(&mut cursor, lines),
            Block::Image {
                align,
                width_mm,
                height_mm,
                ..
            } => layout_image(&mut cursor, index, *align, *width_mm, *height_mm),
            Block::Table { rows, style } => layout_table(&mut cursor, rows, *style),
            Block::PageBreak => {
                if !cursor.at_page_top() {
                    cursor.new_page();
                }
            }
        }
    }

    cursor.pages
}

fn layout_paragraph(cursor: &mut Cursor<'_>, lines: &[String]) {
    let size = BODY_FONT_PT;
    let line_height = leading(size);
    let max_chars = (cursor.geometry.frame_width() / char_width(size)).floor().max(1.0) as usize;
    let x = cursor.geometry.margin;

    for line in lines {
        for visual in wrap_line(line, max_chars) {
            cursor.reserve(line_height);
            let baseline = cursor.y - size * PT_TO_MM;
            if !visual.trim_matches(|c: char| c == ' ' || c == NBSP).is_empty() {
                cursor.push(Op::Text {
                    x,
                    y: baseline,
                    size_pt: size,
                    text: visual,
                });
            }
            cursor.y -= line_height;
        }
    }
}

/// Word-wrap on spaces; words longer than a line are split
pub(super) fn wrap_line(line: &str, max_chars: usize) -> Vec<String> {
    if line.chars().count() <= max_chars {
        return vec![line.to_string()];
    }

    let mut out = Vec::new();
    let mut current = String::new();
    for word in line.split(' ') {
        let mut word: Vec<char> = word.chars().collect();
        loop {
            let used = current.chars().count();
            let sep = usize::from(used > 0);
            if used + sep + word.len() <= max_chars {
                if sep == 1 {
                    current.push(' ');
                }
                current.extend(word.iter());
                break;
            }
            if used > 0 {
                out.push(std::mem::take(&mut current));
                continue;
            }
            let rest = word.split_off(max_chars);
            out.push(word.into_iter().collect());
            word = rest;
        }
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

fn layout_image(cursor: &mut Cursor<'_>, block: usize, align: Align, width: f32, height: f32) {
    let geometry = cursor.geometry;
    let scale = (geometry.frame_width() / width)
        .min(geometry.frame_height() / height)
        .min(1.0);
    let (width, height) = (width * scale, height * scale);

    cursor.reserve(height);
    let x = match align {
        Align::Left => geometry.margin,
        Align::Center => geometry.margin + (geometry.frame_width() - width) / 2.0,
        Align::Right => geometry.margin + geometry.frame_width() - width,
    };
    cursor.push(Op::Image {
        block,
        x,
        y: cursor.y - height,
        width,
        height,
    });
    cursor.y -= height;
}

fn layout_table(cursor: &mut Cursor<'_>, rows: &[Vec<String>], style: TableStyle) {
    let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
    if columns == 0 {
        return;
    }

    let natural: Vec<usize> = (0..columns)
        .map(|c| {
            rows.iter()
                .filter_map(|row| row.get(c))
                .map(|cell| cell.chars().count())
                .max()
                .unwrap_or(0)
        })
        .collect();

    // Shrink the font so the table fits the frame
    let frame = cursor.geometry.frame_width();
    let padding = 2.0 * CELL_PAD_X_MM * columns as f32;
    let chars: usize = natural.iter().sum();
    let mut size = BODY_FONT_PT;
    if chars > 0 && chars as f32 * char_width(size) + padding > frame {
        size = (frame - padding).max(0.0) / (chars as f32 * char_width(1.0));
    }
    let widths: Vec<f32> = natural
        .iter()
        .map(|n| *n as f32 * char_width(size) + 2.0 * CELL_PAD_X_MM)
        .collect();
    let table_width: f32 = widths.iter().sum();
    let left = cursor.geometry.margin + (frame - table_width).max(0.0) / 2.0;
    let row_height = leading(size) + 2.0 * CELL_PAD_Y_MM;

    for (r, row) in rows.iter().enumerate() {
        cursor.reserve(row_height);
        let top = cursor.y;
        let bottom = top - row_height;

        if style == TableStyle::Grid && r == 0 {
            cursor.push(Op::Fill {
                x: left,
                y: bottom,
                width: table_width,
                height: row_height,
                gray: HEADER_GRAY,
            });
        }

        let mut x = left;
        for (c, width) in widths.iter().enumerate() {
            let cell = row.get(c).map(String::as_str).unwrap_or("");
            if !cell.is_empty() {
                let text_x = match style {
                    TableStyle::Grid => x + (width - text_width(cell, size)) / 2.0,
                    TableStyle::Plain => x + CELL_PAD_X_MM,
                };
                cursor.push(Op::Text {
                    x: text_x,
                    y: top - CELL_PAD_Y_MM - size * PT_TO_MM,
                    size_pt: size,
                    text: cell.to_string(),
                });
            }
            x += width;
        }

        if style == TableStyle::Grid {
            let right = left + table_width;
            cursor.push(Op::Rule {
                from: (left, top),
                to: (right, top),
            });
            cursor.push(Op::Rule {
                from: (left, bottom),
                to: (right, bottom),
            });
            let mut x = left;
            cursor.push(Op::Rule {
                from: (x, top),
                to: (x, bottom),
            });
            for width in &widths {
                x += width;
                cursor.push(Op::Rule {
                    from: (x, top),
                    to: (x, bottom),
                });
            }
        }

        cursor.y = bottom;
    }
}
