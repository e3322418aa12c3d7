use std::{borrow::Cow, fmt::Write};

const FONT_SIZE: u32 = 14;
const CAPTION_FONT_SIZE: u32 = 16;
const CELL_PADDING: u32 = 10;
const LINE_HEIGHT: u32 = FONT_SIZE + CELL_PADDING * 2;
const HEADER_BG: &str = "#2f855a";
const HEADER_TEXT: &str = "#ffffff";
const ROW_BG_EVEN: &str = "#f7fafc";
const ROW_BG_ODD: &str = "#edf2f7";
const FOOTER_BG: &str = "#c6f6d5";
const ROW_TEXT: &str = "#1a202c";
const BORDER_COLOR: &str = "#cbd5e0";
const PAGE_BG: &str = "#ffffff";
const FONT_FAMILY: &str = "Noto Sans";
const CHAR_WIDTH: f32 = 8.5;

/// Table rendered as a standalone SVG document.
///
/// Footer rows are drawn after the body in bold on a tinted background, which
/// is where totals go.
#[derive(Default)]
pub struct SvgTableBuilder<'a, Seq> {
    caption: Option<Cow<'a, str>>,
    headers: &'a [Cow<'a, str>],
    rows: Vec<Seq>,
    footer: Vec<Seq>,
    alignments: Cow<'a, [Alignment]>,
}

#[derive(Clone, Copy, Default)]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

#[derive(Clone, Copy)]
enum RowKind {
    Body(usize),
    Footer,
}

impl<'a, Seq> SvgTableBuilder<'a, Seq>
where
    Seq: AsRef<[Cow<'a, str>]> + Default,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn caption(mut self, caption: impl Into<Cow<'a, str>>) -> Self {
        self.caption = Some(caption.into());
        self
    }

    pub fn alignments(mut self, alignments: &'a [Alignment]) -> Self {
        self.alignments = Cow::Borrowed(alignments);
        self
    }

    pub fn headers(mut self, headers: &'a [Cow<'a, str>]) -> Self {
        self.headers = headers;
        if self.alignments.is_empty() {
            self.alignments = Cow::Owned(vec![Alignment::default(); self.headers.len()]);
        }
        self
    }

    pub fn row(mut self, row: Seq) -> Self {
        self.rows.push(row);
        self
    }

    pub fn rows(mut self, rows: impl IntoIterator<Item = Seq>) -> Self {
        self.rows.extend(rows);
        self
    }

    pub fn footer_row(mut self, row: Seq) -> Self {
        self.footer.push(row);
        self
    }

    pub fn build(self) -> String {
        let col_count = self.headers.len();
        if col_count == 0 {
            return String::new();
        }

        let mut col_widths: Vec<u32> = self
            .headers
            .iter()
            .map(|h| estimate_text_width(h))
            .collect();

        for row in self.rows.iter().chain(&self.footer) {
            for (width, cell) in col_widths.iter_mut().zip(row.as_ref()) {
                *width = (*width).max(estimate_text_width(cell));
            }
        }

        let table_width: u32 =
            col_widths.iter().sum::<u32>() + (col_count as u32 + 1) * CELL_PADDING;
        let caption_height = if self.caption.is_some() { LINE_HEIGHT } else { 0 };
        let caption_width = self
            .caption
            .as_deref()
            .map(|caption| estimate_text_width(caption) + CELL_PADDING)
            .unwrap_or(0);
        let total_width = table_width.max(caption_width);
        let row_count = 1 + self.rows.len() as u32 + self.footer.len() as u32;
        let total_height: u32 = caption_height + LINE_HEIGHT * row_count + 2;

        let mut svg = String::with_capacity(4096);
        let _ = writeln!(
            &mut svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{total_width}" height="{total_height}" viewBox="0 0 {total_width} {total_height}">"#
        );
        let _ = writeln!(
            &mut svg,
            r#"<style>text {{ font-family: {FONT_FAMILY}; font-size: {FONT_SIZE}px; }}</style>"#
        );

        if let Some(caption) = &self.caption {
            let _ = writeln!(
                &mut svg,
                r#"<text x="{CELL_PADDING}" y="{}" fill="{ROW_TEXT}" font-size="{CAPTION_FONT_SIZE}" font-weight="bold">{}</text>"#,
                LINE_HEIGHT / 2 + CAPTION_FONT_SIZE / 2 - 2,
                escape_xml(caption)
            );
        }

        let _ = writeln!(
            &mut svg,
            r#"<rect y="{caption_height}" width="{table_width}" height="{}" fill="{BORDER_COLOR}" rx="4" />"#,
            total_height - caption_height
        );
        let _ = writeln!(
            &mut svg,
            r#"<rect x="1" y="{}" width="{}" height="{LINE_HEIGHT}" fill="{HEADER_BG}" rx="3" />"#,
            caption_height + 1,
            table_width - 2
        );

        let layout = RowLayout {
            col_widths: &col_widths,
            alignments: &self.alignments,
            table_width,
        };
        layout.write_cells(&mut svg, self.headers, caption_height, HEADER_TEXT, false);

        let body_top = caption_height + LINE_HEIGHT + 1;
        let kinds = (0..self.rows.len())
            .map(RowKind::Body)
            .chain(std::iter::repeat_n(RowKind::Footer, self.footer.len()));
        for (offset, (kind, row)) in kinds.zip(self.rows.iter().chain(&self.footer)).enumerate() {
            let y = body_top + LINE_HEIGHT * offset as u32;
            layout.write_row(&mut svg, kind, row.as_ref(), y);
        }

        svg.push_str("</svg>");
        svg
    }
}

struct RowLayout<'a> {
    col_widths: &'a [u32],
    alignments: &'a [Alignment],
    table_width: u32,
}

impl RowLayout<'_> {
    fn write_row(&self, svg: &mut String, kind: RowKind, cells: &[Cow<'_, str>], y: u32) {
        let (bg, bold) = match kind {
            RowKind::Body(idx) if idx % 2 == 0 => (ROW_BG_EVEN, false),
            RowKind::Body(_) => (ROW_BG_ODD, false),
            RowKind::Footer => (FOOTER_BG, true),
        };
        let _ = writeln!(
            svg,
            r#"<rect x="1" y="{y}" width="{}" height="{LINE_HEIGHT}" fill="{bg}" />"#,
            self.table_width - 2
        );
        self.write_cells(svg, cells, y, ROW_TEXT, bold);
    }

    fn write_cells(&self, svg: &mut String, cells: &[Cow<'_, str>], y: u32, fill: &str, bold: bool) {
        let weight = if bold { r#" font-weight="bold""# } else { "" };
        let mut x = CELL_PADDING;
        for (i, (cell, width)) in cells.iter().zip(self.col_widths).enumerate() {
            let alignment = self.alignments.get(i).copied().unwrap_or_default();
            let text_x = compute_text_x(x, *width, alignment);
            let anchor = alignment_anchor(alignment);
            let _ = writeln!(
                svg,
                r#"<text x="{text_x}" y="{}" fill="{fill}" text-anchor="{anchor}"{weight}>{}</text>"#,
                y + LINE_HEIGHT / 2 + FONT_SIZE / 2 - 2,
                escape_xml(cell)
            );
            x += width + CELL_PADDING;
        }
    }
}

fn estimate_text_width(text: &str) -> u32 {
    let width = text
        .chars()
        .map(|c| {
            if c.is_ascii() {
                CHAR_WIDTH
            } else {
                CHAR_WIDTH * 2.0
            }
        })
        .sum::<f32>();
    (width.ceil() as u32).max(20) + CELL_PADDING * 2
}

fn compute_text_x(cell_x: u32, cell_width: u32, alignment: Alignment) -> u32 {
    match alignment {
        Alignment::Left => cell_x,
        Alignment::Center => cell_x + cell_width / 2,
        Alignment::Right => cell_x + cell_width,
    }
}

fn alignment_anchor(alignment: Alignment) -> &'static str {
    match alignment {
        Alignment::Left => "start",
        Alignment::Center => "middle",
        Alignment::Right => "end",
    }
}

fn escape_xml(s: &str) -> Cow<'_, str> {
    if !s.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(s);
    }

    let mut result = String::with_capacity(s.len() + 10);
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#39;"),
            _ => result.push(c),
        }
    }
    Cow::Owned(result)
}

/// Stacks standalone SVG documents top to bottom, centred horizontally.
pub fn combine_svgs_vertically(svgs: &[&str]) -> Option<String> {
    if svgs.is_empty() {
        return None;
    }

    const SPACING: u32 = 24;
    const MARGIN: u32 = 16;

    let mut parts = Vec::with_capacity(svgs.len());
    for svg in svgs {
        let width = extract_svg_dimension(svg, "width")?;
        let height = extract_svg_dimension(svg, "height")?;
        parts.push((width, height, extract_svg_content(svg)?));
    }

    let max_width = parts.iter().map(|(width, _, _)| *width).max().unwrap_or(0);
    let stacked_height = parts.iter().map(|(_, height, _)| *height).sum::<u32>()
        + SPACING * (parts.len() as u32 - 1);
    let total_width = max_width + MARGIN * 2;
    let total_height = stacked_height + MARGIN * 2;

    let mut combined =
        String::with_capacity(svgs.iter().map(|s| s.len()).sum::<usize>() + parts.len() * 64 + 512);
    let _ = writeln!(
        &mut combined,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{total_width}" height="{total_height}" viewBox="0 0 {total_width} {total_height}">"#
    );
    let _ = writeln!(
        &mut combined,
        r#"<style>text {{ font-family: {FONT_FAMILY}; font-size: {FONT_SIZE}px; }}</style>"#
    );
    let _ = writeln!(
        &mut combined,
        r#"<rect width="{total_width}" height="{total_height}" fill="{PAGE_BG}" />"#
    );

    let mut y_offset = MARGIN;
    for (width, height, content) in parts {
        let x_offset = MARGIN + (max_width - width) / 2;
        let _ = writeln!(
            &mut combined,
            r#"<g transform="translate({x_offset}, {y_offset})">"#
        );
        combined.push_str(&content);
        combined.push_str("</g>\n");
        y_offset += height + SPACING;
    }

    combined.push_str("</svg>");
    Some(combined)
}

fn extract_svg_dimension(svg: &str, attr: &str) -> Option<u32> {
    let pattern = format!(" {attr}=\"");
    let start = svg.find(&pattern)? + pattern.len();
    let end = svg[start..].find('"')? + start;
    svg[start..end].parse().ok()
}

fn extract_svg_content(svg: &str) -> Option<String> {
    const STYLE_TAG_OPEN: &str = "<style>";
    const STYLE_TAG_CLOSE: &str = "</style>";

    let start = svg.find('>')? + 1;
    let end = svg.rfind("</svg>")?;
    let content = &svg[start..end];

    match (content.find(STYLE_TAG_OPEN), content.find(STYLE_TAG_CLOSE)) {
        (Some(style_start), Some(style_end)) if style_start < style_end => Some(format!(
            "{}{}",
            &content[..style_start],
            &content[style_end + STYLE_TAG_CLOSE.len()..]
        )),
        _ => Some(content.to_owned()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn table_contains_headers_rows_and_footer() {
        let svg = SvgTableBuilder::new()
            .caption("Split Summary")
            .alignments(&[Alignment::Left, Alignment::Right])
            .headers(&[Cow::Borrowed("Person"), Cow::Borrowed("Total")])
            .row([Cow::Borrowed("Ayu"), Cow::Borrowed("Rp10.200")])
            .row([Cow::Borrowed("Budi"), Cow::Borrowed("Rp15.300")])
            .footer_row([Cow::Borrowed("Total"), Cow::Borrowed("Rp25.500")])
            .build();

        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        for text in ["Split Summary", "Ayu", "Budi", "Rp15.300", "Rp25.500"] {
            assert!(svg.contains(text), "missing {text}");
        }
        assert_eq!(svg.matches(FOOTER_BG).count(), 1);
        assert_eq!(svg.matches(r#"font-weight="bold""#).count(), 3);
    }

    #[rstest]
    fn height_counts_caption_and_every_row() {
        let headers = [Cow::Borrowed("A")];
        let svg = SvgTableBuilder::new()
            .caption("c")
            .headers(&headers)
            .row([Cow::Borrowed("1")])
            .footer_row([Cow::Borrowed("2")])
            .build();

        let expected = LINE_HEIGHT * 4 + 2;
        assert_eq!(extract_svg_dimension(&svg, "height"), Some(expected));
    }

    #[rstest]
    fn no_headers_renders_nothing() {
        let svg = SvgTableBuilder::new()
            .row([Cow::Borrowed("orphan")])
            .build();
        assert!(svg.is_empty());
    }

    #[rstest]
    #[case::escapes_all("<Es Teh & 'Kopi'>", "&lt;Es Teh &amp; &#39;Kopi&#39;&gt;")]
    #[case::keeps_plain("Nasi Goreng", "Nasi Goreng")]
    fn escape_xml_cases(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(escape_xml(input), expected);
    }

    #[rstest]
    fn combine_stacks_with_margin() {
        let svg1 = r#"<svg xmlns="http://www.w3.org/2000/svg" width="100" height="50"><style>x</style><text>First</text></svg>"#;
        let svg2 = r#"<svg xmlns="http://www.w3.org/2000/svg" width="120" height="60"><text>Second</text></svg>"#;

        let combined = combine_svgs_vertically(&[svg1, svg2]).expect("combined svg");

        assert!(combined.contains("First"));
        assert!(combined.contains("Second"));
        assert!(!combined.contains("<style>x</style>"));
        assert_eq!(extract_svg_dimension(&combined, "width"), Some(152));
        assert_eq!(extract_svg_dimension(&combined, "height"), Some(166));
    }

    #[rstest]
    fn combine_rejects_empty_input() {
        assert!(combine_svgs_vertically(&[]).is_none());
    }
}
