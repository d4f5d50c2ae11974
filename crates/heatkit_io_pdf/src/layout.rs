//! Page layout planning for heat sheets, independent of the PDF backend.

use heatkit_heat::{C_COLUMN_POSITION, EnumFieldRole, SpecHeatPlan};

use crate::spec::{SpecPdfOptions, SpecPdfPage, SpecPdfText};

/// Millimetres per typographic point.
const N_MM_PER_PT: f32 = 0.3528;
/// Average Helvetica glyph width as a fraction of the font size.
const N_GLYPH_WIDTH_RATIO: f32 = 0.5;

/// One printable column: header text, width and the role it reads.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecPdfColumn {
    /// Header row text.
    pub header: String,
    /// Column width.
    pub width_mm: f32,
    /// `None` reads the heat position.
    pub role: Option<EnumFieldRole>,
}

/// Columns printed for each heat: position, name, bib, affiliation and,
/// when mapped, date of birth.
pub fn derive_pdf_columns(plan: &SpecHeatPlan, options: &SpecPdfOptions) -> Vec<SpecPdfColumn> {
    let mut l_columns = vec![
        SpecPdfColumn {
            header: C_COLUMN_POSITION.to_string(),
            width_mm: options.widths_mm[0],
            role: None,
        },
        SpecPdfColumn {
            header: EnumFieldRole::Name.label().to_string(),
            width_mm: options.widths_mm[1],
            role: Some(EnumFieldRole::Name),
        },
        SpecPdfColumn {
            header: EnumFieldRole::Bib.label().to_string(),
            width_mm: options.widths_mm[2],
            role: Some(EnumFieldRole::Bib),
        },
        SpecPdfColumn {
            header: EnumFieldRole::Affiliation.label().to_string(),
            width_mm: options.widths_mm[3],
            role: Some(EnumFieldRole::Affiliation),
        },
    ];
    if plan.layout().if_has_date_of_birth {
        l_columns.push(SpecPdfColumn {
            header: EnumFieldRole::DateOfBirth.label().to_string(),
            width_mm: options.widths_mm[4],
            role: Some(EnumFieldRole::DateOfBirth),
        });
    }
    l_columns
}

/// Estimated printed width of `text` in millimetres.
pub fn estimate_text_width_mm(text: &str, font_size_pt: f32) -> f32 {
    text.chars().count() as f32 * font_size_pt * N_GLYPH_WIDTH_RATIO * N_MM_PER_PT
}

/// Truncate `text` so it fits `width_mm` (with a 1 mm inner padding).
pub fn fit_text(text: &str, width_mm: f32, font_size_pt: f32) -> String {
    let n_glyph_mm = font_size_pt * N_GLYPH_WIDTH_RATIO * N_MM_PER_PT;
    let n_chars_max = ((width_mm - 2.0).max(0.0) / n_glyph_mm).floor() as usize;
    if text.chars().count() <= n_chars_max {
        return text.to_string();
    }
    if n_chars_max <= 1 {
        return text.chars().take(n_chars_max).collect();
    }
    let mut c_out: String = text.chars().take(n_chars_max - 1).collect();
    c_out.push('~');
    c_out
}

struct PdfCursor<'a> {
    options: &'a SpecPdfOptions,
    l_pages: Vec<SpecPdfPage>,
    n_y_mm: f32,
}

impl<'a> PdfCursor<'a> {
    fn new(options: &'a SpecPdfOptions) -> Self {
        Self {
            options,
            l_pages: vec![],
            n_y_mm: 0.0,
        }
    }

    fn new_page(&mut self) {
        self.l_pages.push(SpecPdfPage::default());
        self.n_y_mm = self.options.page_height_mm - self.options.margin_mm;
    }

    /// Start a new page when fewer than `n_height_mm` remain above the margin.
    fn reserve(&mut self, n_height_mm: f32) {
        if self.l_pages.is_empty() || self.n_y_mm - n_height_mm < self.options.margin_mm {
            self.new_page();
        }
    }

    fn push_text(&mut self, x_mm: f32, font_size_pt: f32, if_bold: bool, text: String) {
        if self.l_pages.is_empty() {
            self.new_page();
        }
        let n_y_mm = self.n_y_mm;
        if let Some(page) = self.l_pages.last_mut() {
            page.texts.push(SpecPdfText {
                x_mm,
                y_mm: n_y_mm,
                font_size_pt,
                if_bold,
                text,
            });
        }
    }

    fn advance(&mut self, n_height_mm: f32) {
        self.n_y_mm -= n_height_mm;
    }
}

/// Lay out every heat group starting on its own page.
///
/// Each group gets a centered bold title, then per heat a `Heat {n}` heading,
/// a bold header row and one line per entry. Tables continue on a new page
/// (with the header repeated) when the bottom margin is reached.
pub fn plan_pdf_pages(plan: &SpecHeatPlan, options: &SpecPdfOptions) -> Vec<SpecPdfPage> {
    let l_columns = derive_pdf_columns(plan, options);
    let mut cursor = PdfCursor::new(options);

    for group in plan.groups() {
        cursor.new_page();
        let c_label = group.label();
        let n_x_title = ((options.page_width_mm
            - estimate_text_width_mm(&c_label, options.font_size_title_pt))
            / 2.0)
            .max(options.margin_mm);
        cursor.advance(options.row_height_mm);
        cursor.push_text(n_x_title, options.font_size_title_pt, true, c_label);
        cursor.advance(options.row_height_mm);

        for heat in group.heats() {
            // Heading, half-row gap, header and at least one entry.
            cursor.reserve(options.row_height_mm * 3.5);
            cursor.advance(options.row_height_mm);
            cursor.push_text(
                options.margin_mm,
                options.font_size_heading_pt,
                true,
                format!("Heat {}", heat.heat_number()),
            );
            cursor.advance(options.row_height_mm / 2.0);
            push_header_row(&mut cursor, &l_columns);

            for entry in heat.entries() {
                if cursor.n_y_mm - options.row_height_mm < options.margin_mm {
                    cursor.new_page();
                    push_header_row(&mut cursor, &l_columns);
                }
                cursor.advance(options.row_height_mm);
                let mut n_x_mm = options.margin_mm;
                for column in &l_columns {
                    let c_text = match column.role {
                        None => entry.position().to_string(),
                        Some(role) => entry.row().get(role).to_text(),
                    };
                    cursor.push_text(
                        n_x_mm + 1.0,
                        options.font_size_body_pt,
                        false,
                        fit_text(&c_text, column.width_mm, options.font_size_body_pt),
                    );
                    n_x_mm += column.width_mm;
                }
            }
            cursor.advance(options.row_height_mm);
        }
    }

    cursor.l_pages
}

fn push_header_row(cursor: &mut PdfCursor<'_>, l_columns: &[SpecPdfColumn]) {
    let options = cursor.options;
    cursor.advance(options.row_height_mm);
    let mut n_x_mm = options.margin_mm;
    for column in l_columns {
        cursor.push_text(
            n_x_mm + 1.0,
            options.font_size_body_pt,
            true,
            fit_text(&column.header, column.width_mm, options.font_size_body_pt),
        );
        n_x_mm += column.width_mm;
    }
}

#[cfg(test)]
mod tests {
    use heatkit_heat::{EnumCellValue, SpecAthleteRow, SpecColumnLayout, SpecRoster, partition};
    use pretty_assertions::assert_eq;

    use super::*;

    fn build_plan(n_rows: usize, if_has_date_of_birth: bool) -> SpecHeatPlan {
        build_plan_with_capacity(n_rows, if_has_date_of_birth, 8)
    }

    fn build_plan_with_capacity(
        n_rows: usize,
        if_has_date_of_birth: bool,
        capacity: usize,
    ) -> SpecHeatPlan {
        let roster = SpecRoster {
            layout: SpecColumnLayout {
                columns_extra: vec![],
                if_has_date_of_birth,
            },
            rows: (0..n_rows)
                .map(|n_idx| SpecAthleteRow {
                    name: format!("Athlete {n_idx:02}").into(),
                    bib: EnumCellValue::Number(100.0 + n_idx as f64),
                    affiliation: format!("Club {n_idx:02}").into(),
                    event: "100m".into(),
                    category: "U18".into(),
                    date_of_birth: "2008-01-01".into(),
                    ..Default::default()
                })
                .collect(),
        };
        partition(&roster, capacity).expect("partition")
    }

    #[test]
    fn test_derive_pdf_columns_adds_date_of_birth_only_when_mapped() {
        let options = SpecPdfOptions::default();
        let l_headers = |plan: &SpecHeatPlan| {
            derive_pdf_columns(plan, &options)
                .into_iter()
                .map(|column| column.header)
                .collect::<Vec<_>>()
        };
        assert_eq!(
            l_headers(&build_plan(1, true)),
            vec!["SL", "Name", "Bib Number", "Affiliation", "Date of Birth"]
        );
        assert_eq!(
            l_headers(&build_plan(1, false)),
            vec!["SL", "Name", "Bib Number", "Affiliation"]
        );
    }

    #[test]
    fn test_plan_pdf_pages_title_heading_and_rows() {
        let options = SpecPdfOptions::default();
        let l_pages = plan_pdf_pages(&build_plan(3, true), &options);
        assert_eq!(l_pages.len(), 1);

        let l_texts = &l_pages[0].texts;
        assert_eq!(l_texts[0].text, "U18 - 100m");
        assert!(l_texts[0].if_bold);
        assert_eq!(l_texts[1].text, "Heat 1");
        assert_eq!(l_texts[2].text, "SL");
        // Header (5) + 3 rows x 5 cells after title and heading.
        assert_eq!(l_texts.len(), 2 + 5 + 15);
        assert_eq!(l_texts[7].text, "1");
        assert_eq!(l_texts[8].text, "Athlete 00");
        assert_eq!(l_texts[9].text, "100");
        assert!(l_texts[7].y_mm < l_texts[2].y_mm);
    }

    #[test]
    fn test_plan_pdf_pages_breaks_long_heats_and_repeats_header() {
        let options = SpecPdfOptions {
            row_height_mm: 30.0,
            ..Default::default()
        };
        let l_pages = plan_pdf_pages(&build_plan(8, false), &options);
        assert_eq!(l_pages.len(), 2);
        for page in &l_pages {
            assert!(page.texts.iter().all(|text| text.y_mm >= options.margin_mm));
        }
        assert_eq!(l_pages[1].texts[0].text, "SL");
    }

    #[test]
    fn test_plan_pdf_pages_keeps_heat_heading_with_first_entry() {
        let options = SpecPdfOptions {
            row_height_mm: 10.0,
            ..Default::default()
        };
        let l_pages = plan_pdf_pages(&build_plan_with_capacity(38, false, 19), &options);
        assert_eq!(l_pages.len(), 2);

        let text_last = l_pages[0].texts.last().expect("page 1 has text");
        assert!(!text_last.if_bold);
        assert_eq!(l_pages[1].texts[0].text, "Heat 2");
        assert_eq!(l_pages[1].texts[1].text, "SL");
        assert_eq!(
            l_pages[1]
                .texts
                .iter()
                .filter(|text| text.text == "SL")
                .count(),
            1
        );
    }

    #[test]
    fn test_fit_text_truncates_with_marker() {
        assert_eq!(fit_text("Ana", 30.0, 10.0), "Ana");
        let c_fitted = fit_text(&"x".repeat(80), 15.0, 10.0);
        assert_eq!(c_fitted.chars().count(), 7);
        assert!(c_fitted.ends_with('~'));
    }
}
