//! PDF page constants.

/// A4 portrait width.
pub const N_PAGE_WIDTH_MM: f32 = 210.0;
/// A4 portrait height.
pub const N_PAGE_HEIGHT_MM: f32 = 297.0;
/// Margin on every side.
pub const N_MARGIN_MM: f32 = 10.0;
/// Line pitch of every printed row.
pub const N_ROW_HEIGHT_MM: f32 = 8.0;
/// Widths for SL, Name, Bib Number, Affiliation and Date of Birth.
pub const TUP_COLUMN_WIDTHS_MM: [f32; 5] = [15.0, 55.0, 30.0, 50.0, 30.0];
/// Group title size.
pub const N_FONT_SIZE_TITLE_PT: f32 = 16.0;
/// `Heat {n}` heading size.
pub const N_FONT_SIZE_HEADING_PT: f32 = 12.0;
/// Header and entry row size.
pub const N_FONT_SIZE_BODY_PT: f32 = 10.0;
/// Document title used when the caller gives none.
pub const C_DOCUMENT_TITLE_DEFAULT: &str = "Heat Sheets";
