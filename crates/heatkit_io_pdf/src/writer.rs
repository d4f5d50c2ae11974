//! Heat sheet PDF rendering on top of `printpdf`.

use std::path::Path;

use heatkit_heat::SpecHeatPlan;
use printpdf::{BuiltinFont, Mm, PdfDocument};
use tracing::{debug, info};

use crate::conf::C_DOCUMENT_TITLE_DEFAULT;
use crate::layout::plan_pdf_pages;
use crate::spec::{PdfWriteError, SpecPdfOptions};

/// Render the plan into PDF bytes, one group per page (or more).
///
/// An empty plan still yields a single blank page so the output is a valid
/// document.
pub fn render_plan_pdf(
    plan: &SpecHeatPlan,
    title: Option<&str>,
    options: &SpecPdfOptions,
) -> Result<Vec<u8>, PdfWriteError> {
    let l_pages = plan_pdf_pages(plan, options);
    let n_width = Mm(options.page_width_mm);
    let n_height = Mm(options.page_height_mm);

    let (doc, idx_page_first, idx_layer_first) = PdfDocument::new(
        title.unwrap_or(C_DOCUMENT_TITLE_DEFAULT),
        n_width,
        n_height,
        "Layer 1",
    );
    let font_regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|err| PdfWriteError::Backend(err.to_string()))?;
    let font_bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|err| PdfWriteError::Backend(err.to_string()))?;

    for (n_idx_page, page) in l_pages.iter().enumerate() {
        let (idx_page, idx_layer) = if n_idx_page == 0 {
            (idx_page_first, idx_layer_first)
        } else {
            doc.add_page(n_width, n_height, "Layer 1")
        };
        let layer = doc.get_page(idx_page).get_layer(idx_layer);
        for text in &page.texts {
            let font = if text.if_bold { &font_bold } else { &font_regular };
            layer.use_text(
                text.text.as_str(),
                text.font_size_pt,
                Mm(text.x_mm),
                Mm(text.y_mm),
                font,
            );
        }
    }
    debug!(pages = l_pages.len().max(1), "pdf pages laid out");

    doc.save_to_bytes()
        .map_err(|err| PdfWriteError::Backend(err.to_string()))
}

/// Render the plan and write it to `path`.
pub fn write_plan_pdf(
    plan: &SpecHeatPlan,
    path: impl AsRef<Path>,
    title: Option<&str>,
    options: &SpecPdfOptions,
) -> Result<(), PdfWriteError> {
    let path = path.as_ref();
    let l_bytes = render_plan_pdf(plan, title, options)?;
    std::fs::write(path, &l_bytes).map_err(|source| PdfWriteError::Io {
        path: path.display().to_string(),
        source,
    })?;
    info!(
        path = %path.display(),
        groups = plan.groups().len(),
        bytes = l_bytes.len(),
        "wrote heat sheets pdf"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use heatkit_heat::{SpecAthleteRow, SpecColumnLayout, SpecRoster, partition};

    use super::*;

    fn build_plan() -> SpecHeatPlan {
        let roster = SpecRoster {
            layout: SpecColumnLayout::default(),
            rows: ["100m", "200m", "100m"]
                .iter()
                .enumerate()
                .map(|(n_idx, event)| SpecAthleteRow {
                    name: format!("Athlete {n_idx}").into(),
                    bib: format!("{}", 10 + n_idx).into(),
                    affiliation: "Owls".into(),
                    event: (*event).into(),
                    category: "U18".into(),
                    ..Default::default()
                })
                .collect(),
        };
        partition(&roster, 8).expect("partition")
    }

    #[test]
    fn test_render_plan_pdf_produces_pdf_bytes() {
        let l_bytes =
            render_plan_pdf(&build_plan(), Some("Meet"), &SpecPdfOptions::default()).expect("pdf");
        assert!(l_bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_render_plan_pdf_handles_empty_plan() {
        let plan = partition(&SpecRoster::default(), 8).expect("partition");
        let l_bytes = render_plan_pdf(&plan, None, &SpecPdfOptions::default()).expect("pdf");
        assert!(l_bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_write_plan_pdf_writes_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("heats.pdf");
        write_plan_pdf(&build_plan(), &path, None, &SpecPdfOptions::default()).expect("write");
        let l_bytes = std::fs::read(&path).expect("read");
        assert!(l_bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_write_plan_pdf_reports_bad_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("missing").join("heats.pdf");
        let err = write_plan_pdf(&build_plan(), &path, None, &SpecPdfOptions::default())
            .expect_err("missing directory");
        assert!(matches!(err, PdfWriteError::Io { .. }));
    }
}
