use patungan_application::{RenderFailure, RenderRequest, SummaryRenderer};
use patungan_presentation::SplitSummaryPresenter;
use resvg::usvg::{Options, Tree};
use std::sync::{Arc, LazyLock};
use tiny_skia::Pixmap;

static OPTIONS: LazyLock<Options> = LazyLock::new(|| {
    let mut fontdb = resvg::usvg::fontdb::Database::new();
    fontdb.load_system_fonts();

    // Generic fallbacks for machines without Noto
    fontdb.set_sans_serif_family("DejaVu Sans");
    fontdb.set_serif_family("DejaVu Serif");
    fontdb.set_monospace_family("DejaVu Sans Mono");

    Options {
        fontdb: Arc::new(fontdb),
        ..Options::default()
    }
});

/// Convert SVG string to PNG bytes
pub fn svg_to_png(svg: &str) -> Option<Vec<u8>> {
    let tree = Tree::from_str(svg, &OPTIONS).ok()?;
    let size = tree.size();
    let width = size.width().ceil() as u32;
    let height = size.height().ceil() as u32;

    let mut pixmap = Pixmap::new(width, height)?;
    resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());
    pixmap.encode_png().ok()
}

/// Rasterises the bill and per-person tables into a single PNG.
#[derive(Clone, Copy, Debug, Default)]
pub struct PngSummaryRenderer;

impl SummaryRenderer for PngSummaryRenderer {
    fn render(&self, request: &RenderRequest<'_>) -> Result<Vec<u8>, RenderFailure> {
        let view = SplitSummaryPresenter::render(request);
        let Some(svg) = view.combined_svg() else {
            tracing::warn!(session_id = %request.session_id, "Summary tables could not be combined");
            return Err(RenderFailure::Rasterise);
        };

        let png = svg_to_png(&svg).ok_or(RenderFailure::Rasterise)?;
        tracing::debug!(
            session_id = %request.session_id,
            person_count = request.splits.len(),
            bytes = png.len(),
            "Split summary rendered"
        );
        Ok(png)
    }

    fn extension(&self) -> &'static str {
        "png"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use patungan_application::SessionId;
    use patungan_domain::{Assignment, BillAdjustments, Item, ItemIndex, Money, PersonSplit};

    const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n";

    #[test]
    fn svg_is_rasterised_to_png() {
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" width="20" height="10"><rect width="20" height="10" fill="red"/></svg>"#;

        let png = svg_to_png(svg).expect("valid svg");

        assert!(png.starts_with(PNG_MAGIC));
    }

    #[test]
    fn invalid_svg_yields_none() {
        assert!(svg_to_png("not an svg").is_none());
    }

    #[test]
    fn summary_renders_as_png() {
        let items = vec![Item::new("Sate", 1, Money::from_i64(20_000))];
        let claim = Assignment {
            person: "Rina".into(),
            item_index: ItemIndex(0),
            quantity: 1,
        };
        let splits = vec![PersonSplit {
            person: "Rina".into(),
            item_subtotal: Money::from_i64(20_000),
            adjustment_share: Money::ZERO,
            total: Money::from_i64(20_000),
            items: vec![claim.clone()],
        }];
        let adjustments = BillAdjustments {
            total_payment: Money::from_i64(20_000),
            ..BillAdjustments::default()
        };
        let session_id = SessionId::from("1718000000000".to_owned());
        let request = RenderRequest {
            session_id: &session_id,
            items: &items,
            assignments: std::slice::from_ref(&claim),
            adjustments: &adjustments,
            splits: &splits,
        };

        let png = PngSummaryRenderer.render(&request).expect("renders");

        assert!(png.starts_with(PNG_MAGIC));
        assert_eq!(PngSummaryRenderer.extension(), "png");
    }
}
