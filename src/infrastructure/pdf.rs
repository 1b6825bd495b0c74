use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument};
use tracing::instrument;

use crate::domain::{
    layout::{FontStyle, LayoutItem, PageSpec, TextLine},
    ports::DocumentWriter,
    DomainError, PageLayout,
};

const POINT_TO_MM: f32 = 25.4 / 72.0;
const LAYER_NAME: &str = "content";

/// A line pinned to a page position. `y_mm` is the baseline measured from the
/// bottom edge, as PDF coordinates are.
#[derive(Debug, Clone, PartialEq)]
pub struct Placement<'a> {
    pub page: usize,
    pub x_mm: f32,
    pub y_mm: f32,
    pub line: &'a TextLine,
}

/// Lays lines top to bottom and starts a new page when the next line would
/// cross the bottom margin.
pub fn paginate(layout: &PageLayout) -> Vec<Placement<'_>> {
    let PageSpec {
        height_mm,
        margin_mm,
        ..
    } = layout.page;
    let top = height_mm - margin_mm;

    let mut placements = Vec::new();
    let mut page = 0;
    let mut cursor = top;

    for item in &layout.items {
        match item {
            LayoutItem::Gap(mm) => cursor -= mm,
            LayoutItem::Text(line) => {
                let baseline_drop = line.size_pt * POINT_TO_MM;
                if cursor - baseline_drop < margin_mm && cursor < top {
                    page += 1;
                    cursor = top;
                }
                placements.push(Placement {
                    page,
                    x_mm: margin_mm + line.indent_mm,
                    y_mm: cursor - baseline_drop,
                    line,
                });
                cursor -= line.advance_mm;
            }
        }
    }

    placements
}

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    italic: IndirectFontRef,
}

impl Fonts {
    fn get(&self, style: FontStyle) -> &IndirectFontRef {
        match style {
            FontStyle::Regular => &self.regular,
            FontStyle::Bold => &self.bold,
            FontStyle::Italic => &self.italic,
        }
    }
}

/// Renders a [`PageLayout`] with the built-in Helvetica faces.
#[derive(Debug, Clone, Default)]
pub struct PdfWriter;

impl PdfWriter {
    pub fn new() -> Self {
        Self
    }
}

fn render_error(context: &str, e: impl std::fmt::Debug) -> DomainError {
    DomainError::render(format!("{context}: {e:?}"))
}

impl DocumentWriter for PdfWriter {
    #[instrument(skip(self, layout), fields(title = %layout.title))]
    fn write(&self, layout: &PageLayout) -> Result<Vec<u8>, DomainError> {
        let width = Mm(layout.page.width_mm);
        let height = Mm(layout.page.height_mm);
        let (doc, first_page, first_layer) =
            PdfDocument::new(layout.title.as_str(), width, height, LAYER_NAME);

        let fonts = Fonts {
            regular: doc
                .add_builtin_font(BuiltinFont::Helvetica)
                .map_err(|e| render_error("load font", e))?,
            bold: doc
                .add_builtin_font(BuiltinFont::HelveticaBold)
                .map_err(|e| render_error("load font", e))?,
            italic: doc
                .add_builtin_font(BuiltinFont::HelveticaOblique)
                .map_err(|e| render_error("load font", e))?,
        };

        let mut layers = vec![doc.get_page(first_page).get_layer(first_layer)];
        for placement in paginate(layout) {
            while layers.len() <= placement.page {
                let (page, layer) = doc.add_page(width, height, LAYER_NAME);
                layers.push(doc.get_page(page).get_layer(layer));
            }

            let line = placement.line;
            layers[placement.page].use_text(
                line.text.as_str(),
                line.size_pt,
                Mm(placement.x_mm),
                Mm(placement.y_mm),
                fonts.get(line.style),
            );
        }

        drop(layers);
        doc.save_to_bytes()
            .map_err(|e| render_error("serialize document", e))
    }

    fn content_type(&self) -> &'static str {
        "application/pdf"
    }
}
