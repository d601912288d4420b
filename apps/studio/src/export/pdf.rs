//! Raster PDF export: one tall bitmap sliced across US-letter pages.
//!
//! Every page references the same image XObject. Page `k` draws it shifted up by `k`
//! page heights, so each page shows the next vertical slice and the page boxes clip the rest.

use std::io::Write;
use std::sync::Arc;

use chrono::Utc;
use flate2::{write::ZlibEncoder, Compression};
use image::RgbImage;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use tracing::{debug, info};

use crate::export::fonts::FontRegistry;
use crate::export::raster::rasterize;
use crate::export::{Artifact, CaptureError};
use crate::layout::{SurfaceRegistry, PREVIEW_SURFACE_ID};

/// US letter, 8.5in x 11in, in PDF points.
pub const PAGE_WIDTH_PT: f64 = 612.0;
pub const PAGE_HEIGHT_PT: f64 = 792.0;

const PRODUCER: &str = concat!("resume-studio ", env!("CARGO_PKG_VERSION"));

/// Where the shared bitmap lands on each page.
#[derive(Debug, Clone, PartialEq)]
pub struct PagePlan {
    /// Bitmap height once scaled to the page width, in points.
    pub image_height_pt: f64,
    /// Vertical offset of the bitmap's top edge on each page (0, -P, -2P, ...).
    pub offsets: Vec<f64>,
}

impl PagePlan {
    pub fn page_count(&self) -> usize {
        self.offsets.len()
    }
}

/// Places the full bitmap at offset 0 on page one, then adds pages shifted up one page
/// height at a time while any unplaced height remains.
pub fn paginate(image_width: u32, image_height: u32) -> PagePlan {
    let image_height_pt = if image_width == 0 {
        0.0
    } else {
        image_height as f64 * PAGE_WIDTH_PT / image_width as f64
    };

    let mut offsets = vec![0.0];
    let mut position = 0.0;
    let mut height_left = image_height_pt - PAGE_HEIGHT_PT;
    while height_left > 0.0 {
        position -= PAGE_HEIGHT_PT;
        offsets.push(position);
        height_left -= PAGE_HEIGHT_PT;
    }

    PagePlan {
        image_height_pt,
        offsets,
    }
}

/// Assembles the PDF: one FlateDecode RGB image shared by every page.
pub fn write_pdf(image: &RgbImage, plan: &PagePlan) -> Result<Vec<u8>, CaptureError> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(image.as_raw())?;
    let pixels = encoder.finish()?;

    let image_stream = Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => image.width() as i64,
            "Height" => image.height() as i64,
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
            "Filter" => "FlateDecode",
        },
        pixels,
    )
    .with_compression(false);
    let image_id = doc.add_object(image_stream);

    let resources_id = doc.add_object(dictionary! {
        "XObject" => dictionary! { "Im0" => image_id },
    });

    let mut kids: Vec<Object> = Vec::with_capacity(plan.page_count());
    for offset in &plan.offsets {
        // PDF space grows upward from the bottom-left corner.
        let y = PAGE_HEIGHT_PT - plan.image_height_pt - offset;
        let content = Content {
            operations: vec![
                Operation::new("q", vec![]),
                Operation::new(
                    "cm",
                    vec![
                        (PAGE_WIDTH_PT as f32).into(),
                        0.0_f32.into(),
                        0.0_f32.into(),
                        (plan.image_height_pt as f32).into(),
                        0.0_f32.into(),
                        (y as f32).into(),
                    ],
                ),
                Operation::new("Do", vec![Object::Name(b"Im0".to_vec())]),
                Operation::new("Q", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let page_count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count,
            "Resources" => resources_id,
            "MediaBox" => vec![
                0.into(),
                0.into(),
                (PAGE_WIDTH_PT as i64).into(),
                (PAGE_HEIGHT_PT as i64).into(),
            ],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let info_id = doc.add_object(dictionary! {
        "Producer" => Object::string_literal(PRODUCER),
        "CreationDate" => Object::string_literal(Utc::now().format("D:%Y%m%d%H%M%SZ").to_string()),
    });
    doc.trailer.set("Info", info_id);

    let mut out = Vec::new();
    doc.save_to(&mut out)?;
    Ok(out)
}

/// Captures the mounted preview and returns it as a paginated PDF.
///
/// The detached copy is released on every exit path when its guard drops.
pub async fn export_pdf(
    surfaces: &SurfaceRegistry,
    fonts: &FontRegistry,
    scale: f32,
    base_name: &str,
) -> Result<Artifact, CaptureError> {
    let detached = surfaces
        .detach(PREVIEW_SURFACE_ID)
        .ok_or_else(|| CaptureError::SurfaceMissing(PREVIEW_SURFACE_ID.to_string()))?;

    let faces = fonts.ready(detached.surface().font).await;
    let surface = Arc::clone(detached.surface());

    let (bytes, pages) = tokio::task::spawn_blocking(move || -> Result<_, CaptureError> {
        let image = rasterize(&surface, &faces, scale)?;
        let plan = paginate(image.width(), image.height());
        debug!(
            width = image.width(),
            height = image.height(),
            pages = plan.page_count(),
            "Rasterized surface"
        );
        Ok((write_pdf(&image, &plan)?, plan.page_count()))
    })
    .await??;

    let artifact = Artifact::pdf(base_name, bytes);
    info!(
        file = %artifact.file_name,
        pages,
        size = artifact.bytes.len(),
        "PDF export complete"
    );
    Ok(artifact)
}
