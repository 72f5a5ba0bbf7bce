//! Best-effort image export.

use std::path::PathBuf;

use crate::model::{ContentItem, Document, ImageData};
use crate::store::PageStore;

/// Subdirectory of the output directory receiving exported images.
pub const IMAGES_DIR: &str = "images";

/// Write page renders, table crops and picture crops under `images/`.
///
/// Tables and pictures are numbered per kind in document order, whether or
/// not they carry an image. Failures are logged and skipped.
pub(crate) fn export_images(doc: &Document, stem: &str, store: &PageStore) -> Vec<PathBuf> {
    let mut written = Vec::new();

    for (page_no, page) in &doc.pages {
        if let Some(image) = page.image.as_ref().filter(|i| !i.is_empty()) {
            let name = format!("{}_page_{}", stem, page_no);
            save_image(store, &name, image, &mut written);
        }
    }

    let mut table_counter = 0;
    let mut picture_counter = 0;
    for (item, _) in doc.iterate_items(None) {
        let page_no = item.page_no().unwrap_or(0);
        let (name, image) = match &item.content {
            ContentItem::Table(table) => {
                table_counter += 1;
                let name = format!("{}_page_{}_table_{}", stem, page_no, table_counter);
                (name, table.image.as_ref())
            }
            ContentItem::Picture(picture) => {
                picture_counter += 1;
                let name = format!("{}_page_{}_picture_{}", stem, page_no, picture_counter);
                (name, picture.image.as_ref())
            }
            ContentItem::Text(_) => continue,
        };
        if let Some(image) = image.filter(|i| !i.is_empty()) {
            save_image(store, &name, image, &mut written);
        }
    }

    log::info!("Exported {} images", written.len());
    written
}

fn save_image(store: &PageStore, name: &str, image: &ImageData, written: &mut Vec<PathBuf>) {
    let file_name = format!("{}/{}.{}", IMAGES_DIR, name, extension_for(&image.mime_type));
    match store.write_file(&file_name, &image.data) {
        Ok(path) => written.push(path),
        Err(e) => log::warn!("Failed to save image {}: {}", name, e),
    }
}

/// Images are stored as encoded by the parser; only the extension follows
/// the MIME type.
fn extension_for(mime_type: &str) -> &'static str {
    match mime_type {
        "image/jpeg" | "image/jpg" => "jpg",
        "image/jp2" => "jp2",
        "image/gif" => "gif",
        _ => "png",
    }
}
