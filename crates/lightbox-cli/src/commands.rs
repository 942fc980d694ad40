//! CLI command implementations.

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use lightbox_core::encode::encode_png;
use lightbox_core::{
    BackgroundDecoder, Bitmap, FilterField, FilterMode, FsStorage, RenderUpdate, SessionDocument,
    Storage, Viewer,
};
use log::{debug, info};

/// Render a session's active layer (or `layer`) to a PNG file.
pub fn render_session(session: &Path, layer: Option<usize>, output: &Path) -> Result<()> {
    info!("Rendering session: {}", session.display());

    let storage: Arc<dyn Storage> = Arc::new(FsStorage);
    let document = SessionDocument::load(storage.as_ref(), &path_str(session)?)
        .with_context(|| format!("Failed to load session {}", session.display()))?;

    let mut viewer = Viewer::new();
    viewer.restore(&document)?;
    if let Some(index) = layer {
        viewer
            .set_active_layer(index)
            .with_context(|| format!("Cannot select layer {}", index))?;
    }

    let bitmap = render_active(&mut viewer, storage)?;
    write_png(&bitmap, output)
}

/// Run one image through the filter pipeline and write a PNG.
pub fn filter_image(
    image: &Path,
    mode: FilterMode,
    threshold: f64,
    grayscale: bool,
    output: &Path,
) -> Result<()> {
    info!("Filtering image: {}", image.display());

    let mut viewer = Viewer::new();
    viewer.add_layer_from_path(&path_str(image)?)?;
    for field in [
        FilterField::Mode(mode),
        FilterField::ThresholdPercent(threshold),
        FilterField::Grayscale(grayscale),
    ] {
        viewer.set_active_filter_field(field)?;
    }

    let bitmap = render_active(&mut viewer, Arc::new(FsStorage))?;
    write_png(&bitmap, output)
}

/// Print a summary of a saved session.
pub fn print_session(session: &Path, out: &mut impl Write) -> Result<()> {
    let document = SessionDocument::load(&FsStorage, &path_str(session)?)
        .with_context(|| format!("Failed to load session {}", session.display()))?;

    writeln!(out, "Session: {}", session.display())?;
    writeln!(out, "Layers: {}", document.layers.len())?;
    for (index, layer) in document.layers.iter().enumerate() {
        let marker = if index == document.active_layer { '*' } else { ' ' };
        let filter = layer.filter();
        writeln!(
            out,
            "{} {}: {} [{}, threshold {}%{}{}]",
            marker,
            index,
            layer.source_path(),
            filter.mode.name(),
            filter.threshold_percent,
            if filter.grayscale { ", grayscale" } else { "" },
            if filter.blinking { ", blinking" } else { "" },
        )?;
    }
    writeln!(out, "Transform: {}", document.view.transform_css())?;

    Ok(())
}

/// Drive the viewer until the active layer has been decoded and rendered.
fn render_active(viewer: &mut Viewer, storage: Arc<dyn Storage>) -> Result<Arc<Bitmap>> {
    let mut decoder = BackgroundDecoder::new(storage);

    loop {
        match viewer.render()? {
            RenderUpdate::Rendered(bitmap) => return Ok(bitmap),
            RenderUpdate::Reload(request) => decoder.submit(request),
            RenderUpdate::Pending => {
                let Some(outcome) = decoder.wait() else {
                    bail!("Render is waiting on a decode that was never started");
                };
                if let Some(bitmap) = viewer.finish_decode(outcome)? {
                    return Ok(bitmap);
                }
            }
        }
    }
}

fn write_png(bitmap: &Bitmap, output: &Path) -> Result<()> {
    let png = encode_png(bitmap)?;
    FsStorage
        .write(&path_str(output)?, &png)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    debug!("Wrote {} bytes", png.len());
    println!(
        "Wrote {}x{} image to {}",
        bitmap.width,
        bitmap.height,
        output.display()
    );
    Ok(())
}

fn path_str(path: &Path) -> Result<String> {
    match path.to_str() {
        Some(path) => Ok(path.to_string()),
        None => bail!("Path is not valid UTF-8: {}", path.display()),
    }
}
