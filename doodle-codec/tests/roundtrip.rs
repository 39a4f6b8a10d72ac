//! Integration tests for export and re-import of surfaces (doodle-codec).
//!
//! An exported surface, decoded and blitted into a buffer of the same size,
//! must reproduce the original pixels exactly.

use doodle_codec::{decode_data_uri, export_png, export_surface, ImageFormat};
use doodle_core::{
    blit, Brush, FillRequest, PixelBuffer, Point, Rgba, SourceBitmap, Surface,
};

/// A surface with a closed outline, a filled interior and a stray stroke.
fn colored_surface() -> Surface {
    let mut surface = Surface::with_size(120, 90).unwrap();
    surface.set_brush(Brush::new(Rgba::rgb(20, 20, 20), 4.0));
    surface.begin_stroke(Point::new(20.0, 20.0));
    for (x, y) in [(100.0, 20.0), (100.0, 70.0), (20.0, 70.0), (20.0, 20.0)] {
        surface.extend_stroke(Point::new(x, y));
    }
    surface.end_stroke();

    surface
        .fill(&FillRequest::new(60, 45, Rgba::rgb(250, 200, 30), 32))
        .unwrap();

    surface.set_brush(Brush::new(Rgba::rgb(40, 90, 200), 2.5));
    surface.begin_stroke(Point::new(5.0, 85.0));
    surface.extend_stroke(Point::new(115.0, 80.0));
    surface.end_stroke();
    surface
}

#[test]
fn export_decode_blit_is_bit_exact() {
    let surface = colored_surface();
    let encoded = export_surface(&surface).unwrap();

    let decoded = decode_data_uri(&encoded.data_uri()).unwrap();
    assert_eq!(decoded.dimensions(), surface.dimensions());

    let mut restored = PixelBuffer::allocate(120, 90).unwrap();
    blit(&mut restored, &decoded);
    assert_eq!(&restored, surface.buffer());
}

#[test]
fn exported_bytes_are_png() {
    let encoded = export_surface(&colored_surface()).unwrap();
    assert_eq!(
        ImageFormat::from_magic_bytes(encoded.as_bytes()),
        ImageFormat::Png
    );
}

#[test]
fn recalled_image_reproduces_surface() {
    let original = colored_surface();
    let uri = export_surface(&original).unwrap().data_uri();

    let mut recalled = Surface::with_size(120, 90).unwrap();
    recalled.load_image(decode_data_uri(&uri).unwrap());
    assert!(recalled.is_locked());
    assert_eq!(recalled.buffer(), original.buffer());
}

#[test]
fn buffer_to_bitmap_matches_png_path() {
    let surface = colored_surface();
    let direct: SourceBitmap = surface.buffer().to_bitmap();
    let via_png = decode_data_uri(&export_png(surface.buffer()).unwrap().data_uri()).unwrap();
    assert_eq!(direct, via_png);
}
