//! Behavioral properties of a surface exercised through the public API.

use doodle_core::{
    blit, flood_fill, Brush, FillRequest, FillStatus, PixelBuffer, Point, Rgba, SourceBitmap,
    Surface, SurfaceEvent, Tool,
};

const RED: Rgba = Rgba::rgb(255, 0, 0);

fn solid(width: u32, height: u32, color: Rgba) -> SourceBitmap {
    SourceBitmap::from_image(image::RgbaImage::from_pixel(width, height, color.into())).unwrap()
}

/// A 60x60 surface with a closed square outline from (10,10) to (50,50).
fn outlined_square() -> Surface {
    let mut surface = Surface::with_size(60, 60).unwrap();
    surface.set_brush(Brush::new(Rgba::BLACK, 3.0));
    surface.begin_stroke(Point::new(10.0, 10.0));
    for (x, y) in [(50.0, 10.0), (50.0, 50.0), (10.0, 50.0), (10.0, 10.0)] {
        surface.extend_stroke(Point::new(x, y));
    }
    surface.end_stroke();
    surface
}

#[test]
fn fill_is_idempotent() {
    let mut surface = outlined_square();
    let request = FillRequest::new(30, 30, RED, 32);

    let first = surface.fill(&request).unwrap();
    assert_eq!(first.status, FillStatus::Filled);
    let after_first = surface.buffer().clone();

    let second = surface.fill(&request).unwrap();
    assert_eq!(second.status, FillStatus::AlreadyFilled);
    assert_eq!(surface.buffer(), &after_first);
}

#[test]
fn fill_stays_inside_closed_outline() {
    let mut surface = outlined_square();
    let report = surface.fill(&FillRequest::new(30, 30, RED, 32)).unwrap();
    assert!(report.changed());

    let buffer = surface.buffer();
    for y in 0..60 {
        for x in 0..60 {
            if buffer.read(x, y).unwrap() == RED {
                assert!(x > 10 && x < 50 && y > 10 && y < 50, "leak at ({x}, {y})");
            }
        }
    }
    assert_eq!(buffer.read(5, 5).unwrap(), Rgba::WHITE);
    assert_eq!(buffer.read(55, 30).unwrap(), Rgba::WHITE);
    assert_eq!(buffer.read(47, 47).unwrap(), RED);

    let bounds = report.bounds.unwrap();
    assert!(bounds.x > 10 && bounds.right() <= 50);
}

#[test]
fn fill_covers_exactly_the_connected_region() {
    let gray = Rgba::rgb(200, 200, 200);
    let mut buffer = PixelBuffer::allocate(40, 40).unwrap();
    let mut disk = Vec::new();
    for y in 0..40u32 {
        for x in 0..40u32 {
            let (dx, dy) = (i64::from(x) - 20, i64::from(y) - 20);
            if dx * dx + dy * dy <= 100 {
                buffer.write(x, y, gray).unwrap();
                disk.push((x, y));
            }
        }
    }
    assert_eq!(disk.len(), 317);

    let report = flood_fill(&mut buffer, &FillRequest::new(20, 20, RED, 32)).unwrap();
    assert_eq!(report.status, FillStatus::Filled);
    assert_eq!(report.filled, disk.len());

    for y in 0..40u32 {
        for x in 0..40u32 {
            let expected = if disk.contains(&(x, y)) { RED } else { Rgba::WHITE };
            assert_eq!(buffer.read(x, y).unwrap(), expected, "pixel ({x}, {y})");
        }
    }
}

#[test]
fn ink_is_never_overwritten() {
    let mut surface = outlined_square();
    let before = surface.buffer().clone();

    let on_line = surface.fill(&FillRequest::new(50, 30, RED, 255)).unwrap();
    assert_eq!(on_line.status, FillStatus::SeedIsInk);
    assert_eq!(surface.buffer(), &before);

    // Even a huge tolerance cannot cross the outline.
    surface.fill(&FillRequest::new(30, 30, RED, 400)).unwrap();
    assert_eq!(surface.buffer().read(50, 30).unwrap(), Rgba::BLACK);
    assert_eq!(surface.buffer().read(5, 5).unwrap(), Rgba::WHITE);
}

#[test]
fn letterbox_is_centered() {
    let mut buffer = PixelBuffer::allocate(300, 300).unwrap();
    let placed = blit(&mut buffer, &solid(400, 100, RED));

    assert_eq!((placed.x, placed.y, placed.width, placed.height), (0, 112, 300, 75));
    assert_eq!(buffer.read(150, 111).unwrap(), Rgba::WHITE);
    assert_eq!(buffer.read(150, 112).unwrap(), RED);
    assert_eq!(buffer.read(150, 186).unwrap(), RED);
    assert_eq!(buffer.read(150, 187).unwrap(), Rgba::WHITE);
    // 113 rows of padding below the image.
    assert_eq!(300 - placed.bottom(), 113);
}

#[test]
fn resize_matches_fresh_blit() {
    let photo = solid(400, 100, Rgba::rgb(30, 120, 220));
    let mut surface = Surface::with_size(300, 250).unwrap();
    surface.load_image(photo.clone());

    surface
        .handle_event(&SurfaceEvent::Resize {
            width: 600,
            height: 500,
        })
        .unwrap();

    let mut expected = PixelBuffer::allocate(600, 500).unwrap();
    blit(&mut expected, &photo);
    assert_eq!(surface.buffer(), &expected);
}

#[test]
fn repeated_resizes_do_not_compound_loss() {
    let mut pixels = image::RgbaImage::from_pixel(64, 32, image::Rgba([255, 255, 255, 255]));
    for x in 0..64 {
        pixels.put_pixel(x, x / 2, image::Rgba([0, 0, 0, 255]));
    }
    let photo = SourceBitmap::from_image(pixels).unwrap();

    let mut surface = Surface::with_size(300, 250).unwrap();
    surface.load_image(photo);
    let original = surface.buffer().clone();

    surface.resize(37, 91).unwrap();
    surface.resize(500, 120).unwrap();
    surface.resize(300, 250).unwrap();
    assert_eq!(surface.buffer(), &original);
}

#[test]
fn locked_surface_ignores_input_until_cleared() {
    let mut surface = Surface::with_size(50, 50).unwrap();
    surface.load_image(solid(10, 10, Rgba::rgb(200, 200, 200)));
    let locked = surface.buffer().clone();

    surface.begin_stroke(Point::new(0.0, 0.0));
    surface.extend_stroke(Point::new(49.0, 49.0));
    surface.set_tool(Tool::Fill);
    let report = surface.fill_at(Point::new(25.0, 25.0)).unwrap();
    assert_eq!(report.status, FillStatus::Locked);
    assert_eq!(surface.buffer(), &locked);

    surface.clear();
    let report = surface.fill_at(Point::new(25.0, 25.0)).unwrap();
    assert_eq!(report.status, FillStatus::Filled);
}

#[test]
fn blank_surface_cannot_be_exported() {
    let mut surface = Surface::with_size(20, 20).unwrap();
    assert!(surface.export_buffer().is_err());

    surface.begin_stroke(Point::new(2.0, 2.0));
    surface.extend_stroke(Point::new(18.0, 2.0));
    assert!(surface.export_buffer().is_ok());
}
