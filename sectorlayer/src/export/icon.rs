use std::io::Cursor;

use image::{ImageFormat, Rgba, RgbaImage};

/// Archive path of the point icon.
pub const ICON_PATH: &str = "files/point.png";

const SIZE: u32 = 32;
const FILL: Rgba<u8> = Rgba([220, 40, 40, 255]);
const RIM: Rgba<u8> = Rgba([255, 255, 255, 255]);
const CLEAR: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Render the placemark icon (a filled dot with a white rim) as PNG.
pub fn point_icon_png() -> image::ImageResult<Vec<u8>> {
    let center = (SIZE as f32 - 1.0) / 2.0;
    let outer = SIZE as f32 / 2.0 - 1.0;
    let inner = outer - 2.5;

    let img = RgbaImage::from_fn(SIZE, SIZE, |x, y| {
        let d = ((x as f32 - center).powi(2) + (y as f32 - center).powi(2)).sqrt();
        if d <= inner {
            FILL
        } else if d <= outer {
            RIM
        } else {
            CLEAR
        }
    });

    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}
