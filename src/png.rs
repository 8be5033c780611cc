use std::path::Path;

use crate::error::Result;

/// Writes an 8-bit RGB buffer (row-major, top-to-bottom) out as a PNG. The
/// only place the `image` crate is named — everything upstream works in
/// linear `Color` and only quantizes to `u8` immediately before this call.
/// The format is always PNG regardless of the path's extension — we pass
/// the hint explicitly rather than let `image` sniff it, since the
/// configuration surface defines the format, not the output path.
pub fn write_rgb8(path: &Path, width: u32, height: u32, pixels: &[u8]) -> Result<()> {
    let buffer =
        image::RgbImage::from_raw(width, height, pixels.to_vec()).expect(
            "pixel buffer length must equal width * height * 3",
        );
    buffer.save_with_format(path, image::ImageFormat::Png)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_a_png_of_the_expected_size() {
        let dir = std::env::temp_dir();
        let path = dir.join("octant_trace_test_output.png");
        let width = 4;
        let height = 3;
        let pixels = vec![128u8; (width * height * 3) as usize];

        write_rgb8(&path, width, height, &pixels).expect("writes png");

        let loaded = image::open(&path).expect("reopen png");
        assert_eq!(loaded.width(), width);
        assert_eq!(loaded.height(), height);

        std::fs::remove_file(&path).ok();
    }
}
