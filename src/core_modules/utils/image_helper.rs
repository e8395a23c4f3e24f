pub mod image_helper {
    use crate::core_modules::mask::Mask;
    use crate::core_modules::pixel_buffer::PixelBuffer;
    use image::ImageEncoder;
    use std::path::Path;

    /// Writes raw RGBA bytes as a PNG.
    pub fn save(
        path: &Path,
        width: u32,
        height: u32,
        buffer: &[u8],
    ) -> Result<(), image::error::ImageError> {
        let output = std::fs::File::create(path)?;
        let encoder = image::codecs::png::PngEncoder::new(output);

        encoder.write_image(buffer, width, height, image::ExtendedColorType::Rgba8)?;

        Ok(())
    }

    /// Dumps a captured buffer for offline inspection.
    pub fn save_buffer(path: &Path, buffer: &PixelBuffer) -> Result<(), image::error::ImageError> {
        save(path, buffer.width(), buffer.height(), buffer.as_bytes())
    }

    /// Dumps a segmentation mask as a black/white PNG.
    pub fn save_mask(path: &Path, mask: &Mask) -> Result<(), image::error::ImageError> {
        mask.to_gray_image().save(path)
    }
}
