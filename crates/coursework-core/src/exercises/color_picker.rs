//! Colour picker: load an image and sample the colour under a point.

use std::fmt;
use std::path::{Path, PathBuf};

use image::{DynamicImage, GenericImageView, RgbaImage};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum PickerError {
    #[error("Please upload a valid image file.")]
    InvalidImage,

    #[error("No image loaded")]
    NoImage,

    #[error("Point ({x}, {y}) is outside the {width}x{height} image")]
    OutOfBounds {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// `#rrggbb`, lowercase and zero padded
    pub fn hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    pub fn css(&self) -> String {
        format!("rgb({}, {}, {})", self.r, self.g, self.b)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.hex())
    }
}

/// Thumbnail of the loaded image for one requested size
#[derive(Debug)]
struct Preview {
    max_width: u32,
    max_height: u32,
    image: RgbaImage,
}

#[derive(Debug, Default)]
pub struct ColorPicker {
    image: Option<DynamicImage>,
    source: Option<PathBuf>,
    selected: Rgb,
    preview: Option<Preview>,
}

impl ColorPicker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode the image at `path`, replacing any loaded image. The selected
    /// colour is kept until the next pick.
    pub fn load(&mut self, path: &Path) -> Result<(), PickerError> {
        let image = image::ImageReader::open(path)
            .and_then(|reader| reader.with_guessed_format())
            .map_err(|e| {
                warn!(path = %path.display(), error = %e, "Cannot open image");
                PickerError::InvalidImage
            })?
            .decode()
            .map_err(|e| {
                warn!(path = %path.display(), error = %e, "Cannot decode image");
                PickerError::InvalidImage
            })?;

        debug!(
            path = %path.display(),
            width = image.width(),
            height = image.height(),
            "Image loaded"
        );
        self.image = Some(image);
        self.source = Some(path.to_path_buf());
        self.preview = None;
        Ok(())
    }

    pub fn load_image(&mut self, image: DynamicImage) {
        self.image = Some(image);
        self.source = None;
        self.preview = None;
    }

    pub fn has_image(&self) -> bool {
        self.image.is_some()
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn dimensions(&self) -> Option<(u32, u32)> {
        self.image.as_ref().map(|img| img.dimensions())
    }

    pub fn selected(&self) -> Rgb {
        self.selected
    }

    /// Sample the pixel at `(x, y)` and make it the selected colour
    pub fn pick(&mut self, x: u32, y: u32) -> Result<Rgb, PickerError> {
        let image = self.image.as_ref().ok_or(PickerError::NoImage)?;
        let (width, height) = image.dimensions();
        if x >= width || y >= height {
            return Err(PickerError::OutOfBounds {
                x,
                y,
                width,
                height,
            });
        }
        let [r, g, b, _] = image.get_pixel(x, y).0;
        self.selected = Rgb::new(r, g, b);
        Ok(self.selected)
    }

    /// Map a cell of a `cols` x `rows` grid drawn over the image to the
    /// pixel at the cell's centre
    pub fn cell_to_pixel(&self, col: u32, row: u32, cols: u32, rows: u32) -> Option<(u32, u32)> {
        let (width, height) = self.dimensions()?;
        if cols == 0 || rows == 0 || col >= cols || row >= rows {
            return None;
        }
        let x = ((2 * col as u64 + 1) * width as u64 / (2 * cols as u64)) as u32;
        let y = ((2 * row as u64 + 1) * height as u64 / (2 * rows as u64)) as u32;
        Some((x.min(width - 1), y.min(height - 1)))
    }

    /// Downscaled copy that fits in `max_width` x `max_height`, keeping the
    /// aspect ratio. Rebuilt only when the size or the image changes.
    pub fn preview(&mut self, max_width: u32, max_height: u32) -> Option<&RgbaImage> {
        let image = self.image.as_ref()?;
        if max_width == 0 || max_height == 0 {
            return None;
        }
        let cached = matches!(
            self.preview,
            Some(ref p) if p.max_width == max_width && p.max_height == max_height
        );
        if !cached {
            debug!(max_width, max_height, "Building image preview");
            self.preview = Some(Preview {
                max_width,
                max_height,
                image: image.thumbnail(max_width, max_height).to_rgba8(),
            });
        }
        self.preview.as_ref().map(|p| &p.image)
    }

    /// Drop the image and return the selection to black
    pub fn reset(&mut self) {
        self.image = None;
        self.source = None;
        self.selected = Rgb::default();
        self.preview = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn two_tone() -> DynamicImage {
        let mut img = RgbaImage::from_pixel(4, 2, Rgba([255, 0, 0, 255]));
        img.put_pixel(3, 1, Rgba([10, 200, 5, 255]));
        DynamicImage::ImageRgba8(img)
    }

    #[test]
    fn test_hex_and_css() {
        let c = Rgb::new(10, 200, 5);
        assert_eq!(c.hex(), "#0ac805");
        assert_eq!(c.css(), "rgb(10, 200, 5)");
        assert_eq!(Rgb::default().hex(), "#000000");
        assert_eq!(Rgb::new(255, 255, 255).to_string(), "#ffffff");
    }

    #[test]
    fn test_pick_samples_pixel() {
        let mut picker = ColorPicker::new();
        picker.load_image(two_tone());
        assert_eq!(picker.pick(0, 0).unwrap(), Rgb::new(255, 0, 0));
        assert_eq!(picker.pick(3, 1).unwrap(), Rgb::new(10, 200, 5));
        assert_eq!(picker.selected().hex(), "#0ac805");
    }

    #[test]
    fn test_pick_out_of_bounds() {
        let mut picker = ColorPicker::new();
        picker.load_image(two_tone());
        picker.pick(3, 1).unwrap();
        let err = picker.pick(4, 0).unwrap_err();
        assert!(matches!(err, PickerError::OutOfBounds { x: 4, .. }));
        // Selection untouched by a failed pick
        assert_eq!(picker.selected(), Rgb::new(10, 200, 5));
    }

    #[test]
    fn test_pick_without_image() {
        let mut picker = ColorPicker::new();
        assert!(matches!(picker.pick(0, 0), Err(PickerError::NoImage)));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("swatch.png");
        two_tone().save(&path).unwrap();

        let mut picker = ColorPicker::new();
        picker.load(&path).unwrap();
        assert_eq!(picker.dimensions(), Some((4, 2)));
        assert_eq!(picker.source(), Some(path.as_path()));
        assert_eq!(picker.pick(3, 1).unwrap().css(), "rgb(10, 200, 5)");
    }

    #[test]
    fn test_load_rejects_non_image() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "not an image").unwrap();

        let mut picker = ColorPicker::new();
        let err = picker.load(&path).unwrap_err();
        assert_eq!(err.to_string(), "Please upload a valid image file.");
        assert!(!picker.has_image());

        let missing = dir.path().join("missing.png");
        assert!(matches!(picker.load(&missing), Err(PickerError::InvalidImage)));
    }

    #[test]
    fn test_reset() {
        let mut picker = ColorPicker::new();
        picker.load_image(two_tone());
        picker.pick(0, 0).unwrap();
        picker.reset();
        assert!(!picker.has_image());
        assert_eq!(picker.selected(), Rgb::default());
        assert_eq!(picker.dimensions(), None);
    }

    #[test]
    fn test_cell_to_pixel() {
        let mut picker = ColorPicker::new();
        assert_eq!(picker.cell_to_pixel(0, 0, 2, 2), None);
        picker.load_image(two_tone());
        assert_eq!(picker.cell_to_pixel(0, 0, 2, 1), Some((1, 1)));
        assert_eq!(picker.cell_to_pixel(1, 0, 2, 1), Some((3, 1)));
        assert_eq!(picker.cell_to_pixel(2, 0, 2, 1), None);
        assert_eq!(picker.cell_to_pixel(0, 0, 0, 1), None);
    }

    #[test]
    fn test_preview_fits() {
        let mut picker = ColorPicker::new();
        picker.load_image(two_tone());
        let preview = picker.preview(2, 2).unwrap();
        assert!(preview.width() <= 2 && preview.height() <= 2);
        assert!(picker.preview(0, 5).is_none());
    }

    fn cached_size(picker: &ColorPicker) -> Option<(u32, u32)> {
        picker.preview.as_ref().map(|p| (p.max_width, p.max_height))
    }

    #[test]
    fn test_preview_cached_per_size() {
        let mut picker = ColorPicker::new();
        picker.load_image(two_tone());
        assert_eq!(cached_size(&picker), None);

        picker.preview(2, 2).unwrap();
        assert_eq!(cached_size(&picker), Some((2, 2)));
        let first = picker.preview(2, 2).unwrap().clone();
        assert_eq!(cached_size(&picker), Some((2, 2)));

        picker.preview(4, 2).unwrap();
        assert_eq!(cached_size(&picker), Some((4, 2)));
        assert_ne!(picker.preview(4, 2).unwrap().dimensions(), first.dimensions());

        // A new image or a reset drops the stale thumbnail
        picker.load_image(two_tone());
        assert_eq!(cached_size(&picker), None);
        picker.preview(2, 2).unwrap();
        picker.reset();
        assert_eq!(cached_size(&picker), None);
        assert!(picker.preview(2, 2).is_none());
    }
}
