use image::RgbaImage;

/// Drawing surface; always sized to the natural dimensions of its last image.
#[derive(Default)]
pub struct Canvas {
    width: u32,
    height: u32,
    pixels: Option<RgbaImage>,
    generation: u64,
}

impl Canvas {
    pub fn paint(&mut self, image: RgbaImage) {
        self.clear();
        self.width = image.width();
        self.height = image.height();
        self.pixels = Some(image);
    }

    pub fn clear(&mut self) {
        self.pixels = None;
        self.generation += 1;
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn pixels(&self) -> Option<&RgbaImage> {
        self.pixels.as_ref()
    }

    /// Bumped on every change so the UI knows when to re-upload its texture.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}
