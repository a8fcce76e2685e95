/// Minimum pixel count (h*w) to use pixel-level Rayon parallelism when
/// folding a grid into the running mean.
pub const PARALLEL_PIXEL_THRESHOLD: usize = 65_536;

/// Number of channels in a color frame (R, G, B).
pub const COLOR_CHANNEL_COUNT: usize = 3;

/// File extensions recognized as still frames in an image sequence
/// directory. Compared case-insensitively.
pub const RASTER_EXTENSIONS: [&str; 6] = ["png", "jpg", "jpeg", "tif", "tiff", "bmp"];
