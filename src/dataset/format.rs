//! Texture format mapping for decoded tiles.
//!
//! Maps a dataset's (band count, sample type) pair onto the texture
//! format the renderer uploads. The mapping is deterministic and
//! lenient: an unrenderable combination logs an error and falls back
//! to a default format rather than failing, preserving forward
//! progress over correctness of that one layer.

use super::raster::SampleType;

/// Channel layout of a decoded tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureChannels {
    Red,
    Rg,
    Rgb,
    Rgba,
}

impl TextureChannels {
    /// Number of channels.
    pub fn count(&self) -> usize {
        match self {
            TextureChannels::Red => 1,
            TextureChannels::Rg => 2,
            TextureChannels::Rgb => 3,
            TextureChannels::Rgba => 4,
        }
    }
}

/// The pixel format of a decoded tile: channel layout plus sample
/// type. Interpreted by the GPU upload boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureFormat {
    /// Channel layout.
    pub channels: TextureChannels,
    /// Per-channel sample type.
    pub sample_type: SampleType,
}

impl TextureFormat {
    /// The fallback format used for unrenderable band/type
    /// combinations.
    pub const FALLBACK: TextureFormat = TextureFormat {
        channels: TextureChannels::Rgba,
        sample_type: SampleType::U8,
    };

    /// Bytes per interleaved pixel.
    pub fn bytes_per_pixel(&self) -> usize {
        self.channels.count() * self.sample_type.size_bytes()
    }

    /// Map a raster's band count and sample type to a texture format.
    ///
    /// Band counts 1 through 4 map onto Red/RG/RGB/RGBA with the
    /// source sample type. Anything else logs an error and returns
    /// [`TextureFormat::FALLBACK`].
    pub fn for_raster(band_count: usize, sample_type: SampleType) -> TextureFormat {
        let channels = match band_count {
            1 => TextureChannels::Red,
            2 => TextureChannels::Rg,
            3 => TextureChannels::Rgb,
            4 => TextureChannels::Rgba,
            other => {
                tracing::error!(
                    band_count = other,
                    ?sample_type,
                    "no texture format for raster layout, using fallback"
                );
                return TextureFormat::FALLBACK;
            }
        };

        TextureFormat {
            channels,
            sample_type,
        }
    }
}
