//! System font measurement using fontdb and rustybuzz

use std::path::Path;
use std::sync::Arc;

use fontdb::{Database, Family, Query, Source, Stretch, Weight, ID as FontId};
use rustybuzz::UnicodeBuffer;

use super::{FontMetrics, Size};
use crate::style::Style;
use crate::utils::{FxError, Result};

type FontData = Arc<dyn AsRef<[u8]> + Send + Sync>;

/// Font database backed by installed and explicitly added fonts
pub struct SystemFonts {
    database: Database,
}

/// Face resolved from the database, with its bytes kept alive
#[derive(Clone)]
pub struct SystemFace {
    id: FontId,
    data: FontData,
    index: u32,
    units_per_em: f64,
    size: f64,
}

impl core::fmt::Debug for SystemFace {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SystemFace")
            .field("id", &self.id)
            .field("index", &self.index)
            .field("units_per_em", &self.units_per_em)
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}

impl SystemFonts {
    /// Database with all system fonts loaded
    #[must_use]
    pub fn new() -> Self {
        let mut database = Database::new();
        database.load_system_fonts();
        log::debug!("loaded {} system font faces", database.len());
        Self { database }
    }

    /// Database with no fonts; add them with [`Self::load_fonts_dir`] or
    /// [`Self::load_font_file`]
    #[must_use]
    pub fn empty() -> Self {
        Self {
            database: Database::new(),
        }
    }

    /// Add every font found under `dir`
    pub fn load_fonts_dir(&mut self, dir: impl AsRef<Path>) {
        let before = self.database.len();
        self.database.load_fonts_dir(dir.as_ref());
        log::debug!(
            "loaded {} faces from {}",
            self.database.len() - before,
            dir.as_ref().display()
        );
    }

    /// Add a single font file
    ///
    /// # Errors
    ///
    /// Returns [`FxError::Io`] if the file cannot be read.
    pub fn load_font_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        self.database.load_font_file(path.as_ref())?;
        Ok(())
    }

    /// Underlying database
    #[must_use]
    pub const fn database(&self) -> &Database {
        &self.database
    }

    fn find_face(&self, style: &Style) -> Result<FontId> {
        let query = Query {
            families: &[Family::Name(style.font_name.as_str()), Family::SansSerif],
            weight: if style.is_bold() {
                Weight::BOLD
            } else {
                Weight::NORMAL
            },
            stretch: Stretch::Normal,
            style: if style.is_italic() {
                fontdb::Style::Italic
            } else {
                fontdb::Style::Normal
            },
        };

        self.database
            .query(&query)
            .ok_or_else(|| FxError::font_load(&style.font_name, "no matching face"))
    }

    fn face_data(&self, id: FontId, family: &str) -> Result<(FontData, u32)> {
        let (source, index) = self
            .database
            .face_source(id)
            .ok_or_else(|| FxError::font_load(family, "face disappeared from database"))?;

        let data: FontData = match source {
            Source::Binary(data) | Source::SharedFile(_, data) => data,
            Source::File(path) => Arc::new(std::fs::read(&path).map_err(|err| {
                FxError::font_load(family, format!("{}: {err}", path.display()))
            })?),
        };
        Ok((data, index))
    }
}

impl Default for SystemFonts {
    fn default() -> Self {
        Self::new()
    }
}

impl FontMetrics for SystemFonts {
    type Face = SystemFace;

    fn load_font(&self, style: &Style, size: f64) -> Result<SystemFace> {
        let id = self.find_face(style)?;
        let (data, index) = self.face_data(id, &style.font_name)?;

        let units_per_em = ttf_parser::Face::parse((*data).as_ref(), index)
            .map(|face| f64::from(face.units_per_em()))
            .map_err(|err| FxError::font_load(&style.font_name, err))?;

        log::debug!(
            "style {:?} uses face {id:?} for {:?} at {size}pt",
            style.name,
            style.font_name
        );
        Ok(SystemFace {
            id,
            data,
            index,
            units_per_em,
            size,
        })
    }

    fn measure(&self, face: &SystemFace, text: &str) -> Size {
        self.measure_all(face, &[text])
            .pop()
            .unwrap_or(Size::new(0.0, face.size))
    }

    /// Parses the shaping face once for the whole batch
    fn measure_all(&self, face: &SystemFace, texts: &[&str]) -> Vec<Size> {
        let Some(shaper) = rustybuzz::Face::from_slice((*face.data).as_ref(), face.index) else {
            return vec![Size::new(0.0, face.size); texts.len()];
        };

        texts
            .iter()
            .map(|text| Size::new(shaped_width(&shaper, face, text), face.size))
            .collect()
    }
}

fn shaped_width(shaper: &rustybuzz::Face<'_>, face: &SystemFace, text: &str) -> f64 {
    let mut buffer = UnicodeBuffer::new();
    buffer.push_str(text);
    let output = rustybuzz::shape(shaper, &[], buffer);
    let advance: i64 = output
        .glyph_positions()
        .iter()
        .map(|pos| i64::from(pos.x_advance))
        .sum();
    advance as f64 * face.size / face.units_per_em
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_database_fails_to_load() {
        let fonts = SystemFonts::empty();
        let err = fonts.load_font(&Style::new("Default"), 20.0).unwrap_err();
        assert!(matches!(err, FxError::FontLoad(_)));
        assert!(err.is_fatal());
    }

    #[test]
    fn batch_matches_single_measurements() {
        let fonts = SystemFonts::new();
        // Hosts without any installed font have nothing to shape
        let Ok(face) = fonts.load_font(&Style::new("Default"), 40.0) else {
            return;
        };

        let texts = ["ka", "r", "a karaoke"];
        let batch = fonts.measure_all(&face, &texts);
        let single: Vec<Size> = texts.iter().map(|t| fonts.measure(&face, t)).collect();
        assert_eq!(batch, single);
        assert!(batch[2].width > batch[1].width);
        assert!(batch.iter().all(|size| size.height == 40.0));
    }

    #[test]
    fn missing_font_file_is_io_error() {
        let mut fonts = SystemFonts::empty();
        let err = fonts
            .load_font_file("/nonexistent/definitely-missing.ttf")
            .unwrap_err();
        assert!(matches!(err, FxError::Io(_)));
    }
}
