use std::{collections::HashMap, path::PathBuf, sync::Arc};

/// Font family a view asks for, before it is resolved to a concrete face.
///
/// Named families that are not installed fall back to the default sans-serif
/// face instead of failing, the same way a platform typeface lookup does.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum FontFamily {
    #[default]
    Default,
    SansSerif,
    Serif,
    Monospace,
    Named(String),
}

impl FontFamily {
    /// Parses a markup-style family attribute (`"monospace"`, `"serif"`, a face name...).
    pub fn parse(name: &str) -> Self {
        match name.trim() {
            "" => Self::Default,
            "sans-serif" | "sans" => Self::SansSerif,
            "serif" => Self::Serif,
            "monospace" | "mono" => Self::Monospace,
            other => Self::Named(other.to_string()),
        }
    }

    fn as_fontdb(&self) -> fontdb::Family<'_> {
        match self {
            Self::Default | Self::SansSerif => fontdb::Family::SansSerif,
            Self::Serif => fontdb::Family::Serif,
            Self::Monospace => fontdb::Family::Monospace,
            Self::Named(name) => fontdb::Family::Name(name),
        }
    }
}

/// Owns the font database and the parsed faces used for shaping.
///
/// Faces are registered in `fontdb` up front but only parsed by `fontdue`
/// the first time a shaper asks for them.
pub struct FontStorage {
    font_db: fontdb::Database,
    /// Not every face in `font_db` is parsed here.
    loaded_font: HashMap<fontdb::ID, Arc<fontdue::Font>, fxhash::FxBuildHasher>,
}

impl Default for FontStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl FontStorage {
    /// Creates a new empty font storage.
    pub fn new() -> Self {
        Self {
            font_db: fontdb::Database::new(),
            loaded_font: HashMap::with_hasher(fxhash::FxBuildHasher::default()),
        }
    }
}

/// Loading fonts into fontdb.
impl FontStorage {
    /// Loads a font from binary data.
    pub fn load_font_binary(&mut self, data: impl Into<Vec<u8>>) {
        self.font_db.load_font_data(data.into());
    }

    /// Loads a font from a file path.
    pub fn load_font_file(&mut self, path: PathBuf) -> Result<(), std::io::Error> {
        self.font_db.load_font_file(path)
    }

    /// Loads all fonts from a directory.
    pub fn load_fonts_dir(&mut self, dir: PathBuf) {
        self.font_db.load_fonts_dir(dir)
    }

    /// Loads the system fonts.
    pub fn load_system_fonts(&mut self) {
        self.font_db.load_system_fonts();
    }

    /// Sets the face family used for [`FontFamily::Monospace`].
    pub fn set_monospace_family(&mut self, family: impl Into<String>) {
        self.font_db.set_monospace_family(family);
    }

    /// Sets the face family used for [`FontFamily::Default`] and [`FontFamily::SansSerif`].
    pub fn set_sans_serif_family(&mut self, family: impl Into<String>) {
        self.font_db.set_sans_serif_family(family);
    }

    pub fn is_empty(&self) -> bool {
        self.font_db.is_empty()
    }

    pub fn len(&self) -> usize {
        self.font_db.len()
    }
}

/// Resolving and loading faces.
impl FontStorage {
    /// Resolves a family to a face id.
    ///
    /// Tries the requested family, then the default sans-serif family, then
    /// any registered face. Returns `None` only when the storage is empty.
    pub fn resolve(&self, family: &FontFamily) -> Option<fontdb::ID> {
        self.query_families(&[family.as_fontdb()])
            .or_else(|| {
                log::debug!("family {family:?} not installed, using the default face");
                self.query_families(&[fontdb::Family::SansSerif])
            })
            .or_else(|| self.font_db.faces().next().map(|face| face.id))
    }

    fn query_families(&self, families: &[fontdb::Family<'_>]) -> Option<fontdb::ID> {
        self.font_db.query(&fontdb::Query {
            families,
            weight: fontdb::Weight::NORMAL,
            stretch: fontdb::Stretch::Normal,
            style: fontdb::Style::Normal,
        })
    }

    /// Retrieves a parsed font by ID, parsing it on first use.
    pub fn font(&mut self, id: fontdb::ID) -> Option<Arc<fontdue::Font>> {
        use std::collections::hash_map::Entry;

        match self.loaded_font.entry(id) {
            Entry::Occupied(entry) => Some(Arc::clone(entry.get())),
            Entry::Vacant(entry) => {
                let font_result = self.font_db.with_face_data(id, |data, index| {
                    fontdue::Font::from_bytes(
                        data,
                        fontdue::FontSettings {
                            collection_index: index,
                            scale: 40.0,
                            load_substitutions: true,
                        },
                    )
                })?;

                match font_result {
                    Ok(font) => Some(Arc::clone(entry.insert(Arc::new(font)))),
                    Err(e) => {
                        log::error!("Failed to load font (id: {:?}): {}", id, e);
                        None
                    }
                }
            }
        }
    }

    /// Returns face info for an ID.
    pub fn face(&self, id: fontdb::ID) -> Option<&fontdb::FaceInfo> {
        self.font_db.face(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_family_attribute() {
        assert_eq!(FontFamily::parse(""), FontFamily::Default);
        assert_eq!(FontFamily::parse("monospace"), FontFamily::Monospace);
        assert_eq!(FontFamily::parse(" serif "), FontFamily::Serif);
        assert_eq!(FontFamily::parse("sans-serif"), FontFamily::SansSerif);
        assert_eq!(
            FontFamily::parse("Noto Sans"),
            FontFamily::Named("Noto Sans".to_string())
        );
    }

    #[test]
    fn empty_storage_resolves_nothing() {
        let storage = FontStorage::new();
        assert!(storage.is_empty());
        assert_eq!(storage.resolve(&FontFamily::Monospace), None);
        assert_eq!(storage.resolve(&FontFamily::Named("Nope".into())), None);
    }
}
