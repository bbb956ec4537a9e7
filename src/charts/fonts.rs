use font_kit::source::SystemSource;
use log::{debug, info, warn};
use plotters::style::{FontDesc, FontStyle, IntoFont};

pub const FALLBACK_FAMILY: &str = "sans-serif";

/// Every glyph here must be present for a family to count as CJK capable.
const SAMPLE_TEXT: &str = "车险理赔年龄段";

/// Font family used for every chart of one run.
///
/// When no CJK family could be loaded the charts switch to ASCII labels so
/// nothing renders as missing glyphs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontChoice {
    pub family: String,
    pub localized: bool,
}

impl FontChoice {
    pub fn fallback() -> Self {
        Self {
            family: FALLBACK_FAMILY.to_string(),
            localized: false,
        }
    }

    pub fn pick<'a>(&self, localized: &'a str, ascii: &'a str) -> &'a str {
        if self.localized {
            localized
        } else {
            ascii
        }
    }

    pub fn desc(&self, size: f64) -> FontDesc<'_> {
        (self.family.as_str(), size).into_font()
    }

    pub fn bold(&self, size: f64) -> FontDesc<'_> {
        self.desc(size).style(FontStyle::Bold)
    }
}

/// First configured family that can lay out CJK text, else the fallback.
pub fn resolve_font(families: &[String]) -> FontChoice {
    for family in families {
        if covers_cjk(family) {
            info!("Using chart font family {}", family);
            return FontChoice {
                family: family.clone(),
                localized: true,
            };
        }
        debug!("Font family {} is not usable", family);
    }
    warn!(
        "None of the configured font families {:?} is available, falling back to {} with ASCII labels",
        families, FALLBACK_FAMILY
    );
    FontChoice::fallback()
}

/// Looks the family up by exact name; plotters itself would silently
/// substitute sans-serif for an unknown one.
fn covers_cjk(family: &str) -> bool {
    if family.trim().is_empty() {
        return false;
    }
    let handle = match SystemSource::new().select_family_by_name(family) {
        Ok(handle) => handle,
        Err(e) => {
            debug!("Font family {} not found: {:?}", family, e);
            return false;
        }
    };
    handle.fonts().iter().any(|font| match font.load() {
        Ok(font) => SAMPLE_TEXT.chars().all(|c| font.glyph_for_char(c).is_some()),
        Err(e) => {
            debug!("Unable to load a face of {}: {:?}", family, e);
            false
        }
    })
}
