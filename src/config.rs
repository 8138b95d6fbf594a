//! Configuration types for a contact export.
//!
//! All export behaviour is controlled through [`ExportConfig`], built via its
//! [`ExportConfigBuilder`]. Page geometry lives in its own [`PageGeometry`]
//! struct so the layout engine can be driven (and tested) without the rest
//! of the configuration.

use crate::error::ScribeError;
use crate::i18n::Language;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Physical page size in PDF points (1/72 inch).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageSize {
    pub width: f32,
    pub height: f32,
}

impl PageSize {
    /// ISO A4, 210 × 297 mm.
    pub const A4: PageSize = PageSize {
        width: 595.2756,
        height: 841.8898,
    };
}

impl Default for PageSize {
    fn default() -> Self {
        Self::A4
    }
}

/// Page geometry and typography used by the layout engine.
///
/// All distances are in PDF points; `y` grows upwards from the bottom edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageGeometry {
    pub page_size: PageSize,
    /// Left, right and top margin. Default: 40.
    pub margin: f32,
    /// A new page is started when the cursor falls below this height. Default: 60.
    pub bottom_margin: f32,
    /// Font size of the "Export date" header. Default: 10.
    pub header_font_size: f32,
    /// Font size of each contact's name line. Default: 12.
    pub name_font_size: f32,
    /// Font size of field lines. Default: 10.
    pub body_font_size: f32,
    /// Space below the header before the first contact. Default: 30.
    pub header_gap: f32,
    /// Cursor advance after the name line. Default: 15.
    pub name_line_height: f32,
    /// Cursor advance after each field line. Default: 12.
    pub line_height: f32,
    /// Space after a contact's divider. Default: 20.
    pub block_gap: f32,
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self {
            page_size: PageSize::A4,
            margin: 40.0,
            bottom_margin: 60.0,
            header_font_size: 10.0,
            name_font_size: 12.0,
            body_font_size: 10.0,
            header_gap: 30.0,
            name_line_height: 15.0,
            line_height: 12.0,
            block_gap: 20.0,
        }
    }
}

impl PageGeometry {
    /// Baseline of the first line on every page.
    pub fn top(&self) -> f32 {
        self.page_size.height - self.margin
    }

    /// Usable line width between the left and right margins.
    pub fn text_width(&self) -> f32 {
        self.page_size.width - 2.0 * self.margin
    }

    fn validate(&self) -> Result<(), ScribeError> {
        let positive = [
            ("page width", self.page_size.width),
            ("page height", self.page_size.height),
            ("header font size", self.header_font_size),
            ("name font size", self.name_font_size),
            ("body font size", self.body_font_size),
            ("name line height", self.name_line_height),
            ("line height", self.line_height),
        ];
        for (what, v) in positive {
            if !(v.is_finite() && v > 0.0) {
                return Err(ScribeError::InvalidConfig(format!(
                    "{what} must be > 0, got {v}"
                )));
            }
        }
        if self.margin < 0.0 || self.bottom_margin < 0.0 {
            return Err(ScribeError::InvalidConfig("Margins must be ≥ 0".into()));
        }
        if self.text_width() <= self.body_font_size {
            return Err(ScribeError::InvalidConfig(format!(
                "Margin {} leaves no room for text on a {}pt wide page",
                self.margin, self.page_size.width
            )));
        }
        if self.top() - self.bottom_margin < self.name_line_height {
            return Err(ScribeError::InvalidConfig(format!(
                "Top margin {} and bottom margin {} leave no room for a line",
                self.margin, self.bottom_margin
            )));
        }
        Ok(())
    }
}

/// Configuration for a contact export.
///
/// Built via [`ExportConfig::builder()`] or using [`ExportConfig::default()`].
///
/// # Example
/// ```rust
/// use contactscribe::{ExportConfig, Language};
///
/// let config = ExportConfig::builder()
///     .language(Language::Es)
///     .skip_invalid_records(false)
///     .build()
///     .unwrap();
/// assert_eq!(config.language, Language::Es);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Language of the printed labels. Default: English.
    pub language: Language,

    /// Page geometry and font sizes.
    pub geometry: PageGeometry,

    /// Date printed in the header. `None` means today's local date.
    pub export_date: Option<NaiveDate>,

    /// Skip malformed vCard components instead of failing. Default: true.
    ///
    /// Skipped components are reported through
    /// [`crate::output::ExportOutput::skipped`].
    pub skip_invalid_records: bool,

    /// Flate-compress page content streams. Default: true.
    pub compress: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            language: Language::default(),
            geometry: PageGeometry::default(),
            export_date: None,
            skip_invalid_records: true,
            compress: true,
        }
    }
}

impl ExportConfig {
    /// Create a new builder for `ExportConfig`.
    pub fn builder() -> ExportConfigBuilder {
        ExportConfigBuilder {
            config: Self::default(),
        }
    }

    /// The configured export date, or today's local date.
    pub fn resolved_export_date(&self) -> NaiveDate {
        self.export_date
            .unwrap_or_else(|| chrono::Local::now().date_naive())
    }
}

/// Builder for [`ExportConfig`].
#[derive(Debug)]
pub struct ExportConfigBuilder {
    config: ExportConfig,
}

impl ExportConfigBuilder {
    pub fn language(mut self, language: Language) -> Self {
        self.config.language = language;
        self
    }

    pub fn geometry(mut self, geometry: PageGeometry) -> Self {
        self.config.geometry = geometry;
        self
    }

    pub fn page_size(mut self, size: PageSize) -> Self {
        self.config.geometry.page_size = size;
        self
    }

    pub fn margin(mut self, margin: f32) -> Self {
        self.config.geometry.margin = margin;
        self
    }

    pub fn export_date(mut self, date: NaiveDate) -> Self {
        self.config.export_date = Some(date);
        self
    }

    pub fn skip_invalid_records(mut self, v: bool) -> Self {
        self.config.skip_invalid_records = v;
        self
    }

    pub fn compress(mut self, v: bool) -> Self {
        self.config.compress = v;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ExportConfig, ScribeError> {
        self.config.geometry.validate()?;
        Ok(self.config)
    }
}
