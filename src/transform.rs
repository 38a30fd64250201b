//! Color transforms between two profiles.
//!
//! [`ColorTransform`] wraps a moxcms RGBA `f32` executor. Alpha is copied
//! through untouched, so callers hand it straight-alpha rows.

use std::sync::Arc;

use crate::error::ConvertError;
use crate::profile::ColorProfile;

/// ICC rendering intent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum RenderingIntent {
    /// Compress the gamut as a whole to preserve appearance.
    #[default]
    Perceptual,
    /// Map in-gamut colors exactly, relative to the media white point.
    RelativeColorimetric,
    /// Preserve saturation at the cost of hue accuracy.
    Saturation,
    /// Map in-gamut colors exactly, including the white point.
    AbsoluteColorimetric,
}

impl From<RenderingIntent> for moxcms::RenderingIntent {
    fn from(intent: RenderingIntent) -> Self {
        match intent {
            RenderingIntent::Perceptual => moxcms::RenderingIntent::Perceptual,
            RenderingIntent::RelativeColorimetric => moxcms::RenderingIntent::RelativeColorimetric,
            RenderingIntent::Saturation => moxcms::RenderingIntent::Saturation,
            RenderingIntent::AbsoluteColorimetric => moxcms::RenderingIntent::AbsoluteColorimetric,
        }
    }
}

/// A transform from one profile to another over straight-alpha RGBA rows.
pub struct ColorTransform {
    executor: Arc<dyn moxcms::TransformExecutor<f32> + Send + Sync>,
    scratch: Vec<f32>,
}

impl std::fmt::Debug for ColorTransform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ColorTransform")
            .field("scratch_len", &self.scratch.len())
            .finish_non_exhaustive()
    }
}

impl ColorTransform {
    /// Build a transform from `src` to `dest`.
    ///
    /// Returns `Ok(None)` when the profiles are equal and no transform is
    /// needed.
    ///
    /// # Errors
    ///
    /// Returns [`ConvertError::ColorTransformCreationFailed`] if the CMS
    /// cannot connect the two profiles.
    pub fn between(
        src: &ColorProfile,
        dest: &ColorProfile,
        intent: RenderingIntent,
    ) -> Result<Option<Self>, ConvertError> {
        if src == dest {
            log::debug!("profiles equal ({src:?}), no color transform");
            return Ok(None);
        }

        let mut options = moxcms::TransformOptions::default();
        options.rendering_intent = intent.into();

        let executor = src
            .cms_profile()
            .create_transform_f32(
                moxcms::Layout::Rgba,
                dest.cms_profile(),
                moxcms::Layout::Rgba,
                options,
            )
            .map_err(|e| {
                log::warn!("cannot create color transform {src:?} -> {dest:?}: {e:?}");
                ConvertError::ColorTransformCreationFailed {
                    reason: format!("{e:?}"),
                }
            })?;
        log::debug!("created {intent:?} color transform {src:?} -> {dest:?}");

        Ok(Some(Self {
            executor: Arc::from(executor),
            scratch: Vec::new(),
        }))
    }

    /// Transform the first `count` pixels of `rgba` in place.
    ///
    /// # Errors
    ///
    /// Returns [`ConvertError::ColorTransformFailed`] if the CMS rejects the
    /// row.
    ///
    /// # Panics
    ///
    /// Panics if `rgba` holds fewer than `count * 4` floats.
    pub fn apply(&mut self, rgba: &mut [f32], count: usize) -> Result<(), ConvertError> {
        let len = count * 4;
        let row = &mut rgba[..len];
        if self.scratch.len() < len {
            self.scratch.resize(len, 0.0);
        }
        let out = &mut self.scratch[..len];
        self.executor
            .transform(row, out)
            .map_err(|e| ConvertError::ColorTransformFailed {
                reason: format!("{e:?}"),
            })?;
        row.copy_from_slice(out);
        Ok(())
    }
}
