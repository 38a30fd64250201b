//! Color profile handles.
//!
//! A [`ColorProfile`] is an immutable, cheaply cloneable handle to a color
//! space understood by the CMS backend (moxcms). Equality decides whether a
//! conversion needs a color transform at all.

use std::fmt;
use std::sync::Arc;

use moxcms::ToneReprCurve;

use crate::error::ProfileError;

/// Well-known color profiles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[non_exhaustive]
pub enum NamedProfile {
    /// sRGB (IEC 61966-2-1). The desktop default.
    #[default]
    Srgb,
    /// Display P3 with the sRGB transfer curve.
    DisplayP3,
    /// BT.2020 primaries with the BT.709 transfer curve.
    Bt2020,
    /// Adobe RGB (1998).
    AdobeRgb,
    /// sRGB primaries with a linear (gamma 1.0) transfer curve.
    LinearSrgb,
}

impl NamedProfile {
    fn build(self) -> moxcms::ColorProfile {
        match self {
            Self::Srgb => moxcms::ColorProfile::new_srgb(),
            Self::DisplayP3 => moxcms::ColorProfile::new_display_p3(),
            Self::Bt2020 => moxcms::ColorProfile::new_bt2020(),
            Self::AdobeRgb => moxcms::ColorProfile::new_adobe_rgb(),
            Self::LinearSrgb => {
                let mut profile = moxcms::ColorProfile::new_srgb();
                let linear = ToneReprCurve::Parametric(vec![1.0]);
                profile.red_trc = Some(linear.clone());
                profile.green_trc = Some(linear.clone());
                profile.blue_trc = Some(linear);
                // The CICP tag would override the curves above.
                profile.cicp = None;
                profile
            }
        }
    }
}

/// Where a profile came from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProfileSource<'a> {
    /// A well-known profile.
    Named(NamedProfile),
    /// Raw ICC profile data.
    Icc(&'a [u8]),
}

#[derive(Clone, PartialEq, Eq)]
enum Origin {
    Named(NamedProfile),
    Icc(Arc<[u8]>),
}

struct Inner {
    origin: Origin,
    cms: moxcms::ColorProfile,
}

/// Opaque, shareable color profile.
///
/// Two profiles are equal when they are the same handle, the same named
/// profile, or built from byte-identical ICC data.
#[derive(Clone)]
pub struct ColorProfile {
    inner: Arc<Inner>,
}

impl ColorProfile {
    /// The sRGB profile.
    pub fn srgb() -> Self {
        Self::named(NamedProfile::Srgb)
    }

    /// A well-known profile.
    pub fn named(profile: NamedProfile) -> Self {
        Self {
            inner: Arc::new(Inner {
                origin: Origin::Named(profile),
                cms: profile.build(),
            }),
        }
    }

    /// Parse an ICC profile.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError`] if the CMS cannot parse the data.
    pub fn from_icc(icc: impl Into<Arc<[u8]>>) -> Result<Self, ProfileError> {
        let icc = icc.into();
        let cms = moxcms::ColorProfile::new_from_slice(&icc).map_err(|e| ProfileError {
            reason: format!("{e:?}"),
        })?;
        Ok(Self {
            inner: Arc::new(Inner {
                origin: Origin::Icc(icc),
                cms,
            }),
        })
    }

    /// Where this profile came from.
    pub fn source(&self) -> ProfileSource<'_> {
        match &self.inner.origin {
            Origin::Named(named) => ProfileSource::Named(*named),
            Origin::Icc(icc) => ProfileSource::Icc(icc),
        }
    }

    /// Raw ICC bytes, if the profile was parsed from ICC data.
    pub fn icc_bytes(&self) -> Option<&[u8]> {
        match &self.inner.origin {
            Origin::Icc(icc) => Some(&**icc),
            Origin::Named(_) => None,
        }
    }

    /// True for the named sRGB profile.
    ///
    /// ICC data describing sRGB is not recognized.
    pub fn is_srgb(&self) -> bool {
        self.inner.origin == Origin::Named(NamedProfile::Srgb)
    }

    /// The underlying CMS profile.
    pub(crate) fn cms_profile(&self) -> &moxcms::ColorProfile {
        &self.inner.cms
    }
}

impl Default for ColorProfile {
    fn default() -> Self {
        Self::srgb()
    }
}

impl PartialEq for ColorProfile {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner) || self.inner.origin == other.inner.origin
    }
}

impl Eq for ColorProfile {}

impl fmt::Debug for ColorProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.inner.origin {
            Origin::Named(named) => write!(f, "ColorProfile({named:?})"),
            Origin::Icc(icc) => write!(f, "ColorProfile(icc, {} bytes)", icc.len()),
        }
    }
}
