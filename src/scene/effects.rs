//! Camera Post-Process Settings
//!
//! Pure data describing how a camera's image is exposed and tonemapped.
//! Renderers read these when a camera reports `EFFECTS` in its change mask.

/// How the exposure of a frame is determined.
///
/// - [`Fixed`](ExposureMode::Fixed): constant exposure set by the bias
/// - [`LogAverage`](ExposureMode::LogAverage): adapts to the geometric mean luminance
/// - [`Histogram`](ExposureMode::Histogram): adapts to a luminance histogram percentile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ExposureMode {
    Fixed,
    LogAverage,
    #[default]
    Histogram,
}

impl ExposureMode {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Fixed => "Fixed",
            Self::LogAverage => "LogAverage",
            Self::Histogram => "Histogram",
        }
    }

    #[must_use]
    pub fn all() -> &'static [ExposureMode] {
        &[Self::Fixed, Self::LogAverage, Self::Histogram]
    }

    /// The following mode, wrapping around after the last one.
    #[must_use]
    pub fn next(self) -> Self {
        cycle(Self::all(), self)
    }
}

/// Tonemapping operator selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TonemappingMode {
    /// Linear passthrough, clamped by the display.
    Linear,
    #[default]
    Filmic,
    Uncharted2,
}

impl TonemappingMode {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Linear => "Linear",
            Self::Filmic => "Filmic",
            Self::Uncharted2 => "Uncharted2",
        }
    }

    #[must_use]
    pub fn all() -> &'static [TonemappingMode] {
        &[Self::Linear, Self::Filmic, Self::Uncharted2]
    }

    #[must_use]
    pub fn next(self) -> Self {
        cycle(Self::all(), self)
    }
}

fn cycle<T: Copy + PartialEq>(all: &[T], current: T) -> T {
    let position = all.iter().position(|&mode| mode == current).unwrap_or(0);
    all[(position + 1) % all.len()]
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExposureSettings {
    pub mode: ExposureMode,
    /// Exposure bias in stops, applied after adaptation.
    pub log_luminance_bias: f32,
    pub min_log_luminance: f32,
    pub max_log_luminance: f32,
    pub min_histogram_percentage: f32,
    pub max_histogram_percentage: f32,
    /// Adaptation speed towards brighter scenes, in stops per second.
    pub eye_adaptation_brightness: f32,
    /// Adaptation speed towards darker scenes, in stops per second.
    pub eye_adaptation_darkness: f32,
}

impl Default for ExposureSettings {
    fn default() -> Self {
        Self {
            mode: ExposureMode::default(),
            log_luminance_bias: 0.0,
            min_log_luminance: -4.0,
            max_log_luminance: 4.0,
            min_histogram_percentage: 0.7,
            max_histogram_percentage: 0.95,
            eye_adaptation_brightness: 3.0,
            eye_adaptation_darkness: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BloomSettings {
    /// Luminance above which pixels bleed into their neighbours.
    pub threshold: f32,
    /// Blur support as a fraction of the viewport height.
    pub support: f32,
}

impl Default for BloomSettings {
    fn default() -> Self {
        Self {
            threshold: f32::INFINITY,
            support: 0.05,
        }
    }
}

/// Parameters of the filmic curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilmicSettings {
    pub black_clip: f32,
    pub toe: f32,
    pub slope: f32,
    pub shoulder: f32,
    pub white_clip: f32,
}

impl Default for FilmicSettings {
    fn default() -> Self {
        Self {
            black_clip: 0.0,
            toe: 0.53,
            slope: 0.91,
            shoulder: 0.23,
            white_clip: 0.035,
        }
    }
}

/// Parameters of John Hable's Uncharted 2 curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Uncharted2Settings {
    pub shoulder_strength: f32,
    pub linear_strength: f32,
    pub linear_angle: f32,
    pub toe_strength: f32,
    pub toe_numerator: f32,
    pub toe_denominator: f32,
    pub linear_white: f32,
}

impl Default for Uncharted2Settings {
    fn default() -> Self {
        Self {
            shoulder_strength: 0.22,
            linear_strength: 0.3,
            linear_angle: 0.1,
            toe_strength: 0.2,
            toe_numerator: 0.01,
            toe_denominator: 0.3,
            linear_white: 11.2,
        }
    }
}

impl Uncharted2Settings {
    /// Maps a linear luminance value through the curve, normalized so that
    /// `linear_white` maps to one.
    #[must_use]
    pub fn apply(&self, x: f32) -> f32 {
        self.curve(x) / self.curve(self.linear_white)
    }

    fn curve(&self, x: f32) -> f32 {
        let a = self.shoulder_strength;
        let b = self.linear_strength;
        let c = self.linear_angle;
        let d = self.toe_strength;
        let e = self.toe_numerator;
        let f = self.toe_denominator;
        ((x * (a * x + c * b) + d * e) / (x * (a * x + b) + d * f)) - e / f
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TonemappingSettings {
    pub mode: TonemappingMode,
    pub filmic: FilmicSettings,
    pub uncharted2: Uncharted2Settings,
}

/// Every post-process parameter a camera carries.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraEffectsSettings {
    pub exposure: ExposureSettings,
    pub bloom: BloomSettings,
    pub tonemapping: TonemappingSettings,
    pub vignette: f32,
    pub film_grain: f32,
}

impl Default for CameraEffectsSettings {
    fn default() -> Self {
        Self {
            exposure: ExposureSettings::default(),
            bloom: BloomSettings::default(),
            tonemapping: TonemappingSettings::default(),
            vignette: 0.63,
            film_grain: 1.0 / 255.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modes_cycle_through_all_variants() {
        let mut mode = TonemappingMode::Linear;
        let mut seen = Vec::new();
        for _ in 0..TonemappingMode::all().len() {
            seen.push(mode);
            mode = mode.next();
        }
        assert_eq!(mode, TonemappingMode::Linear);
        assert_eq!(seen, TonemappingMode::all());
        assert_eq!(ExposureMode::Histogram.next(), ExposureMode::Fixed);
    }

    #[test]
    fn uncharted2_maps_white_to_one() {
        let settings = Uncharted2Settings::default();
        assert!((settings.apply(settings.linear_white) - 1.0).abs() < 1e-5);
        assert!(settings.apply(0.0).abs() < 1e-5);
    }
}
