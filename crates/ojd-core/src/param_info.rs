//! Parameter metadata for host automation and display.
//!
//! A [`ParamDescriptor`] carries everything a host, a settings file loader or
//! a command-line front end needs to know about one parameter: display names,
//! plain-value range, default, step, a stable numeric [`ParamId`] and string
//! id, and [`ParamFlags`]. Descriptors are plain `Copy` data, built with
//! `const` builder methods so whole parameter tables can live in statics.
//!
//! # Example
//!
//! ```rust
//! use ojd_core::{ParamDescriptor, ParamFlags, ParamId};
//!
//! let drive = ParamDescriptor::rotary("Drive", "Drive", 0.0, 10.0, 1.65, 0.01)
//!     .with_id(ParamId(0), "drive");
//! assert_eq!(drive.normalize(5.0), 0.5);
//!
//! let bypass = ParamDescriptor::switch("Bypass", "Bypass", false)
//!     .with_id(ParamId(4), "bypass")
//!     .with_flags(ParamFlags::AUTOMATABLE.union(ParamFlags::STEPPED).union(ParamFlags::BYPASS));
//! assert!(bypass.is_switch());
//! ```

/// Stable numeric parameter identifier.
///
/// Used for host automation and parameter mapping. Once assigned, a
/// `ParamId` must never change for a given parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParamId(pub u32);

/// Parameter capability flags for host communication.
///
/// Bitflag type. Use [`union`](Self::union) to combine.
///
/// ```rust
/// use ojd_core::ParamFlags;
///
/// let flags = ParamFlags::AUTOMATABLE.union(ParamFlags::STEPPED);
/// assert!(flags.contains(ParamFlags::AUTOMATABLE));
/// assert!(flags.contains(ParamFlags::STEPPED));
/// assert!(!flags.contains(ParamFlags::BYPASS));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamFlags(u8);

impl ParamFlags {
    /// No flags set.
    pub const NONE: Self = Self(0);
    /// Host can automate this parameter (default for all params).
    pub const AUTOMATABLE: Self = Self(1 << 0);
    /// Parameter has discrete steps (switches).
    pub const STEPPED: Self = Self(1 << 1);
    /// Parameter is the host-facing bypass switch.
    pub const BYPASS: Self = Self(1 << 2);

    /// Returns `true` if all bits in `other` are set in `self`.
    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns the union of two flag sets.
    #[inline]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

impl Default for ParamFlags {
    fn default() -> Self {
        Self::AUTOMATABLE
    }
}

/// Descriptor for one parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamDescriptor {
    /// Full parameter name for display (e.g., "Drive", "HP / LP").
    pub name: &'static str,

    /// Short name for hardware displays, max 8 characters.
    pub short_name: &'static str,

    /// Unit type for formatting the parameter value.
    pub unit: ParamUnit,

    /// Minimum allowed value for this parameter.
    pub min: f32,

    /// Maximum allowed value for this parameter.
    pub max: f32,

    /// Default value when the pedal is initialized.
    pub default: f32,

    /// Step increment. `1.0` for switches.
    pub step: f32,

    /// Stable numeric ID for host automation and preset persistence.
    ///
    /// Default: `ParamId(0)` (unassigned).
    pub id: ParamId,

    /// Human-readable stable ID for settings files and debugging.
    ///
    /// Default: `""` (unassigned).
    pub string_id: &'static str,

    /// Capability flags for host communication.
    ///
    /// Default: [`ParamFlags::AUTOMATABLE`].
    pub flags: ParamFlags,
}

impl ParamDescriptor {
    /// Continuous parameter with a linear plain-value range.
    pub const fn rotary(
        name: &'static str,
        short_name: &'static str,
        min: f32,
        max: f32,
        default: f32,
        step: f32,
    ) -> Self {
        Self {
            name,
            short_name,
            unit: ParamUnit::None,
            min,
            max,
            default,
            step,
            id: ParamId(0),
            string_id: "",
            flags: ParamFlags::AUTOMATABLE,
        }
    }

    /// Two-state switch over `0.0..=1.0`; values above `0.5` are "on".
    pub const fn switch(name: &'static str, short_name: &'static str, default_on: bool) -> Self {
        Self {
            name,
            short_name,
            unit: ParamUnit::None,
            min: 0.0,
            max: 1.0,
            default: if default_on { 1.0 } else { 0.0 },
            step: 1.0,
            id: ParamId(0),
            string_id: "",
            flags: ParamFlags::AUTOMATABLE.union(ParamFlags::STEPPED),
        }
    }

    /// Sets the stable parameter ID and string ID.
    ///
    /// ```rust
    /// use ojd_core::{ParamDescriptor, ParamId};
    ///
    /// let desc = ParamDescriptor::rotary("Tone", "Tone", 0.0, 10.0, 5.0, 0.01)
    ///     .with_id(ParamId(1), "tone");
    /// assert_eq!(desc.id, ParamId(1));
    /// assert_eq!(desc.string_id, "tone");
    /// ```
    pub const fn with_id(mut self, id: ParamId, string_id: &'static str) -> Self {
        self.id = id;
        self.string_id = string_id;
        self
    }

    /// Sets the parameter flags.
    pub const fn with_flags(mut self, flags: ParamFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Sets the display unit.
    pub const fn with_unit(mut self, unit: ParamUnit) -> Self {
        self.unit = unit;
        self
    }

    /// Returns `true` for stepped two-state parameters.
    pub const fn is_switch(&self) -> bool {
        self.flags.contains(ParamFlags::STEPPED)
    }

    /// Clamps a value to this parameter's valid range. NaN maps to the default.
    ///
    /// ```rust
    /// use ojd_core::ParamDescriptor;
    ///
    /// let desc = ParamDescriptor::rotary("Volume", "Volume", 0.0, 10.0, 8.35, 0.01);
    /// assert_eq!(desc.clamp(-1.0), 0.0);
    /// assert_eq!(desc.clamp(12.0), 10.0);
    /// assert_eq!(desc.clamp(f32::NAN), 8.35);
    /// ```
    #[inline]
    pub fn clamp(&self, value: f32) -> f32 {
        if value.is_nan() {
            self.default
        } else {
            value.clamp(self.min, self.max)
        }
    }

    /// Converts a plain value to normalized range (0.0 to 1.0).
    #[inline]
    pub fn normalize(&self, value: f32) -> f32 {
        let range = self.max - self.min;
        if range == 0.0 {
            return 0.0;
        }
        (value - self.min) / range
    }

    /// Converts a normalized value (0.0 to 1.0) to the plain range.
    #[inline]
    pub fn denormalize(&self, normalized: f32) -> f32 {
        self.min + normalized * (self.max - self.min)
    }
}

/// Unit type for parameter display and formatting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamUnit {
    /// Decibels (dB).
    Decibels,

    /// Hertz (Hz).
    Hertz,

    /// No unit - the pedal's 0..10 knob scale and switches.
    None,
}

impl ParamUnit {
    /// Returns the unit suffix string for display.
    ///
    /// ```rust
    /// use ojd_core::ParamUnit;
    ///
    /// assert_eq!(ParamUnit::Decibels.suffix(), " dB");
    /// assert_eq!(ParamUnit::Hertz.suffix(), " Hz");
    /// assert_eq!(ParamUnit::None.suffix(), "");
    /// ```
    pub const fn suffix(&self) -> &'static str {
        match self {
            ParamUnit::Decibels => " dB",
            ParamUnit::Hertz => " Hz",
            ParamUnit::None => "",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotary_defaults() {
        let desc = ParamDescriptor::rotary("Drive", "Drive", 0.0, 10.0, 1.65, 0.01);
        assert_eq!(desc.flags, ParamFlags::AUTOMATABLE);
        assert_eq!(desc.unit, ParamUnit::None);
        assert_eq!(desc.id, ParamId(0));
        assert!(!desc.is_switch());
    }

    #[test]
    fn switch_defaults() {
        let off = ParamDescriptor::switch("HP / LP", "HP/LP", false);
        assert_eq!(off.default, 0.0);
        assert_eq!(off.step, 1.0);
        assert!(off.is_switch());

        let on = ParamDescriptor::switch("Bypass", "Bypass", true);
        assert_eq!(on.default, 1.0);
    }

    #[test]
    fn normalize_roundtrip() {
        let desc = ParamDescriptor::rotary("Tone", "Tone", 0.0, 10.0, 5.0, 0.01);
        for v in [0.0, 2.5, 5.0, 10.0] {
            let back = desc.denormalize(desc.normalize(v));
            assert!((back - v).abs() < 1e-6, "{v} -> {back}");
        }
    }

    #[test]
    fn degenerate_range_normalizes_to_zero() {
        let desc = ParamDescriptor::rotary("Fixed", "Fixed", 1.0, 1.0, 1.0, 0.0);
        assert_eq!(desc.normalize(1.0), 0.0);
    }

    #[test]
    fn flags_builder() {
        let desc = ParamDescriptor::switch("Bypass", "Bypass", false)
            .with_flags(ParamFlags::STEPPED.union(ParamFlags::BYPASS));
        assert!(desc.flags.contains(ParamFlags::BYPASS));
        assert!(!desc.flags.contains(ParamFlags::AUTOMATABLE));
        assert_eq!(ParamFlags::default(), ParamFlags::AUTOMATABLE);
    }
}
