//! Level enums shared across the filter, catalog and normalization layers.
//!
//! Wire names are the exact lowercase strings. Parsing is case-sensitive:
//! `"Year"` is not a time resolution.

macro_rules! closed_set {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $wire:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ::serde::Serialize, ::serde::Deserialize)]
        #[serde(rename_all = "lowercase")]
        pub enum $name {
            $( $(#[$vmeta])* $variant, )+
        }

        impl $name {
            /// Every member, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Returns the wire representation.
            #[must_use]
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $( Self::$variant => $wire, )+
                }
            }

            /// Parses the exact wire representation.
            #[must_use]
            pub fn parse(s: &str) -> Option<Self> {
                match s {
                    $( $wire => Some(Self::$variant), )+
                    _ => None,
                }
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

pub(crate) use closed_set;

closed_set! {
    /// Granularity of the time axis.
    #[derive(Default)]
    TimeResolution {
        /// Annual figures.
        #[default]
        Year => "year",
        /// Quarterly figures.
        Quarter => "quarter",
        /// Monthly figures.
        Month => "month",
    }
}

closed_set! {
    /// Finnish administrative region level.
    RegionLevel {
        /// Municipality.
        Kunta => "kunta",
        /// Sub-regional unit.
        Seutukunta => "seutukunta",
        /// Region (province).
        Maakunta => "maakunta",
    }
}

closed_set! {
    /// TOL 2008 industry classification level.
    IndustryLevel {
        /// Top level, a single letter.
        Section => "section",
        /// Two digits.
        Division => "division",
        /// Three digits.
        Group => "group",
        /// Four or five digits.
        Class => "class",
    }
}
