//! Roll flavors.
//!
//! Each flavor is a zero-sized marker type. A `Roll<K>` only exposes the
//! totals that make sense for `K`, so asking a killing roll for an
//! adjustment total is a compile error rather than a runtime check.

use serde::{Deserialize, Serialize};
use std::fmt;

mod sealed {
    pub trait Sealed {}
}

/// Runtime tag for a roll's flavor, carried in serialized records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RollFlavor {
    Success,
    Normal,
    Killing,
    Adjustment,
    Flash,
    Entangle,
    Basic,
}

impl fmt::Display for RollFlavor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RollFlavor::Success => "success",
            RollFlavor::Normal => "normal",
            RollFlavor::Killing => "killing",
            RollFlavor::Adjustment => "adjustment",
            RollFlavor::Flash => "flash",
            RollFlavor::Entangle => "entangle",
            RollFlavor::Basic => "basic",
        };
        write!(f, "{}", name)
    }
}

/// Marker trait implemented by the flavor types below.
pub trait RollKind:
    sealed::Sealed + Copy + Default + fmt::Debug + PartialEq + Send + Sync + 'static
{
    const FLAVOR: RollFlavor;
}

/// Flavors that deal Body and Stun and may roll a hit location.
pub trait DamageKind: RollKind {}

macro_rules! roll_kind {
    ($(#[$meta:meta])* $name:ident => $flavor:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
        pub struct $name;

        impl sealed::Sealed for $name {}

        impl RollKind for $name {
            const FLAVOR: RollFlavor = RollFlavor::$flavor;
        }
    };
}

roll_kind!(
    /// Attack and skill rolls: a signed total compared to a target.
    Success => Success
);
roll_kind!(
    /// Normal damage: Stun is the dice total, Body is counted per die.
    Normal => Normal
);
roll_kind!(
    /// Killing damage: Body is the dice total, Stun is Body times a multiplier.
    Killing => Killing
);
roll_kind!(Adjustment => Adjustment);
roll_kind!(Flash => Flash);
roll_kind!(Entangle => Entangle);
roll_kind!(
    /// Plain signed sum (knockback, generic rolls).
    Basic => Basic
);

impl DamageKind for Normal {}
impl DamageKind for Killing {}
