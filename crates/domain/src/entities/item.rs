//! Attack item - a power or weapon that can be used to attack
//!
//! Items carry their modifiers as a free-form list, the way character data
//! stores them. `AttackItem::profile` folds that list into a typed
//! `AttackProfile` the resolvers read. Anything it does not recognize is
//! reported as a `DataWarning` and otherwise ignored, so older character data
//! stays usable.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DomainError;
use crate::events::DataWarning;
use crate::value_objects::{DamageDice, Edition};
use crate::ItemId;

/// The adjustment powers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AdjustmentPower {
    Drain,
    Aid,
    Healing,
    Transfer,
    Absorption,
    Suppress,
    Dispel,
}

impl AdjustmentPower {
    /// Powers whose input only lists identifiers to raise.
    pub fn enhances_only(&self) -> bool {
        matches!(self, Self::Aid | Self::Healing | Self::Absorption)
    }

    /// Powers whose input only lists identifiers to lower.
    pub fn reduces_only(&self) -> bool {
        matches!(self, Self::Drain | Self::Suppress | Self::Dispel)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Drain => "DRAIN",
            Self::Aid => "AID",
            Self::Healing => "HEALING",
            Self::Transfer => "TRANSFER",
            Self::Absorption => "ABSORPTION",
            Self::Suppress => "SUPPRESS",
            Self::Dispel => "DISPEL",
        }
    }
}

impl fmt::Display for AdjustmentPower {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AdjustmentPower {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DRAIN" => Ok(Self::Drain),
            "AID" => Ok(Self::Aid),
            "HEALING" => Ok(Self::Healing),
            "TRANSFER" => Ok(Self::Transfer),
            "ABSORPTION" => Ok(Self::Absorption),
            "SUPPRESS" => Ok(Self::Suppress),
            "DISPEL" => Ok(Self::Dispel),
            other => Err(DomainError::parse(format!(
                "Unknown adjustment power: {}",
                other
            ))),
        }
    }
}

/// How an attack's dice are read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AttackKind {
    #[default]
    Normal,
    Killing,
    Adjustment { power: AdjustmentPower },
    Flash,
    Entangle,
}

impl AttackKind {
    pub fn adjustment_power(&self) -> Option<AdjustmentPower> {
        match self {
            Self::Adjustment { power } => Some(*power),
            _ => None,
        }
    }
}

/// Which combat value pair the attack rolls against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CombatValue {
    #[default]
    Ocv,
    Omcv,
}

impl CombatValue {
    pub fn offense_key(&self) -> &'static str {
        match self {
            Self::Ocv => "OCV",
            Self::Omcv => "OMCV",
        }
    }

    pub fn defense_key(&self) -> &'static str {
        match self {
            Self::Ocv => "DCV",
            Self::Omcv => "DMCV",
        }
    }
}

/// One advantage, limitation or adder as stored on the item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemModifier {
    /// Upper-case rules id ("PENETRATING", "AOE")
    pub id: String,
    #[serde(default)]
    pub levels: u32,
    #[serde(default)]
    pub option: Option<String>,
    /// Advantage value, used by the 5th edition variable effect tiers
    #[serde(default)]
    pub cost: Option<f64>,
}

impl ItemModifier {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            levels: 0,
            option: None,
            cost: None,
        }
    }

    pub fn with_levels(mut self, levels: u32) -> Self {
        self.levels = levels;
        self
    }

    pub fn with_option(mut self, option: impl Into<String>) -> Self {
        self.option = Some(option.into());
        self
    }

    pub fn with_cost(mut self, cost: f64) -> Self {
        self.cost = Some(cost);
        self
    }

    /// Levels, treating an unset count as one.
    fn levels_or_one(&self) -> u32 {
        self.levels.max(1)
    }
}

/// Upper bound on how much an absorption power can take in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AbsorptionCap {
    Fixed(i32),
    Dice(DamageDice),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttackItem {
    #[serde(default)]
    pub id: ItemId,
    pub name: String,
    #[serde(default)]
    pub kind: AttackKind,
    pub dice: DamageDice,
    #[serde(default)]
    pub combat_value: CombatValue,
    #[serde(default)]
    pub modifiers: Vec<ItemModifier>,
    /// Adjustment target list, e.g. "STR, DEX -> STR"
    #[serde(default)]
    pub adjustment_input: Option<String>,
    #[serde(default)]
    pub end_cost: i32,
    /// Remaining charges; `None` for powers without charges
    #[serde(default)]
    pub charges: Option<u32>,
    #[serde(default)]
    pub absorption_cap: Option<AbsorptionCap>,
    /// Martial maneuvers add a die of knockback
    #[serde(default)]
    pub martial: bool,
}

impl AttackItem {
    pub fn new(name: impl Into<String>, kind: AttackKind, dice: DamageDice) -> Self {
        Self {
            id: ItemId::new(),
            name: name.into(),
            kind,
            dice,
            combat_value: CombatValue::Ocv,
            modifiers: Vec::new(),
            adjustment_input: None,
            end_cost: 0,
            charges: None,
            absorption_cap: None,
            martial: false,
        }
    }

    pub fn with_modifier(mut self, modifier: ItemModifier) -> Self {
        self.modifiers.push(modifier);
        self
    }

    pub fn with_adjustment_input(mut self, input: impl Into<String>) -> Self {
        self.adjustment_input = Some(input.into());
        self
    }

    pub fn with_end_cost(mut self, end: i32) -> Self {
        self.end_cost = end;
        self
    }

    pub fn with_charges(mut self, charges: u32) -> Self {
        self.charges = Some(charges);
        self
    }

    pub fn with_absorption_cap(mut self, cap: AbsorptionCap) -> Self {
        self.absorption_cap = Some(cap);
        self
    }

    pub fn is_killing(&self) -> bool {
        matches!(self.kind, AttackKind::Killing)
    }

    pub fn has_modifier(&self, id: &str) -> bool {
        self.modifiers.iter().any(|m| m.id.eq_ignore_ascii_case(id))
    }

    /// Read the modifier list into a typed profile.
    pub fn profile(&self, edition: Edition) -> (AttackProfile, Vec<DataWarning>) {
        let mut warnings = Vec::new();
        let mut profile = AttackProfile {
            killing: self.is_killing(),
            martial: self.martial,
            knockback_multiplier: match self.kind {
                AttackKind::Normal | AttackKind::Killing => 1,
                _ => 0,
            },
            ..AttackProfile::default()
        };
        let mut area_shape = None;
        let mut explosion = false;
        let mut selective = false;

        for modifier in &self.modifiers {
            match modifier.id.trim().to_ascii_uppercase().as_str() {
                "AOE" | "AREAOFEFFECT" => {
                    let shape = match modifier.option.as_deref() {
                        None => AreaShape::Radius,
                        Some(option) => option.parse().unwrap_or_else(|_| {
                            warnings.push(DataWarning::UnknownModifierOption {
                                item: self.name.clone(),
                                modifier: modifier.id.clone(),
                                option: option.to_string(),
                            });
                            AreaShape::Radius
                        }),
                    };
                    area_shape = Some(shape);
                }
                "EXPLOSION" => explosion = true,
                "SELECTIVETARGET" | "NONSELECTIVETARGET" => selective = true,
                "AUTOFIRE" => {
                    let shots = if modifier.levels == 0 { 5 } else { modifier.levels };
                    profile.autofire_shots = Some(shots);
                }
                "PENETRATING" => profile.penetrating = modifier.levels_or_one(),
                "ARMORPIERCING" => profile.armor_piercing = modifier.levels_or_one(),
                "REDUCEDPENETRATION" => profile.reduced_penetration = true,
                "STUNONLY" => profile.stun_body = StunBodyDamage::StunOnly,
                "BODYONLY" => profile.stun_body = StunBodyDamage::BodyOnly,
                "EFFECTONLY" => profile.stun_body = StunBodyDamage::EffectOnly,
                "DOUBLEKB" => profile.knockback_multiplier = 2,
                "NOKB" => profile.knockback_multiplier = 0,
                "INCREASEDSTUNMULTIPLIER" => {
                    profile.stun_multiplier_levels = modifier.levels_or_one() as i32
                }
                "STANDARDEFFECT" => profile.standard_effect = true,
                "VARIABLEEFFECT" if edition == Edition::Fifth => {
                    profile.simultaneous = SimultaneousEffect::VariableEffect {
                        cost: modifier.cost,
                    }
                }
                "EXPANDEDEFFECT" if edition == Edition::Sixth => {
                    profile.simultaneous = SimultaneousEffect::ExpandedEffect {
                        levels: modifier.levels_or_one(),
                    }
                }
                "VARIABLEEFFECT" | "EXPANDEDEFFECT" => {
                    warnings.push(DataWarning::ModifierNotInEdition {
                        item: self.name.clone(),
                        modifier: modifier.id.clone(),
                        edition,
                    });
                }
                id if NO_COMBAT_EFFECT.contains(&id) => {}
                _ => warnings.push(DataWarning::UnknownModifier {
                    item: self.name.clone(),
                    modifier: modifier.id.clone(),
                }),
            }
        }

        if let Some(shape) = area_shape {
            profile.area = Some(AreaEffect {
                shape,
                explosion,
                selective,
            });
        } else if explosion {
            // 5th edition writes Explosion as its own advantage
            profile.area = Some(AreaEffect {
                shape: AreaShape::Radius,
                explosion: true,
                selective,
            });
        }

        (profile, warnings)
    }
}

/// Known modifiers that change cost or bookkeeping but not resolution.
const NO_COMBAT_EFFECT: &[&str] = &[
    "CHARGES",
    "REDUCEDEND",
    "COSTSEND",
    "NORANGE",
    "LIMITEDRANGE",
    "RANGEBASEDONSTR",
    "OIF",
    "OAF",
    "IIF",
    "IAF",
    "FOCUS",
    "RANGED",
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AreaShape {
    #[default]
    Radius,
    Cone,
    Line,
    Surface,
    Any,
}

impl FromStr for AreaShape {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "RADIUS" => Ok(Self::Radius),
            "CONE" => Ok(Self::Cone),
            "LINE" => Ok(Self::Line),
            "SURFACE" => Ok(Self::Surface),
            "ANY" => Ok(Self::Any),
            other => Err(DomainError::parse(format!("Unknown area shape: {}", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaEffect {
    pub shape: AreaShape,
    /// Loses dice with distance from the origin
    pub explosion: bool,
    /// Selective or nonselective targeting: every target is rolled against
    pub selective: bool,
}

/// Which damage pools the attack actually affects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StunBodyDamage {
    #[default]
    StunAndBody,
    StunOnly,
    BodyOnly,
    EffectOnly,
}

/// How many things one adjustment power may affect at once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SimultaneousEffect {
    #[default]
    Single,
    /// 5th edition; cap follows the advantage value
    VariableEffect { cost: Option<f64> },
    /// 6th edition; cap is the level count
    ExpandedEffect { levels: u32 },
}

/// Typed view of an item's modifiers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttackProfile {
    pub killing: bool,
    pub area: Option<AreaEffect>,
    /// Maximum shots per attack
    pub autofire_shots: Option<u32>,
    pub penetrating: u32,
    pub armor_piercing: u32,
    pub reduced_penetration: bool,
    pub stun_body: StunBodyDamage,
    /// 0 = none, 1 = normal, 2 = double
    pub knockback_multiplier: u8,
    pub stun_multiplier_levels: i32,
    pub standard_effect: bool,
    pub martial: bool,
    pub simultaneous: SimultaneousEffect,
}

impl AttackProfile {
    /// Area attacks without targeting adders hit everything in the template.
    pub fn area_always_hits(&self) -> bool {
        self.area.is_some_and(|area| !area.selective)
    }

    pub fn is_explosion(&self) -> bool {
        self.area.is_some_and(|area| area.explosion)
    }
}
