//! Shared nutrition data structures
//!
//! Used across recipes, days, goals and scoring.

use std::fmt;
use std::ops::{Add, AddAssign, Index, IndexMut};

use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// The twelve tracked micronutrients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Micronutrient {
    #[serde(rename = "vitamin_A_mg")]
    VitaminA,
    #[serde(rename = "vitamin_B6_mg")]
    VitaminB6,
    #[serde(rename = "vitamin_B12_mg")]
    VitaminB12,
    #[serde(rename = "vitamin_C_mg")]
    VitaminC,
    #[serde(rename = "vitamin_D_mg")]
    VitaminD,
    #[serde(rename = "vitamin_E_mg")]
    VitaminE,
    #[serde(rename = "fiber_g")]
    Fiber,
    #[serde(rename = "calcium_mg")]
    Calcium,
    #[serde(rename = "magnesium_mg")]
    Magnesium,
    #[serde(rename = "iron_mg")]
    Iron,
    #[serde(rename = "zinc_mg")]
    Zinc,
    #[serde(rename = "potassium_mg")]
    Potassium,
}

const MICRO_COUNT: usize = 12;

impl Micronutrient {
    /// All keys, in display order
    pub const ALL: [Micronutrient; MICRO_COUNT] = [
        Micronutrient::VitaminA,
        Micronutrient::VitaminB6,
        Micronutrient::VitaminB12,
        Micronutrient::VitaminC,
        Micronutrient::VitaminD,
        Micronutrient::VitaminE,
        Micronutrient::Fiber,
        Micronutrient::Calcium,
        Micronutrient::Magnesium,
        Micronutrient::Iron,
        Micronutrient::Zinc,
        Micronutrient::Potassium,
    ];

    /// Storage key, as used in recipe and goal maps
    pub fn key(self) -> &'static str {
        match self {
            Micronutrient::VitaminA => "vitamin_A_mg",
            Micronutrient::VitaminB6 => "vitamin_B6_mg",
            Micronutrient::VitaminB12 => "vitamin_B12_mg",
            Micronutrient::VitaminC => "vitamin_C_mg",
            Micronutrient::VitaminD => "vitamin_D_mg",
            Micronutrient::VitaminE => "vitamin_E_mg",
            Micronutrient::Fiber => "fiber_g",
            Micronutrient::Calcium => "calcium_mg",
            Micronutrient::Magnesium => "magnesium_mg",
            Micronutrient::Iron => "iron_mg",
            Micronutrient::Zinc => "zinc_mg",
            Micronutrient::Potassium => "potassium_mg",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.key() == key)
    }

    pub fn label(self) -> &'static str {
        match self {
            Micronutrient::VitaminA => "Vitamin A",
            Micronutrient::VitaminB6 => "Vitamin B6",
            Micronutrient::VitaminB12 => "Vitamin B12",
            Micronutrient::VitaminC => "Vitamin C",
            Micronutrient::VitaminD => "Vitamin D",
            Micronutrient::VitaminE => "Vitamin E",
            Micronutrient::Fiber => "Fiber",
            Micronutrient::Calcium => "Calcium",
            Micronutrient::Magnesium => "Magnesium",
            Micronutrient::Iron => "Iron",
            Micronutrient::Zinc => "Zinc",
            Micronutrient::Potassium => "Potassium",
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            Micronutrient::Fiber => "g",
            _ => "mg",
        }
    }

    fn slot(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Micronutrient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// One value per micronutrient.
///
/// Serialized as a JSON object keyed by [`Micronutrient::key`]. Unknown keys
/// are ignored on input and missing keys read as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MicroValues([f64; MICRO_COUNT]);

impl MicroValues {
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn get(&self, nutrient: Micronutrient) -> f64 {
        self.0[nutrient.slot()]
    }

    pub fn set(&mut self, nutrient: Micronutrient, value: f64) {
        self.0[nutrient.slot()] = sanitize(value);
    }

    /// Builder-style setter
    pub fn with(mut self, nutrient: Micronutrient, value: f64) -> Self {
        self.set(nutrient, value);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (Micronutrient, f64)> + '_ {
        Micronutrient::ALL.into_iter().map(move |m| (m, self.get(m)))
    }
}

impl Index<Micronutrient> for MicroValues {
    type Output = f64;

    fn index(&self, nutrient: Micronutrient) -> &f64 {
        &self.0[nutrient.slot()]
    }
}

impl IndexMut<Micronutrient> for MicroValues {
    fn index_mut(&mut self, nutrient: Micronutrient) -> &mut f64 {
        &mut self.0[nutrient.slot()]
    }
}

impl Add for MicroValues {
    type Output = MicroValues;

    fn add(mut self, other: MicroValues) -> MicroValues {
        self += other;
        self
    }
}

impl AddAssign for MicroValues {
    fn add_assign(&mut self, other: MicroValues) {
        for m in Micronutrient::ALL {
            self[m] += other[m];
        }
    }
}

impl Serialize for MicroValues {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(MICRO_COUNT))?;
        for (nutrient, value) in self.iter() {
            map.serialize_entry(nutrient.key(), &value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for MicroValues {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        MicroTable::deserialize(deserializer).map(|table| table.values)
    }
}

/// Grams of sugar listed among a recipe's micronutrients
const SUGAR_KEY: &str = "sugar_g";

/// A recipe's micronutrient table as the analysis service sends it.
///
/// Besides the twelve tracked keys it may list `sugar_g`, which belongs to
/// the day's sugar total rather than to [`MicroValues`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MicroTable {
    pub values: MicroValues,
    pub sugar: f64,
}

impl<'de> Deserialize<'de> for MicroTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct MicroTableVisitor;

        impl<'de> Visitor<'de> for MicroTableVisitor {
            type Value = MicroTable;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of micronutrient keys to amounts")
            }

            fn visit_unit<E: de::Error>(self) -> Result<MicroTable, E> {
                Ok(MicroTable::default())
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<MicroTable, A::Error> {
                let mut table = MicroTable::default();
                while let Some(key) = access.next_key::<String>()? {
                    let Amount(value) = access.next_value()?;
                    if let Some(nutrient) = Micronutrient::from_key(&key) {
                        table.values.set(nutrient, value);
                    } else if key == SUGAR_KEY {
                        table.sugar = value;
                    }
                }
                Ok(table)
            }
        }

        deserializer.deserialize_any(MicroTableVisitor)
    }
}

/// Recipe macro block as returned by the analysis service
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Macros {
    #[serde(default, deserialize_with = "lenient_amount")]
    pub calories: f64,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub protein: f64,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub carbs: f64,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub fat: f64,
    #[serde(default, alias = "sugar_g", deserialize_with = "lenient_amount")]
    pub sugar: f64,
}

/// Accumulated nutrients for one day
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NutrientTotals {
    #[serde(default)]
    pub calories: f64,
    #[serde(default)]
    pub protein: f64, // grams
    #[serde(default)]
    pub carbs: f64, // grams
    #[serde(default)]
    pub fat: f64, // grams
    #[serde(default)]
    pub sugar: f64, // grams
    #[serde(default)]
    pub micros: MicroValues,
}

impl NutrientTotals {
    pub fn zero() -> Self {
        Self::default()
    }

    /// Totals contributed by one macro block and micronutrient table
    pub fn from_parts(macros: &Macros, micros: &MicroValues) -> Self {
        Self {
            calories: sanitize(macros.calories),
            protein: sanitize(macros.protein),
            carbs: sanitize(macros.carbs),
            fat: sanitize(macros.fat),
            sugar: sanitize(macros.sugar),
            micros: *micros,
        }
    }

    /// Energy carried by protein, carbs and fat (4/4/9 kcal per gram)
    pub fn macro_energy(&self) -> f64 {
        self.protein * 4.0 + self.carbs * 4.0 + self.fat * 9.0
    }

    pub fn fiber(&self) -> f64 {
        self.micros[Micronutrient::Fiber]
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::zero()
    }
}

impl Add for NutrientTotals {
    type Output = NutrientTotals;

    fn add(self, other: NutrientTotals) -> NutrientTotals {
        NutrientTotals {
            calories: self.calories + other.calories,
            protein: self.protein + other.protein,
            carbs: self.carbs + other.carbs,
            fat: self.fat + other.fat,
            sugar: self.sugar + other.sugar,
            micros: self.micros + other.micros,
        }
    }
}

impl std::iter::Sum for NutrientTotals {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(NutrientTotals::zero(), |acc, n| acc + n)
    }
}

/// Clamp to a finite, non-negative amount
fn sanitize(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

/// Parse the numeric prefix of a string such as `"5.2mg"` or `" 85 "`
pub fn parse_amount(raw: &str) -> f64 {
    let trimmed = raw.trim();
    let end = trimmed
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || c == '.' || ((c == '-' || c == '+') && i == 0)))
        .map(|(i, _)| i)
        .unwrap_or(trimmed.len());
    trimmed[..end].parse::<f64>().map(sanitize).unwrap_or(0.0)
}

/// A tolerant nutrient amount: numbers, numeric strings and `null`
struct Amount(f64);

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct AmountVisitor;

        impl<'de> Visitor<'de> for AmountVisitor {
            type Value = Amount;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a number or a numeric string")
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Amount, E> {
                Ok(Amount(sanitize(v)))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Amount, E> {
                Ok(Amount(sanitize(v as f64)))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Amount, E> {
                Ok(Amount(sanitize(v as f64)))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Amount, E> {
                Ok(Amount(parse_amount(v)))
            }

            fn visit_bool<E: de::Error>(self, _: bool) -> Result<Amount, E> {
                Ok(Amount(0.0))
            }

            fn visit_unit<E: de::Error>(self) -> Result<Amount, E> {
                Ok(Amount(0.0))
            }

            fn visit_none<E: de::Error>(self) -> Result<Amount, E> {
                Ok(Amount(0.0))
            }
        }

        deserializer.deserialize_any(AmountVisitor)
    }
}

/// `deserialize_with` adapter reading an explicit `null` as the default value
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// `deserialize_with` adapter for tolerant amounts
pub(crate) fn lenient_amount<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Amount::deserialize(deserializer).map(|Amount(v)| v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_micronutrient_keys_round_trip() {
        for m in Micronutrient::ALL {
            assert_eq!(Micronutrient::from_key(m.key()), Some(m));
        }
        assert_eq!(Micronutrient::from_key("sodium_mg"), None);
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("5.2mg"), 5.2);
        assert_eq!(parse_amount(" 85 "), 85.0);
        assert_eq!(parse_amount("12 g"), 12.0);
        assert_eq!(parse_amount("plenty"), 0.0);
        assert_eq!(parse_amount("-3"), 0.0);
    }

    #[test]
    fn test_micro_values_ignore_unknown_and_parse_strings() {
        let values: MicroValues = serde_json::from_str(
            r#"{"vitamin_C_mg": 85, "iron_mg": "5.2mg", "sodium_mg": 900, "calcium_mg": null}"#,
        )
        .unwrap();
        assert_eq!(values[Micronutrient::VitaminC], 85.0);
        assert_eq!(values[Micronutrient::Iron], 5.2);
        assert_eq!(values[Micronutrient::Calcium], 0.0);
        assert_eq!(values[Micronutrient::Zinc], 0.0);
    }

    #[test]
    fn test_micro_values_serialize_every_key() {
        let values = MicroValues::zero().with(Micronutrient::Zinc, 3.0);
        let json = serde_json::to_value(values).unwrap();
        let object = json.as_object().unwrap();
        assert_eq!(object.len(), 12);
        assert_eq!(object["zinc_mg"], 3.0);
        assert_eq!(object["fiber_g"], 0.0);
    }

    #[test]
    fn test_micro_table_keeps_sugar_apart() {
        let table: MicroTable =
            serde_json::from_str(r#"{"sugar_g": "30g", "iron_mg": 2, "sodium_mg": 900}"#).unwrap();
        assert_eq!(table.sugar, 30.0);
        assert_eq!(table.values[Micronutrient::Iron], 2.0);

        let values: MicroValues = serde_json::from_str(r#"{"sugar_g": 30}"#).unwrap();
        assert_eq!(values, MicroValues::zero());
    }

    #[test]
    fn test_macros_missing_fields_default_to_zero() {
        let macros: Macros = serde_json::from_str(r#"{"calories": 720, "protein": "68"}"#).unwrap();
        assert_eq!(macros.calories, 720.0);
        assert_eq!(macros.protein, 68.0);
        assert_eq!(macros.carbs, 0.0);
        assert_eq!(macros.sugar, 0.0);
    }

    #[test]
    fn test_totals_sum() {
        let a = NutrientTotals {
            calories: 100.0,
            protein: 10.0,
            micros: MicroValues::zero().with(Micronutrient::Iron, 2.0),
            ..Default::default()
        };
        let b = NutrientTotals {
            calories: 50.0,
            fat: 5.0,
            micros: MicroValues::zero().with(Micronutrient::Iron, 1.5),
            ..Default::default()
        };
        let total: NutrientTotals = vec![a, b].into_iter().sum();
        assert_eq!(total.calories, 150.0);
        assert_eq!(total.protein, 10.0);
        assert_eq!(total.fat, 5.0);
        assert_eq!(total.micros[Micronutrient::Iron], 3.5);
        assert_eq!(total.macro_energy(), 10.0 * 4.0 + 5.0 * 9.0);
    }
}
