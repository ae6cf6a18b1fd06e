//! Mana costs, mana pools and colors

use crate::{Result, SimError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Mana colors, plus colorless mana
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Color {
    White,
    Blue,
    Black,
    Red,
    Green,
    Colorless,
}

impl Color {
    /// WUBRG order followed by colorless; also the index into mana arrays
    pub const ALL: [Color; 6] = [
        Color::White,
        Color::Blue,
        Color::Black,
        Color::Red,
        Color::Green,
        Color::Colorless,
    ];

    fn index(self) -> usize {
        match self {
            Color::White => 0,
            Color::Blue => 1,
            Color::Black => 2,
            Color::Red => 3,
            Color::Green => 4,
            Color::Colorless => 5,
        }
    }

    fn symbol(self) -> char {
        match self {
            Color::White => 'W',
            Color::Blue => 'U',
            Color::Black => 'B',
            Color::Red => 'R',
            Color::Green => 'G',
            Color::Colorless => 'C',
        }
    }

    fn from_symbol(c: char) -> Option<Color> {
        Color::ALL.into_iter().find(|color| color.symbol() == c)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// A mana cost such as "2RR" (2 generic + 2 red)
///
/// The same shape describes what a mana ability produces, in which case
/// `generic` is always zero. Serialized as its cost string ("2RR").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ManaCost {
    pub generic: u8,
    /// Colored (and colorless) symbols, indexed in `Color::ALL` order
    pub symbols: [u8; 6],
}

impl ManaCost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a cost string like "2RR", "{1}{U}{B}" or "CC"
    ///
    /// Braces and spaces are ignored; multi-digit generic amounts are summed
    /// as one number.
    pub fn from_string(s: &str) -> Result<Self> {
        let mut cost = ManaCost::new();
        let mut digits = String::new();

        for c in s.chars() {
            match c {
                '0'..='9' => digits.push(c),
                '{' | '}' | ' ' => {}
                other => match Color::from_symbol(other.to_ascii_uppercase()) {
                    Some(color) => cost.symbols[color.index()] += 1,
                    None => {
                        return Err(SimError::InvalidAction(format!(
                            "invalid mana symbol '{other}' in cost \"{s}\""
                        )))
                    }
                },
            }
        }

        if !digits.is_empty() {
            cost.generic = digits
                .parse()
                .map_err(|_| SimError::InvalidAction(format!("invalid generic mana in \"{s}\"")))?;
        }

        Ok(cost)
    }

    /// A single mana of one color
    pub fn of(color: Color, amount: u8) -> Self {
        let mut cost = ManaCost::new();
        cost.symbols[color.index()] = amount;
        cost
    }

    pub fn amount(&self, color: Color) -> u8 {
        self.symbols[color.index()]
    }

    /// Converted mana cost
    pub fn cmc(&self) -> u8 {
        self.generic + self.symbols.iter().sum::<u8>()
    }

    pub fn is_empty(&self) -> bool {
        self.cmc() == 0
    }

    /// Same cost with extra generic mana (commander tax)
    pub fn with_additional_generic(&self, extra: u8) -> Self {
        ManaCost {
            generic: self.generic.saturating_add(extra),
            symbols: self.symbols,
        }
    }

    /// Colors that appear in this cost, excluding colorless
    pub fn colors(&self) -> impl Iterator<Item = Color> + '_ {
        Color::ALL[..5]
            .iter()
            .copied()
            .filter(move |c| self.amount(*c) > 0)
    }
}

impl fmt::Display for ManaCost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.generic > 0 || self.is_empty() {
            write!(f, "{}", self.generic)?;
        }
        for color in Color::ALL {
            for _ in 0..self.amount(color) {
                write!(f, "{}", color)?;
            }
        }
        Ok(())
    }
}

impl TryFrom<String> for ManaCost {
    type Error = SimError;

    fn try_from(s: String) -> Result<Self> {
        ManaCost::from_string(&s)
    }
}

impl From<ManaCost> for String {
    fn from(cost: ManaCost) -> String {
        cost.to_string()
    }
}

/// Mana pool for a player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ManaPool {
    mana: [u8; 6],
}

impl ManaPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_color(&mut self, color: Color) {
        self.mana[color.index()] += 1;
    }

    /// Add everything a mana ability produced
    pub fn add(&mut self, produced: &ManaCost) {
        for (slot, amount) in self.mana.iter_mut().zip(produced.symbols) {
            *slot += amount;
        }
    }

    pub fn amount(&self, color: Color) -> u8 {
        self.mana[color.index()]
    }

    pub fn clear(&mut self) {
        self.mana = [0; 6];
    }

    pub fn total(&self) -> u8 {
        self.mana.iter().sum()
    }

    /// Check if the pool covers the given cost
    pub fn can_pay(&self, cost: &ManaCost) -> bool {
        let colored_ok = self
            .mana
            .iter()
            .zip(cost.symbols)
            .all(|(have, need)| *have >= need);
        colored_ok && self.total() >= cost.cmc()
    }

    /// Pay a cost from this pool
    ///
    /// Colored requirements are paid first, then generic mana is taken in
    /// WUBRG order and colorless last. The pool is left untouched on failure.
    pub fn pay_cost(&mut self, cost: &ManaCost) -> Result<()> {
        if !self.can_pay(cost) {
            return Err(SimError::InvalidAction(format!(
                "insufficient mana to pay {cost} (pool has {} mana)",
                self.total()
            )));
        }

        for (slot, need) in self.mana.iter_mut().zip(cost.symbols) {
            *slot -= need;
        }

        let mut generic = cost.generic;
        for slot in self.mana.iter_mut() {
            let used = generic.min(*slot);
            *slot -= used;
            generic -= used;
        }
        debug_assert_eq!(generic, 0, "generic cost left unpaid");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mana_cost_parsing() {
        let cost = ManaCost::from_string("2RR").unwrap();
        assert_eq!(cost.generic, 2);
        assert_eq!(cost.amount(Color::Red), 2);
        assert_eq!(cost.cmc(), 4);

        let braces = ManaCost::from_string("{1}{U}{B}").unwrap();
        assert_eq!(braces.generic, 1);
        assert_eq!(braces.amount(Color::Blue), 1);
        assert_eq!(braces.amount(Color::Black), 1);
        assert_eq!(braces.to_string(), "1UB");

        assert!(ManaCost::from_string("2X").is_err());
        assert_eq!(ManaCost::from_string("").unwrap().to_string(), "0");
    }

    #[test]
    fn test_commander_tax() {
        let cost = ManaCost::from_string("W").unwrap();
        let taxed = cost.with_additional_generic(4);
        assert_eq!(taxed.to_string(), "4W");
        assert_eq!(taxed.cmc(), 5);
    }

    #[test]
    fn test_pool_pays_colored_then_generic() {
        let mut pool = ManaPool::new();
        pool.add_color(Color::Red);
        pool.add_color(Color::Red);
        pool.add_color(Color::Blue);

        let cost = ManaCost::from_string("1R").unwrap();
        assert!(pool.can_pay(&cost));
        pool.pay_cost(&cost).unwrap();
        // Generic is taken in WUBRG order, so the blue goes first
        assert_eq!(pool.amount(Color::Red), 1);
        assert_eq!(pool.amount(Color::Blue), 0);
    }

    #[test]
    fn test_pool_unchanged_on_failure() {
        let mut pool = ManaPool::new();
        pool.add_color(Color::Blue);
        pool.add_color(Color::Blue);

        let cost = ManaCost::from_string("RR").unwrap();
        assert!(pool.pay_cost(&cost).is_err());
        assert_eq!(pool.amount(Color::Blue), 2);
    }

    #[test]
    fn test_pool_add_produced() {
        let mut pool = ManaPool::new();
        pool.add(&ManaCost::of(Color::Colorless, 2));
        assert_eq!(pool.total(), 2);
        assert!(pool.can_pay(&ManaCost::from_string("2").unwrap()));
        assert!(!pool.can_pay(&ManaCost::from_string("G").unwrap()));
        pool.clear();
        assert_eq!(pool.total(), 0);
    }
}
