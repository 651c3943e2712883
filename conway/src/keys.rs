// keys.rs - Number-key slots bound to catalog patterns

use std::fmt;

use crate::patterns::{PatternCatalog, PatternError};

/// The ten pattern slots, in keyboard order `1` to `9` then `0`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PatternKey {
    Num1,
    Num2,
    Num3,
    Num4,
    Num5,
    Num6,
    Num7,
    Num8,
    Num9,
    Num0,
}

impl PatternKey {
    pub const ALL: [PatternKey; 10] = [
        PatternKey::Num1,
        PatternKey::Num2,
        PatternKey::Num3,
        PatternKey::Num4,
        PatternKey::Num5,
        PatternKey::Num6,
        PatternKey::Num7,
        PatternKey::Num8,
        PatternKey::Num9,
        PatternKey::Num0,
    ];

    /// Position in [`PatternKey::ALL`].
    pub fn slot(self) -> usize {
        self as usize
    }

    /// The digit printed on the key.
    pub fn digit(self) -> char {
        match self {
            PatternKey::Num0 => '0',
            other => char::from(b'1' + other.slot() as u8),
        }
    }
}

impl fmt::Display for PatternKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.digit())
    }
}

/// Bindings shipped with the default pattern library.
pub const DEFAULT_BINDINGS: [&str; 10] = [
    "Blinker",
    "Toad",
    "Beacon",
    "Pulsar",
    "Penta Decathlon",
    "Glider",
    "Glider Gun",
    "Bunnies",
    "R-Pentomino",
    "Puffer-Train",
];

/// Which pattern each number key loads.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct KeyBindings {
    slots: [Option<String>; 10],
}

impl KeyBindings {
    /// Bind `names` to the keys in order, checking each against `catalog`.
    ///
    /// Names past the tenth are ignored; keys past the last name stay unbound.
    pub fn new<S: AsRef<str>>(
        names: &[S],
        catalog: &PatternCatalog,
    ) -> Result<Self, PatternError> {
        let mut bindings = Self::default();
        for (slot, name) in bindings.slots.iter_mut().zip(names) {
            *slot = Some(name.as_ref().to_owned());
        }
        bindings.validate(catalog)?;
        Ok(bindings)
    }

    /// Fail on the first binding that names a pattern missing from `catalog`.
    pub fn validate(&self, catalog: &PatternCatalog) -> Result<(), PatternError> {
        for (_, name) in self.iter() {
            catalog.get(name)?;
        }
        Ok(())
    }

    pub fn pattern_for(&self, key: PatternKey) -> Option<&str> {
        self.slots[key.slot()].as_deref()
    }

    /// Bound keys with their pattern names, in keyboard order.
    pub fn iter(&self) -> impl Iterator<Item = (PatternKey, &str)> + '_ {
        PatternKey::ALL
            .into_iter()
            .filter_map(|key| self.pattern_for(key).map(|name| (key, name)))
    }
}
