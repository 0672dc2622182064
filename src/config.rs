use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

pub const DEFAULT_SEARCH_CAP: usize = 100_000;
pub const DEFAULT_MAX_ATTEMPTS: usize = 100;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum GameMode {
    #[default]
    Normal,
    /// Cells below the top are hidden from the player. The core treats it
    /// exactly like `Normal`; only presentation differs.
    Hidden,
}

impl FromStr for GameMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "NORMAL" | "0" => Ok(GameMode::Normal),
            "HIDDEN" | "1" => Ok(GameMode::Hidden),
            _ => Err(ConfigError::InvalidMode(s.to_string())),
        }
    }
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameMode::Normal => write!(f, "NORMAL"),
            GameMode::Hidden => write!(f, "HIDDEN"),
        }
    }
}

/// How colored cells are shared out between colors.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum ColorPolicy {
    /// One uniformly random color per cell. A color may end up unused.
    #[default]
    Uniform,
    /// Every color gets at least one cell.
    GuaranteedMinimum,
    /// Every color gets exactly one bottle's worth of cells.
    WholeBottles,
}

/// What to do with a generated arrangement before handing it out.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AcceptancePolicy {
    /// Return the first arrangement without searching it.
    AcceptFirst,
    /// Regenerate until the search proves an arrangement solvable.
    RequireSolvable { max_attempts: usize },
}

impl AcceptancePolicy {
    /// Acceptance used when none is set. Only whole-bottle distributions can
    /// be solvable as a rule; under the other policies almost every color
    /// count fails to fill whole bottles, so regenerating would not help.
    pub fn default_for(policy: ColorPolicy) -> Self {
        match policy {
            ColorPolicy::WholeBottles => AcceptancePolicy::RequireSolvable {
                max_attempts: DEFAULT_MAX_ATTEMPTS,
            },
            ColorPolicy::Uniform | ColorPolicy::GuaranteedMinimum => AcceptancePolicy::AcceptFirst,
        }
    }
}

/// How free space is carved out of a freshly filled layout.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum CarvePolicy {
    /// Remove top cells only while fewer than `empty` cells are free.
    #[default]
    FreeSpace,
    /// Remove `empty` top cells unconditionally, discarding them.
    DiscardTops,
}

/// Validated puzzle parameters. Only constructible through [`Config::new`]
/// or [`ConfigBuilder::build`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    bottles: usize,
    capacity: usize,
    colors: usize,
    empty: usize,
    mode: GameMode,
    color_policy: ColorPolicy,
    acceptance: AcceptancePolicy,
    carve_policy: CarvePolicy,
    require_spare_bottle: bool,
    search_cap: usize,
}

impl Config {
    pub fn new(bottles: usize, capacity: usize, colors: usize, empty: usize) -> Result<Self, ConfigError> {
        ConfigBuilder::new(bottles, capacity, colors, empty).build()
    }

    pub fn builder(bottles: usize, capacity: usize, colors: usize, empty: usize) -> ConfigBuilder {
        ConfigBuilder::new(bottles, capacity, colors, empty)
    }

    pub fn get_bottles(&self) -> usize {
        self.bottles
    }

    pub fn get_capacity(&self) -> usize {
        self.capacity
    }

    pub fn get_colors(&self) -> usize {
        self.colors
    }

    pub fn get_empty(&self) -> usize {
        self.empty
    }

    /// Number of colored cells, `bottles * capacity - empty`.
    pub fn get_colored_cells(&self) -> usize {
        self.bottles * self.capacity - self.empty
    }

    /// Upper bound on the cells a single color may hold.
    pub fn get_max_cells_per_color(&self) -> usize {
        self.bottles * self.capacity
    }

    pub fn get_mode(&self) -> GameMode {
        self.mode
    }

    pub fn get_color_policy(&self) -> ColorPolicy {
        self.color_policy
    }

    pub fn get_acceptance(&self) -> AcceptancePolicy {
        self.acceptance
    }

    pub fn get_carve_policy(&self) -> CarvePolicy {
        self.carve_policy
    }

    pub fn requires_spare_bottle(&self) -> bool {
        self.require_spare_bottle
    }

    pub fn get_search_cap(&self) -> usize {
        self.search_cap
    }
}

#[derive(Clone, Debug)]
pub struct ConfigBuilder {
    bottles: usize,
    capacity: usize,
    colors: usize,
    empty: usize,
    mode: GameMode,
    color_policy: ColorPolicy,
    acceptance: Option<AcceptancePolicy>,
    carve_policy: CarvePolicy,
    require_spare_bottle: bool,
    search_cap: usize,
}

impl ConfigBuilder {
    pub fn new(bottles: usize, capacity: usize, colors: usize, empty: usize) -> Self {
        Self {
            bottles,
            capacity,
            colors,
            empty,
            mode: GameMode::default(),
            color_policy: ColorPolicy::default(),
            acceptance: None,
            carve_policy: CarvePolicy::default(),
            require_spare_bottle: false,
            search_cap: DEFAULT_SEARCH_CAP,
        }
    }

    pub fn mode(mut self, mode: GameMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn color_policy(mut self, policy: ColorPolicy) -> Self {
        self.color_policy = policy;
        self
    }

    pub fn acceptance(mut self, acceptance: AcceptancePolicy) -> Self {
        self.acceptance = Some(acceptance);
        self
    }

    pub fn carve_policy(mut self, policy: CarvePolicy) -> Self {
        self.carve_policy = policy;
        self
    }

    /// Require more bottles than colors, so one can always stay empty.
    pub fn require_spare_bottle(mut self, strict: bool) -> Self {
        self.require_spare_bottle = strict;
        self
    }

    pub fn search_cap(mut self, cap: usize) -> Self {
        self.search_cap = cap;
        self
    }

    pub fn build(self) -> Result<Config, ConfigError> {
        if self.bottles < 1 {
            return Err(ConfigError::NoBottles(self.bottles));
        }
        if self.capacity < 1 {
            return Err(ConfigError::NoCapacity(self.capacity));
        }
        if self.colors < 1 {
            return Err(ConfigError::NoColors(self.colors));
        }
        if self.empty < 1 {
            return Err(ConfigError::NoEmptyCells(self.empty));
        }
        let total = self
            .bottles
            .checked_mul(self.capacity)
            .ok_or(ConfigError::NoColoredCells { total: usize::MAX, empty: self.empty })?;
        if total <= self.empty {
            return Err(ConfigError::NoColoredCells { total, empty: self.empty });
        }
        let colored = total - self.empty;
        if colored % self.capacity != 0 {
            return Err(ConfigError::IndivisibleCells {
                colored,
                capacity: self.capacity,
            });
        }
        if self.bottles < self.colors {
            return Err(ConfigError::TooFewBottles {
                bottles: self.bottles,
                colors: self.colors,
            });
        }
        if self.require_spare_bottle && self.bottles == self.colors {
            return Err(ConfigError::NoSpareBottle {
                bottles: self.bottles,
                colors: self.colors,
            });
        }
        if self.color_policy == ColorPolicy::WholeBottles && self.colors * self.capacity != colored {
            return Err(ConfigError::WholeBottleMismatch {
                colors: self.colors,
                capacity: self.capacity,
                needed: self.colors * self.capacity,
                colored,
            });
        }
        if self.color_policy == ColorPolicy::GuaranteedMinimum && colored < self.colors {
            return Err(ConfigError::TooFewCells {
                colored,
                colors: self.colors,
            });
        }
        let acceptance = self
            .acceptance
            .unwrap_or_else(|| AcceptancePolicy::default_for(self.color_policy));
        if acceptance == (AcceptancePolicy::RequireSolvable { max_attempts: 0 }) {
            return Err(ConfigError::NoAttempts);
        }
        if self.search_cap < 1 {
            return Err(ConfigError::NoSearchCap);
        }
        Ok(Config {
            bottles: self.bottles,
            capacity: self.capacity,
            colors: self.colors,
            empty: self.empty,
            mode: self.mode,
            color_policy: self.color_policy,
            acceptance,
            carve_policy: self.carve_policy,
            require_spare_bottle: self.require_spare_bottle,
            search_cap: self.search_cap,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_colored_cells() {
        let config = Config::new(6, 4, 4, 4).unwrap();
        assert_eq!(config.get_colored_cells(), 20);
        assert_eq!(config.get_max_cells_per_color(), 24);
    }

    #[test]
    fn rejects_zero_parameters() {
        assert_eq!(Config::new(0, 4, 4, 4), Err(ConfigError::NoBottles(0)));
        assert_eq!(Config::new(6, 0, 4, 4), Err(ConfigError::NoCapacity(0)));
        assert_eq!(Config::new(6, 4, 0, 4), Err(ConfigError::NoColors(0)));
        assert_eq!(Config::new(6, 4, 4, 0), Err(ConfigError::NoEmptyCells(0)));
    }

    #[test]
    fn rejects_no_colored_cells() {
        assert!(matches!(
            Config::new(2, 2, 1, 4),
            Err(ConfigError::NoColoredCells { total: 4, empty: 4 })
        ));
    }

    #[test]
    fn rejects_indivisible_cells() {
        assert!(matches!(
            Config::new(6, 4, 4, 3),
            Err(ConfigError::IndivisibleCells { colored: 21, capacity: 4 })
        ));
    }

    #[test]
    fn bottle_count_against_colors() {
        assert!(matches!(
            Config::new(3, 2, 4, 2),
            Err(ConfigError::TooFewBottles { bottles: 3, colors: 4 })
        ));
        assert!(!Config::new(4, 2, 4, 2).unwrap().requires_spare_bottle());
        assert!(Config::builder(5, 2, 4, 2)
            .require_spare_bottle(true)
            .build()
            .unwrap()
            .requires_spare_bottle());
        assert!(matches!(
            Config::builder(4, 2, 4, 2).require_spare_bottle(true).build(),
            Err(ConfigError::NoSpareBottle { .. })
        ));
    }

    #[test]
    fn whole_bottles_needs_matching_cells() {
        assert!(Config::builder(6, 4, 4, 8)
            .color_policy(ColorPolicy::WholeBottles)
            .build()
            .is_ok());
        assert!(matches!(
            Config::builder(6, 4, 4, 4)
                .color_policy(ColorPolicy::WholeBottles)
                .build(),
            Err(ConfigError::WholeBottleMismatch { needed: 16, colored: 20, .. })
        ));
    }

    #[test]
    fn guaranteed_minimum_needs_a_cell_per_color() {
        assert!(matches!(
            Config::builder(5, 1, 5, 1)
                .color_policy(ColorPolicy::GuaranteedMinimum)
                .build(),
            Err(ConfigError::TooFewCells { colored: 4, colors: 5 })
        ));
    }

    #[test]
    fn rejects_zero_attempts_and_cap() {
        assert_eq!(
            Config::builder(3, 2, 2, 2)
                .acceptance(AcceptancePolicy::RequireSolvable { max_attempts: 0 })
                .build(),
            Err(ConfigError::NoAttempts)
        );
        assert_eq!(
            Config::builder(3, 2, 2, 2).search_cap(0).build(),
            Err(ConfigError::NoSearchCap)
        );
    }

    #[test]
    fn acceptance_follows_color_policy() {
        assert_eq!(
            Config::new(8, 4, 6, 8).unwrap().get_acceptance(),
            AcceptancePolicy::AcceptFirst
        );
        let whole = Config::builder(6, 4, 4, 8)
            .color_policy(ColorPolicy::WholeBottles)
            .build()
            .unwrap();
        assert_eq!(
            whole.get_acceptance(),
            AcceptancePolicy::RequireSolvable {
                max_attempts: DEFAULT_MAX_ATTEMPTS
            }
        );
        let explicit = Config::builder(6, 4, 4, 8)
            .acceptance(AcceptancePolicy::RequireSolvable { max_attempts: 3 })
            .build()
            .unwrap();
        assert_eq!(
            explicit.get_acceptance(),
            AcceptancePolicy::RequireSolvable { max_attempts: 3 }
        );
    }

    #[test]
    fn parses_mode_tokens() {
        assert_eq!("normal".parse::<GameMode>(), Ok(GameMode::Normal));
        assert_eq!("1".parse::<GameMode>(), Ok(GameMode::Hidden));
        assert_eq!(
            "2".parse::<GameMode>(),
            Err(ConfigError::InvalidMode("2".to_string()))
        );
    }
}
