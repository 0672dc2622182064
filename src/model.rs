use std::collections::BTreeMap;
use std::fmt;

/// Color identifier. Real colors start at 1; 0 never appears in a bottle.
pub type Color = usize;

/// Convert a color into its letter label: 1 -> "A", 26 -> "Z", 27 -> "AA".
/// Uses Excel-style base-26 numbering. Color 0 has no label and renders as ".".
pub fn color_to_letters(color: Color) -> String {
    let mut chars = Vec::new();
    let mut id = color;
    if id == 0 {
        return ".".to_string();
    }
    while id > 0 {
        let rem = (id - 1) % 26;
        chars.push((b'A' + rem as u8) as char);
        id = (id - 1) / 26;
    }
    chars.iter().rev().collect()
}

/// Convert a letter label like "A", "Z", "AA" back into a color.
/// Any non A-Z character makes the label invalid.
pub fn letters_to_color(s: &str) -> Option<Color> {
    let mut acc: usize = 0;
    for ch in s.chars() {
        if !ch.is_ascii_alphabetic() {
            return None;
        }
        let digit = (ch.to_ascii_uppercase() as u8 - b'A') as usize;
        acc = acc.checked_mul(26)?.checked_add(digit + 1)?;
    }
    if acc == 0 { None } else { Some(acc) }
}

/// A capacity-bounded stack of colors. Index 0 is the bottom, the last
/// element is the pourable top.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Bottle {
    colors: Vec<Color>,
    capacity: usize,
}

impl Bottle {
    pub fn new(capacity: usize) -> Self {
        Self {
            colors: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Returns `None` if the colors overflow the capacity or contain color 0.
    pub fn with_colors(colors: Vec<Color>, capacity: usize) -> Option<Self> {
        if colors.len() > capacity || colors.contains(&0) {
            return None;
        }
        Some(Self { colors, capacity })
    }

    /// Parse a bottle written bottom-to-top in letter notation, e.g. "ABB." or
    /// "A,AB,C". Dots and dashes stand for free cells and are skipped.
    pub fn new_from_repr(repr: &str, capacity: usize) -> Option<Self> {
        let tokens: Vec<String> = if repr.contains(',') {
            repr.split(',').map(|t| t.trim().to_string()).collect()
        } else {
            repr.trim().chars().map(|ch| ch.to_string()).collect()
        };
        let mut colors = Vec::new();
        for token in tokens {
            if token.is_empty() || token == "." || token == "-" {
                continue;
            }
            colors.push(letters_to_color(&token)?);
        }
        Self::with_colors(colors, capacity)
    }

    pub fn add_color(&mut self, color: Color) -> bool {
        if self.is_full() || color == 0 {
            return false;
        }
        self.colors.push(color);
        true
    }

    pub fn pop_color(&mut self) -> Option<Color> {
        self.colors.pop()
    }

    pub fn is_full(&self) -> bool {
        self.colors.len() >= self.capacity
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn get_empty_space(&self) -> usize {
        self.capacity.saturating_sub(self.colors.len())
    }

    pub fn get_capacity(&self) -> usize {
        self.capacity
    }

    pub fn get_filled_amount(&self) -> usize {
        self.colors.len()
    }

    pub fn get_colors(&self) -> &[Color] {
        &self.colors
    }

    pub fn get_top_color(&self) -> Option<Color> {
        self.colors.last().copied()
    }

    /// Length of the run of identical colors at the top.
    pub fn get_top_run_depth(&self) -> usize {
        let Some(top) = self.get_top_color() else {
            return 0;
        };
        self.colors.iter().rev().take_while(|&&c| c == top).count()
    }

    pub fn is_monochrome(&self) -> bool {
        self.colors.windows(2).all(|w| w[0] == w[1])
    }

    /// Empty, or full of a single color.
    pub fn is_complete(&self) -> bool {
        self.is_empty() || (self.is_full() && self.is_monochrome())
    }

    /// How many cells a pour from `self` into `other` would move. Zero means
    /// the pour is illegal.
    pub fn get_pourable_amount(&self, other: &Bottle) -> usize {
        let Some(top) = self.get_top_color() else {
            return 0;
        };
        if !other.is_empty() && other.get_top_color() != Some(top) {
            return 0;
        }
        self.get_top_run_depth().min(other.get_empty_space())
    }

    pub fn could_pour_into(&self, other: &Bottle) -> bool {
        self.get_pourable_amount(other) > 0
    }

    /// Pour the top run into `other`. Moved cells keep their relative order.
    pub fn pour_into(&mut self, other: &mut Bottle) -> bool {
        let transfer_amount = self.get_pourable_amount(other);
        if transfer_amount == 0 {
            return false;
        }
        let moved = self.colors.split_off(self.colors.len() - transfer_amount);
        other.colors.extend(moved);
        true
    }

    /// Letters bottom-to-top, one "." per free cell. Commas separate cells
    /// when any label is longer than one letter.
    pub fn get_text_representation(&self) -> String {
        let mut repr: Vec<String> = self.colors.iter().map(|&c| color_to_letters(c)).collect();
        repr.extend(std::iter::repeat_n(".".to_string(), self.get_empty_space()));
        let has_multi_char = repr.iter().any(|s| s.len() > 1);
        let separator = if has_multi_char { "," } else { "" };
        repr.join(separator)
    }
}

/// Pour the maximal top run of one bottle into another.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct MoveAction {
    pub from_container: usize,
    pub to_container: usize,
}

impl MoveAction {
    pub fn new(from_container: usize, to_container: usize) -> Self {
        Self {
            from_container,
            to_container,
        }
    }
}

impl fmt::Display for MoveAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.from_container, self.to_container)
    }
}

/// An arrangement of colors into bottles.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PuzzleState {
    pub bottles: Vec<Bottle>,
}

impl PuzzleState {
    pub fn new(bottles: Vec<Bottle>) -> Self {
        Self { bottles }
    }

    /// Build an arrangement where every bottle shares one capacity.
    pub fn from_colors(bottles: Vec<Vec<Color>>, capacity: usize) -> Option<Self> {
        let bottles = bottles
            .into_iter()
            .map(|colors| Bottle::with_colors(colors, capacity))
            .collect::<Option<Vec<_>>>()?;
        Some(Self { bottles })
    }

    /// Parse one letter-notation token per bottle.
    pub fn new_from_repr<'a>(
        reprs: impl IntoIterator<Item = &'a str>,
        capacity: usize,
    ) -> Option<Self> {
        let bottles = reprs
            .into_iter()
            .map(|repr| Bottle::new_from_repr(repr, capacity))
            .collect::<Option<Vec<_>>>()?;
        Some(Self { bottles })
    }

    pub fn get_bottles(&self) -> &[Bottle] {
        &self.bottles
    }

    pub fn len(&self) -> usize {
        self.bottles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bottles.is_empty()
    }

    pub fn get_container_sizes(&self) -> Vec<usize> {
        self.bottles.iter().map(Bottle::get_capacity).collect()
    }

    pub fn get_filled_cells_count(&self) -> usize {
        self.bottles.iter().map(Bottle::get_filled_amount).sum()
    }

    pub fn get_empty_spaces_count(&self) -> usize {
        self.bottles.iter().map(Bottle::get_empty_space).sum()
    }

    pub fn get_available_colors_with_count(&self) -> BTreeMap<Color, usize> {
        let mut counts = BTreeMap::new();
        for bottle in &self.bottles {
            for &color in bottle.get_colors() {
                *counts.entry(color).or_insert(0) += 1;
            }
        }
        counts
    }

    /// Every bottle is empty or full of one color.
    pub fn is_solved(&self) -> bool {
        self.bottles.iter().all(Bottle::is_complete)
    }

    fn pair_mut(&mut self, from: usize, to: usize) -> Option<(&mut Bottle, &mut Bottle)> {
        if from == to || from >= self.bottles.len() || to >= self.bottles.len() {
            return None;
        }
        if from < to {
            let (left, right) = self.bottles.split_at_mut(to);
            Some((&mut left[from], &mut right[0]))
        } else {
            let (left, right) = self.bottles.split_at_mut(from);
            Some((&mut right[0], &mut left[to]))
        }
    }

    pub fn could_apply_move(&self, action: &MoveAction) -> bool {
        let (from, to) = (action.from_container, action.to_container);
        from != to
            && from < self.bottles.len()
            && to < self.bottles.len()
            && self.bottles[from].could_pour_into(&self.bottles[to])
    }

    /// Apply a pour in place. Returns false and leaves the state untouched if
    /// the move is illegal.
    pub fn apply_move(&mut self, action: &MoveAction) -> bool {
        match self.pair_mut(action.from_container, action.to_container) {
            Some((from, to)) => from.pour_into(to),
            None => false,
        }
    }

    /// The state reached by a legal move, or `None`.
    pub fn with_move(&self, action: &MoveAction) -> Option<PuzzleState> {
        if !self.could_apply_move(action) {
            return None;
        }
        let mut next = self.clone();
        next.apply_move(action);
        Some(next)
    }

    /// Every legal move from this state, in (source, destination) order.
    pub fn get_legal_moves(&self) -> Vec<MoveAction> {
        let n = self.bottles.len();
        (0..n)
            .flat_map(|from| (0..n).map(move |to| MoveAction::new(from, to)))
            .filter(|action| self.could_apply_move(action))
            .collect()
    }

    /// Order-preserving, hashable snapshot of the colors in every bottle.
    pub fn canonical_key(&self) -> Vec<Vec<Color>> {
        self.bottles.iter().map(|b| b.get_colors().to_vec()).collect()
    }

    pub fn get_text_representation(&self) -> String {
        self.bottles
            .iter()
            .map(Bottle::get_text_representation)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl fmt::Display for PuzzleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, bottle) in self.bottles.iter().enumerate() {
            writeln!(f, "{:>3}: {}", index, bottle.get_text_representation())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(bottles: Vec<Vec<Color>>, capacity: usize) -> PuzzleState {
        PuzzleState::from_colors(bottles, capacity).unwrap()
    }

    #[test]
    fn letters_round_trip_past_z() {
        assert_eq!(color_to_letters(1), "A");
        assert_eq!(color_to_letters(26), "Z");
        assert_eq!(color_to_letters(27), "AA");
        assert_eq!(letters_to_color("ab"), Some(28));
        assert_eq!(letters_to_color("A1"), None);
        assert_eq!(letters_to_color(""), None);
    }

    #[test]
    fn top_run_depth_counts_matching_colors() {
        let bottle = Bottle::with_colors(vec![1, 2, 2, 2], 4).unwrap();
        assert_eq!(bottle.get_top_run_depth(), 3);
        assert_eq!(Bottle::new(4).get_top_run_depth(), 0);
    }

    #[test]
    fn pour_is_limited_by_free_space() {
        let mut from = Bottle::with_colors(vec![1, 2, 2, 2], 4).unwrap();
        let mut to = Bottle::with_colors(vec![3, 2], 3).unwrap();
        assert_eq!(from.get_pourable_amount(&to), 1);
        assert!(from.pour_into(&mut to));
        assert_eq!(from.get_colors(), &[1, 2, 2]);
        assert_eq!(to.get_colors(), &[3, 2, 2]);
    }

    #[test]
    fn pour_rejects_color_mismatch_and_full_destination() {
        let from = Bottle::with_colors(vec![1], 2).unwrap();
        let mismatch = Bottle::with_colors(vec![2], 2).unwrap();
        let full = Bottle::with_colors(vec![1, 1], 2).unwrap();
        assert!(!from.could_pour_into(&mismatch));
        assert!(!from.could_pour_into(&full));
        assert!(!Bottle::new(2).could_pour_into(&Bottle::new(2)));
    }

    #[test]
    fn overfull_bottle_is_rejected() {
        assert!(Bottle::with_colors(vec![1, 1, 1], 2).is_none());
        assert!(Bottle::with_colors(vec![0], 2).is_none());
    }

    #[test]
    fn goal_predicate() {
        assert!(state(vec![vec![], vec![], vec![]], 4).is_solved());
        assert!(state(vec![vec![1, 1, 1, 1], vec![], vec![]], 4).is_solved());
        assert!(!state(vec![vec![1, 2], vec![]], 4).is_solved());
        // monochrome but not full
        assert!(!state(vec![vec![1, 1], vec![1, 1]], 4).is_solved());
    }

    #[test]
    fn apply_move_conserves_cells() {
        let mut s = state(vec![vec![1, 2], vec![2, 1], vec![]], 2);
        let before = s.get_filled_cells_count();
        assert!(s.apply_move(&MoveAction::new(0, 2)));
        assert_eq!(s.canonical_key(), vec![vec![1], vec![2, 1], vec![2]]);
        assert_eq!(s.get_filled_cells_count(), before);
    }

    #[test]
    fn apply_move_rejects_bad_indices() {
        let mut s = state(vec![vec![1], vec![]], 2);
        assert!(!s.apply_move(&MoveAction::new(0, 0)));
        assert!(!s.apply_move(&MoveAction::new(0, 5)));
        assert!(!s.apply_move(&MoveAction::new(7, 1)));
        assert!(s.apply_move(&MoveAction::new(0, 1)));
    }

    #[test]
    fn legal_moves_without_free_space() {
        let s = state(vec![vec![1, 2], vec![2, 1]], 2);
        assert!(s.get_legal_moves().is_empty());
    }

    #[test]
    fn text_representation_round_trips() {
        let s = state(vec![vec![1, 2], vec![3], vec![]], 3);
        let text = s.get_text_representation();
        assert_eq!(text, "AB.\nC..\n...");
        let parsed = PuzzleState::new_from_repr(text.lines(), 3).unwrap();
        assert_eq!(parsed, s);
    }
}
