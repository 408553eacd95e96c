//! Variable value domains.

use std::fmt;

/// The two-element value domain shared by every variable of a model.
///
/// # Examples
///
/// ```
/// use u_stitch::csp::Vartype;
///
/// assert_eq!(Vartype::Spin.values(), [-1, 1]);
/// assert_eq!(Vartype::Binary.flip(0), 1);
/// assert!(!Vartype::Binary.contains(-1));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Vartype {
    /// Variables take values in {-1, +1}.
    Spin,
    /// Variables take values in {0, 1}.
    Binary,
}

impl Vartype {
    /// The domain as `[low, high]`.
    pub const fn values(self) -> [i8; 2] {
        match self {
            Vartype::Spin => [-1, 1],
            Vartype::Binary => [0, 1],
        }
    }

    /// The "negative" member of the domain (-1 or 0).
    pub const fn low(self) -> i8 {
        self.values()[0]
    }

    /// The "positive" member of the domain (always 1).
    pub const fn high(self) -> i8 {
        self.values()[1]
    }

    /// Whether `value` belongs to this domain.
    pub fn contains(self, value: i8) -> bool {
        value == self.low() || value == self.high()
    }

    /// Maps a domain value to its complement.
    pub fn flip(self, value: i8) -> i8 {
        match self {
            Vartype::Spin => -value,
            Vartype::Binary => 1 - value,
        }
    }

    /// Translates a domain value to the equivalent spin.
    pub fn to_spin(self, value: i8) -> i8 {
        if value == self.high() {
            1
        } else {
            -1
        }
    }

    /// Translates a spin to the equivalent value in this domain.
    pub fn from_spin(self, spin: i8) -> i8 {
        if spin > 0 {
            self.high()
        } else {
            self.low()
        }
    }

    /// Iterates the full Cartesian product of the domain over `n` positions
    /// in lexicographic order (low before high, first position most
    /// significant).
    pub fn configurations(self, n: usize) -> impl Iterator<Item = Vec<i8>> {
        let [low, high] = self.values();
        (0..1u64 << n).map(move |mask| {
            (0..n)
                .map(|i| {
                    if mask >> (n - 1 - i) & 1 == 1 {
                        high
                    } else {
                        low
                    }
                })
                .collect()
        })
    }
}

impl fmt::Display for Vartype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Vartype::Spin => write!(f, "SPIN"),
            Vartype::Binary => write!(f, "BINARY"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domains() {
        assert_eq!(Vartype::Spin.low(), -1);
        assert_eq!(Vartype::Spin.high(), 1);
        assert_eq!(Vartype::Binary.low(), 0);
        assert_eq!(Vartype::Binary.high(), 1);
        assert!(Vartype::Spin.contains(-1));
        assert!(!Vartype::Spin.contains(0));
    }

    #[test]
    fn test_flip_is_complement() {
        for vartype in [Vartype::Spin, Vartype::Binary] {
            let [low, high] = vartype.values();
            assert_eq!(vartype.flip(low), high);
            assert_eq!(vartype.flip(high), low);
        }
    }

    #[test]
    fn test_spin_translation() {
        assert_eq!(Vartype::Binary.to_spin(0), -1);
        assert_eq!(Vartype::Binary.to_spin(1), 1);
        assert_eq!(Vartype::Binary.from_spin(-1), 0);
        assert_eq!(Vartype::Spin.from_spin(1), 1);
    }

    #[test]
    fn test_configurations_order() {
        let all: Vec<Vec<i8>> = Vartype::Binary.configurations(2).collect();
        assert_eq!(all, vec![vec![0, 0], vec![0, 1], vec![1, 0], vec![1, 1]]);

        assert_eq!(Vartype::Spin.configurations(0).collect::<Vec<_>>(), vec![Vec::<i8>::new()]);
        assert_eq!(Vartype::Spin.configurations(5).count(), 32);
    }
}
