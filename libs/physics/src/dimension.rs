use crate::error::{Error, Result};

/// A named base unit, identified for equality purposes by its prime.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Dimension {
    pub name: String,
    pub symbol: Option<String>,
    pub prime: u64,
}

impl Dimension {
    /// Short form used when rendering dimension lists (`kg` rather than `kilogram`).
    pub fn label(&self) -> &str {
        self.symbol.as_deref().unwrap_or(&self.name)
    }

    pub fn matches(&self, key: &str) -> bool {
        self.name == key || self.symbol.as_deref() == Some(key)
    }
}

/// Base dimensions known to a compilation, each assigned a distinct prime in
/// declaration order (2, 3, 5, 7, ...).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DimensionTable {
    dimensions: Vec<Dimension>,
}

const SI_BASE: &[(&str, &str)] = &[
    ("meter", "m"),
    ("kilogram", "kg"),
    ("second", "s"),
    ("ampere", "A"),
    ("kelvin", "K"),
    ("mole", "mol"),
    ("candela", "cd"),
    ("radian", "rad"),
];

impl DimensionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// The seven SI base units plus `rad`, which the cross product needs.
    pub fn si() -> Self {
        let mut dimensions = Vec::with_capacity(SI_BASE.len());
        let mut prime = 1;
        for (name, symbol) in SI_BASE {
            prime = next_prime(prime);
            dimensions.push(Dimension {
                name: (*name).to_string(),
                symbol: Some((*symbol).to_string()),
                prime,
            });
        }
        Self { dimensions }
    }

    pub fn insert(&mut self, name: impl Into<String>, symbol: Option<String>) -> Result<&Dimension> {
        let name = name.into();
        if self.get(&name).is_some() {
            return Err(Error::DuplicateDimension(name));
        }
        if let Some(symbol) = symbol.as_deref() {
            if self.get(symbol).is_some() {
                return Err(Error::DuplicateDimension(symbol.to_string()));
            }
        }

        let prime = next_prime(self.dimensions.last().map(|d| d.prime).unwrap_or(1));
        tracing::trace!(dimension = %name, prime, "registered dimension");

        let index = self.dimensions.len();
        self.dimensions.push(Dimension { name, symbol, prime });
        Ok(&self.dimensions[index])
    }

    /// Look a dimension up by name or by symbol.
    pub fn get(&self, key: &str) -> Option<&Dimension> {
        self.dimensions.iter().find(|d| d.matches(key))
    }

    pub fn len(&self) -> usize {
        self.dimensions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dimensions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Dimension> {
        self.dimensions.iter()
    }
}

fn next_prime(after: u64) -> u64 {
    let mut candidate = after + 1;
    while !is_prime(candidate) {
        candidate += 1;
    }
    candidate
}

fn is_prime(n: u64) -> bool {
    if n < 2 {
        return false;
    }
    let mut divisor = 2;
    while divisor * divisor <= n {
        if n % divisor == 0 {
            return false;
        }
        divisor += 1;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primes_are_assigned_in_declaration_order() {
        let mut table = DimensionTable::new();
        let primes: Vec<u64> = ["a", "b", "c", "d", "e"]
            .iter()
            .map(|n| table.insert(*n, None).unwrap().prime)
            .collect();
        assert_eq!(primes, vec![2, 3, 5, 7, 11]);
    }

    #[test]
    fn lookup_by_name_or_symbol() {
        let table = DimensionTable::si();
        assert_eq!(table.get("kilogram").unwrap().prime, 3);
        assert_eq!(table.get("kg").unwrap().prime, 3);
        assert_eq!(table.get("rad").unwrap().name, "radian");
        assert!(table.get("furlong").is_none());
    }

    #[test]
    fn rejects_duplicates() {
        let mut table = DimensionTable::si();
        assert!(matches!(
            table.insert("meter", None),
            Err(Error::DuplicateDimension(_))
        ));
        assert!(matches!(
            table.insert("metre", Some("m".into())),
            Err(Error::DuplicateDimension(s)) if s == "m"
        ));
        assert_eq!(table.insert("bit", None).unwrap().prime, 23);
    }
}
